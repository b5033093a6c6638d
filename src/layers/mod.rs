//! Layer Model Module
//!
//! Implements the artboard's layer stack:
//! - Raster layers: pixels plus a filter chain
//! - Adjustment layers: settings that recolor everything beneath them
//! - Documents: the persisted ground truth of a stack

mod document;
mod layer;
mod stack;

pub use document::{Document, LayerRecord, DOCUMENT_VERSION};
pub use layer::{AdjustmentLayer, Layer, LayerId, RasterLayer};
pub use stack::{LayerStack, StackEvent};
