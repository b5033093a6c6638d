//! Artboard - Non-destructive Adjustment Layer Compositing
//!
//! Artboard keeps an ordered stack of raster and adjustment layers and
//! derives, for every raster layer, the filter chain a renderer should
//! apply to it.
//!
//! # Architecture
//!
//! - Raster layers own a base filter chain that is captured once and never
//!   overwritten.
//! - Adjustment layers hold no pixels. Each one contributes primitive
//!   filter ops to every raster layer beneath it.
//! - The compositor recomputes `current = base ++ ops of visible
//!   adjustments above` after every mutation and hands the result to a
//!   [`RenderTarget`].

pub mod adjustments;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod filters;
pub mod history;
pub mod layers;

pub use adjustments::{AdjustmentKind, AdjustmentSettings};
pub use config::EngineConfig;
pub use engine::{Compositor, MountState, NullTarget, RecordingTarget, RenderTarget, StackObserver};
pub use error::{ArtboardError, Result};
pub use filters::{CurveChannel, CurvePoint, FilterChain, FilterOp};
pub use history::{ActionType, History, HistoryEntry};
pub use layers::{AdjustmentLayer, Document, Layer, LayerId, LayerStack, RasterLayer, StackEvent};
