//! Compositing Engine Module
//!
//! - Compositor: owns the stack and recomputes effective filter chains
//! - Render targets: where the chains are delivered

mod compositor;
mod target;

pub use compositor::{Compositor, MountState, StackObserver};
pub use target::{NullTarget, RecordingTarget, RenderTarget};
