//! Render targets
//!
//! The compositor never touches pixels. It hands each raster layer's
//! effective chain to a [`RenderTarget`] and asks it to repaint once per
//! pass.

use std::collections::HashMap;

use crate::filters::{FilterChain, FilterOp};
use crate::layers::LayerId;

/// Rendering collaborator that applies filter chains to layer pixels
pub trait RenderTarget {
    /// Replace the filters applied to one raster layer
    fn apply_filter_chain(&mut self, layer_id: LayerId, chain: &[FilterOp]);

    /// Redraw the artboard; called once after every composite pass
    fn request_repaint(&mut self);
}

/// Target that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTarget;

impl RenderTarget for NullTarget {
    fn apply_filter_chain(&mut self, _layer_id: LayerId, _chain: &[FilterOp]) {}

    fn request_repaint(&mut self) {}
}

/// Target that remembers the last chain per layer
///
/// Used by the CLI to print results and by tests to observe passes.
#[derive(Debug, Clone, Default)]
pub struct RecordingTarget {
    chains: HashMap<LayerId, FilterChain>,
    applied: usize,
    repaints: usize,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last chain applied to `layer_id`
    pub fn chain_for(&self, layer_id: LayerId) -> Option<&[FilterOp]> {
        self.chains.get(&layer_id).map(Vec::as_slice)
    }

    /// Total `apply_filter_chain` calls
    pub fn applied(&self) -> usize {
        self.applied
    }

    pub fn repaints(&self) -> usize {
        self.repaints
    }

    pub fn reset(&mut self) {
        self.chains.clear();
        self.applied = 0;
        self.repaints = 0;
    }
}

impl RenderTarget for RecordingTarget {
    fn apply_filter_chain(&mut self, layer_id: LayerId, chain: &[FilterOp]) {
        self.chains.insert(layer_id, chain.to_vec());
        self.applied += 1;
    }

    fn request_repaint(&mut self) {
        self.repaints += 1;
    }
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    fn apply_filter_chain(&mut self, layer_id: LayerId, chain: &[FilterOp]) {
        (**self).apply_filter_chain(layer_id, chain);
    }

    fn request_repaint(&mut self) {
        (**self).request_repaint();
    }
}
