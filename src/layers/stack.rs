//! Layer Stack
//!
//! The ordered, bottom-to-top sequence of layers. Index comparison is the
//! only notion of "above" and "below"; no layer caches its own position.
//! Every mutation goes through a named method returning a single
//! [`StackEvent`].

use serde_json::Value;

use crate::adjustments::{AdjustmentKind, AdjustmentSettings};
use crate::error::{ArtboardError, Result};

use super::layer::{AdjustmentLayer, Layer, LayerId, RasterLayer};

/// Notification emitted by every stack mutation
#[derive(Debug, Clone, PartialEq)]
pub enum StackEvent {
    Inserted { layer_id: LayerId, index: usize },
    Removed { layer_id: LayerId, index: usize },
    Moved { layer_id: LayerId, from: usize, to: usize },
    VisibilityChanged { layer_id: LayerId, visible: bool },
    SettingsChanged { layer_id: LayerId },
    IntensityChanged { layer_id: LayerId, intensity: f32 },
    /// The whole stack was swapped (document load, undo, redo)
    Replaced,
}

impl StackEvent {
    pub fn layer_id(&self) -> Option<LayerId> {
        match self {
            StackEvent::Inserted { layer_id, .. }
            | StackEvent::Removed { layer_id, .. }
            | StackEvent::Moved { layer_id, .. }
            | StackEvent::VisibilityChanged { layer_id, .. }
            | StackEvent::SettingsChanged { layer_id }
            | StackEvent::IntensityChanged { layer_id, .. } => Some(*layer_id),
            StackEvent::Replaced => None,
        }
    }
}

/// Ordered layer stack, index 0 at the bottom
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    /// Build a stack from bottom-to-top layers
    ///
    /// # Errors
    /// Returns `DuplicateLayer` if two layers share an id
    pub fn from_layers(layers: Vec<Layer>) -> Result<Self> {
        let mut stack = Self::new();
        for layer in layers {
            stack.push(layer)?;
        }
        Ok(stack)
    }

    /// Insert a layer at `index` (clamped to the stack length)
    pub fn insert(&mut self, layer: impl Into<Layer>, index: usize) -> Result<StackEvent> {
        let layer = layer.into();
        let layer_id = layer.id();
        if self.index_of(layer_id).is_some() {
            return Err(ArtboardError::DuplicateLayer {
                layer_id: layer_id.to_string(),
            });
        }

        let index = index.min(self.layers.len());
        log::debug!("Inserting layer '{}' ({}) at {}", layer.name(), layer_id, index);
        self.layers.insert(index, layer);
        Ok(StackEvent::Inserted { layer_id, index })
    }

    /// Insert a layer on top of the stack
    pub fn push(&mut self, layer: impl Into<Layer>) -> Result<StackEvent> {
        let top = self.layers.len();
        self.insert(layer, top)
    }

    /// Remove a layer by id
    pub fn remove(&mut self, layer_id: LayerId) -> Result<StackEvent> {
        let index = self.require(layer_id)?;
        let layer = self.layers.remove(index);
        log::debug!("Removed layer '{}' ({}) from {}", layer.name(), layer_id, index);
        Ok(StackEvent::Removed { layer_id, index })
    }

    /// Move a layer to `new_index` (clamped to the top of the stack)
    pub fn move_layer(&mut self, layer_id: LayerId, new_index: usize) -> Result<StackEvent> {
        let from = self.require(layer_id)?;
        let layer = self.layers.remove(from);
        let to = new_index.min(self.layers.len());
        self.layers.insert(to, layer);
        log::debug!("Moved layer {} from {} to {}", layer_id, from, to);
        Ok(StackEvent::Moved { layer_id, from, to })
    }

    /// Show or hide any layer
    pub fn set_visible(&mut self, layer_id: LayerId, visible: bool) -> Result<StackEvent> {
        let index = self.require(layer_id)?;
        self.layers[index].set_visible(visible);
        Ok(StackEvent::VisibilityChanged { layer_id, visible })
    }

    /// Replace an adjustment layer's settings
    ///
    /// The settings may change the layer's kind. Non-finite values are
    /// replaced with defaults.
    pub fn set_adjustment_settings(
        &mut self,
        layer_id: LayerId,
        settings: AdjustmentSettings,
    ) -> Result<StackEvent> {
        let layer = self.adjustment_mut(layer_id)?;
        layer.set_settings(settings);
        Ok(StackEvent::SettingsChanged { layer_id })
    }

    /// Apply an editor payload to an adjustment layer
    ///
    /// The payload is parsed against the layer's current kind; missing or
    /// malformed fields take that kind's defaults.
    pub fn set_adjustment_settings_json(
        &mut self,
        layer_id: LayerId,
        settings: &Value,
    ) -> Result<StackEvent> {
        let layer = self.adjustment_mut(layer_id)?;
        let parsed = layer.settings().reparse(settings);
        layer.set_settings(parsed);
        Ok(StackEvent::SettingsChanged { layer_id })
    }

    /// Set an adjustment layer's intensity (clamped to [0, 1])
    pub fn set_intensity(&mut self, layer_id: LayerId, intensity: f32) -> Result<StackEvent> {
        let layer = self.adjustment_mut(layer_id)?;
        layer.set_intensity(intensity);
        Ok(StackEvent::IntensityChanged {
            layer_id,
            intensity: layer.intensity(),
        })
    }

    /// Swap in a whole new set of layers
    pub(crate) fn replace(&mut self, other: LayerStack) -> StackEvent {
        self.layers = other.layers;
        StackEvent::Replaced
    }

    pub fn get(&self, layer_id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == layer_id)
    }

    pub fn at(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn index_of(&self, layer_id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id() == layer_id)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers bottom-to-top
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn raster_layers(&self) -> impl Iterator<Item = (usize, &RasterLayer)> {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_raster().map(|r| (i, r)))
    }

    pub fn adjustment_layers(&self) -> impl Iterator<Item = (usize, &AdjustmentLayer)> {
        self.layers
            .iter()
            .enumerate()
            .filter_map(|(i, l)| l.as_adjustment().map(|a| (i, a)))
    }

    /// Visible adjustment layers strictly above `index`, in ascending order
    pub fn adjustments_above(&self, index: usize) -> impl Iterator<Item = (usize, &AdjustmentLayer)> {
        self.adjustment_layers()
            .filter(move |(i, a)| *i > index && a.is_visible())
    }

    /// Layers that are drawn and exported; adjustment layers never are
    pub fn drawable_layers(&self) -> impl Iterator<Item = &RasterLayer> {
        self.layers.iter().filter_map(Layer::as_raster)
    }

    /// Next free default name for a new adjustment, e.g. "Curves 2"
    pub fn generate_name(&self, kind: AdjustmentKind) -> String {
        let base = kind.display_name();
        let mut counter = 1;
        loop {
            let name = format!("{} {}", base, counter);
            if !self.layers.iter().any(|l| l.name() == name) {
                return name;
            }
            counter += 1;
        }
    }

    pub(crate) fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    fn require(&self, layer_id: LayerId) -> Result<usize> {
        self.index_of(layer_id)
            .ok_or_else(|| ArtboardError::layer_not_found(layer_id))
    }

    fn adjustment_mut(&mut self, layer_id: LayerId) -> Result<&mut AdjustmentLayer> {
        let index = self.require(layer_id)?;
        self.layers[index]
            .as_adjustment_mut()
            .ok_or_else(|| ArtboardError::NotAnAdjustmentLayer {
                layer_id: layer_id.to_string(),
            })
    }
}
