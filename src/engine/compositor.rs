//! Compositing Engine
//!
//! Owns the layer stack and recomputes every raster layer's effective
//! filter chain from its captured base plus the visible adjustments above
//! it. A pass never fails and is idempotent: running it twice in a row
//! yields the same chains.

use std::fmt;

use serde_json::Value;

use crate::adjustments::{AdjustmentKind, AdjustmentSettings};
use crate::config::EngineConfig;
use crate::error::{ArtboardError, Result};
use crate::filters::{adjustment_ops, FilterChain, LutCache};
use crate::history::{ActionType, History, HistoryEntry};
use crate::layers::{AdjustmentLayer, Document, Layer, LayerId, LayerStack, StackEvent};

use super::target::RenderTarget;

/// Listener notified after each mutation has been recomposited
pub trait StackObserver {
    fn stack_changed(&mut self, event: &StackEvent, stack: &LayerStack);
}

impl<F> StackObserver for F
where
    F: FnMut(&StackEvent, &LayerStack),
{
    fn stack_changed(&mut self, event: &StackEvent, stack: &LayerStack) {
        self(event, stack)
    }
}

/// Lifecycle of the deferred initial pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountState {
    /// Not attached to a host yet
    Unmounted,
    /// Mounted; the initial pass runs on the next tick
    Pending,
    /// Initial pass done
    Mounted,
}

/// Non-destructive adjustment-layer compositor
pub struct Compositor<R: RenderTarget> {
    stack: LayerStack,
    luts: LutCache,
    target: R,
    config: EngineConfig,
    history: History,
    observers: Vec<Box<dyn StackObserver>>,
    mount_state: MountState,
    passes: u64,
}

impl<R: RenderTarget + fmt::Debug> fmt::Debug for Compositor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compositor")
            .field("stack", &self.stack)
            .field("target", &self.target)
            .field("config", &self.config)
            .field("mount_state", &self.mount_state)
            .field("passes", &self.passes)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<R: RenderTarget> Compositor<R> {
    /// Create a compositor with the default configuration
    pub fn new(target: R) -> Self {
        Self::with_config(target, EngineConfig::default())
    }

    pub fn with_config(target: R, config: EngineConfig) -> Self {
        Self {
            stack: LayerStack::new(),
            luts: LutCache::new(config.lut_cache_capacity),
            target,
            history: History::new(config.max_undo_levels),
            config,
            observers: Vec::new(),
            mount_state: MountState::Unmounted,
            passes: 0,
        }
    }

    /// Builder: start from an existing stack
    ///
    /// Nothing is composited until the compositor is mounted or mutated.
    pub fn with_stack(mut self, stack: LayerStack) -> Self {
        self.stack = stack;
        self
    }

    // === Accessors ===

    pub fn stack(&self) -> &LayerStack {
        &self.stack
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn into_target(self) -> R {
        self.target
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn lut_cache(&self) -> &LutCache {
        &self.luts
    }

    /// Number of composite passes run so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn mount_state(&self) -> MountState {
        self.mount_state
    }

    /// Snapshot of the current ground truth
    pub fn document(&self) -> Document {
        Document::from_stack(&self.stack)
    }

    pub fn subscribe(&mut self, observer: impl StackObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    // === Lifecycle ===

    /// Attach to a host
    ///
    /// With `defer_initial_composite` the first pass waits for the next
    /// [`tick`](Self::tick); otherwise it runs now. Mounting twice is a no-op.
    pub fn mount(&mut self) {
        if self.mount_state != MountState::Unmounted {
            return;
        }

        if self.config.defer_initial_composite {
            tracing::debug!("initial composite deferred to next tick");
            self.mount_state = MountState::Pending;
        } else {
            self.composite();
            self.mount_state = MountState::Mounted;
        }
    }

    /// Host event-loop tick; runs the deferred initial pass once
    ///
    /// Returns `true` if a pass ran.
    pub fn tick(&mut self) -> bool {
        if self.mount_state != MountState::Pending {
            return false;
        }
        self.composite();
        self.mount_state = MountState::Mounted;
        true
    }

    // === Compositing ===

    /// Recompute every raster layer's effective chain
    ///
    /// Each raster layer's base chain is captured on first contact. The
    /// effective chain is the base followed by the ops of every visible
    /// adjustment layer above it, bottom to top.
    pub fn composite(&mut self) {
        self.passes += 1;

        let mut contributions: Vec<(usize, FilterChain)> = Vec::new();
        for (index, adjustment) in self.stack.adjustment_layers() {
            if !adjustment.is_visible() {
                continue;
            }
            if adjustment.kind().is_none() {
                tracing::warn!(
                    layer_id = %adjustment.id(),
                    kind = adjustment.settings().kind_name(),
                    "unrecognized adjustment kind contributes no filters"
                );
            }
            let ops = adjustment_ops(adjustment.settings(), adjustment.intensity(), &mut self.luts);
            contributions.push((index, ops));
        }

        let mut rasters = 0usize;
        for (index, layer) in self.stack.layers_mut().iter_mut().enumerate() {
            let Layer::Raster(raster) = layer else {
                continue;
            };

            let mut chain = raster.capture_base().clone();
            chain.extend(
                contributions
                    .iter()
                    .filter(|(above, _)| *above > index)
                    .flat_map(|(_, ops)| ops.iter().cloned()),
            );

            self.target.apply_filter_chain(raster.id(), &chain);
            raster.set_current(chain);
            rasters += 1;
        }

        self.target.request_repaint();
        tracing::debug!(
            pass = self.passes,
            rasters,
            adjustments = contributions.len(),
            "composite pass"
        );
    }

    // === Mutations ===

    /// Insert a layer at `index` (clamped)
    pub fn insert_layer(&mut self, layer: impl Into<Layer>, index: usize) -> Result<&LayerStack> {
        let layer = layer.into();
        let description = format!("Insert '{}'", layer.name());
        self.apply(ActionType::InsertLayer, description, move |stack| {
            stack.insert(layer, index)
        })
    }

    /// Insert a layer on top of the stack
    pub fn push_layer(&mut self, layer: impl Into<Layer>) -> Result<&LayerStack> {
        let top = self.stack.len();
        self.insert_layer(layer, top)
    }

    /// Insert a default adjustment of `kind` with the next free name
    ///
    /// Returns the new layer's id.
    pub fn add_adjustment(&mut self, kind: AdjustmentKind, index: usize) -> Result<LayerId> {
        let layer = AdjustmentLayer::new(kind).named(self.stack.generate_name(kind));
        let id = layer.id();
        self.insert_layer(layer, index)?;
        Ok(id)
    }

    pub fn remove_layer(&mut self, layer_id: LayerId) -> Result<&LayerStack> {
        let description = format!("Remove '{}'", self.layer_name(layer_id)?);
        self.apply(ActionType::RemoveLayer, description, move |stack| {
            stack.remove(layer_id)
        })
    }

    /// Move a layer to `new_index` (clamped)
    pub fn move_layer(&mut self, layer_id: LayerId, new_index: usize) -> Result<&LayerStack> {
        let description = format!("Move '{}' to {}", self.layer_name(layer_id)?, new_index);
        self.apply(ActionType::MoveLayer, description, move |stack| {
            stack.move_layer(layer_id, new_index)
        })
    }

    pub fn set_visible(&mut self, layer_id: LayerId, visible: bool) -> Result<&LayerStack> {
        let verb = if visible { "Show" } else { "Hide" };
        let description = format!("{} '{}'", verb, self.layer_name(layer_id)?);
        self.apply(ActionType::ToggleVisibility, description, move |stack| {
            stack.set_visible(layer_id, visible)
        })
    }

    pub fn set_adjustment_settings(
        &mut self,
        layer_id: LayerId,
        settings: AdjustmentSettings,
    ) -> Result<&LayerStack> {
        let description = format!("Edit '{}'", self.layer_name(layer_id)?);
        self.apply(ActionType::EditSettings, description, move |stack| {
            stack.set_adjustment_settings(layer_id, settings)
        })
    }

    /// Apply a settings payload from a UI editor
    ///
    /// Partial or malformed payloads are never rejected; missing fields
    /// take the kind's defaults.
    pub fn set_adjustment_settings_json(
        &mut self,
        layer_id: LayerId,
        settings: &Value,
    ) -> Result<&LayerStack> {
        let description = format!("Edit '{}'", self.layer_name(layer_id)?);
        self.apply(ActionType::EditSettings, description, move |stack| {
            stack.set_adjustment_settings_json(layer_id, settings)
        })
    }

    pub fn set_intensity(&mut self, layer_id: LayerId, intensity: f32) -> Result<&LayerStack> {
        let description = format!("Set intensity of '{}'", self.layer_name(layer_id)?);
        self.apply(ActionType::EditIntensity, description, move |stack| {
            stack.set_intensity(layer_id, intensity)
        })
    }

    /// Replace the whole stack with a document's layers
    pub fn load_document(&mut self, document: Document) -> Result<&LayerStack> {
        let restored = document.into_stack()?;
        let description = format!("Load document ({} layers)", restored.len());
        self.apply(ActionType::LoadDocument, description, move |stack| {
            Ok(stack.replace(restored))
        })
    }

    // === History ===

    /// Restore the stack to before the last recorded mutation
    pub fn undo(&mut self) -> Result<&LayerStack> {
        let entry = self.history.peek_undo().ok_or(ArtboardError::NothingToUndo)?;
        let restored = entry.before.clone().into_stack()?;
        let entry = self.history.undo()?;
        log::info!("Undo: {}", entry.description);
        Ok(self.restore(restored))
    }

    /// Re-apply the last undone mutation
    pub fn redo(&mut self) -> Result<&LayerStack> {
        let entry = self.history.peek_redo().ok_or(ArtboardError::NothingToRedo)?;
        let restored = entry.after.clone().into_stack()?;
        let entry = self.history.redo()?;
        log::info!("Redo: {}", entry.description);
        Ok(self.restore(restored))
    }

    fn restore(&mut self, restored: LayerStack) -> &LayerStack {
        let event = self.stack.replace(restored);
        self.composite();
        self.notify(&event);
        &self.stack
    }

    fn apply<F>(&mut self, action: ActionType, description: String, mutate: F) -> Result<&LayerStack>
    where
        F: FnOnce(&mut LayerStack) -> Result<StackEvent>,
    {
        let before = self.config.record_history.then(|| self.document());

        let event = mutate(&mut self.stack)?;
        self.composite();

        if let Some(before) = before {
            let after = self.document();
            self.history
                .push(HistoryEntry::new(action, description, before, after));
        }

        self.notify(&event);
        Ok(&self.stack)
    }

    fn notify(&mut self, event: &StackEvent) {
        for observer in &mut self.observers {
            observer.stack_changed(event, &self.stack);
        }
    }

    fn layer_name(&self, layer_id: LayerId) -> Result<String> {
        self.stack
            .get(layer_id)
            .map(|l| l.name().to_string())
            .ok_or_else(|| ArtboardError::layer_not_found(layer_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RecordingTarget;
    use crate::filters::FilterOp;
    use crate::layers::RasterLayer;

    fn compositor() -> Compositor<RecordingTarget> {
        Compositor::new(RecordingTarget::new())
    }

    #[test]
    fn test_mount_defers_initial_pass() {
        let mut comp = compositor().with_stack(
            LayerStack::from_layers(vec![RasterLayer::new("bg").into()]).unwrap(),
        );
        comp.mount();
        assert_eq!(comp.mount_state(), MountState::Pending);
        assert_eq!(comp.passes(), 0);

        assert!(comp.tick());
        assert!(!comp.tick());
        assert_eq!(comp.passes(), 1);
        assert_eq!(comp.mount_state(), MountState::Mounted);
        assert_eq!(comp.target().repaints(), 1);
    }

    #[test]
    fn test_mount_without_deferral() {
        let config = EngineConfig {
            defer_initial_composite: false,
            ..EngineConfig::default()
        };
        let mut comp = Compositor::with_config(RecordingTarget::new(), config);
        comp.mount();
        comp.mount();
        assert_eq!(comp.passes(), 1);
        assert!(!comp.tick());
    }

    #[test]
    fn test_tick_before_mount_does_nothing() {
        let mut comp = compositor();
        assert!(!comp.tick());
        assert_eq!(comp.passes(), 0);
    }

    #[test]
    fn test_failed_mutation_records_nothing() {
        let mut comp = compositor();
        let raster = RasterLayer::new("bg");
        let id = raster.id();
        comp.push_layer(raster).unwrap();
        let passes = comp.passes();

        assert!(comp.set_intensity(id, 0.5).is_err());
        assert_eq!(comp.passes(), passes);
        assert_eq!(comp.history().undo_count(), 1);
    }

    #[test]
    fn test_history_can_be_disabled() {
        let config = EngineConfig {
            record_history: false,
            ..EngineConfig::default()
        };
        let mut comp = Compositor::with_config(RecordingTarget::new(), config);
        comp.push_layer(RasterLayer::new("bg")).unwrap();
        assert!(!comp.history().can_undo());
    }

    #[test]
    fn test_add_adjustment_generates_names() {
        let mut comp = compositor();
        let first = comp.add_adjustment(AdjustmentKind::Curves, 0).unwrap();
        let second = comp.add_adjustment(AdjustmentKind::Curves, 5).unwrap();
        assert_eq!(comp.stack().get(first).map(Layer::name), Some("Curves 1"));
        assert_eq!(comp.stack().get(second).map(Layer::name), Some("Curves 2"));
    }

    #[test]
    fn test_each_pass_repaints_once() {
        let mut comp = compositor();
        let raster = RasterLayer::with_filters("bg", vec![FilterOp::contrast(0.1)]);
        let id = raster.id();
        comp.push_layer(raster).unwrap();
        comp.add_adjustment(AdjustmentKind::BlackWhite, 1).unwrap();

        assert_eq!(comp.target().repaints(), 2);
        assert_eq!(
            comp.target().chain_for(id),
            Some(&[FilterOp::contrast(0.1), FilterOp::Grayscale][..])
        );
    }
}
