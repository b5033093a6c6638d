//! Compositing Tests
//!
//! End-to-end tests for the adjustment layer compositor.

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use artboard::adjustments::{ExposureSettings, LevelsSettings};
use artboard::{
    AdjustmentKind, AdjustmentLayer, AdjustmentSettings, Compositor, CurveChannel, Document,
    EngineConfig, FilterOp, Layer, LayerId, LayerStack, MountState, RasterLayer,
    RecordingTarget, StackEvent,
};

fn compositor() -> Compositor<RecordingTarget> {
    Compositor::new(RecordingTarget::new())
}

fn photo() -> RasterLayer {
    RasterLayer::with_filters("photo", vec![FilterOp::brightness(0.1)])
}

fn exposure(value: f32) -> AdjustmentLayer {
    AdjustmentLayer::new(AdjustmentSettings::Exposure(ExposureSettings {
        exposure: value,
        contrast: 0.0,
    }))
}

fn current(comp: &Compositor<RecordingTarget>, id: LayerId) -> Vec<FilterOp> {
    comp.stack()
        .get(id)
        .and_then(Layer::as_raster)
        .map(|r| r.current_filter_chain().to_vec())
        .unwrap_or_default()
}

fn base(comp: &Compositor<RecordingTarget>, id: LayerId) -> Option<Vec<FilterOp>> {
    comp.stack()
        .get(id)
        .and_then(Layer::as_raster)
        .and_then(|r| r.base_filter_chain().map(<[FilterOp]>::to_vec))
}

// === Scenario Tests ===

#[test]
fn test_black_white_above_photo() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(AdjustmentLayer::new(AdjustmentKind::BlackWhite))
        .unwrap();

    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(0.1), FilterOp::Grayscale]
    );
    assert_eq!(base(&comp, id), Some(vec![FilterOp::brightness(0.1)]));
}

#[test]
fn test_adjustment_below_raster_has_no_effect() {
    let mut comp = compositor();
    let bg = RasterLayer::with_filters("bg", vec![FilterOp::contrast(0.2)]);
    let id = bg.id();
    comp.push_layer(exposure(0.5)).unwrap();
    comp.push_layer(bg).unwrap();

    assert_eq!(current(&comp, id), vec![FilterOp::contrast(0.2)]);
}

#[test]
fn test_hiding_adjustment_restores_base() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    let adjustment = exposure(0.5);
    let adjustment_id = adjustment.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(adjustment).unwrap();
    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(0.1), FilterOp::brightness(0.5)]
    );

    comp.set_visible(adjustment_id, false).unwrap();
    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);
}

// === Invariant Tests ===

#[test]
fn test_composite_is_idempotent() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(exposure(0.3)).unwrap();
    comp.push_layer(AdjustmentLayer::new(AdjustmentKind::SaturationVibrance))
        .unwrap();

    let first = current(&comp, id);
    comp.composite();
    comp.composite();

    assert_eq!(current(&comp, id), first);
    assert_eq!(base(&comp, id), Some(vec![FilterOp::brightness(0.1)]));
}

#[test]
fn test_zero_intensity_is_identity() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    let levels = AdjustmentLayer::new(AdjustmentSettings::Levels(LevelsSettings {
        black: 0.2,
        mid: 1.8,
        white: 0.9,
    }))
    .with_intensity(0.0);
    comp.push_layer(photo).unwrap();
    comp.push_layer(levels).unwrap();

    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);
}

#[test]
fn test_intensity_scales_contribution() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    let adjustment = exposure(0.5);
    let adjustment_id = adjustment.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(adjustment).unwrap();

    comp.set_intensity(adjustment_id, 0.5).unwrap();
    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(0.1), FilterOp::brightness(0.25)]
    );
}

#[test]
fn test_stack_order_sensitivity() {
    let mut comp = compositor();
    let raster = RasterLayer::new("r");
    let id = raster.id();
    let a = exposure(0.4);
    let a_id = a.id();
    comp.push_layer(a).unwrap();
    comp.push_layer(raster).unwrap();
    comp.push_layer(AdjustmentLayer::new(AdjustmentKind::BlackWhite))
        .unwrap();

    assert_eq!(current(&comp, id), vec![FilterOp::Grayscale]);

    comp.move_layer(a_id, 99).unwrap();
    assert_eq!(
        current(&comp, id),
        vec![FilterOp::Grayscale, FilterOp::brightness(0.4)]
    );
}

#[test]
fn test_removing_last_adjustment_restores_base() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    let adjustment_id = comp.add_adjustment(AdjustmentKind::BlackWhite, 1).unwrap();
    comp.insert_layer(photo, 0).unwrap();
    assert_eq!(current(&comp, id).len(), 2);

    comp.remove_layer(adjustment_id).unwrap();
    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);
}

#[test]
fn test_raster_moved_to_top_sees_nothing() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(exposure(0.5)).unwrap();
    comp.push_layer(AdjustmentLayer::new(AdjustmentKind::BlackWhite))
        .unwrap();

    comp.move_layer(id, 2).unwrap();
    assert_eq!(comp.stack().index_of(id), Some(2));
    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);
}

#[test]
fn test_each_raster_sees_only_layers_above_it() {
    let mut comp = compositor();
    let lower = RasterLayer::new("lower");
    let upper = RasterLayer::new("upper");
    let (lower_id, upper_id) = (lower.id(), upper.id());
    comp.push_layer(lower).unwrap();
    comp.push_layer(exposure(0.2)).unwrap();
    comp.push_layer(upper).unwrap();
    comp.push_layer(AdjustmentLayer::new(AdjustmentKind::BlackWhite))
        .unwrap();

    assert_eq!(
        current(&comp, lower_id),
        vec![FilterOp::brightness(0.2), FilterOp::Grayscale]
    );
    assert_eq!(current(&comp, upper_id), vec![FilterOp::Grayscale]);
}

// === Settings Tests ===

#[test]
fn test_malformed_settings_fall_back_to_defaults() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    let exposure_id = comp.add_adjustment(AdjustmentKind::Exposure, 1).unwrap();
    let levels_id = comp.add_adjustment(AdjustmentKind::Levels, 2).unwrap();

    comp.set_adjustment_settings_json(exposure_id, &json!({"exposure": "bright", "contrast": null}))
        .unwrap();
    comp.set_adjustment_settings_json(levels_id, &json!({"black": [1, 2], "white": {}}))
        .unwrap();

    assert_eq!(
        current(&comp, id),
        vec![
            FilterOp::brightness(0.1),
            FilterOp::brightness(0.0),
            FilterOp::contrast(0.0),
            FilterOp::gamma(1.0),
        ]
    );
}

#[test]
fn test_infinite_exposure_saturates() {
    let mut comp = compositor();
    let photo = RasterLayer::new("photo");
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    comp.push_layer(exposure(f32::INFINITY)).unwrap();
    let from_editor = comp.add_adjustment(AdjustmentKind::Exposure, 2).unwrap();
    comp.set_adjustment_settings_json(from_editor, &json!({"exposure": 1e39}))
        .unwrap();

    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(1.0), FilterOp::brightness(1.0)]
    );
}

#[test]
fn test_curves_from_editor_payload() {
    let mut comp = compositor();
    let photo = RasterLayer::new("photo");
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    let curves_id = comp.add_adjustment(AdjustmentKind::Curves, 1).unwrap();

    comp.set_adjustment_settings_json(
        curves_id,
        &json!({
            "active_channel": "r",
            "channels": {"r": [{"x": 0.5, "y": 0.75}]}
        }),
    )
    .unwrap();

    let chain = current(&comp, id);
    assert_eq!(chain.len(), 1);
    match &chain[0] {
        FilterOp::Curve {
            lut,
            channel,
            intensity,
        } => {
            assert_eq!(*channel, CurveChannel::Red);
            assert_eq!(*intensity, 1.0);
            assert!(lut.get(128) > 160);
        }
        other => panic!("expected curve op, got {:?}", other),
    }
    let cached = comp.lut_cache().len();
    let misses = comp.lut_cache().misses();

    comp.composite();
    assert_eq!(comp.lut_cache().len(), cached);
    assert_eq!(comp.lut_cache().misses(), misses);
    assert!(comp.lut_cache().hits() > 0);
}

#[test]
fn test_unknown_kind_contributes_nothing() {
    let photo_id = LayerId::new();
    let document: Document = serde_json::from_value(json!({
        "version": 1,
        "saved_at": "2024-06-01T12:00:00Z",
        "layers": [
            {
                "type": "raster",
                "id": photo_id,
                "name": "photo",
                "position": 0,
                "base_filter_chain": [{"op": "contrast", "delta": 0.3}]
            },
            {
                "type": "adjustment",
                "id": LayerId::new(),
                "name": "Posterize",
                "position": 1,
                "kind": "posterize",
                "settings": {"levels": 4}
            },
            {
                "type": "adjustment",
                "id": LayerId::new(),
                "name": "B&W",
                "position": 2,
                "kind": "black-white"
            }
        ]
    }))
    .unwrap();

    let mut comp = compositor();
    comp.load_document(document).unwrap();
    assert_eq!(
        current(&comp, photo_id),
        vec![FilterOp::contrast(0.3), FilterOp::Grayscale]
    );
}

#[test]
fn test_settings_on_raster_rejected() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();

    let err = comp
        .set_adjustment_settings(id, AdjustmentSettings::BlackWhite)
        .unwrap_err();
    assert_eq!(err.error_code(), "NOT_AN_ADJUSTMENT_LAYER");
    assert!(comp.remove_layer(LayerId::new()).is_err());
}

// === Lifecycle Tests ===

#[test]
fn test_deferred_initial_pass() {
    let photo = photo();
    let id = photo.id();
    let stack = LayerStack::from_layers(vec![
        photo.into(),
        AdjustmentLayer::new(AdjustmentKind::BlackWhite).into(),
    ])
    .unwrap();

    let mut comp = compositor().with_stack(stack);
    comp.mount();
    assert_eq!(comp.mount_state(), MountState::Pending);
    assert_eq!(base(&comp, id), None);
    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);

    assert!(comp.tick());
    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(0.1), FilterOp::Grayscale]
    );
    assert_eq!(comp.target().repaints(), 1);
}

#[test]
fn test_mutation_before_tick_is_idempotent_with_initial_pass() {
    let photo = photo();
    let id = photo.id();
    let mut comp = compositor()
        .with_stack(LayerStack::from_layers(vec![photo.into()]).unwrap());
    comp.mount();
    comp.add_adjustment(AdjustmentKind::BlackWhite, 1).unwrap();
    let before_tick = current(&comp, id);

    assert!(comp.tick());
    assert_eq!(current(&comp, id), before_tick);
    assert_eq!(comp.target().chain_for(id), Some(before_tick.as_slice()));
}

#[test]
fn test_observers_see_recomposited_stack() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&events);

    let mut comp = compositor();
    comp.subscribe(move |event: &StackEvent, stack: &LayerStack| {
        let chains: usize = stack
            .raster_layers()
            .map(|(_, r)| r.current_filter_chain().len())
            .sum();
        seen.borrow_mut().push((event.clone(), chains));
    });

    let photo = RasterLayer::new("photo");
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    let bw = comp.add_adjustment(AdjustmentKind::BlackWhite, 1).unwrap();

    let events = events.borrow();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], (StackEvent::Inserted { layer_id: id, index: 0 }, 0));
    assert_eq!(events[1], (StackEvent::Inserted { layer_id: bw, index: 1 }, 1));
}

// === History Tests ===

#[test]
fn test_undo_redo_restores_chains() {
    let mut comp = compositor();
    let photo = photo();
    let id = photo.id();
    comp.push_layer(photo).unwrap();
    comp.add_adjustment(AdjustmentKind::BlackWhite, 1).unwrap();
    assert_eq!(current(&comp, id).len(), 2);

    comp.undo().unwrap();
    assert_eq!(comp.stack().len(), 1);
    assert_eq!(current(&comp, id), vec![FilterOp::brightness(0.1)]);

    comp.redo().unwrap();
    assert_eq!(comp.stack().len(), 2);
    assert_eq!(
        current(&comp, id),
        vec![FilterOp::brightness(0.1), FilterOp::Grayscale]
    );

    comp.undo().unwrap();
    comp.undo().unwrap();
    assert!(comp.stack().is_empty());
    assert_eq!(comp.undo().unwrap_err().error_code(), "NOTHING_TO_UNDO");
}

#[test]
fn test_history_respects_configured_depth() {
    let config = EngineConfig {
        max_undo_levels: 2,
        ..EngineConfig::default()
    };
    let mut comp = Compositor::with_config(RecordingTarget::new(), config);
    for name in ["a", "b", "c"] {
        comp.push_layer(RasterLayer::new(name)).unwrap();
    }

    assert_eq!(comp.history().undo_count(), 2);
    comp.undo().unwrap();
    comp.undo().unwrap();
    assert_eq!(comp.stack().len(), 1);
}
