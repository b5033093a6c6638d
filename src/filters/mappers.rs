//! Channel filter mappers
//!
//! Stateless translation of adjustment settings plus a resolved intensity
//! into an ordered list of primitive filter ops. Only curves touch state,
//! and only through the LUT cache.

use crate::adjustments::{
    AdjustmentSettings, CurvesSettings, ExposureSettings, HueSaturationSettings, LevelsSettings,
    SaturationVibranceSettings,
};

use super::curve::LutCache;
use super::op::{clamp_delta, clamp_unit, FilterChain, FilterOp};

/// `clamp(value * intensity, -1, 1)`
pub fn scaled(value: f32, intensity: f32) -> f32 {
    clamp_delta(value * intensity)
}

/// Brightness, contrast and gamma, always all three
pub fn levels_ops(settings: &LevelsSettings, intensity: f32) -> FilterChain {
    let s = settings.sanitized();
    vec![
        FilterOp::brightness(scaled((s.white - 1.0) - s.black, intensity)),
        FilterOp::contrast(scaled(s.white - s.black - 1.0, intensity)),
        FilterOp::gamma(s.mid),
    ]
}

/// Hue rotation, saturation and brightness, each only when non-zero
pub fn hue_saturation_ops(settings: &HueSaturationSettings, intensity: f32) -> FilterChain {
    let s = settings.sanitized();
    let mut ops = Vec::with_capacity(3);
    if s.hue != 0.0 {
        ops.push(FilterOp::hue_rotation(scaled(s.hue, intensity)));
    }
    if s.saturation != 0.0 {
        ops.push(FilterOp::saturation(scaled(s.saturation, intensity)));
    }
    if s.lightness != 0.0 {
        ops.push(FilterOp::brightness(scaled(s.lightness, intensity)));
    }
    ops
}

/// Brightness and contrast, each only when non-zero
pub fn exposure_ops(settings: &ExposureSettings, intensity: f32) -> FilterChain {
    let s = settings.sanitized();
    let mut ops = Vec::with_capacity(2);
    if s.exposure != 0.0 {
        ops.push(FilterOp::brightness(scaled(s.exposure, intensity)));
    }
    if s.contrast != 0.0 {
        ops.push(FilterOp::contrast(scaled(s.contrast, intensity)));
    }
    ops
}

/// Saturation and vibrance, always both
pub fn saturation_vibrance_ops(settings: &SaturationVibranceSettings, intensity: f32) -> FilterChain {
    let s = settings.sanitized();
    vec![
        FilterOp::saturation(scaled(s.saturation, intensity)),
        FilterOp::vibrance(scaled(s.vibrance, intensity)),
    ]
}

pub fn black_white_ops() -> FilterChain {
    vec![FilterOp::Grayscale]
}

/// One curve op built from the active channel's points
pub fn curves_ops(settings: &CurvesSettings, intensity: f32, luts: &mut LutCache) -> FilterChain {
    let lut = luts.get_or_build(settings.active_points());
    vec![FilterOp::curve(lut, settings.active_channel, intensity)]
}

/// Ops contributed by one adjustment layer
///
/// A zero (or non-finite) intensity contributes nothing for every kind, and
/// so does an unrecognized kind.
pub fn adjustment_ops(
    settings: &AdjustmentSettings,
    intensity: f32,
    luts: &mut LutCache,
) -> FilterChain {
    let intensity = clamp_unit(intensity);
    if intensity == 0.0 {
        return Vec::new();
    }

    match settings {
        AdjustmentSettings::Curves(s) => curves_ops(s, intensity, luts),
        AdjustmentSettings::Levels(s) => levels_ops(s, intensity),
        AdjustmentSettings::HueSaturation(s) => hue_saturation_ops(s, intensity),
        AdjustmentSettings::Exposure(s) => exposure_ops(s, intensity),
        AdjustmentSettings::SaturationVibrance(s) => saturation_vibrance_ops(s, intensity),
        AdjustmentSettings::BlackWhite => black_white_ops(),
        AdjustmentSettings::Unrecognized { .. } => Vec::new(),
    }
}
