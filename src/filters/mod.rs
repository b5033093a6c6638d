//! Filter primitives
//!
//! Primitive filter ops, the curve interpolator and the mappers that turn
//! adjustment settings into ops.

mod curve;
mod mappers;
mod op;

pub use curve::{
    apply_curve_rgb, apply_lut, build_lut, CurveChannel, CurvePoint, Lut, LutCache,
    DEFAULT_LUT_CACHE_CAPACITY, LUT_SIZE,
};
pub use mappers::{
    adjustment_ops, black_white_ops, curves_ops, exposure_ops, hue_saturation_ops, levels_ops,
    saturation_vibrance_ops, scaled,
};
pub use op::{clamp_delta, clamp_unit, FilterChain, FilterOp, GAMMA_MAX, GAMMA_MIN};
