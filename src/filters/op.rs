//! Primitive filter operations
//!
//! The atomic, parameterized color operations a filter chain is built from.
//! Every numeric parameter is clamped into its valid domain when the op is
//! constructed, so nothing downstream ever sees an out-of-range value.

use std::fmt;
use std::sync::Arc;

use num_traits::clamp;
use serde::{Deserialize, Serialize};

use super::curve::{CurveChannel, Lut};

/// Lower bound of gamma ops
pub const GAMMA_MIN: f32 = 0.2;

/// Upper bound of gamma ops
pub const GAMMA_MAX: f32 = 2.0;

/// Ordered list of primitive ops, applied first to last
pub type FilterChain = Vec<FilterOp>;

/// A single primitive color operation
///
/// Deltas (`Brightness`, `Contrast`) and amounts (`HueRotation`,
/// `Saturation`, `Vibrance`) live in [-1, 1]. A hue rotation amount is a
/// fraction of a half turn, so 1.0 rotates by 180 degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum FilterOp {
    Brightness { delta: f32 },
    Contrast { delta: f32 },
    Gamma { gamma: f32 },
    HueRotation { amount: f32 },
    Saturation { amount: f32 },
    Vibrance { amount: f32 },
    Grayscale,
    Curve {
        lut: Arc<Lut>,
        channel: CurveChannel,
        intensity: f32,
    },
}

impl FilterOp {
    pub fn brightness(delta: f32) -> Self {
        FilterOp::Brightness {
            delta: clamp_delta(delta),
        }
    }

    pub fn contrast(delta: f32) -> Self {
        FilterOp::Contrast {
            delta: clamp_delta(delta),
        }
    }

    pub fn gamma(gamma: f32) -> Self {
        FilterOp::Gamma {
            gamma: clamp_gamma(gamma),
        }
    }

    pub fn hue_rotation(amount: f32) -> Self {
        FilterOp::HueRotation {
            amount: clamp_delta(amount),
        }
    }

    pub fn saturation(amount: f32) -> Self {
        FilterOp::Saturation {
            amount: clamp_delta(amount),
        }
    }

    pub fn vibrance(amount: f32) -> Self {
        FilterOp::Vibrance {
            amount: clamp_delta(amount),
        }
    }

    pub fn curve(lut: Arc<Lut>, channel: CurveChannel, intensity: f32) -> Self {
        FilterOp::Curve {
            lut,
            channel,
            intensity: clamp_unit(intensity),
        }
    }

    /// Re-clamp every parameter into its domain
    ///
    /// Ops built through the constructors are already normalized; this is
    /// for ops that arrive through deserialization.
    pub fn normalized(self) -> Self {
        match self {
            FilterOp::Brightness { delta } => FilterOp::brightness(delta),
            FilterOp::Contrast { delta } => FilterOp::contrast(delta),
            FilterOp::Gamma { gamma } => FilterOp::gamma(gamma),
            FilterOp::HueRotation { amount } => FilterOp::hue_rotation(amount),
            FilterOp::Saturation { amount } => FilterOp::saturation(amount),
            FilterOp::Vibrance { amount } => FilterOp::vibrance(amount),
            FilterOp::Grayscale => FilterOp::Grayscale,
            FilterOp::Curve {
                lut,
                channel,
                intensity,
            } => FilterOp::curve(lut, channel, intensity),
        }
    }

    /// Stable op name, matching the serialized tag
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Brightness { .. } => "brightness",
            FilterOp::Contrast { .. } => "contrast",
            FilterOp::Gamma { .. } => "gamma",
            FilterOp::HueRotation { .. } => "hue_rotation",
            FilterOp::Saturation { .. } => "saturation",
            FilterOp::Vibrance { .. } => "vibrance",
            FilterOp::Grayscale => "grayscale",
            FilterOp::Curve { .. } => "curve",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Brightness { delta } | FilterOp::Contrast { delta } => {
                write!(f, "{}({:+.3})", self.name(), delta)
            }
            FilterOp::Gamma { gamma } => write!(f, "gamma({:.3})", gamma),
            FilterOp::HueRotation { amount } => {
                write!(f, "hue_rotation({:+.1}deg)", amount * 180.0)
            }
            FilterOp::Saturation { amount } | FilterOp::Vibrance { amount } => {
                write!(f, "{}({:+.3})", self.name(), amount)
            }
            FilterOp::Grayscale => write!(f, "grayscale"),
            FilterOp::Curve {
                channel, intensity, ..
            } => write!(f, "curve({}, {:.3})", channel, intensity),
        }
    }
}

/// Clamp into [-1, 1]; infinities saturate, NaN becomes the neutral 0
pub fn clamp_delta(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        clamp(value, -1.0, 1.0)
    }
}

/// Clamp into [0, 1]; non-finite values become 0
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_finite() {
        clamp(value, 0.0, 1.0)
    } else {
        0.0
    }
}

fn clamp_gamma(value: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        clamp(value, GAMMA_MIN, GAMMA_MAX)
    }
}
