//! Kind-specific adjustment settings
//!
//! Settings arrive from UI editors as loosely-shaped JSON. Parsing never
//! fails: a missing, non-numeric or NaN field takes the kind's default
//! value. Out-of-range values, infinities included, are kept and clamped
//! later when the filter ops are built.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::filters::{CurveChannel, CurvePoint};

/// Levels: input black point, midtone gamma and white point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelsSettings {
    pub black: f32,
    pub mid: f32,
    pub white: f32,
}

impl Default for LevelsSettings {
    fn default() -> Self {
        Self {
            black: 0.0,
            mid: 1.0,
            white: 1.0,
        }
    }
}

impl LevelsSettings {
    pub fn from_json(value: &Value) -> Self {
        let d = Self::default();
        Self {
            black: number_or(value, &["black", "blackPoint"], d.black),
            mid: number_or(value, &["mid", "gamma", "midtones"], d.mid),
            white: number_or(value, &["white", "whitePoint"], d.white),
        }
    }

    pub fn sanitized(self) -> Self {
        let d = Self::default();
        Self {
            black: non_nan_or(self.black, d.black),
            mid: non_nan_or(self.mid, d.mid),
            white: non_nan_or(self.white, d.white),
        }
    }
}

/// Hue/saturation/lightness, each in [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HueSaturationSettings {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl HueSaturationSettings {
    pub fn from_json(value: &Value) -> Self {
        Self {
            hue: number_or(value, &["hue"], 0.0),
            saturation: number_or(value, &["saturation"], 0.0),
            lightness: number_or(value, &["lightness"], 0.0),
        }
    }

    pub fn sanitized(self) -> Self {
        Self {
            hue: non_nan_or(self.hue, 0.0),
            saturation: non_nan_or(self.saturation, 0.0),
            lightness: non_nan_or(self.lightness, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ExposureSettings {
    pub exposure: f32,
    pub contrast: f32,
}

impl ExposureSettings {
    pub fn from_json(value: &Value) -> Self {
        Self {
            exposure: number_or(value, &["exposure"], 0.0),
            contrast: number_or(value, &["contrast"], 0.0),
        }
    }

    pub fn sanitized(self) -> Self {
        Self {
            exposure: non_nan_or(self.exposure, 0.0),
            contrast: non_nan_or(self.contrast, 0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct SaturationVibranceSettings {
    pub saturation: f32,
    pub vibrance: f32,
}

impl SaturationVibranceSettings {
    pub fn from_json(value: &Value) -> Self {
        Self {
            saturation: number_or(value, &["saturation"], 0.0),
            vibrance: number_or(value, &["vibrance"], 0.0),
        }
    }

    pub fn sanitized(self) -> Self {
        Self {
            saturation: non_nan_or(self.saturation, 0.0),
            vibrance: non_nan_or(self.vibrance, 0.0),
        }
    }
}

/// Per-channel control points plus the channel currently being edited
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CurvesSettings {
    pub channels: BTreeMap<CurveChannel, Vec<CurvePoint>>,
    pub active_channel: CurveChannel,
}

impl CurvesSettings {
    pub fn new(active_channel: CurveChannel) -> Self {
        Self {
            channels: BTreeMap::new(),
            active_channel,
        }
    }

    /// Builder: set the points of one channel
    pub fn with_points(mut self, channel: CurveChannel, points: Vec<CurvePoint>) -> Self {
        self.channels.insert(channel, points);
        self
    }

    /// Points of a channel; empty when the channel was never edited
    pub fn points_for(&self, channel: CurveChannel) -> &[CurvePoint] {
        self.channels.get(&channel).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn active_points(&self) -> &[CurvePoint] {
        self.points_for(self.active_channel)
    }

    /// Accepts `{"channels": {"rgb": [{"x":..,"y":..}, [x, y], ...]}, "active_channel": "r"}`
    ///
    /// Unknown channel names and unreadable points are skipped.
    pub fn from_json(value: &Value) -> Self {
        let active_channel = ["active_channel", "activeChannel", "channel"]
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find_map(CurveChannel::parse)
            .unwrap_or_default();

        let mut channels = BTreeMap::new();
        let map = value
            .get("channels")
            .or_else(|| value.get("points"))
            .and_then(Value::as_object);
        if let Some(map) = map {
            for (name, points) in map {
                let Some(channel) = CurveChannel::parse(name) else {
                    log::debug!("Ignoring unknown curve channel '{}'", name);
                    continue;
                };
                let points = points
                    .as_array()
                    .map(|list| list.iter().filter_map(parse_point).collect())
                    .unwrap_or_default();
                channels.insert(channel, points);
            }
        }

        Self {
            channels,
            active_channel,
        }
    }

    pub fn sanitized(mut self) -> Self {
        for points in self.channels.values_mut() {
            points.retain(|p| p.x.is_finite() && p.y.is_finite());
        }
        self
    }
}

fn parse_point(value: &Value) -> Option<CurvePoint> {
    let (x, y) = match value {
        Value::Object(map) => (map.get("x")?.as_f64()?, map.get("y")?.as_f64()?),
        Value::Array(pair) if pair.len() == 2 => (pair[0].as_f64()?, pair[1].as_f64()?),
        _ => return None,
    };
    let point = CurvePoint::new(x as f32, y as f32);
    (point.x.is_finite() && point.y.is_finite()).then_some(point)
}

/// First number found under any of `keys`, else `default`
///
/// Magnitudes beyond `f32` become infinities and saturate downstream.
fn number_or(value: &Value, keys: &[&str], default: f32) -> f32 {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_f64))
        .map(|n| n as f32)
        .find(|n| !n.is_nan())
        .unwrap_or(default)
}

fn non_nan_or(value: f32, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value
    }
}
