//! Adjustment kinds and their settings
//!
//! An adjustment's kind and settings travel together as one closed enum, so
//! every consumer matches exhaustively over the supported kinds.

mod settings;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use settings::{
    CurvesSettings, ExposureSettings, HueSaturationSettings, LevelsSettings,
    SaturationVibranceSettings,
};

/// Supported adjustment kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjustmentKind {
    Curves,
    Levels,
    HueSaturation,
    Exposure,
    SaturationVibrance,
    BlackWhite,
}

impl AdjustmentKind {
    pub const ALL: [AdjustmentKind; 6] = [
        AdjustmentKind::Curves,
        AdjustmentKind::Levels,
        AdjustmentKind::HueSaturation,
        AdjustmentKind::Exposure,
        AdjustmentKind::SaturationVibrance,
        AdjustmentKind::BlackWhite,
    ];

    /// Wire name, as stored in documents
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentKind::Curves => "curves",
            AdjustmentKind::Levels => "levels",
            AdjustmentKind::HueSaturation => "hue-saturation",
            AdjustmentKind::Exposure => "exposure",
            AdjustmentKind::SaturationVibrance => "saturation-vibrance",
            AdjustmentKind::BlackWhite => "black-white",
        }
    }

    /// Human-readable name used for new layer names
    pub fn display_name(&self) -> &'static str {
        match self {
            AdjustmentKind::Curves => "Curves",
            AdjustmentKind::Levels => "Levels",
            AdjustmentKind::HueSaturation => "Hue/Saturation",
            AdjustmentKind::Exposure => "Exposure",
            AdjustmentKind::SaturationVibrance => "Vibrance",
            AdjustmentKind::BlackWhite => "Black & White",
        }
    }

    /// Parse a kind name, ignoring case and `-`/`_`/space separators
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "curves" | "curve" => Some(AdjustmentKind::Curves),
            "levels" => Some(AdjustmentKind::Levels),
            "huesaturation" | "hsl" => Some(AdjustmentKind::HueSaturation),
            "exposure" => Some(AdjustmentKind::Exposure),
            "saturationvibrance" | "vibrance" => Some(AdjustmentKind::SaturationVibrance),
            "blackwhite" | "blackandwhite" => Some(AdjustmentKind::BlackWhite),
            _ => None,
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind plus kind-specific settings payload
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustmentSettings {
    Curves(CurvesSettings),
    Levels(LevelsSettings),
    HueSaturation(HueSaturationSettings),
    Exposure(ExposureSettings),
    SaturationVibrance(SaturationVibranceSettings),
    BlackWhite,
    /// A kind this build does not know; kept verbatim so it survives a
    /// save/load cycle, contributes no filters.
    Unrecognized { kind: String, raw: Value },
}

impl AdjustmentSettings {
    /// Default settings for a kind
    pub fn default_for(kind: AdjustmentKind) -> Self {
        match kind {
            AdjustmentKind::Curves => AdjustmentSettings::Curves(CurvesSettings::default()),
            AdjustmentKind::Levels => AdjustmentSettings::Levels(LevelsSettings::default()),
            AdjustmentKind::HueSaturation => {
                AdjustmentSettings::HueSaturation(HueSaturationSettings::default())
            }
            AdjustmentKind::Exposure => AdjustmentSettings::Exposure(ExposureSettings::default()),
            AdjustmentKind::SaturationVibrance => {
                AdjustmentSettings::SaturationVibrance(SaturationVibranceSettings::default())
            }
            AdjustmentKind::BlackWhite => AdjustmentSettings::BlackWhite,
        }
    }

    /// Parse settings for a kind name; never fails
    pub fn from_json(kind: &str, value: &Value) -> Self {
        match AdjustmentKind::parse(kind) {
            Some(kind) => Self::parse_for(kind, value),
            None => AdjustmentSettings::Unrecognized {
                kind: kind.to_string(),
                raw: value.clone(),
            },
        }
    }

    /// Parse settings against a known kind; missing fields take defaults
    pub fn parse_for(kind: AdjustmentKind, value: &Value) -> Self {
        match kind {
            AdjustmentKind::Curves => AdjustmentSettings::Curves(CurvesSettings::from_json(value)),
            AdjustmentKind::Levels => AdjustmentSettings::Levels(LevelsSettings::from_json(value)),
            AdjustmentKind::HueSaturation => {
                AdjustmentSettings::HueSaturation(HueSaturationSettings::from_json(value))
            }
            AdjustmentKind::Exposure => {
                AdjustmentSettings::Exposure(ExposureSettings::from_json(value))
            }
            AdjustmentKind::SaturationVibrance => {
                AdjustmentSettings::SaturationVibrance(SaturationVibranceSettings::from_json(value))
            }
            AdjustmentKind::BlackWhite => AdjustmentSettings::BlackWhite,
        }
    }

    /// Re-parse an editor payload against this settings' own kind
    pub fn reparse(&self, value: &Value) -> Self {
        match self {
            AdjustmentSettings::Unrecognized { kind, .. } => AdjustmentSettings::Unrecognized {
                kind: kind.clone(),
                raw: value.clone(),
            },
            known => match known.kind() {
                Some(kind) => Self::parse_for(kind, value),
                None => known.clone(),
            },
        }
    }

    pub fn kind(&self) -> Option<AdjustmentKind> {
        match self {
            AdjustmentSettings::Curves(_) => Some(AdjustmentKind::Curves),
            AdjustmentSettings::Levels(_) => Some(AdjustmentKind::Levels),
            AdjustmentSettings::HueSaturation(_) => Some(AdjustmentKind::HueSaturation),
            AdjustmentSettings::Exposure(_) => Some(AdjustmentKind::Exposure),
            AdjustmentSettings::SaturationVibrance(_) => Some(AdjustmentKind::SaturationVibrance),
            AdjustmentSettings::BlackWhite => Some(AdjustmentKind::BlackWhite),
            AdjustmentSettings::Unrecognized { .. } => None,
        }
    }

    /// Kind name as stored in documents, including unrecognized kinds
    pub fn kind_name(&self) -> &str {
        match self {
            AdjustmentSettings::Unrecognized { kind, .. } => kind,
            known => known.kind().map(|k| k.as_str()).unwrap_or_default(),
        }
    }

    /// Serialize the settings payload (without the kind)
    pub fn to_json(&self) -> Value {
        let value = match self {
            AdjustmentSettings::Curves(s) => serde_json::to_value(s),
            AdjustmentSettings::Levels(s) => serde_json::to_value(s),
            AdjustmentSettings::HueSaturation(s) => serde_json::to_value(s),
            AdjustmentSettings::Exposure(s) => serde_json::to_value(s),
            AdjustmentSettings::SaturationVibrance(s) => serde_json::to_value(s),
            AdjustmentSettings::BlackWhite => Ok(Value::Object(serde_json::Map::new())),
            AdjustmentSettings::Unrecognized { raw, .. } => Ok(raw.clone()),
        };
        // Settings are plain numbers and maps; serialization cannot fail.
        value.unwrap_or(Value::Null)
    }

    /// Replace NaN numbers with the kind's defaults; infinities are kept
    pub fn sanitized(self) -> Self {
        match self {
            AdjustmentSettings::Curves(s) => AdjustmentSettings::Curves(s.sanitized()),
            AdjustmentSettings::Levels(s) => AdjustmentSettings::Levels(s.sanitized()),
            AdjustmentSettings::HueSaturation(s) => {
                AdjustmentSettings::HueSaturation(s.sanitized())
            }
            AdjustmentSettings::Exposure(s) => AdjustmentSettings::Exposure(s.sanitized()),
            AdjustmentSettings::SaturationVibrance(s) => {
                AdjustmentSettings::SaturationVibrance(s.sanitized())
            }
            other => other,
        }
    }
}

impl From<AdjustmentKind> for AdjustmentSettings {
    fn from(kind: AdjustmentKind) -> Self {
        AdjustmentSettings::default_for(kind)
    }
}
