//! Layer types
//!
//! Raster layers carry filter chains; adjustment layers carry settings and
//! recolor the raster layers beneath them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adjustments::{AdjustmentKind, AdjustmentSettings};
use crate::filters::{clamp_unit, FilterChain, FilterOp};

/// Unique layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for LayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A pixel-bearing layer
///
/// `base_filter_chain` is captured once, by the first composite pass that
/// touches the layer, and never overwritten afterwards. Until then
/// `current_filter_chain` holds the layer's intrinsic filters.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    id: LayerId,
    name: String,
    visible: bool,
    base_filter_chain: Option<FilterChain>,
    current_filter_chain: FilterChain,
}

impl RasterLayer {
    /// Create a raster layer without intrinsic filters
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_filters(name, Vec::new())
    }

    /// Create a raster layer with intrinsic filters
    pub fn with_filters(name: impl Into<String>, filters: FilterChain) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            visible: true,
            base_filter_chain: None,
            current_filter_chain: filters,
        }
    }

    /// Builder: use a specific id
    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = id;
        self
    }

    /// Rebuild a layer whose base chain was already captured
    pub(crate) fn restored(id: LayerId, name: String, visible: bool, base: FilterChain) -> Self {
        Self {
            id,
            name,
            visible,
            current_filter_chain: base.clone(),
            base_filter_chain: Some(base),
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The captured base chain, `None` until the first composite
    pub fn base_filter_chain(&self) -> Option<&[FilterOp]> {
        self.base_filter_chain.as_deref()
    }

    /// The effective chain from the last composite
    pub fn current_filter_chain(&self) -> &[FilterOp] {
        &self.current_filter_chain
    }

    /// Base chain if captured, otherwise the intrinsic filters
    pub fn ground_truth(&self) -> &[FilterOp] {
        self.base_filter_chain
            .as_deref()
            .unwrap_or(&self.current_filter_chain)
    }

    /// One-time capture of the base chain
    pub(crate) fn capture_base(&mut self) -> &FilterChain {
        let current = &self.current_filter_chain;
        self.base_filter_chain.get_or_insert_with(|| current.clone())
    }

    pub(crate) fn set_current(&mut self, chain: FilterChain) {
        self.current_filter_chain = chain;
    }
}

/// A pixel-less layer recoloring every raster layer beneath it
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentLayer {
    id: LayerId,
    name: String,
    settings: AdjustmentSettings,
    intensity: f32,
    visible: bool,
}

impl AdjustmentLayer {
    /// Visible adjustment at full intensity, named after its kind
    pub fn new(settings: impl Into<AdjustmentSettings>) -> Self {
        let settings = settings.into().sanitized();
        let name = settings
            .kind()
            .map(|k| k.display_name().to_string())
            .unwrap_or_else(|| settings.kind_name().to_string());
        Self {
            id: LayerId::new(),
            name,
            settings,
            intensity: 1.0,
            visible: true,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = id;
        self
    }

    /// Builder: opacity-derived intensity, clamped to [0, 1]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = clamp_unit(intensity);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<AdjustmentKind> {
        self.settings.kind()
    }

    pub fn settings(&self) -> &AdjustmentSettings {
        &self.settings
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_settings(&mut self, settings: AdjustmentSettings) {
        self.settings = settings.sanitized();
    }

    pub(crate) fn set_intensity(&mut self, intensity: f32) {
        self.intensity = clamp_unit(intensity);
    }
}

/// A node in the artboard's z-ordered stack
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Raster(RasterLayer),
    Adjustment(AdjustmentLayer),
}

impl Layer {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Raster(l) => l.id(),
            Layer::Adjustment(l) => l.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Layer::Raster(l) => l.name(),
            Layer::Adjustment(l) => l.name(),
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Layer::Raster(l) => l.visible,
            Layer::Adjustment(l) => l.visible,
        }
    }

    /// Adjustment layers are never drawn or exported as shapes
    pub fn is_drawable(&self) -> bool {
        matches!(self, Layer::Raster(_))
    }

    pub fn as_raster(&self) -> Option<&RasterLayer> {
        match self {
            Layer::Raster(l) => Some(l),
            Layer::Adjustment(_) => None,
        }
    }

    pub fn as_adjustment(&self) -> Option<&AdjustmentLayer> {
        match self {
            Layer::Adjustment(l) => Some(l),
            Layer::Raster(_) => None,
        }
    }

    pub(crate) fn as_adjustment_mut(&mut self) -> Option<&mut AdjustmentLayer> {
        match self {
            Layer::Adjustment(l) => Some(l),
            Layer::Raster(_) => None,
        }
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        match self {
            Layer::Raster(l) => l.visible = visible,
            Layer::Adjustment(l) => l.visible = visible,
        }
    }
}

impl From<RasterLayer> for Layer {
    fn from(layer: RasterLayer) -> Self {
        Layer::Raster(layer)
    }
}

impl From<AdjustmentLayer> for Layer {
    fn from(layer: AdjustmentLayer) -> Self {
        Layer::Adjustment(layer)
    }
}
