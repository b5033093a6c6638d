//! Document persistence
//!
//! A saved artboard is a checksummed JSON envelope around a [`Document`].
//! Only the ground truth is persisted: base chains for raster layers and
//! kind/settings/intensity for adjustments. Current chains are derived
//! state and are rebuilt by the next composite pass after loading.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::adjustments::AdjustmentSettings;
use crate::error::{ArtboardError, Result};
use crate::filters::{clamp_unit, FilterChain, FilterOp};

use super::layer::{AdjustmentLayer, Layer, LayerId, RasterLayer};
use super::stack::LayerStack;

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

fn default_visible() -> bool {
    true
}

fn default_intensity() -> f32 {
    1.0
}

/// One persisted layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerRecord {
    Raster {
        id: LayerId,
        name: String,
        #[serde(default = "default_visible")]
        visible: bool,
        position: usize,
        #[serde(default)]
        base_filter_chain: FilterChain,
    },
    Adjustment {
        id: LayerId,
        name: String,
        position: usize,
        kind: String,
        #[serde(default)]
        settings: Value,
        #[serde(default = "default_intensity")]
        intensity: f32,
        #[serde(default = "default_visible")]
        visible: bool,
    },
}

impl LayerRecord {
    pub fn position(&self) -> usize {
        match self {
            LayerRecord::Raster { position, .. } | LayerRecord::Adjustment { position, .. } => {
                *position
            }
        }
    }

    fn from_layer(layer: &Layer, position: usize) -> Self {
        match layer {
            Layer::Raster(raster) => LayerRecord::Raster {
                id: raster.id(),
                name: raster.name().to_string(),
                visible: raster.is_visible(),
                position,
                base_filter_chain: raster.ground_truth().to_vec(),
            },
            Layer::Adjustment(adjustment) => LayerRecord::Adjustment {
                id: adjustment.id(),
                name: adjustment.name().to_string(),
                position,
                kind: adjustment.settings().kind_name().to_string(),
                settings: adjustment.settings().to_json(),
                intensity: adjustment.intensity(),
                visible: adjustment.is_visible(),
            },
        }
    }

    fn into_layer(self) -> Layer {
        match self {
            LayerRecord::Raster {
                id,
                name,
                visible,
                base_filter_chain,
                ..
            } => {
                let base = base_filter_chain
                    .into_iter()
                    .map(FilterOp::normalized)
                    .collect();
                RasterLayer::restored(id, name, visible, base).into()
            }
            LayerRecord::Adjustment {
                id,
                name,
                kind,
                settings,
                intensity,
                visible,
                ..
            } => {
                let settings = AdjustmentSettings::from_json(&kind, &settings);
                let mut layer = AdjustmentLayer::new(settings)
                    .with_id(id)
                    .named(name)
                    .with_intensity(clamp_unit(intensity));
                if !visible {
                    layer = layer.hidden();
                }
                layer.into()
            }
        }
    }
}

/// Serializable snapshot of a layer stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub layers: Vec<LayerRecord>,
}

/// On-disk wrapper carrying the layer checksum
#[derive(Serialize, Deserialize)]
struct SavedDocument {
    checksum: String,
    document: Value,
}

impl Document {
    /// Snapshot a stack, recording each layer's position
    pub fn from_stack(stack: &LayerStack) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            saved_at: Utc::now(),
            layers: stack
                .iter()
                .enumerate()
                .map(|(position, layer)| LayerRecord::from_layer(layer, position))
                .collect(),
        }
    }

    /// Rebuild a stack, ordering layers by their recorded position
    ///
    /// # Errors
    /// `UnsupportedVersion` for documents newer than this build,
    /// `DuplicateLayer` if two records share an id.
    pub fn into_stack(self) -> Result<LayerStack> {
        if self.version > DOCUMENT_VERSION {
            return Err(ArtboardError::UnsupportedVersion {
                version: self.version,
            });
        }

        let mut records = self.layers;
        records.sort_by_key(LayerRecord::position);
        LayerStack::from_layers(records.into_iter().map(LayerRecord::into_layer).collect())
    }

    /// Parse a bare document (no checksum envelope)
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document with a checksum of its layers
    pub fn save(&self, path: &Path) -> Result<()> {
        let document = serde_json::to_value(self)?;
        let checksum = layers_checksum(&document)?;
        let content = serde_json::to_string_pretty(&SavedDocument { checksum, document })?;
        fs::write(path, content)?;

        log::info!(
            "Saved document with {} layers to {}",
            self.layers.len(),
            path.display()
        );
        Ok(())
    }

    /// Read and verify a saved document
    ///
    /// # Errors
    /// `FileNotFound` if `path` does not exist, `ChecksumMismatch` if the
    /// layers were edited after saving.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArtboardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let saved: SavedDocument = serde_json::from_str(&content)
            .map_err(|e| ArtboardError::invalid_document(e.to_string()))?;

        if layers_checksum(&saved.document)? != saved.checksum {
            log::warn!("Checksum mismatch in {}", path.display());
            return Err(ArtboardError::ChecksumMismatch {
                path: path.to_path_buf(),
            });
        }

        let document: Document = serde_json::from_value(saved.document)
            .map_err(|e| ArtboardError::invalid_document(e.to_string()))?;
        log::info!(
            "Loaded document v{} with {} layers from {}",
            document.version,
            document.layers.len(),
            path.display()
        );
        Ok(document)
    }
}

/// SHA-256 of the compact `layers` serialization
///
/// Floats must re-serialize byte-identically after a parse; serde_json's
/// `float_roundtrip` parser guarantees that.
fn layers_checksum(document: &Value) -> Result<String> {
    let layers = document
        .get("layers")
        .ok_or_else(|| ArtboardError::invalid_document("missing 'layers'"))?;
    let canonical = serde_json::to_string(layers)?;
    Ok(format!("{:x}", Sha256::digest(canonical.as_bytes())))
}
