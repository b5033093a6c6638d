//! Error handling for Artboard
//!
//! The composite pass itself never fails: malformed settings fall back to
//! defaults and unknown kinds contribute nothing. Errors only come from
//! addressing the stack incorrectly, from history, and from document I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for Artboard operations
pub type Result<T> = std::result::Result<T, ArtboardError>;

/// Main error type for Artboard operations
#[derive(Error, Debug)]
pub enum ArtboardError {
    // Stack Errors
    #[error("Layer not found: {layer_id}")]
    LayerNotFound { layer_id: String },

    #[error("Layer already in stack: {layer_id}")]
    DuplicateLayer { layer_id: String },

    #[error("Layer {layer_id} is not an adjustment layer")]
    NotAnAdjustmentLayer { layer_id: String },

    // History Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // Document Errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Invalid document: {reason}")]
    InvalidDocument { reason: String },

    #[error("Document checksum mismatch: {path}")]
    ChecksumMismatch { path: PathBuf },

    #[error("Unsupported document version: {version}")]
    UnsupportedVersion { version: u32 },

    // Configuration Errors
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // I/O Errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization Errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ArtboardError {
    pub fn layer_not_found(layer_id: impl ToString) -> Self {
        ArtboardError::LayerNotFound {
            layer_id: layer_id.to_string(),
        }
    }

    pub fn invalid_document(reason: impl Into<String>) -> Self {
        ArtboardError::InvalidDocument {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            ArtboardError::LayerNotFound { .. } => "LAYER_NOT_FOUND",
            ArtboardError::DuplicateLayer { .. } => "DUPLICATE_LAYER",
            ArtboardError::NotAnAdjustmentLayer { .. } => "NOT_AN_ADJUSTMENT_LAYER",
            ArtboardError::NothingToUndo => "NOTHING_TO_UNDO",
            ArtboardError::NothingToRedo => "NOTHING_TO_REDO",
            ArtboardError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ArtboardError::InvalidDocument { .. } => "INVALID_DOCUMENT",
            ArtboardError::ChecksumMismatch { .. } => "CHECKSUM_MISMATCH",
            ArtboardError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            ArtboardError::InvalidConfig { .. } => "INVALID_CONFIG",
            ArtboardError::Io(_) => "IO_ERROR",
            ArtboardError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Check if this error is recoverable
    ///
    /// Recoverable errors leave the stack untouched; the caller can simply
    /// retry with corrected input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ArtboardError::LayerNotFound { .. }
                | ArtboardError::DuplicateLayer { .. }
                | ArtboardError::NotAnAdjustmentLayer { .. }
                | ArtboardError::NothingToUndo
                | ArtboardError::NothingToRedo
                | ArtboardError::FileNotFound { .. }
        )
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            ArtboardError::LayerNotFound { .. } => vec![
                "The layer may have been deleted by an earlier edit",
                "Refresh the layer panel and try again",
            ],
            ArtboardError::DuplicateLayer { .. } => vec![
                "Duplicate the layer instead of inserting it twice",
            ],
            ArtboardError::NotAnAdjustmentLayer { .. } => vec![
                "Settings and intensity only apply to adjustment layers",
                "Insert an adjustment layer above this layer instead",
            ],
            ArtboardError::ChecksumMismatch { .. } => vec![
                "The document was modified outside the editor",
                "Restore the document from a backup",
            ],
            ArtboardError::UnsupportedVersion { .. } => vec![
                "Open the document with a newer version of the editor",
            ],
            ArtboardError::InvalidConfig { .. } => vec![
                "Remove the offending field to fall back to its default",
            ],
            _ => vec![],
        }
    }
}
