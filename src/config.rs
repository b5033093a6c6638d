//! Engine configuration
//!
//! Loaded from an optional JSON file; every field has a default, so an
//! empty object is a valid configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ArtboardError, Result};
use crate::filters::DEFAULT_LUT_CACHE_CAPACITY;
use crate::history::DEFAULT_MAX_UNDO_LEVELS;

/// Tunables for the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hold the first composite pass until the next tick after mounting.
    pub defer_initial_composite: bool,

    /// Number of distinct curves kept in the LUT cache before it flushes.
    pub lut_cache_capacity: usize,

    /// Maximum number of undo levels to keep.
    pub max_undo_levels: usize,

    /// Record a history entry for every stack mutation.
    pub record_history: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            defer_initial_composite: true,
            lut_cache_capacity: DEFAULT_LUT_CACHE_CAPACITY,
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            record_history: true,
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file; missing fields take defaults
    ///
    /// # Errors
    /// `FileNotFound`, a parse error, or `InvalidConfig` from [`validate`](Self::validate).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ArtboardError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded engine config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lut_cache_capacity == 0 {
            return Err(ArtboardError::InvalidConfig {
                reason: "lut_cache_capacity must be non-zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.defer_initial_composite);
        assert_eq!(config.lut_cache_capacity, 64);
        assert_eq!(config.max_undo_levels, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"defer_initial_composite": false}}"#).unwrap();

        let config = EngineConfig::load(file.path()).unwrap();
        assert!(!config.defer_initial_composite);
        assert_eq!(config.lut_cache_capacity, DEFAULT_LUT_CACHE_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"lut_cache_capacity": 0}}"#).unwrap();

        let err = EngineConfig::load(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load(Path::new("/nonexistent/artboard.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
