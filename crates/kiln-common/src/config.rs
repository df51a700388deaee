//! Build-context configuration shared by the compiler and the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{KilnError, Result};

/// Settings injected into every compiled build as reserved metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KilnConfig {
    /// Whether plugins should run in step-by-step debug mode.
    pub debug: bool,
    /// Whether plugins should overwrite existing artifacts.
    pub force: bool,
}

impl KilnConfig {
    /// Loads the configuration from a JSON file.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// configuration object.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| KilnError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| KilnError::Config {
            message: format!("{}: {e}", path.display()),
        })?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_disables_everything() {
        let config = KilnConfig::default();
        assert!(!config.debug);
        assert!(!config.force);
    }

    #[test]
    fn from_file_fills_missing_fields() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("kiln.json");
        std::fs::write(&path, r#"{"force": true}"#).expect("write");

        let config = KilnConfig::from_file(&path).expect("should load");
        assert!(config.force);
        assert!(!config.debug);
    }

    #[test]
    fn from_file_rejects_unknown_fields() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("kiln.json");
        std::fs::write(&path, r#"{"verbose": true}"#).expect("write");

        let err = KilnConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, KilnError::Config { .. }), "got: {err}");
    }

    #[test]
    fn from_file_malformed_json_names_the_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let path = dir.path().join("kiln.json");
        std::fs::write(&path, "{").expect("write");

        let err = KilnConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, KilnError::Config { .. }), "got: {err}");
        assert!(err.to_string().contains("kiln.json"), "got: {err}");
    }

    #[test]
    fn from_file_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let err = KilnConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, KilnError::Io { .. }));
    }
}
