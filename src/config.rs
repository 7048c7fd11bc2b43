//! Database configuration
//!
//! Controls where table files live and how hard the storage layer tries to make
//! rewrites durable.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default directory holding `<table>.schema` / `<table>.csv` pairs.
pub const DEFAULT_DATA_DIR: &str = "db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Directory holding the table files
    pub data_dir: PathBuf,

    /// fsync the temporary row file before it replaces the live one
    ///
    /// Turning this off makes UPDATE/DELETE cheaper but a crash right after a
    /// rewrite may leave an empty row file behind.
    pub durable_writes: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            durable_writes: true,
        }
    }
}

impl DbConfig {
    /// Config rooted at `data_dir` with default settings
    pub fn with_data_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Throwaway setup for tests: no fsync
    pub fn for_testing<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            durable_writes: false,
        }
    }

    /// Load a JSON config file. Missing keys fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DbConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("db"));
        assert!(config.durable_writes);
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("featherdb.json");
        fs::write(&path, r#"{ "data_dir": "/tmp/feather" }"#).unwrap();

        let config = DbConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/feather"));
        assert!(config.durable_writes);
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ data_dir: ").unwrap();

        let err = DbConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::FeatherError::Config(_)));
    }
}
