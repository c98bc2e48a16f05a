//! Configuration for the calibration cache
//!
//! Loads configuration from a TOML file. The only tunable is where the
//! per-device calibration blobs are cached on disk.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Calibration library configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CalibConfig {
    /// Directory holding one cached calibration blob per device
    pub cache_dir: PathBuf,
}

impl CalibConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: CalibConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default cache location under the user's home directory
    /// (`~/.gati-calib`), falling back to a relative path when no home
    /// directory is set.
    pub fn default_cache_dir() -> PathBuf {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(".gati-calib"),
            None => PathBuf::from(".gati-calib"),
        }
    }
}

impl Default for CalibConfig {
    fn default() -> Self {
        Self {
            cache_dir: Self::default_cache_dir(),
        }
    }
}
