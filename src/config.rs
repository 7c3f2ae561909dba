// src/config.rs
//! Solver configuration
//!
//! Loaded from a TOML file; every field has a default so an empty file,
//! or no file at all, yields a working configuration.
//!
//! ```toml
//! freshness_secs = 86400
//! network_use = "offline"
//! minimum_stability = "stable"
//! data_dirs = ["/opt/feedsolver/share"]
//! ```

use crate::error::{Error, Result};
use crate::model::Stability;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Default staleness threshold: 30 days
pub const DEFAULT_FRESHNESS_SECS: u64 = 30 * 24 * 60 * 60;

/// How much network access a solve may assume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NetworkLevel {
    /// Implementations may be downloaded
    #[default]
    Full,
    /// Only local, stored or externally managed implementations are usable
    Offline,
}

/// Policy and locations used by a solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Age after which a network feed counts as stale
    pub freshness_secs: u64,
    pub network_use: NetworkLevel,
    /// Lowest stability accepted without an explicit pin
    pub minimum_stability: Stability,
    /// Searched in order for native feeds and site packages
    pub data_dirs: Vec<PathBuf>,
    /// Root of persisted preferences
    pub config_dir: PathBuf,
    pub store_dirs: Vec<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            freshness_secs: DEFAULT_FRESHNESS_SECS,
            network_use: NetworkLevel::default(),
            minimum_stability: Stability::Developer,
            data_dirs: paths::default_data_dirs(),
            config_dir: paths::default_config_dir(),
            store_dirs: paths::default_store_dirs(),
        }
    }
}

impl SolverConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content)?;
        debug!("Loaded solver configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` if given and present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    pub fn is_offline(&self) -> bool {
        self.network_use == NetworkLevel::Offline
    }
}
