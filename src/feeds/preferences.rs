// src/feeds/preferences.rs

//! Persisted per-feed and per-interface user preferences
//!
//! Stored as TOML under the configuration directory:
//! `feeds/<escaped feed>.toml` and `interfaces/<escaped interface>.toml`.
//! Missing or unreadable files yield neutral defaults.

use crate::error::{Error, Result};
use crate::model::{FeedReference, FeedUri, Stability};
use crate::paths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// User settings for a single implementation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplementationPreferences {
    /// Replaces the feed's stability rating when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_stability: Option<Stability>,
}

/// User settings for a feed
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedPreferences {
    /// When the feed was last fetched from the network
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    /// Keyed by implementation ID
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub implementations: BTreeMap<String, ImplementationPreferences>,
}

impl FeedPreferences {
    /// The user's stability override for an implementation, if any
    pub fn user_stability(&self, id: &str) -> Option<Stability> {
        self.implementations.get(id).and_then(|p| p.user_stability)
    }

    pub fn set_user_stability(&mut self, id: impl Into<String>, stability: Option<Stability>) {
        self.implementations.entry(id.into()).or_default().user_stability = stability;
    }

    /// Whether the feed has not been checked within `freshness` of `now`
    pub fn is_stale(&self, freshness: Duration, now: DateTime<Utc>) -> bool {
        match self.last_checked {
            None => true,
            Some(checked) => match (now - checked).to_std() {
                Ok(age) => age > freshness,
                // Timestamp in the future
                Err(_) => false,
            },
        }
    }
}

/// User settings for an interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfacePreferences {
    /// Replaces the global minimum stability for this interface
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stability_policy: Option<Stability>,
    /// Extra feeds to consider for this interface
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feeds: Vec<FeedReference>,
}

/// Source of stored preferences
///
/// Both lookups return neutral defaults when nothing is persisted.
pub trait PreferencesStore: Send + Sync {
    fn load_for(&self, feed: &FeedUri) -> FeedPreferences;

    fn load_interface_preferences(&self, interface: &FeedUri) -> InterfacePreferences;
}

/// Preferences persisted as TOML files under a configuration directory
#[derive(Debug, Clone)]
pub struct DirectoryPreferencesStore {
    config_dir: PathBuf,
}

impl DirectoryPreferencesStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn save_for(&self, feed: &FeedUri, preferences: &FeedPreferences) -> Result<()> {
        write_toml(&paths::feed_preferences_path(&self.config_dir, feed), preferences)
    }

    pub fn save_interface_preferences(
        &self,
        interface: &FeedUri,
        preferences: &InterfacePreferences,
    ) -> Result<()> {
        write_toml(
            &paths::interface_preferences_path(&self.config_dir, interface),
            preferences,
        )
    }
}

impl PreferencesStore for DirectoryPreferencesStore {
    fn load_for(&self, feed: &FeedUri) -> FeedPreferences {
        read_toml_or_default(&paths::feed_preferences_path(&self.config_dir, feed))
    }

    fn load_interface_preferences(&self, interface: &FeedUri) -> InterfacePreferences {
        read_toml_or_default(&paths::interface_preferences_path(
            &self.config_dir,
            interface,
        ))
    }
}

/// Store with nothing persisted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPreferences;

impl PreferencesStore for NoPreferences {
    fn load_for(&self, _feed: &FeedUri) -> FeedPreferences {
        FeedPreferences::default()
    }

    fn load_interface_preferences(&self, _interface: &FeedUri) -> InterfacePreferences {
        InterfacePreferences::default()
    }
}

fn read_toml_or_default<T>(path: &Path) -> T
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return T::default();
    }
    let parsed = fs::read_to_string(path)
        .map_err(Error::from)
        .and_then(|content| {
            toml::from_str(&content).map_err(|e| Error::ParseError(e.to_string()))
        });
    match parsed {
        Ok(value) => {
            debug!("Loaded preferences from {}", path.display());
            value
        }
        Err(e) => {
            warn!("Ignoring unreadable preferences {}: {}", path.display(), e);
            T::default()
        }
    }
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(value).map_err(|e| Error::ParseError(e.to_string()))?;
    fs::write(path, content)?;
    Ok(())
}
