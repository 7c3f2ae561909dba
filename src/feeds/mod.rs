// src/feeds/mod.rs

//! Feed access, stored preferences and feed source enumeration
//!
//! The solver never fetches anything itself. It reads parsed feeds through a
//! [`FeedManager`] and user settings through a [`PreferencesStore`]; both may
//! be shared across concurrent solves.

mod preferences;
mod sources;

pub use preferences::{
    DirectoryPreferencesStore, FeedPreferences, ImplementationPreferences, InterfacePreferences,
    NoPreferences, PreferencesStore,
};
pub use sources::{FeedLoader, FeedSource, FeedSources, SourceKind};

use crate::error::{Error, Result};
use crate::model::{Feed, FeedUri};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Read access to parsed feeds
pub trait FeedManager: Send + Sync {
    /// Whether the feed is available without fetching
    fn contains(&self, feed: &FeedUri) -> bool;

    /// Get a parsed feed by identity
    fn get_feed(&self, feed: &FeedUri) -> Result<Arc<Feed>>;

    /// Load a feed from a local file
    fn load_local(&self, path: &Path) -> Result<Arc<Feed>>;

    /// Bring a feed up to date before a retry; a no-op when nothing can be fetched
    fn refresh(&self, _feed: &FeedUri) -> Result<()> {
        Ok(())
    }
}

/// Feed manager over an in-memory cache, optionally backed by a cache directory
///
/// Network feeds must be inserted (or present in the cache directory as
/// `<escaped uri>.json`); local feeds are read from disk on demand. Reads and
/// inserts may happen concurrently.
#[derive(Debug, Default)]
pub struct FeedCache {
    feeds: RwLock<HashMap<FeedUri, Arc<Feed>>>,
    cache_dir: Option<PathBuf>,
}

impl FeedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache whose misses fall back to `<cache_dir>/<escaped uri>.json`
    pub fn with_cache_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            feeds: RwLock::new(HashMap::new()),
            cache_dir: Some(cache_dir.into()),
        }
    }

    /// Add or replace a feed
    pub fn insert(&self, uri: FeedUri, feed: Feed) -> Arc<Feed> {
        let feed = Arc::new(feed);
        self.feeds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(uri, Arc::clone(&feed));
        feed
    }

    /// Add a feed and persist it to the cache directory, if there is one
    pub fn store(&self, uri: FeedUri, feed: Feed) -> Result<Arc<Feed>> {
        if let Some(path) = self.cache_path(&uri) {
            feed.save(&path)?;
        }
        Ok(self.insert(uri, feed))
    }

    pub fn remove(&self, uri: &FeedUri) -> Option<Arc<Feed>> {
        self.feeds
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(uri)
    }

    fn cached(&self, uri: &FeedUri) -> Option<Arc<Feed>> {
        self.feeds
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(uri)
            .cloned()
    }

    fn cache_path(&self, uri: &FeedUri) -> Option<PathBuf> {
        self.cache_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.json", uri.escape())))
    }

    fn disk_path(&self, uri: &FeedUri) -> Option<PathBuf> {
        uri.local_path()
            .or_else(|| self.cache_path(uri))
            .filter(|path| path.is_file())
    }
}

impl FeedManager for FeedCache {
    fn contains(&self, feed: &FeedUri) -> bool {
        self.cached(feed).is_some() || self.disk_path(feed).is_some()
    }

    fn get_feed(&self, feed: &FeedUri) -> Result<Arc<Feed>> {
        if let Some(cached) = self.cached(feed) {
            return Ok(cached);
        }

        let path = self.disk_path(feed).ok_or_else(|| Error::FeedUnavailable {
            feed: feed.to_string(),
            reason: "not in cache".to_string(),
        })?;
        debug!("Loading feed {} from {}", feed, path.display());
        let parsed = Feed::load(&path).map_err(|e| Error::FeedUnavailable {
            feed: feed.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.insert(feed.clone(), parsed))
    }

    fn load_local(&self, path: &Path) -> Result<Arc<Feed>> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("No feed at {}", path.display())));
        }
        let uri = FeedUri::from_path(path)?;
        if let Some(cached) = self.cached(&uri) {
            return Ok(cached);
        }
        Ok(self.insert(uri, Feed::load(path)?))
    }
}
