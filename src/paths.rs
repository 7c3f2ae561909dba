// src/paths.rs
//! Centralized path derivation for data, configuration and store directories

use crate::model::FeedUri;
use std::path::{Path, PathBuf};

/// Directory name used under system and user base directories
pub const APP_DIR: &str = "feedsolver";

/// Subdirectory of a data dir holding native feed overrides
pub const NATIVE_FEEDS_DIR: &str = "native_feeds";

/// Subdirectory of a data dir holding vendor-bundled feeds
pub const SITE_PACKAGES_DIR: &str = "site-packages";

/// Feed file expected at `<vendor>/<APP_DIR>/` under a site-packages dir
pub const SITE_PACKAGE_FEED_FILE: &str = "feed.json";

/// Environment variable prepending a data directory to the search list
pub const DATA_DIR_ENV: &str = "FEEDSOLVER_DATA_DIR";

/// Data directories searched for native feeds and site packages, in order
pub fn default_data_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        dirs.push(PathBuf::from(dir));
    }
    if let Some(user) = dirs::data_dir() {
        dirs.push(user.join(APP_DIR));
    }
    dirs.push(Path::new("/usr/local/share").join(APP_DIR));
    dirs.push(Path::new("/usr/share").join(APP_DIR));
    dirs
}

/// Root of persisted feed and interface preferences
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/etc"))
        .join(APP_DIR)
}

/// Implementation store roots: the user's cache, then the shared one
pub fn default_store_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(cache) = dirs::cache_dir() {
        dirs.push(cache.join(APP_DIR).join("implementations"));
    }
    dirs.push(Path::new("/var/cache").join(APP_DIR).join("implementations"));
    dirs
}

/// Location of the native override feed for a feed identity
pub fn native_feed_path(data_dir: &Path, feed: &FeedUri) -> PathBuf {
    data_dir.join(NATIVE_FEEDS_DIR).join(feed.escape())
}

/// Directory scanned for vendor feeds of an interface
pub fn site_packages_dir(data_dir: &Path, interface: &FeedUri) -> PathBuf {
    interface
        .escape_components()
        .into_iter()
        .fold(data_dir.join(SITE_PACKAGES_DIR), |path, c| path.join(c))
}

/// Feed file a vendor directory would provide
pub fn site_package_feed_path(vendor_dir: &Path) -> PathBuf {
    vendor_dir.join(APP_DIR).join(SITE_PACKAGE_FEED_FILE)
}

/// Persisted preferences for one feed
pub fn feed_preferences_path(config_dir: &Path, feed: &FeedUri) -> PathBuf {
    config_dir
        .join("feeds")
        .join(format!("{}.toml", feed.escape()))
}

/// Persisted preferences for one interface
pub fn interface_preferences_path(config_dir: &Path, interface: &FeedUri) -> PathBuf {
    config_dir
        .join("interfaces")
        .join(format!("{}.toml", interface.escape()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri() -> FeedUri {
        FeedUri::parse("http://example.com/test1.json").unwrap()
    }

    #[test]
    fn test_native_feed_path() {
        assert_eq!(
            native_feed_path(Path::new("/data"), &uri()),
            PathBuf::from("/data/native_feeds/http%3a%2f%2fexample.com%2ftest1.json")
        );
    }

    #[test]
    fn test_site_packages_dir() {
        assert_eq!(
            site_packages_dir(Path::new("/data"), &uri()),
            PathBuf::from("/data/site-packages/http/example.com/test1.json")
        );
        assert_eq!(
            site_package_feed_path(Path::new("/sp/vendor")),
            PathBuf::from("/sp/vendor/feedsolver/feed.json")
        );
    }

    #[test]
    fn test_preferences_paths() {
        let feed = feed_preferences_path(Path::new("/cfg"), &uri());
        assert!(feed.starts_with("/cfg/feeds"));
        assert!(feed.to_string_lossy().ends_with(".toml"));
        let iface = interface_preferences_path(Path::new("/cfg"), &uri());
        assert!(iface.starts_with("/cfg/interfaces"));
    }

    #[test]
    fn test_default_dirs_end_with_app_dir() {
        for dir in default_data_dirs() {
            assert!(dir.ends_with(APP_DIR));
        }
        assert!(default_config_dir().ends_with(APP_DIR));
        assert!(!default_store_dirs().is_empty());
    }
}
