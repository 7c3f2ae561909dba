// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use feedsolver::model::{Archive, Command, Element, Retrieval};
use feedsolver::{
    CancellationToken, DirectoryPreferencesStore, ExternalImplementation, Feed, FeedCache,
    FeedManager, FeedReference, FeedUri, Implementation, ImplementationVersion,
    PackageImplementation, PackageManager, Result, SolveContext, SolverConfig, Stability,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

pub const TEST1: &str = "http://example.com/test1.json";
pub const SUB1: &str = "http://example.com/sub1.json";
pub const SUB2: &str = "http://example.com/sub2.json";
pub const APP: &str = "http://example.com/app.json";
pub const LIB: &str = "http://example.com/lib.json";
pub const TOOL: &str = "http://example.com/tool.json";

/// Route solver logs to the test output, filtered by `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn uri(s: &str) -> FeedUri {
    FeedUri::parse(s).unwrap()
}

pub fn v(s: &str) -> ImplementationVersion {
    ImplementationVersion::parse(s).unwrap()
}

/// A stable, downloadable implementation providing a `run` command.
pub fn implementation(id: &str, version: &str) -> Implementation {
    let mut imp = Implementation::new(id, v(version));
    imp.stability = Stability::Stable;
    imp.commands.insert(
        "run".to_string(),
        Command {
            path: Some(format!("bin/{}", id)),
            ..Command::default()
        },
    );
    imp.retrieval = Retrieval::Archives(vec![Archive {
        href: format!("http://example.com/{}.tar.gz", id),
        size: 1024,
        extract: None,
        mime_type: None,
    }]);
    imp
}

pub fn feed(feed_uri: &str, implementations: Vec<Implementation>) -> Feed {
    Feed {
        uri: Some(uri(feed_uri)),
        name: feed_uri.rsplit('/').next().unwrap_or(feed_uri).to_string(),
        summary: None,
        elements: implementations.into_iter().map(Element::Implementation).collect(),
        feeds: Vec::new(),
    }
}

/// Main test feed: one implementation, a `firefox` package placeholder and
/// a reference to `SUB1`.
pub fn test_feed() -> Feed {
    let mut test = feed(TEST1, vec![implementation("id1", "1.0")]);
    let mut placeholder = PackageImplementation::new("firefox");
    placeholder.commands.insert("run".to_string(), Command::default());
    test.elements.push(Element::PackageImplementation(placeholder));
    test.feeds.push(FeedReference::new(uri(SUB1)));
    test
}

/// Temporary data, config and store directories plus in-memory collaborators.
pub struct Fixture {
    pub temp: TempDir,
    pub feeds: Arc<FeedCache>,
    pub packages: Arc<MockPackageManager>,
}

impl Fixture {
    pub fn new() -> Self {
        init_tracing();
        Self {
            temp: tempfile::tempdir().unwrap(),
            feeds: Arc::new(FeedCache::new()),
            packages: Arc::new(MockPackageManager::default()),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp.path().join("data")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.temp.path().join("config")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.temp.path().join("store")
    }

    pub fn config(&self) -> SolverConfig {
        SolverConfig {
            data_dirs: vec![self.data_dir()],
            config_dir: self.config_dir(),
            store_dirs: vec![self.store_dir()],
            ..SolverConfig::default()
        }
    }

    pub fn context(&self) -> SolveContext {
        self.context_with(self.config())
    }

    pub fn context_with(&self, config: SolverConfig) -> SolveContext {
        SolveContext::new(self.feeds.clone(), config).with_package_manager(self.packages.clone())
    }

    pub fn preferences(&self) -> DirectoryPreferencesStore {
        DirectoryPreferencesStore::new(self.config_dir())
    }

    /// Register a feed under its own URI.
    pub fn add_feed(&self, feed: Feed) -> Arc<Feed> {
        let feed_uri = feed.uri.clone().expect("test feeds carry a URI");
        self.feeds.insert(feed_uri, feed)
    }

    /// Write a feed to disk, returning its local identity.
    pub fn write_feed(&self, path: &Path, feed: &Feed) -> FeedUri {
        feed.save(path).unwrap();
        FeedUri::from_path(path).unwrap()
    }
}

/// Package manager answering from a fixed table, keyed by package name.
#[derive(Default)]
pub struct MockPackageManager {
    packages: Mutex<HashMap<String, Vec<ExternalImplementation>>>,
    queries: AtomicUsize,
}

impl MockPackageManager {
    pub fn add(&self, package: &str, external: ExternalImplementation) {
        self.packages
            .lock()
            .unwrap()
            .entry(package.to_string())
            .or_default()
            .push(external);
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl PackageManager for MockPackageManager {
    fn query(
        &self,
        package: &PackageImplementation,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExternalImplementation>> {
        cancel.check()?;
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .packages
            .lock()
            .unwrap()
            .get(&package.package)
            .cloned()
            .unwrap_or_default())
    }
}

/// Feed manager whose `refresh` swaps in pending feed updates.
#[derive(Default)]
pub struct RefreshingFeeds {
    pub cache: FeedCache,
    updates: Mutex<HashMap<FeedUri, Feed>>,
    refreshes: AtomicUsize,
}

impl RefreshingFeeds {
    pub fn stage_update(&self, feed: Feed) {
        let feed_uri = feed.uri.clone().unwrap();
        self.updates.lock().unwrap().insert(feed_uri, feed);
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl FeedManager for RefreshingFeeds {
    fn contains(&self, feed: &FeedUri) -> bool {
        self.cache.contains(feed)
    }

    fn get_feed(&self, feed: &FeedUri) -> Result<Arc<Feed>> {
        self.cache.get_feed(feed)
    }

    fn load_local(&self, path: &Path) -> Result<Arc<Feed>> {
        self.cache.load_local(path)
    }

    fn refresh(&self, feed: &FeedUri) -> Result<()> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if let Some(update) = self.updates.lock().unwrap().remove(feed) {
            self.cache.insert(feed.clone(), update);
        }
        Ok(())
    }
}
