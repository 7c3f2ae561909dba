// src/feeds/sources.rs

//! Enumerates the feeds to consult for one requirement
//!
//! Sources come in a fixed order: the main feed, its compatible sub-feeds,
//! feeds added through interface preferences, native overrides and finally
//! site packages. Only the main feed is mandatory; everything after it is
//! discovered lazily as the iterator advances.

use crate::error::{Error, Result};
use crate::feeds::FeedManager;
use crate::model::{Feed, FeedReference, FeedUri, Requirements};
use crate::paths;
use crate::solver::SolveContext;
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use strum_macros::Display;
use tracing::{debug, warn};

/// Where a feed (and so a candidate) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    /// The feed named by the interface itself
    Main,
    /// Referenced from the main feed
    SubFeed,
    /// Added by the user's interface preferences
    Preference,
    /// Locally stored override of the main feed
    NativeOverride,
    /// Feed bundled by a vendor under site-packages
    SitePackage,
    /// Synthesized from the host package manager
    Distribution,
}

impl SourceKind {
    /// Local overrides outrank network feeds at equal version
    pub fn is_override(self) -> bool {
        matches!(self, SourceKind::NativeOverride | SourceKind::SitePackage)
    }
}

/// How to obtain a source's feed document
#[derive(Debug, Clone)]
pub enum FeedLoader {
    /// Already loaded
    Loaded(Arc<Feed>),
    /// Through the feed manager by identity
    Uri(FeedUri),
    /// From a local file through the feed manager
    Path(PathBuf),
}

impl FeedLoader {
    pub fn load(&self, feeds: &dyn FeedManager) -> Result<Arc<Feed>> {
        match self {
            FeedLoader::Loaded(feed) => Ok(Arc::clone(feed)),
            FeedLoader::Uri(uri) => feeds.get_feed(uri),
            FeedLoader::Path(path) => feeds.load_local(path),
        }
    }
}

/// A feed to consult, and how to load it
#[derive(Debug, Clone)]
pub struct FeedSource {
    /// Identity candidates from this feed are attributed to
    pub uri: FeedUri,
    pub kind: SourceKind,
    pub loader: FeedLoader,
}

#[derive(Debug, Clone, Copy)]
enum Stage {
    SubFeeds,
    Preferences,
    NativeOverrides,
    SitePackages,
}

impl Stage {
    fn next(self) -> Option<Stage> {
        match self {
            Stage::SubFeeds => Some(Stage::Preferences),
            Stage::Preferences => Some(Stage::NativeOverrides),
            Stage::NativeOverrides => Some(Stage::SitePackages),
            Stage::SitePackages => None,
        }
    }
}

/// Lazy, de-duplicated sequence of feed sources for a requirement
///
/// Yields `Err(Error::Cancelled)` once if the solve is cancelled, then stops.
pub struct FeedSources<'a> {
    ctx: &'a SolveContext,
    requirements: &'a Requirements,
    main_feed: Arc<Feed>,
    main: Option<FeedSource>,
    stage: Option<Stage>,
    pending: VecDeque<FeedSource>,
    seen: HashSet<FeedUri>,
    finished: bool,
}

impl<'a> FeedSources<'a> {
    /// Load the main feed and prepare the remaining sources
    ///
    /// Fails with `FeedUnavailable` if the main feed cannot be obtained.
    pub fn new(ctx: &'a SolveContext, requirements: &'a Requirements) -> Result<Self> {
        ctx.cancel.check()?;
        let interface = &requirements.interface;

        let main_feed = ctx.feeds.get_feed(interface).map_err(|e| match e {
            Error::Cancelled => Error::Cancelled,
            e @ Error::FeedUnavailable { .. } => e,
            other => Error::FeedUnavailable {
                feed: interface.to_string(),
                reason: other.to_string(),
            },
        })?;

        let mut seen = HashSet::new();
        seen.insert(interface.clone());

        Ok(Self {
            ctx,
            requirements,
            main: Some(FeedSource {
                uri: interface.clone(),
                kind: SourceKind::Main,
                loader: FeedLoader::Loaded(Arc::clone(&main_feed)),
            }),
            main_feed,
            stage: Some(Stage::SubFeeds),
            pending: VecDeque::new(),
            seen,
            finished: false,
        })
    }

    /// The main feed, loaded eagerly
    pub fn main_feed(&self) -> &Arc<Feed> {
        &self.main_feed
    }

    fn push(&mut self, uri: FeedUri, kind: SourceKind, loader: FeedLoader) {
        if self.seen.insert(uri.clone()) {
            debug!("Feed source for {}: {} ({})", self.requirements.interface, uri, kind);
            self.pending.push_back(FeedSource { uri, kind, loader });
        }
    }

    fn push_reference(&mut self, reference: &FeedReference, kind: SourceKind) {
        if !reference.arch.runs_on(&self.requirements.architecture) {
            debug!(
                "Skipping feed {}: {} is incompatible with {}",
                reference.source, reference.arch, self.requirements.architecture
            );
            return;
        }
        let wanted = &self.requirements.languages;
        if !reference.languages.is_empty()
            && !wanted.is_empty()
            && !reference.languages.iter().any(|l| wanted.contains(l))
        {
            debug!("Skipping feed {}: no requested language", reference.source);
            return;
        }
        self.push(
            reference.source.clone(),
            kind,
            FeedLoader::Uri(reference.source.clone()),
        );
    }

    fn fill(&mut self, stage: Stage) {
        let ctx = self.ctx;
        let interface = self.requirements.interface.clone();
        match stage {
            Stage::SubFeeds => {
                let main_feed = Arc::clone(&self.main_feed);
                for reference in &main_feed.feeds {
                    self.push_reference(reference, SourceKind::SubFeed);
                }
            }
            Stage::Preferences => {
                let prefs = ctx.preferences.load_interface_preferences(&interface);
                for reference in &prefs.feeds {
                    self.push_reference(reference, SourceKind::Preference);
                }
            }
            Stage::NativeOverrides => {
                for data_dir in &ctx.config.data_dirs {
                    let path = paths::native_feed_path(data_dir, &interface);
                    if path.is_file() {
                        self.push_local(path, SourceKind::NativeOverride);
                    }
                }
            }
            Stage::SitePackages => {
                for data_dir in &ctx.config.data_dirs {
                    let dir = paths::site_packages_dir(data_dir, &interface);
                    for path in site_package_feeds(&dir) {
                        self.push_local(path, SourceKind::SitePackage);
                    }
                }
            }
        }
    }

    fn push_local(&mut self, path: PathBuf, kind: SourceKind) {
        match FeedUri::from_path(&path) {
            Ok(uri) => self.push(uri, kind, FeedLoader::Path(path)),
            Err(e) => warn!("Ignoring {} feed {}: {}", kind, path.display(), e),
        }
    }
}

impl Iterator for FeedSources<'_> {
    type Item = Result<FeedSource>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Err(e) = self.ctx.cancel.check() {
            self.finished = true;
            return Some(Err(e));
        }
        if let Some(main) = self.main.take() {
            return Some(Ok(main));
        }
        loop {
            if let Some(source) = self.pending.pop_front() {
                return Some(Ok(source));
            }
            let Some(stage) = self.stage else {
                self.finished = true;
                return None;
            };
            self.stage = stage.next();
            self.fill(stage);
        }
    }
}

/// Vendor feed files under a site-packages directory, sorted by vendor
fn site_package_feeds(dir: &std::path::Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Cannot scan site packages in {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut vendors: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    vendors.sort();

    vendors
        .iter()
        .map(|vendor| paths::site_package_feed_path(vendor))
        .filter(|path| path.is_file())
        .collect()
}
