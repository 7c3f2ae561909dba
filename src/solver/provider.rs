// src/solver/provider.rs

//! Collects and ranks every candidate for a requirement

use crate::error::{Error, Result};
use crate::feeds::{FeedSources, SourceKind};
use crate::model::{Feed, FeedUri, Implementation, Requirements, Selection};
use crate::packages::distribution_feed;
use crate::solver::candidate::{SelectionCandidate, SuitabilityPolicy};
use crate::solver::SolveContext;
use std::sync::Arc;
use tracing::{debug, warn};

/// Aggregates candidates across all feed sources and the package manager
pub struct CandidateProvider<'a> {
    ctx: &'a SolveContext,
}

impl<'a> CandidateProvider<'a> {
    pub fn new(ctx: &'a SolveContext) -> Self {
        Self { ctx }
    }

    /// Every candidate for `requirements`, best first
    ///
    /// Unsuitable candidates stay in the list with their rejection reason.
    /// Fails with `FeedUnavailable` only when the main feed is missing.
    pub fn get_sorted_candidates(&self, requirements: &Requirements) -> Result<Vec<SelectionCandidate>> {
        let ctx = self.ctx;
        let interface_prefs = ctx
            .preferences
            .load_interface_preferences(&requirements.interface);
        let policy = SuitabilityPolicy {
            minimum_stability: interface_prefs
                .stability_policy
                .unwrap_or(ctx.config.minimum_stability),
            offline: ctx.config.is_offline(),
            store: ctx.store.as_ref(),
        };

        let mut candidates = Vec::new();
        for source in FeedSources::new(ctx, requirements)? {
            let source = source?;
            let feed = match source.loader.load(ctx.feeds.as_ref()) {
                Ok(feed) => feed,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!("Skipping {} feed {}: {}", source.kind, source.uri, e);
                    continue;
                }
            };

            let preferences = ctx.preferences.load_for(&source.uri);
            for implementation in feed.implementations() {
                candidates.push(SelectionCandidate::new(
                    source.uri.clone(),
                    source.kind,
                    preferences.clone(),
                    implementation.clone(),
                    requirements,
                    &policy,
                ));
            }

            self.add_package_candidates(&feed, &source.uri, requirements, &policy, &mut candidates)?;
        }

        candidates.sort_by(|a, b| a.rank(b));
        debug!(
            "{} candidate(s) for {}, {} suitable",
            candidates.len(),
            requirements,
            candidates.iter().filter(|c| c.is_suitable()).count()
        );
        Ok(candidates)
    }

    fn add_package_candidates(
        &self,
        feed: &Feed,
        feed_uri: &FeedUri,
        requirements: &Requirements,
        policy: &SuitabilityPolicy<'_>,
        candidates: &mut Vec<SelectionCandidate>,
    ) -> Result<()> {
        let mut placeholders = feed.package_implementations().peekable();
        if placeholders.peek().is_none() {
            return Ok(());
        }

        let distribution_uri = distribution_feed(feed_uri);
        let preferences = self.ctx.preferences.load_for(&distribution_uri);
        for placeholder in placeholders {
            let found = match self.ctx.package_manager.query(placeholder, &self.ctx.cancel) {
                Ok(found) => found,
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    warn!("Package query for {} failed: {}", placeholder.package, e);
                    continue;
                }
            };
            for external in found {
                debug!(
                    "Host package {} {} offered for {}",
                    external.package, external.version, requirements.interface
                );
                candidates.push(SelectionCandidate::new(
                    distribution_uri.clone(),
                    SourceKind::Distribution,
                    preferences.clone(),
                    external.to_implementation(placeholder),
                    requirements,
                    policy,
                ));
            }
        }
        Ok(())
    }

    /// Recover the full implementation a selection was built from
    ///
    /// Fails with `NotFound` when the current feed no longer contains it.
    pub fn lookup_original_implementation(&self, selection: &Selection) -> Result<Implementation> {
        self.ctx.cancel.check()?;
        let feed_uri = selection.feed();

        if let Some(main_uri) = feed_uri.strip_distribution_prefix() {
            let feed = self.load(&main_uri)?;
            for placeholder in feed.package_implementations() {
                let found = self.ctx.package_manager.query(placeholder, &self.ctx.cancel)?;
                if let Some(external) = found.into_iter().find(|e| e.id() == selection.id) {
                    return Ok(external.to_implementation(placeholder));
                }
            }
        } else if let Some(implementation) = self.load(feed_uri)?.find_implementation(&selection.id) {
            return Ok(implementation.clone());
        }

        Err(Error::NotFound(format!(
            "Implementation {} in feed {}",
            selection.id, feed_uri
        )))
    }

    fn load(&self, uri: &FeedUri) -> Result<Arc<Feed>> {
        match uri.local_path() {
            Some(path) if !self.ctx.feeds.contains(uri) => self.ctx.feeds.load_local(&path),
            _ => self.ctx.feeds.get_feed(uri),
        }
    }
}
