// src/solver/engine.rs

//! Greedy dependency-closure solver
//!
//! Each interface is committed to its best suitable candidate as soon as it
//! is reached; earlier choices are never revisited. A combination that only
//! a different earlier choice would permit therefore fails with
//! `NoCandidate`.

use crate::error::{Error, Rejection, Result};
use crate::model::{Dependency, FeedUri, Importance, Requirements, Selections};
use crate::solver::{CandidateProvider, SolveContext, Solution, Solver};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Commits greedily to the first suitable candidate per interface
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedySolver {
    refresh: bool,
}

impl GreedySolver {
    pub fn new() -> Self {
        Self { refresh: false }
    }

    /// Variant that asks the feed manager to refresh each feed before use
    pub fn refreshing() -> Self {
        Self { refresh: true }
    }
}

impl Solver for GreedySolver {
    fn solve(&self, ctx: &SolveContext, requirements: &Requirements) -> Result<Solution> {
        ctx.cancel.check()?;
        info!("Solving {}", requirements);

        let mut run = SolveRun {
            ctx,
            provider: CandidateProvider::new(ctx),
            refresh: self.refresh,
            now: Utc::now(),
            selections: Selections::new(
                requirements.interface.clone(),
                requirements.command.clone(),
            ),
            resolved: HashMap::new(),
            in_progress: Vec::new(),
            stale: false,
        };
        run.resolve(requirements.clone())?;

        if run.stale {
            info!("Solution for {} uses stale feeds", requirements.interface);
        }
        Ok(Solution {
            selections: run.selections,
            stale: run.stale,
        })
    }
}

/// Mutable state of one solve
struct SolveRun<'a> {
    ctx: &'a SolveContext,
    provider: CandidateProvider<'a>,
    refresh: bool,
    now: DateTime<Utc>,
    selections: Selections,
    /// Accumulated requirements of each resolved interface
    resolved: HashMap<FeedUri, Requirements>,
    /// Interfaces being resolved, outermost first
    in_progress: Vec<FeedUri>,
    stale: bool,
}

impl SolveRun<'_> {
    fn resolve(&mut self, requirements: Requirements) -> Result<()> {
        self.ctx.cancel.check()?;
        self.in_progress.push(requirements.interface.clone());
        let result = self.resolve_interface(requirements);
        self.in_progress.pop();
        result
    }

    fn resolve_interface(&mut self, requirements: Requirements) -> Result<()> {
        let interface = requirements.interface.clone();

        if self.refresh {
            match self.ctx.feeds.refresh(&interface) {
                Ok(()) => {}
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => warn!("Refreshing {} failed: {}", interface, e),
            }
        }

        let candidates = self.provider.get_sorted_candidates(&requirements)?;
        let Some(chosen) = candidates.iter().find(|c| c.is_suitable()) else {
            return Err(Error::NoCandidate {
                interface: interface.to_string(),
                rejections: candidates.iter().map(|c| c.to_rejection()).collect(),
            });
        };

        info!(
            "Selected {} {} for {} from {}",
            chosen.implementation.id, chosen.implementation.version, interface, chosen.feed
        );
        if is_network_feed(&chosen.feed)
            && chosen
                .preferences
                .is_stale(self.ctx.config.freshness(), self.now)
        {
            debug!("Feed {} is stale", chosen.feed);
            self.stale = true;
        }

        let dependencies = group_dependencies(
            chosen
                .implementation
                .dependencies_for(requirements.command.as_deref()),
            &requirements,
        );
        for (dep_requirements, importance) in dependencies {
            match importance {
                Importance::Essential => self.resolve_dependency(dep_requirements)?,
                Importance::Recommended => self.resolve_recommended(dep_requirements)?,
            }
        }

        // Skipped recommended dependencies are not required
        let mut selection = chosen.to_selection(&candidates);
        selection
            .requires
            .retain(|dependency| self.selections.contains(dependency));
        self.selections.insert(selection);
        self.resolved.insert(interface, requirements);
        Ok(())
    }

    /// Resolve a recommended dependency, dropping it if it cannot be satisfied
    fn resolve_recommended(&mut self, requirements: Requirements) -> Result<()> {
        let snapshot = (self.selections.clone(), self.resolved.clone(), self.stale);
        let interface = requirements.interface.clone();
        match self.resolve_dependency(requirements) {
            Err(e @ (Error::NoCandidate { .. } | Error::FeedUnavailable { .. })) => {
                warn!("Skipping recommended dependency {}: {}", interface, e);
                (self.selections, self.resolved, self.stale) = snapshot;
                Ok(())
            }
            other => other,
        }
    }

    fn resolve_dependency(&mut self, requirements: Requirements) -> Result<()> {
        let interface = &requirements.interface;

        if let Some(start) = self.in_progress.iter().position(|i| i == interface) {
            let mut chain: Vec<String> = self.in_progress[start..]
                .iter()
                .map(|i| i.to_string())
                .collect();
            chain.push(interface.to_string());
            return Err(Error::CyclicDependency { chain });
        }

        if let Some(existing) = self.resolved.get_mut(interface) {
            existing.merge(&requirements);
            let range = existing.effective_range();
            if let Some(selection) = self.selections.get(interface) {
                if !range.contains(&selection.version) {
                    return Err(Error::NoCandidate {
                        interface: interface.to_string(),
                        rejections: vec![Rejection {
                            feed: selection.feed().to_string(),
                            implementation: selection.id.clone(),
                            version: selection.version.to_string(),
                            reason: format!("already selected, but {} is required", range),
                        }],
                    });
                }
            }
            debug!("{} already resolved", interface);
            return Ok(());
        }

        self.resolve(requirements)
    }
}

/// Nested requirements per dependency target, merging repeated targets
///
/// A target is essential if any dependency on it is.
fn group_dependencies(
    dependencies: Vec<&Dependency>,
    parent: &Requirements,
) -> Vec<(Requirements, Importance)> {
    let mut grouped: Vec<(Requirements, Importance)> = Vec::new();
    for dependency in dependencies {
        let nested = dependency.requirements(parent);
        match grouped
            .iter_mut()
            .find(|(r, _)| r.interface == nested.interface)
        {
            Some((existing, importance)) => {
                existing.merge(&nested);
                if dependency.importance == Importance::Essential {
                    *importance = Importance::Essential;
                }
            }
            None => grouped.push((nested, dependency.importance)),
        }
    }
    grouped
}

/// Only feeds fetched over the network can go stale
fn is_network_feed(feed: &FeedUri) -> bool {
    !feed.is_local() && !feed.is_distribution()
}
