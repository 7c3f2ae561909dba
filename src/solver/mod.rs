// src/solver/mod.rs

//! Implementation selection
//!
//! A solve starts from a [`Requirements`], asks the [`CandidateProvider`]
//! for ranked candidates per interface and commits to the best suitable one,
//! following dependencies until the graph is closed.
//!
//! Everything a solve depends on travels in an explicit [`SolveContext`];
//! the solver itself keeps no state between solves, so one context and one
//! solver can serve concurrent solves.

mod candidate;
mod engine;
mod fallback;
mod provider;

pub use candidate::SelectionCandidate;
pub use engine::GreedySolver;
pub use fallback::FallbackSolver;
pub use provider::CandidateProvider;

use crate::cancel::CancellationToken;
use crate::config::SolverConfig;
use crate::error::Result;
use crate::feeds::{DirectoryPreferencesStore, FeedManager, PreferencesStore};
use crate::model::{Requirements, Selections};
use crate::packages::{HostPackageManager, PackageManager};
use crate::store::{DirectoryStore, ImplementationStore};
use std::sync::Arc;

/// Collaborators and policy for solving
#[derive(Clone)]
pub struct SolveContext {
    pub feeds: Arc<dyn FeedManager>,
    pub preferences: Arc<dyn PreferencesStore>,
    pub package_manager: Arc<dyn PackageManager>,
    pub store: Arc<dyn ImplementationStore>,
    pub config: SolverConfig,
    pub cancel: CancellationToken,
}

impl SolveContext {
    /// Context using the configured directories and the host package manager
    pub fn new(feeds: Arc<dyn FeedManager>, config: SolverConfig) -> Self {
        Self {
            feeds,
            preferences: Arc::new(DirectoryPreferencesStore::new(config.config_dir.clone())),
            package_manager: Arc::new(HostPackageManager::detect()),
            store: Arc::new(DirectoryStore::new(config.store_dirs.clone())),
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_preferences(mut self, preferences: Arc<dyn PreferencesStore>) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn with_package_manager(mut self, package_manager: Arc<dyn PackageManager>) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ImplementationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Outcome of a successful solve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub selections: Selections,
    /// Some selected feed should be refreshed; the selections are still usable
    pub stale: bool,
}

/// A selection strategy
pub trait Solver: Send + Sync {
    fn solve(&self, ctx: &SolveContext, requirements: &Requirements) -> Result<Solution>;
}

/// Greedy solve, retried after refreshing feeds if it fails
pub fn default_solver() -> FallbackSolver<GreedySolver, GreedySolver> {
    FallbackSolver::new(GreedySolver::new(), GreedySolver::refreshing())
}
