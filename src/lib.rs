// src/lib.rs

//! Feedsolver: implementation selection across feeds
//!
//! Given a requested interface, finds every implementation on offer from
//! the interface's feed, its sub-feeds, user-added feeds, local overrides,
//! vendor site packages and the host package manager, ranks them
//! deterministically and selects one per interface across the whole
//! dependency graph.
//!
//! # Architecture
//!
//! - Feeds and preferences are read through injected collaborators
//!   ([`FeedManager`], [`PreferencesStore`], [`PackageManager`])
//! - Each solve gets an explicit [`SolveContext`]; no global state
//! - Candidates are ranked by version, source, stability and identity
//! - Resolution is greedy and never backtracks

pub mod arch;
pub mod cancel;
pub mod config;
mod error;
pub mod feeds;
pub mod model;
pub mod packages;
pub mod paths;
pub mod solver;
pub mod store;
pub mod version;

pub use arch::{Architecture, Cpu, Os};
pub use cancel::CancellationToken;
pub use config::{NetworkLevel, SolverConfig};
pub use error::{Error, Rejection, Result};
pub use feeds::{
    DirectoryPreferencesStore, FeedCache, FeedManager, FeedPreferences, InterfacePreferences,
    PreferencesStore, SourceKind,
};
pub use model::{
    Dependency, Feed, FeedReference, FeedUri, Implementation, Importance, PackageImplementation,
    Requirements, Selection, Selections, Stability,
};
pub use packages::{ExternalImplementation, HostPackageManager, NullPackageManager, PackageManager};
pub use solver::{
    default_solver, CandidateProvider, FallbackSolver, GreedySolver, SelectionCandidate,
    SolveContext, Solution, Solver,
};
pub use store::{DirectoryStore, ImplementationStore, ManifestDigest};
pub use version::{Constraint, ImplementationVersion, VersionRange};
