// src/error.rs

//! Error types for feed aggregation and implementation selection

use std::fmt;
use thiserror::Error;

/// Why a single candidate was not chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Feed the candidate came from
    pub feed: String,
    /// Implementation ID within that feed
    pub implementation: String,
    /// Version string of the implementation
    pub version: String,
    /// Human-readable reason
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}): {}",
            self.implementation, self.version, self.feed, self.reason
        )
    }
}

fn format_rejections(rejections: &[Rejection]) -> String {
    if rejections.is_empty() {
        return "no implementations found".to_string();
    }
    rejections
        .iter()
        .map(|r| format!("\n  - {}", r))
        .collect::<String>()
}

/// Errors produced while solving
#[derive(Error, Debug)]
pub enum Error {
    /// The main feed for an interface could not be obtained
    #[error("Feed '{feed}' is unavailable: {reason}")]
    FeedUnavailable { feed: String, reason: String },

    /// Every candidate for an interface was unsuitable
    #[error("No suitable implementation of '{interface}': {}", format_rejections(.rejections))]
    NoCandidate {
        interface: String,
        rejections: Vec<Rejection>,
    },

    /// A dependency chain leads back to an interface still being resolved
    #[error("Circular dependency: {}", .chain.join(" -> "))]
    CyclicDependency { chain: Vec<String> },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// A lookup against current feed state found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid feed URI: {0}")]
    InvalidFeedUri(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this is a resolution failure another strategy may retry
    pub fn is_solver_failure(&self) -> bool {
        matches!(
            self,
            Error::FeedUnavailable { .. } | Error::NoCandidate { .. } | Error::CyclicDependency { .. }
        )
    }

    /// Whether this error represents user cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
