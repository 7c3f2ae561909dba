// src/model/requirements.rs

//! What a caller asks the solver for

use crate::arch::Architecture;
use crate::model::FeedUri;
use crate::version::{Constraint, VersionRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Command selected when none is named explicitly
pub const DEFAULT_COMMAND: &str = "run";

/// A request to select an implementation of an interface
///
/// Value-comparable and hashable so it can key caches and groupings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirements {
    pub interface: FeedUri,
    /// Command the chosen implementation must provide; `None` for libraries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub architecture: Architecture,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Preferred languages, most preferred first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    /// Extra constraints for interfaces reached through dependencies
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_restrictions: BTreeMap<FeedUri, Vec<Constraint>>,
}

impl Requirements {
    /// Requirements for running an interface on this machine
    pub fn new(interface: FeedUri) -> Self {
        Self {
            interface,
            command: Some(DEFAULT_COMMAND.to_string()),
            architecture: Architecture::host(),
            constraints: Vec::new(),
            languages: Vec::new(),
            extra_restrictions: BTreeMap::new(),
        }
    }

    /// Requirements reached through a dependency; no command is needed
    pub fn for_dependency(interface: FeedUri, architecture: Architecture) -> Self {
        Self {
            interface,
            command: None,
            architecture,
            constraints: Vec::new(),
            languages: Vec::new(),
            extra_restrictions: BTreeMap::new(),
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn without_command(mut self) -> Self {
        self.command = None;
        self
    }

    pub fn with_architecture(mut self, architecture: Architecture) -> Self {
        self.architecture = architecture;
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.languages.push(language.into());
        self
    }

    pub fn with_extra_restriction(mut self, interface: FeedUri, constraint: Constraint) -> Self {
        self.extra_restrictions
            .entry(interface)
            .or_default()
            .push(constraint);
        self
    }

    /// Intersection of own constraints and any extra restriction on this interface
    pub fn effective_range(&self) -> VersionRange {
        let extra = self
            .extra_restrictions
            .get(&self.interface)
            .into_iter()
            .flatten();
        VersionRange::from_constraints(self.constraints.iter().chain(extra))
    }

    /// Fold another request for the same interface into this one
    ///
    /// Constraints accumulate, so the effective range can only narrow.
    pub fn merge(&mut self, other: &Requirements) {
        for constraint in &other.constraints {
            if !self.constraints.contains(constraint) {
                self.constraints.push(constraint.clone());
            }
        }
        if self.command.is_none() {
            self.command = other.command.clone();
        }
    }
}

impl fmt::Display for Requirements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.interface)?;
        if let Some(ref command) = self.command {
            write!(f, " ({})", command)?;
        }
        let range = self.effective_range();
        if !range.is_unbounded() {
            write!(f, " [{}]", range)?;
        }
        write!(f, " for {}", self.architecture)
    }
}
