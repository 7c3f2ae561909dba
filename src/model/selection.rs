// src/model/selection.rs

//! Solver results: one chosen implementation per interface

use crate::arch::Architecture;
use crate::error::Result;
use crate::model::{ExternalPackage, FeedUri, Stability};
use crate::solver::SelectionCandidate;
use crate::store::ManifestDigest;
use crate::version::ImplementationVersion;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// The implementation chosen for one interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    pub interface: FeedUri,
    /// Feed the implementation came from, when it differs from `interface`
    #[serde(rename = "from-feed", default, skip_serializing_if = "Option::is_none")]
    pub from_feed: Option<FeedUri>,
    pub id: String,
    pub version: ImplementationVersion,
    #[serde(default)]
    pub arch: Architecture,
    #[serde(default)]
    pub stability: Stability,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digests: Vec<ManifestDigest>,
    #[serde(rename = "local-path", default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<ExternalPackage>,
    /// Names of the commands the implementation provides
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    /// Interfaces this selection depends on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<FeedUri>,
    /// Every candidate considered; informational only
    #[serde(skip)]
    pub candidates: Vec<SelectionCandidate>,
}

impl Selection {
    /// The feed this selection was sourced from
    pub fn feed(&self) -> &FeedUri {
        self.from_feed.as_ref().unwrap_or(&self.interface)
    }
}

impl PartialEq for Selection {
    fn eq(&self, other: &Self) -> bool {
        self.interface == other.interface
            && self.from_feed == other.from_feed
            && self.id == other.id
            && self.version == other.version
            && self.arch == other.arch
            && self.stability == other.stability
            && self.digests == other.digests
            && self.local_path == other.local_path
            && self.package == other.package
            && self.commands == other.commands
            && self.requires == other.requires
    }
}

impl Eq for Selection {}

impl PartialOrd for Selection {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Selection {
    fn cmp(&self, other: &Self) -> Ordering {
        self.interface
            .cmp(&other.interface)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// The closed set of selections for one solve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SelectionsDocument", from = "SelectionsDocument")]
pub struct Selections {
    interface: FeedUri,
    command: Option<String>,
    implementations: BTreeMap<FeedUri, Selection>,
}

#[derive(Serialize, Deserialize)]
struct SelectionsDocument {
    interface: FeedUri,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    command: Option<String>,
    selections: Vec<Selection>,
}

impl From<Selections> for SelectionsDocument {
    fn from(s: Selections) -> Self {
        Self {
            interface: s.interface,
            command: s.command,
            selections: s.implementations.into_values().collect(),
        }
    }
}

impl From<SelectionsDocument> for Selections {
    fn from(doc: SelectionsDocument) -> Self {
        let implementations = doc
            .selections
            .into_iter()
            .map(|s| (s.interface.clone(), s))
            .collect();
        Self {
            interface: doc.interface,
            command: doc.command,
            implementations,
        }
    }
}

impl Selections {
    pub(crate) fn new(interface: FeedUri, command: Option<String>) -> Self {
        Self {
            interface,
            command,
            implementations: BTreeMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, selection: Selection) {
        self.implementations
            .insert(selection.interface.clone(), selection);
    }

    /// The root interface that was solved for
    pub fn interface(&self) -> &FeedUri {
        &self.interface
    }

    /// The command to invoke on the root selection
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref()
    }

    pub fn get(&self, interface: &FeedUri) -> Option<&Selection> {
        self.implementations.get(interface)
    }

    pub fn contains(&self, interface: &FeedUri) -> bool {
        self.implementations.contains_key(interface)
    }

    /// The selection for the root interface
    pub fn main(&self) -> Option<&Selection> {
        self.get(&self.interface)
    }

    /// Selections ordered by interface identity
    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.implementations.values()
    }

    pub fn len(&self) -> usize {
        self.implementations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.implementations.is_empty()
    }

    /// Candidates considered for an interface, for "why this one" reports
    pub fn candidates_for(&self, interface: &FeedUri) -> &[SelectionCandidate] {
        self.get(interface)
            .map(|s| s.candidates.as_slice())
            .unwrap_or(&[])
    }

    /// Stable, sorted JSON suitable for diffing
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(interface: &str, id: &str) -> Selection {
        Selection {
            interface: FeedUri::parse(interface).unwrap(),
            from_feed: None,
            id: id.to_string(),
            version: ImplementationVersion::parse("1.0").unwrap(),
            arch: Architecture::any(),
            stability: Stability::Stable,
            digests: Vec::new(),
            local_path: None,
            package: None,
            commands: vec!["run".to_string()],
            requires: Vec::new(),
            candidates: Vec::new(),
        }
    }

    #[test]
    fn test_serialization_sorted_by_interface() {
        let mut selections = Selections::new(
            FeedUri::parse("http://example.com/z-app").unwrap(),
            Some("run".to_string()),
        );
        selections.insert(selection("http://example.com/z-app", "app"));
        selections.insert(selection("http://example.com/a-lib", "lib"));

        let json = selections.to_json().unwrap();
        let lib_pos = json.find("a-lib").unwrap();
        let app_pos = json.rfind("\"app\"").unwrap();
        assert!(lib_pos < app_pos);

        let back = Selections::from_json(&json).unwrap();
        assert_eq!(back, selections);
        assert_eq!(back.to_json().unwrap(), json);
    }

    #[test]
    fn test_from_feed_defaults_to_interface() {
        let mut sel = selection("http://example.com/app", "x");
        assert_eq!(sel.feed().as_str(), "http://example.com/app");
        sel.from_feed = Some(FeedUri::parse("http://example.com/sub").unwrap());
        assert_eq!(sel.feed().as_str(), "http://example.com/sub");
    }

    #[test]
    fn test_main_and_lookup() {
        let mut selections = Selections::new(FeedUri::parse("http://example.com/app").unwrap(), None);
        assert!(selections.is_empty());
        selections.insert(selection("http://example.com/app", "x"));
        assert_eq!(selections.main().unwrap().id, "x");
        assert_eq!(selections.len(), 1);
        assert!(selections
            .candidates_for(&FeedUri::parse("http://example.com/other").unwrap())
            .is_empty());
    }
}
