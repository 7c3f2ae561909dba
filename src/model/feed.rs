// src/model/feed.rs

//! Parsed feed documents
//!
//! A feed lists implementations of one interface, plus references to
//! sub-feeds that may hold more. Feeds are stored as JSON:
//!
//! ```json
//! {
//!   "uri": "http://example.com/editor.json",
//!   "name": "Editor",
//!   "elements": [
//!     { "type": "implementation", "id": "sha256=ab12", "version": "1.2",
//!       "arch": "Linux-x86_64", "stability": "stable",
//!       "commands": { "run": { "path": "bin/editor" } },
//!       "retrieval": { "archives": [ { "href": "http://example.com/editor-1.2.tgz", "size": 1024 } ] } },
//!     { "type": "package-implementation", "package": "editor", "distributions": ["Debian"] }
//!   ],
//!   "feeds": [ { "source": "http://example.com/editor-arm.json", "arch": "Linux-aarch64" } ]
//! }
//! ```

use crate::arch::Architecture;
use crate::error::Result;
use crate::model::{FeedUri, Requirements, Stability};
use crate::store::ManifestDigest;
use crate::version::{Constraint, ImplementationVersion};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A feed document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feed {
    /// Canonical identity; absent for purely local feeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<FeedUri>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Sub-feeds offering more implementations of the same interface
    #[serde(default)]
    pub feeds: Vec<FeedReference>,
}

impl Feed {
    /// Parse a feed from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a feed from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the feed as JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn implementations(&self) -> impl Iterator<Item = &Implementation> {
        self.elements.iter().filter_map(|e| match e {
            Element::Implementation(imp) => Some(imp),
            Element::PackageImplementation(_) => None,
        })
    }

    pub fn package_implementations(&self) -> impl Iterator<Item = &PackageImplementation> {
        self.elements.iter().filter_map(|e| match e {
            Element::PackageImplementation(pkg) => Some(pkg),
            Element::Implementation(_) => None,
        })
    }

    /// Find an implementation by ID
    pub fn find_implementation(&self, id: &str) -> Option<&Implementation> {
        self.implementations().find(|imp| imp.id == id)
    }
}

/// One entry in a feed's element list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Element {
    Implementation(Implementation),
    /// Placeholder resolved by querying the host package manager
    PackageImplementation(PackageImplementation),
}

/// A concrete, versioned implementation of an interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Implementation {
    pub id: String,
    pub version: ImplementationVersion,
    #[serde(default)]
    pub arch: Architecture,
    #[serde(default)]
    pub stability: Stability,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub digests: Vec<ManifestDigest>,
    #[serde(default)]
    pub retrieval: Retrieval,
}

impl Implementation {
    /// A minimal implementation, mostly useful when building feeds in code
    pub fn new(id: impl Into<String>, version: ImplementationVersion) -> Self {
        Self {
            id: id.into(),
            version,
            arch: Architecture::any(),
            stability: Stability::default(),
            languages: Vec::new(),
            dependencies: Vec::new(),
            commands: BTreeMap::new(),
            digests: Vec::new(),
            retrieval: Retrieval::default(),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match &self.retrieval {
            Retrieval::LocalPath(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.retrieval, Retrieval::Distribution(_))
    }

    /// Dependencies of the implementation plus those of one command
    pub fn dependencies_for(&self, command: Option<&str>) -> Vec<&Dependency> {
        let mut deps: Vec<&Dependency> = self.dependencies.iter().collect();
        if let Some(cmd) = command.and_then(|name| self.commands.get(name)) {
            deps.extend(cmd.dependencies.iter());
        }
        deps
    }
}

/// How an implementation's files are obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Retrieval {
    /// Downloadable archives (possibly none)
    Archives(Vec<Archive>),
    /// Already unpacked at a local path
    LocalPath(PathBuf),
    /// Managed by the host package manager
    Distribution(ExternalPackage),
}

impl Default for Retrieval {
    fn default() -> Self {
        Retrieval::Archives(Vec::new())
    }
}

/// A downloadable archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Archive {
    pub href: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
    #[serde(rename = "mime-type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Marker for implementations installed by the host package manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPackage {
    /// Distribution family, e.g. `Debian`, `RPM`, `Arch`
    pub distribution: String,
    pub package: String,
    /// File whose presence shows the package is still installed
    #[serde(rename = "quick-test-file", default, skip_serializing_if = "Option::is_none")]
    pub quick_test_file: Option<PathBuf>,
}

/// A placeholder asking the host package manager for implementations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageImplementation {
    pub package: String,
    /// Distribution families this package name applies to; empty means all
    #[serde(default)]
    pub distributions: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub commands: BTreeMap<String, Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

impl PackageImplementation {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            distributions: Vec::new(),
            commands: BTreeMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Whether this placeholder applies to a distribution family
    pub fn applies_to(&self, distribution: &str) -> bool {
        self.distributions.is_empty()
            || self
                .distributions
                .iter()
                .any(|d| d.eq_ignore_ascii_case(distribution))
    }
}

/// A named entry point into an implementation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
}

/// How badly an implementation needs a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Essential,
    /// Used when available; an unsatisfiable one is skipped
    Recommended,
}

/// A dependency on another interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub interface: FeedUri,
    #[serde(default)]
    pub importance: Importance,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Dependency {
    pub fn new(interface: FeedUri) -> Self {
        Self {
            interface,
            importance: Importance::Essential,
            constraints: Vec::new(),
        }
    }

    /// Nested requirements for the depended-on interface
    pub fn requirements(&self, parent: &Requirements) -> Requirements {
        let mut reqs = Requirements::for_dependency(self.interface.clone(), parent.architecture);
        reqs.constraints = self.constraints.clone();
        reqs.languages = parent.languages.clone();
        reqs.extra_restrictions = parent.extra_restrictions.clone();
        reqs
    }
}

/// Reference from one feed to another offering the same interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedReference {
    pub source: FeedUri,
    #[serde(default)]
    pub arch: Architecture,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl FeedReference {
    pub fn new(source: FeedUri) -> Self {
        Self {
            source,
            arch: Architecture::any(),
            languages: Vec::new(),
        }
    }
}
