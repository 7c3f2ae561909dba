// src/model/uri.rs

//! Feed and interface identities
//!
//! An identity is either an HTTP(S) URL, an absolute local path, or a
//! `distribution:`-prefixed identity naming results bridged from the host
//! package manager.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

/// Reserved prefix for feeds synthesized from the host package manager
pub const DISTRIBUTION_PREFIX: &str = "distribution:";

/// Stable identity of a feed or interface
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedUri(String);

impl FeedUri {
    /// Parse and validate an identity string
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if let Some(inner) = s.strip_prefix(DISTRIBUTION_PREFIX) {
            if inner.starts_with(DISTRIBUTION_PREFIX) {
                return Err(Error::InvalidFeedUri(format!(
                    "Nested distribution prefix in '{}'",
                    s
                )));
            }
            Self::parse(inner)?;
            return Ok(Self(s.to_string()));
        }

        if s.starts_with("http://") || s.starts_with("https://") {
            let url = Url::parse(s)
                .map_err(|e| Error::InvalidFeedUri(format!("'{}': {}", s, e)))?;
            if url.host_str().is_none() {
                return Err(Error::InvalidFeedUri(format!("'{}' has no host", s)));
            }
            return Ok(Self(s.to_string()));
        }

        if s.starts_with("file://") {
            let path = Url::parse(s)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| Error::InvalidFeedUri(format!("'{}' is not a file path", s)))?;
            return Self::from_path(&path);
        }

        if Path::new(s).is_absolute() {
            return Ok(Self(s.to_string()));
        }

        Err(Error::InvalidFeedUri(format!(
            "'{}' is neither an HTTP(S) URL nor an absolute path",
            s
        )))
    }

    /// Identity for a local feed file
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_absolute() {
            return Err(Error::InvalidFeedUri(format!(
                "Local feed path '{}' must be absolute",
                path.display()
            )));
        }
        Ok(Self(path.to_string_lossy().into_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_distribution(&self) -> bool {
        self.0.starts_with(DISTRIBUTION_PREFIX)
    }

    /// Whether this names a file on the local filesystem
    pub fn is_local(&self) -> bool {
        !self.is_distribution() && Path::new(&self.0).is_absolute()
    }

    pub fn local_path(&self) -> Option<PathBuf> {
        self.is_local().then(|| PathBuf::from(&self.0))
    }

    /// The `distribution:`-prefixed form of this identity
    pub fn with_distribution_prefix(&self) -> FeedUri {
        if self.is_distribution() {
            self.clone()
        } else {
            Self(format!("{}{}", DISTRIBUTION_PREFIX, self.0))
        }
    }

    /// The identity behind a `distribution:` prefix, if present
    pub fn strip_distribution_prefix(&self) -> Option<FeedUri> {
        self.0
            .strip_prefix(DISTRIBUTION_PREFIX)
            .map(|inner| Self(inner.to_string()))
    }

    /// Collision-free escape usable as a single file name
    pub fn escape(&self) -> String {
        escape_component(&self.0)
    }

    /// Escaped path components: scheme, host and path segments
    ///
    /// `http://example.com:8080/a/b.json` becomes
    /// `["http", "example.com%3a8080", "a", "b.json"]`.
    pub fn escape_components(&self) -> Vec<String> {
        if let Some(inner) = self.strip_distribution_prefix() {
            let mut components = vec!["distribution".to_string()];
            components.extend(inner.escape_components());
            return components;
        }

        if self.is_local() {
            let mut components = vec!["file".to_string()];
            components.extend(
                Path::new(&self.0)
                    .components()
                    .filter_map(|c| match c {
                        std::path::Component::Normal(part) => {
                            Some(escape_component(&part.to_string_lossy()))
                        }
                        _ => None,
                    }),
            );
            return components;
        }

        match Url::parse(&self.0) {
            Ok(url) => {
                let mut components = vec![url.scheme().to_string()];
                let host = match (url.host_str(), url.port()) {
                    (Some(host), Some(port)) => format!("{}:{}", host, port),
                    (Some(host), None) => host.to_string(),
                    (None, _) => String::new(),
                };
                components.push(escape_component(&host));
                if let Some(segments) = url.path_segments() {
                    components.extend(
                        segments
                            .filter(|s| !s.is_empty())
                            .map(escape_component),
                    );
                }
                components
            }
            Err(_) => vec![self.escape()],
        }
    }
}

/// Escape everything but `[A-Za-z0-9_-]` and non-leading dots as `%xx`
pub fn escape_component(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for (i, byte) in s.bytes().enumerate() {
        let keep = byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' || (byte == b'.' && i > 0);
        if keep {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{:02x}", byte));
        }
    }
    escaped
}

impl fmt::Display for FeedUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FeedUri {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FeedUri {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<FeedUri> for String {
    fn from(uri: FeedUri) -> Self {
        uri.0
    }
}

impl AsRef<str> for FeedUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
