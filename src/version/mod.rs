// src/version/mod.rs

//! Implementation versions and version constraints
//!
//! Versions are dotted decimal lists separated by dash modifiers:
//! `1.2.3`, `1.0-pre2`, `2.1-rc1`, `1.0-post`, `1.0-3`.
//!
//! Ordering across modifiers is fixed:
//! `1.0-pre1 < 1.0-rc1 < 1.0 < 1.0-1 < 1.0-post1`

mod range;

pub use range::{Constraint, VersionRange};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Release maturity modifier introducing a version part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `-pre`
    Pre,
    /// `-rc`
    Rc,
    /// A bare dash, e.g. packaging revisions like `1.0-2`
    Empty,
    /// `-post`
    Post,
}

impl Modifier {
    /// Rank relative to the end of a version (0)
    fn rank(self) -> i8 {
        match self {
            Modifier::Pre => -2,
            Modifier::Rc => -1,
            Modifier::Empty => 1,
            Modifier::Post => 2,
        }
    }

    fn as_prefix(self) -> &'static str {
        match self {
            Modifier::Pre => "pre",
            Modifier::Rc => "rc",
            Modifier::Empty => "",
            Modifier::Post => "post",
        }
    }
}

/// A version number of an implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImplementationVersion {
    leading: Vec<u64>,
    parts: Vec<(Modifier, Vec<u64>)>,
}

fn parse_dotted(s: &str, original: &str) -> Result<Vec<u64>> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split('.')
        .map(|n| {
            n.parse::<u64>().map_err(|_| {
                Error::ParseError(format!("Invalid version segment '{}' in '{}'", n, original))
            })
        })
        .collect()
}

fn format_dotted(numbers: &[u64]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

impl ImplementationVersion {
    /// Parse a version string such as `1.2-rc3-post1`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let mut pieces = s.split('-');

        let first = pieces.next().unwrap_or_default();
        if first.is_empty() {
            return Err(Error::ParseError(format!(
                "Version '{}' must start with a number",
                s
            )));
        }
        let leading = parse_dotted(first, s)?;

        let mut parts = Vec::new();
        for piece in pieces {
            let (modifier, rest) = if let Some(rest) = piece.strip_prefix("pre") {
                (Modifier::Pre, rest)
            } else if let Some(rest) = piece.strip_prefix("rc") {
                (Modifier::Rc, rest)
            } else if let Some(rest) = piece.strip_prefix("post") {
                (Modifier::Post, rest)
            } else {
                (Modifier::Empty, piece)
            };
            parts.push((modifier, parse_dotted(rest, s)?));
        }

        Ok(Self { leading, parts })
    }

    /// Build a plain dotted version from numbers
    pub fn from_numbers(numbers: &[u64]) -> Self {
        Self {
            leading: numbers.to_vec(),
            parts: Vec::new(),
        }
    }

    /// Whether any part carries a `pre` or `rc` modifier
    pub fn is_prerelease(&self) -> bool {
        self.parts
            .iter()
            .any(|(m, _)| matches!(m, Modifier::Pre | Modifier::Rc))
    }

    /// The leading dotted numbers
    pub fn leading(&self) -> &[u64] {
        &self.leading
    }
}

impl Ord for ImplementationVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.leading.cmp(&other.leading) {
            Ordering::Equal => {}
            ord => return ord,
        }

        let len = self.parts.len().max(other.parts.len());
        for i in 0..len {
            // A missing part is the end of the version, rank 0
            let (rank_a, nums_a) = self
                .parts
                .get(i)
                .map(|(m, n)| (m.rank(), n.as_slice()))
                .unwrap_or((0, &[]));
            let (rank_b, nums_b) = other
                .parts
                .get(i)
                .map(|(m, n)| (m.rank(), n.as_slice()))
                .unwrap_or((0, &[]));

            match rank_a.cmp(&rank_b).then_with(|| nums_a.cmp(nums_b)) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for ImplementationVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ImplementationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_dotted(&self.leading))?;
        for (modifier, numbers) in &self.parts {
            write!(f, "-{}{}", modifier.as_prefix(), format_dotted(numbers))?;
        }
        Ok(())
    }
}

impl FromStr for ImplementationVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ImplementationVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<ImplementationVersion> for String {
    fn from(v: ImplementationVersion) -> Self {
        v.to_string()
    }
}
