// src/version/range.rs

//! Version constraints and their collapsed effective range

use super::ImplementationVersion;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A restriction on acceptable versions
///
/// `not_before` is inclusive, `before` is exclusive. Either may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(rename = "not-before", default, skip_serializing_if = "Option::is_none")]
    pub not_before: Option<ImplementationVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<ImplementationVersion>,
}

impl Constraint {
    pub fn new(
        not_before: Option<ImplementationVersion>,
        before: Option<ImplementationVersion>,
    ) -> Self {
        Self { not_before, before }
    }

    /// Parse range syntax: `1.0..!2.0`, `1.2..`, `..!3`, or `..`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (low, high) = s.split_once("..").ok_or_else(|| {
            Error::ParseError(format!("Version range '{}' is missing '..'", s))
        })?;

        let not_before = if low.is_empty() {
            None
        } else {
            Some(ImplementationVersion::parse(low)?)
        };

        let before = if high.is_empty() {
            None
        } else {
            let upper = high.strip_prefix('!').ok_or_else(|| {
                Error::ParseError(format!("Upper bound in '{}' must start with '!'", s))
            })?;
            Some(ImplementationVersion::parse(upper)?)
        };

        Ok(Self { not_before, before })
    }

    /// Check if a version satisfies this constraint
    pub fn contains(&self, version: &ImplementationVersion) -> bool {
        VersionRange::from(self.clone()).contains(version)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        VersionRange::from(self.clone()).fmt(f)
    }
}

/// The intersection of any number of constraints
///
/// An empty range (lower >= upper) is valid and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionRange {
    pub not_before: Option<ImplementationVersion>,
    pub before: Option<ImplementationVersion>,
}

impl VersionRange {
    /// A range with no bounds
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Collapse constraints: max of lower bounds, min of upper bounds
    pub fn from_constraints<'a, I>(constraints: I) -> Self
    where
        I: IntoIterator<Item = &'a Constraint>,
    {
        constraints
            .into_iter()
            .fold(Self::unbounded(), |range, c| range.intersect(c))
    }

    /// Narrow this range by another constraint
    pub fn intersect(mut self, constraint: &Constraint) -> Self {
        if let Some(ref low) = constraint.not_before {
            match self.not_before {
                Some(ref current) if current >= low => {}
                _ => self.not_before = Some(low.clone()),
            }
        }
        if let Some(ref high) = constraint.before {
            match self.before {
                Some(ref current) if current <= high => {}
                _ => self.before = Some(high.clone()),
            }
        }
        self
    }

    pub fn contains(&self, version: &ImplementationVersion) -> bool {
        if let Some(ref low) = self.not_before {
            if version < low {
                return false;
            }
        }
        if let Some(ref high) = self.before {
            if version >= high {
                return false;
            }
        }
        true
    }

    pub fn is_unbounded(&self) -> bool {
        self.not_before.is_none() && self.before.is_none()
    }

    /// Whether no version can ever satisfy this range
    pub fn is_empty(&self) -> bool {
        matches!((&self.not_before, &self.before), (Some(low), Some(high)) if low >= high)
    }
}

impl From<Constraint> for VersionRange {
    fn from(c: Constraint) -> Self {
        Self {
            not_before: c.not_before,
            before: c.before,
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref low) = self.not_before {
            write!(f, "{}", low)?;
        }
        write!(f, "..")?;
        if let Some(ref high) = self.before {
            write!(f, "!{}", high)?;
        }
        Ok(())
    }
}
