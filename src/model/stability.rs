// src/model/stability.rs

//! Maturity ratings for implementations

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// How mature an implementation is considered
///
/// Ordered from least to most trusted, so `Ord` ranks candidates directly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    /// Known security problems; never chosen
    Insecure,
    /// Known bugs; never chosen
    Buggy,
    Developer,
    #[default]
    Testing,
    Stable,
    /// Provided by the host package manager
    Packaged,
    /// Explicitly preferred by the user
    Preferred,
}

impl Stability {
    /// Ratings that rule an implementation out regardless of policy
    pub fn is_blacklisted(self) -> bool {
        matches!(self, Stability::Insecure | Stability::Buggy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ordering() {
        assert!(Stability::Insecure < Stability::Buggy);
        assert!(Stability::Buggy < Stability::Developer);
        assert!(Stability::Developer < Stability::Testing);
        assert!(Stability::Testing < Stability::Stable);
        assert!(Stability::Stable < Stability::Packaged);
        assert!(Stability::Packaged < Stability::Preferred);
    }

    #[test]
    fn test_string_roundtrip() {
        for s in ["insecure", "buggy", "developer", "testing", "stable", "packaged", "preferred"] {
            let stability = Stability::from_str(s).unwrap();
            assert_eq!(stability.to_string(), s);
        }
        assert!(Stability::from_str("rock-solid").is_err());
    }

    #[test]
    fn test_blacklisted() {
        assert!(Stability::Buggy.is_blacklisted());
        assert!(Stability::Insecure.is_blacklisted());
        assert!(!Stability::Developer.is_blacklisted());
    }

    #[test]
    fn test_default_is_testing() {
        assert_eq!(Stability::default(), Stability::Testing);
    }
}
