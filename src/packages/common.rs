// src/packages/common.rs
//! Normalization shared by the host package manager backends
//!
//! Package managers report versions like `1:2.30-1ubuntu3` or `115.0~b9-1`
//! and architectures like `amd64` or `noarch`. These are mapped onto
//! implementation versions and architectures before anything is ranked.

use crate::arch::{Architecture, Cpu, Os};
use crate::version::ImplementationVersion;
use std::str::FromStr;

/// An installed package as reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    /// Upstream version, possibly with epoch and revision still attached
    pub version: String,
    pub arch: String,
}

/// Turn a distribution version into an implementation version
///
/// The epoch is stripped, the packaging revision (after the last `-`) is
/// dropped when `has_revision` is set, `~` becomes a `-pre` (or `-rc` for
/// `~rc`) modifier and trailing non-numeric noise such as `+dfsg` is cut.
/// Returns `None` if nothing parsable remains.
pub fn cleanup_distro_version(raw: &str, has_revision: bool) -> Option<ImplementationVersion> {
    let mut version = raw.trim();

    if let Some((epoch, rest)) = version.split_once(':') {
        if !epoch.is_empty() && epoch.chars().all(|c| c.is_ascii_digit()) {
            version = rest;
        }
    }

    if has_revision {
        if let Some((upstream, _)) = version.rsplit_once('-') {
            version = upstream;
        }
    }

    let (upstream, tilde) = match version.split_once('~') {
        Some((upstream, suffix)) => (upstream, Some(suffix)),
        None => (version, None),
    };

    let numeric = leading_dotted(upstream);
    if numeric.is_empty() {
        return None;
    }

    let mut cleaned = numeric.to_string();
    if let Some(suffix) = tilde {
        let (modifier, rest) = match suffix.strip_prefix("rc") {
            Some(rest) => ("rc", rest),
            None => ("pre", suffix.trim_start_matches(|c: char| c.is_ascii_alphabetic() || c == '.')),
        };
        cleaned.push('-');
        cleaned.push_str(modifier);
        cleaned.push_str(leading_dotted(rest));
    }

    ImplementationVersion::parse(&cleaned).ok()
}

/// Longest prefix made of dot-separated numbers, without stray dots
fn leading_dotted(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(s.len());
    s[..end].trim_matches('.')
}

/// Whether a package name is safe to hand to a package manager tool
///
/// Names come from feeds. Anything that could be read as an option, or
/// that falls outside the characters distributions use, is refused.
pub fn is_valid_package_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '_' | ':' | '@' | '-'))
}

/// Map a package manager's architecture name onto an architecture for `os`
///
/// Returns `None` for CPU names we don't know.
pub fn map_host_arch(arch: &str, os: Os) -> Option<Architecture> {
    let cpu = match arch {
        "all" | "noarch" | "any" | "" => Cpu::All,
        "amd64" => Cpu::X86_64,
        "arm64" => Cpu::Aarch64,
        "armhf" => Cpu::Armv7l,
        "armel" => Cpu::Armv6l,
        "powerpc" => Cpu::Ppc,
        "ppc64el" | "ppc64le" => Cpu::Ppc64,
        other => Cpu::from_str(other).ok()?,
    };
    Some(Architecture::new(os, cpu))
}
