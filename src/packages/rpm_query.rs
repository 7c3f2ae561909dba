// src/packages/rpm_query.rs

//! Query installed RPM packages from the system database
//!
//! Uses the `rpm` command-line tool. The release is reported separately
//! from the version, so versions returned here carry no revision.

use crate::error::{Error, Result};
use crate::packages::common::InstalledPackage;
use std::process::Command;
use tracing::debug;

/// Distribution family name feeds use for RPM-based systems
pub const DISTRIBUTION: &str = "RPM";

/// Whether `rpm` is on the PATH
pub fn is_available() -> bool {
    which::which("rpm").is_ok()
}

/// Query every installed instance of a package
pub fn query_installed(name: &str) -> Result<Vec<InstalledPackage>> {
    debug!("Querying rpm for package: {}", name);

    // Format: NAME|EPOCH|VERSION|ARCH
    let output = Command::new("rpm")
        .args([
            "-q",
            "--queryformat",
            "%{NAME}|%{EPOCH}|%{VERSION}|%{ARCH}\n",
            "--",
            name,
        ])
        .output()?;

    if !output.status.success() {
        return Err(Error::NotFound(format!(
            "Package '{}' not found in RPM database",
            name
        )));
    }

    let packages = parse_output(&String::from_utf8_lossy(&output.stdout));
    debug!("rpm reports {} installed instance(s) of {}", packages.len(), name);
    Ok(packages)
}

/// Parse `rpm -q --queryformat` output
pub fn parse_output(output: &str) -> Vec<InstalledPackage> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.trim().split('|').collect();
            if parts.len() < 4 || parts[2].is_empty() {
                return None;
            }
            let version = match parts[1] {
                "(none)" | "" | "0" => parts[2].to_string(),
                epoch => format!("{}:{}", epoch, parts[2]),
            };
            Some(InstalledPackage {
                name: parts[0].to_string(),
                version,
                arch: parts[3].to_string(),
            })
        })
        .collect()
}
