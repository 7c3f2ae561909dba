// src/packages/dpkg_query.rs

//! Query installed dpkg packages from the system database
//!
//! Uses the `dpkg-query` command-line tool. Multi-arch systems may report
//! several architectures of the same package.

use crate::error::{Error, Result};
use crate::packages::common::InstalledPackage;
use std::process::Command;
use tracing::debug;

/// Distribution family name feeds use for dpkg-based systems
pub const DISTRIBUTION: &str = "Debian";

/// Whether `dpkg-query` is on the PATH
pub fn is_available() -> bool {
    which::which("dpkg-query").is_ok()
}

/// Query every installed architecture of a package
pub fn query_installed(name: &str) -> Result<Vec<InstalledPackage>> {
    debug!("Querying dpkg for package: {}", name);

    // Format: Status|Package|Version|Architecture
    let output = Command::new("dpkg-query")
        .args([
            "-W",
            "-f",
            "${Status}|${Package}|${Version}|${Architecture}\n",
            "--",
            name,
        ])
        .output()?;

    if !output.status.success() {
        return Err(Error::NotFound(format!(
            "Package '{}' not found in dpkg database",
            name
        )));
    }

    let packages = parse_output(&String::from_utf8_lossy(&output.stdout));
    debug!("dpkg reports {} installed instance(s) of {}", packages.len(), name);
    Ok(packages)
}

/// Parse `dpkg-query -W` output, keeping only fully installed packages
pub fn parse_output(output: &str) -> Vec<InstalledPackage> {
    output
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.trim().split('|').collect();
            if parts.len() < 4 || !parts[0].ends_with("installed") || parts[0].contains("not-installed") {
                return None;
            }
            Some(InstalledPackage {
                name: parts[1].to_string(),
                version: parts[2].to_string(),
                arch: parts[3].to_string(),
            })
        })
        .collect()
}
