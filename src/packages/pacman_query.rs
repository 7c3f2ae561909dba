// src/packages/pacman_query.rs

//! Query installed pacman packages from the local database

use crate::error::{Error, Result};
use crate::packages::common::InstalledPackage;
use std::process::Command;
use tracing::debug;

/// Distribution family name feeds use for Arch Linux
pub const DISTRIBUTION: &str = "Arch";

/// Whether `pacman` is on the PATH
pub fn is_available() -> bool {
    which::which("pacman").is_ok()
}

/// Query an installed package
pub fn query_installed(name: &str) -> Result<Vec<InstalledPackage>> {
    debug!("Querying pacman for package: {}", name);

    let output = Command::new("pacman").args(["-Qi", "--", name]).output()?;

    if !output.status.success() {
        return Err(Error::NotFound(format!(
            "Package '{}' not found in pacman database",
            name
        )));
    }

    Ok(parse_output(&String::from_utf8_lossy(&output.stdout))
        .into_iter()
        .collect())
}

/// Parse `pacman -Qi` output for one package
pub fn parse_output(output: &str) -> Option<InstalledPackage> {
    let mut name = None;
    let mut version = None;
    let mut arch = String::new();

    for line in output.lines() {
        if let Some((key, value)) = line.split_once(':') {
            let value = value.trim();
            match key.trim() {
                "Name" => name = Some(value.to_string()),
                "Version" => version = Some(value.to_string()),
                "Architecture" => arch = value.to_string(),
                _ => {}
            }
        }
    }

    Some(InstalledPackage {
        name: name?,
        version: version?,
        arch,
    })
}
