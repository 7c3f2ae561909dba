// src/store/mod.rs

//! Content-addressed implementation store
//!
//! Installed implementations live in directories named after their manifest
//! digest, e.g. `<root>/sha256_<hex>`. Only presence checks and manifest
//! digest verification happen here; unpacking and manifest generation are
//! handled elsewhere.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};
use tracing::{debug, warn};

/// Name of the manifest file inside an implementation directory
pub const MANIFEST_FILE: &str = ".manifest";

/// Digest algorithms recognized in feeds
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    /// SHA-256 over the manifest, hex encoded
    Sha256,
    /// SHA-256 over the manifest, base32 encoded
    Sha256New,
    /// SHA-1 over the manifest
    Sha1New,
}

/// A digest identifying an implementation's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManifestDigest {
    pub algorithm: DigestAlgorithm,
    pub value: String,
}

impl ManifestDigest {
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<String>) -> Self {
        Self {
            algorithm,
            value: value.into(),
        }
    }

    /// SHA-256 digest of manifest bytes
    pub fn sha256_of(manifest: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(manifest);
        Self::new(DigestAlgorithm::Sha256, hex::encode(hasher.finalize()))
    }

    /// Directory name of this implementation inside a store root
    pub fn dir_name(&self) -> String {
        format!("{}_{}", self.algorithm, self.value)
    }
}

impl fmt::Display for ManifestDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name())
    }
}

/// Read-only view of installed implementations
pub trait ImplementationStore: Send + Sync {
    /// Whether an implementation with this digest is present
    fn contains(&self, digest: &ManifestDigest) -> bool;

    /// Whether any of the given digests is present
    fn contains_any(&self, digests: &[ManifestDigest]) -> bool {
        digests.iter().any(|d| self.contains(d))
    }
}

/// Store backed by one or more directories on disk
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    roots: Vec<PathBuf>,
}

impl DirectoryStore {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Locate the directory holding an implementation
    pub fn path_of(&self, digest: &ManifestDigest) -> Option<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(digest.dir_name()))
            .find(|path| path.is_dir())
    }

    /// Check an installed implementation's manifest against its digest
    ///
    /// Only `sha256` digests can be recomputed here.
    pub fn verify(&self, digest: &ManifestDigest) -> Result<()> {
        let dir = self
            .path_of(digest)
            .ok_or_else(|| Error::NotFound(format!("Implementation {} is not in the store", digest)))?;

        if digest.algorithm != DigestAlgorithm::Sha256 {
            return Err(Error::ParseError(format!(
                "Cannot verify {} digests",
                digest.algorithm
            )));
        }

        let manifest = fs::read(dir.join(MANIFEST_FILE))?;
        let actual = ManifestDigest::sha256_of(&manifest);
        if actual.value != digest.value {
            warn!("Manifest digest mismatch in {}: got {}", dir.display(), actual.value);
            return Err(Error::ParseError(format!(
                "Manifest of {} does not match: expected {}, got {}",
                dir.display(),
                digest.value,
                actual.value
            )));
        }

        debug!("Verified {}", digest);
        Ok(())
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ImplementationStore for DirectoryStore {
    fn contains(&self, digest: &ManifestDigest) -> bool {
        self.path_of(digest).is_some()
    }
}

/// Store that never contains anything
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyStore;

impl ImplementationStore for EmptyStore {
    fn contains(&self, _digest: &ManifestDigest) -> bool {
        false
    }
}

/// Write a manifest and return its digest directory (for tests and tooling)
pub fn install_manifest(root: &Path, manifest: &[u8]) -> Result<ManifestDigest> {
    let digest = ManifestDigest::sha256_of(manifest);
    let dir = root.join(digest.dir_name());
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(MANIFEST_FILE), manifest)?;
    Ok(digest)
}
