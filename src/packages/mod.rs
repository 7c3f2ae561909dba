// src/packages/mod.rs

//! Bridge to the host package manager
//!
//! Feeds may contain package-implementation placeholders naming a native
//! package. The [`PackageManager`] answers such a placeholder with whatever
//! is actually installed, and the results join the candidate list as
//! implementations owned by a `distribution:`-prefixed feed.

mod common;
pub mod dpkg_query;
pub mod pacman_query;
pub mod rpm_query;

pub use common::{cleanup_distro_version, is_valid_package_name, map_host_arch, InstalledPackage};

use crate::arch::{Architecture, Os};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::model::{
    ExternalPackage, FeedUri, Implementation, PackageImplementation, Retrieval, Stability,
};
use crate::version::ImplementationVersion;
use std::path::PathBuf;
use tracing::{debug, warn};

/// An implementation installed and managed by the host package manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalImplementation {
    /// Distribution family, e.g. `Debian`
    pub distribution: String,
    pub package: String,
    pub version: ImplementationVersion,
    pub arch: Architecture,
    pub languages: Vec<String>,
    pub quick_test_file: Option<PathBuf>,
}

impl ExternalImplementation {
    pub fn new(
        distribution: impl Into<String>,
        package: impl Into<String>,
        version: ImplementationVersion,
    ) -> Self {
        Self {
            distribution: distribution.into(),
            package: package.into(),
            version,
            arch: Architecture::any(),
            languages: Vec::new(),
            quick_test_file: None,
        }
    }

    /// Stable ID: `package:<distribution>:<package>:<version>:<arch>`
    pub fn id(&self) -> String {
        format!(
            "package:{}:{}:{}:{}",
            self.distribution.to_lowercase(),
            self.package,
            self.version,
            self.arch.cpu
        )
    }

    /// Synthetic implementation carrying the placeholder's commands and dependencies
    pub fn to_implementation(&self, placeholder: &PackageImplementation) -> Implementation {
        let mut implementation = Implementation::new(self.id(), self.version.clone());
        implementation.arch = self.arch;
        implementation.stability = Stability::Packaged;
        implementation.languages = self.languages.clone();
        implementation.commands = placeholder.commands.clone();
        implementation.dependencies = placeholder.dependencies.clone();
        implementation.retrieval = Retrieval::Distribution(ExternalPackage {
            distribution: self.distribution.clone(),
            package: self.package.clone(),
            quick_test_file: self.quick_test_file.clone(),
        });
        implementation
    }
}

/// Feed identity under which a feed's native packages are reported
pub fn distribution_feed(feed: &FeedUri) -> FeedUri {
    feed.with_distribution_prefix()
}

/// Answers package-implementation placeholders with installed packages
///
/// Absence of a package manager or package is not an error: the result is
/// simply empty. Only cancellation is reported as a failure.
pub trait PackageManager: Send + Sync {
    fn query(
        &self,
        package: &PackageImplementation,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExternalImplementation>>;
}

/// Package manager backends the host may provide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Dpkg,
    Rpm,
    Pacman,
}

impl Backend {
    /// Distribution family name used in feeds
    pub fn distribution(self) -> &'static str {
        match self {
            Backend::Dpkg => dpkg_query::DISTRIBUTION,
            Backend::Rpm => rpm_query::DISTRIBUTION,
            Backend::Pacman => pacman_query::DISTRIBUTION,
        }
    }

    fn is_available(self) -> bool {
        match self {
            Backend::Dpkg => dpkg_query::is_available(),
            Backend::Rpm => rpm_query::is_available(),
            Backend::Pacman => pacman_query::is_available(),
        }
    }

    fn query_installed(self, name: &str) -> Result<Vec<InstalledPackage>> {
        match self {
            Backend::Dpkg => dpkg_query::query_installed(name),
            Backend::Rpm => rpm_query::query_installed(name),
            Backend::Pacman => pacman_query::query_installed(name),
        }
    }

    /// Whether reported versions still carry a packaging revision
    fn has_revision(self) -> bool {
        !matches!(self, Backend::Rpm)
    }
}

/// Package manager of the running system
#[derive(Debug, Clone)]
pub struct HostPackageManager {
    backend: Option<Backend>,
}

impl HostPackageManager {
    /// Detect the first available backend
    pub fn detect() -> Self {
        let backend = [Backend::Dpkg, Backend::Rpm, Backend::Pacman]
            .into_iter()
            .find(|b| b.is_available());
        match backend {
            Some(b) => debug!("Using {} package manager", b.distribution()),
            None => debug!("No supported host package manager found"),
        }
        Self { backend }
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn backend(&self) -> Option<Backend> {
        self.backend
    }

    fn convert(&self, backend: Backend, installed: InstalledPackage) -> Option<ExternalImplementation> {
        let Some(version) = cleanup_distro_version(&installed.version, backend.has_revision()) else {
            debug!(
                "Skipping {} {}: unparsable version",
                installed.name, installed.version
            );
            return None;
        };
        let Some(arch) = map_host_arch(&installed.arch, Os::Linux) else {
            debug!(
                "Skipping {} {}: unknown architecture {}",
                installed.name, installed.version, installed.arch
            );
            return None;
        };
        let mut external = ExternalImplementation::new(backend.distribution(), installed.name, version);
        external.arch = arch;
        Some(external)
    }
}

impl PackageManager for HostPackageManager {
    fn query(
        &self,
        package: &PackageImplementation,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExternalImplementation>> {
        cancel.check()?;
        let Some(backend) = self.backend else {
            return Ok(Vec::new());
        };
        if !package.applies_to(backend.distribution()) {
            return Ok(Vec::new());
        }
        if !is_valid_package_name(&package.package) {
            warn!("Ignoring invalid package name {:?}", package.package);
            return Ok(Vec::new());
        }

        let installed = match backend.query_installed(&package.package) {
            Ok(installed) => installed,
            Err(Error::NotFound(msg)) => {
                debug!("{}", msg);
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!("Querying {} for {} failed: {}", backend.distribution(), package.package, e);
                return Ok(Vec::new());
            }
        };
        cancel.check()?;

        Ok(installed
            .into_iter()
            .filter_map(|p| self.convert(backend, p))
            .collect())
    }
}

/// Package manager that never finds anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPackageManager;

impl PackageManager for NullPackageManager {
    fn query(
        &self,
        _package: &PackageImplementation,
        cancel: &CancellationToken,
    ) -> Result<Vec<ExternalImplementation>> {
        cancel.check()?;
        Ok(Vec::new())
    }
}
