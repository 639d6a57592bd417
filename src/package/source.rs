//! Materialized package source directories.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::{SrcInfo, VersionDescriptor};

/// A package source directory together with its parsed build metadata.
///
/// Created by a [`SourceFetcher`](crate::aur::SourceFetcher); the version
/// of live-source packages is replaced in place by
/// [`VersionProbe`](crate::build::VersionProbe).
#[derive(Debug, Clone, PartialEq)]
pub struct PackageSource {
    pub path: PathBuf,
    pub srcinfo: SrcInfo,
}

impl PackageSource {
    pub fn new(path: PathBuf, srcinfo: SrcInfo) -> Self {
        Self { path, srcinfo }
    }

    /// Load a package source from a directory containing `.SRCINFO`.
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let srcinfo = SrcInfo::load(runtime, path)?;
        Ok(Self::new(path.to_path_buf(), srcinfo))
    }

    /// Source package identity.
    pub fn base(&self) -> &str {
        &self.srcinfo.pkgbase
    }

    /// Names of the binary packages this source produces.
    pub fn names(&self) -> &[String] {
        &self.srcinfo.pkgnames
    }

    pub fn version(&self) -> &VersionDescriptor {
        &self.srcinfo.version
    }

    pub fn is_live_source(&self) -> bool {
        self.srcinfo.is_live_source()
    }

    /// Human readable identity, `base` or `base:(name1, name2)` for split packages.
    pub fn display_name(&self) -> String {
        let names = self.names();
        if names.len() > 1 || names.first().is_some_and(|n| n != self.base()) {
            format!("{}:({})", self.base(), names.join(", "))
        } else {
            self.base().to_string()
        }
    }
}
