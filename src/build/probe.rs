//! Version refresh for live-source packages.

use log::info;

use crate::error::BuildError;
use crate::package::{PackageSource, SrcInfo};
use crate::runtime::Runtime;
use crate::tool::BuildTool;

/// Re-derives the version of live-source packages by pulling upstream
/// sources and re-reading the regenerated build metadata.
pub struct VersionProbe<'a, R: Runtime, T: BuildTool> {
    runtime: &'a R,
    tool: &'a T,
}

impl<'a, R: Runtime, T: BuildTool> VersionProbe<'a, R, T> {
    pub fn new(runtime: &'a R, tool: &'a T) -> Self {
        Self { runtime, tool }
    }

    /// Refresh the metadata of a live-source package.
    ///
    /// Packages with a pinned version are returned unchanged. Updates the
    /// source tree on disk to the latest upstream revision.
    pub async fn refresh(&self, mut pkg: PackageSource) -> Result<PackageSource, BuildError> {
        if !pkg.is_live_source() {
            return Ok(pkg);
        }

        info!("Checking for new version of {}", pkg.display_name());

        let refreshed = match self.tool.prepare_source(&pkg.path).await {
            Ok(()) => SrcInfo::load(self.runtime, &pkg.path),
            Err(e) => Err(e),
        };

        pkg.srcinfo = refreshed.map_err(|source| BuildError::VersionRefresh {
            pkgbase: pkg.base().to_string(),
            source,
        })?;
        Ok(pkg)
    }
}
