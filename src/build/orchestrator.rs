//! End-to-end build run.

use log::info;
use std::path::PathBuf;

use crate::aur::SourceFetcher;
use crate::error::BuildError;
use crate::repo::ReferenceRepository;
use crate::runtime::Runtime;
use crate::tool::{BuildTool, EnvOverride};

use super::{ArtifactHarvester, BuildOutcome, BuildReport, RunLock, StalenessResolver, VersionProbe};

/// Drives a build run: environment refresh, source fetch, staleness
/// resolution, then build and harvest of every outdated package.
///
/// Packages are processed strictly one after another. The first failure ends
/// the run; artifacts already produced stay on disk but are not reported.
pub struct BuildOrchestrator<'a, R: Runtime, T: BuildTool> {
    runtime: &'a R,
    tool: &'a T,
    repo: &'a dyn ReferenceRepository,
    workdir: PathBuf,
    env: Vec<EnvOverride>,
}

impl<'a, R: Runtime, T: BuildTool> BuildOrchestrator<'a, R, T> {
    pub fn new(
        runtime: &'a R,
        tool: &'a T,
        repo: &'a dyn ReferenceRepository,
        workdir: PathBuf,
    ) -> Self {
        Self {
            runtime,
            tool,
            repo,
            workdir,
            env: vec![],
        }
    }

    /// Environment variables passed to every package build.
    pub fn with_env(mut self, env: Vec<EnvOverride>) -> Self {
        self.env = env;
        self
    }

    /// Build every package in `requested`, plus build dependencies, that is
    /// missing from or outdated in the reference repository.
    ///
    /// Holds the working directory lock for the whole run.
    pub async fn build_new(
        &self,
        requested: &[String],
        fetcher: &dyn SourceFetcher,
    ) -> Result<BuildOutcome, BuildError> {
        let _lock = RunLock::acquire(&self.workdir)?;

        info!("Updating packages");
        self.tool
            .refresh_environment()
            .await
            .map_err(BuildError::Environment)?;

        info!(
            "Fetching build sources+dependencies for {}",
            requested.join(", ")
        );
        let sources = fetcher.get(requested).await.map_err(BuildError::Fetch)?;

        let resolver = StalenessResolver::new(VersionProbe::new(self.runtime, self.tool));
        let outdated = resolver.resolve(sources, self.repo).await?;
        if outdated.is_empty() {
            info!("All packages up to date, nothing to build");
            return Ok(BuildOutcome::UpToDate);
        }

        let harvester = ArtifactHarvester::new(self.runtime);
        let mut artifacts = Vec::new();
        for pkg in &outdated {
            info!("Building package {}", pkg.display_name());
            self.tool
                .build_and_install(&pkg.path, &self.env)
                .await
                .map_err(|source| BuildError::Build {
                    pkgbase: pkg.base().to_string(),
                    source,
                })?;

            let built = harvester
                .harvest(&pkg.path)
                .map_err(|source| BuildError::Harvest {
                    pkgbase: pkg.base().to_string(),
                    path: pkg.path.clone(),
                    source,
                })?;
            artifacts.extend(built);
        }

        let report = BuildReport::new(artifacts);
        info!("{}", report);
        Ok(BuildOutcome::Built(report))
    }
}
