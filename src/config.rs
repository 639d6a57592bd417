use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::{
    aur::{AurClient, AurFetcher, DEFAULT_AUR_URL},
    build::{BuildOrchestrator, BuildOutcome},
    error::BuildError,
    http::HttpClient,
    repo::LocalRepository,
    runtime::Runtime,
    tool::{EnvOverride, Makepkg},
};

/// Directory name below the user cache directory used as default workdir.
const WORKDIR_NAME: &str = "repobuild";

/// Settings of a build run together with the real collaborators.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub aur: AurClient,
    pub tool: Makepkg,
    pub workdir: PathBuf,
    pub repo_db: PathBuf,
    pub packager: Option<String>,
}

impl<R: Runtime> Config<R> {
    pub fn new(
        runtime: R,
        workdir: Option<PathBuf>,
        repo_db: PathBuf,
        packager: Option<String>,
        aur_url: Option<String>,
    ) -> Result<Self> {
        let workdir = match workdir {
            Some(dir) => dir,
            None => runtime
                .cache_dir()
                .map(|dir| dir.join(WORKDIR_NAME))
                .context("Could not determine a default working directory, use --workdir")?,
        };
        debug!("Using working directory {:?}", workdir);

        let packager = packager
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());

        let aur_url = aur_url.unwrap_or_else(|| DEFAULT_AUR_URL.to_string());
        let aur = AurClient::new(HttpClient::with_user_agent()?, aur_url);

        Ok(Self {
            runtime,
            aur,
            tool: Makepkg::new(),
            workdir,
            repo_db,
            packager,
        })
    }

    /// Environment passed to every package build.
    pub fn env_overrides(&self) -> Vec<EnvOverride> {
        self.packager
            .iter()
            .map(|identity| EnvOverride::packager(identity.as_str()))
            .collect()
    }

    /// Build `names` and their AUR dependencies that are outdated in the
    /// configured repository.
    pub async fn build(&self, names: &[String]) -> Result<BuildOutcome, BuildError> {
        let repo = LocalRepository::new(&self.runtime, self.repo_db.clone());
        let fetcher = AurFetcher::new(&self.runtime, self.aur.clone(), self.workdir.clone());

        BuildOrchestrator::new(&self.runtime, &self.tool, &repo, self.workdir.clone())
            .with_env(self.env_overrides())
            .build_new(names, &fetcher)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;

    fn config(
        runtime: MockRuntime,
        workdir: Option<&str>,
        packager: Option<&str>,
    ) -> Result<Config<MockRuntime>> {
        Config::new(
            runtime,
            workdir.map(PathBuf::from),
            PathBuf::from("/srv/repo/custom.db.tar.gz"),
            packager.map(String::from),
            None,
        )
    }

    #[test]
    fn test_default_workdir_under_cache_dir() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_cache_dir()
            .returning(|| Some(PathBuf::from("/home/user/.cache")));

        let config = config(runtime, None, None).unwrap();
        assert_eq!(config.workdir, PathBuf::from("/home/user/.cache/repobuild"));
        assert_eq!(config.aur.base_url(), DEFAULT_AUR_URL);
    }

    #[test]
    fn test_explicit_workdir_skips_cache_dir() {
        let mut runtime = MockRuntime::new();
        runtime.expect_cache_dir().never();

        let config = config(runtime, Some("/var/tmp/builds"), None).unwrap();
        assert_eq!(config.workdir, PathBuf::from("/var/tmp/builds"));
    }

    #[test]
    fn test_missing_cache_dir_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_cache_dir().returning(|| None);

        let err = config(runtime, None, None).err().unwrap();
        assert!(err.to_string().contains("--workdir"));
    }

    #[test]
    fn test_packager_becomes_env_override() {
        let config = config(
            MockRuntime::new(),
            Some("/w"),
            Some("Jane Doe <jane@example.com>"),
        )
        .unwrap();
        assert_eq!(
            config.env_overrides(),
            vec![EnvOverride::new("PACKAGER", "Jane Doe <jane@example.com>")]
        );
    }

    #[test]
    fn test_blank_packager_is_ignored() {
        let config = config(MockRuntime::new(), Some("/w"), Some("  ")).unwrap();
        assert_eq!(config.packager, None);
        assert!(config.env_overrides().is_empty());
    }

    #[test]
    fn test_custom_aur_url() {
        let config = Config::new(
            MockRuntime::new(),
            Some(PathBuf::from("/w")),
            PathBuf::from("/srv/repo/custom.db.tar.gz"),
            None,
            Some("http://localhost:8080/".into()),
        )
        .unwrap();
        assert_eq!(config.aur.base_url(), "http://localhost:8080");
    }
}
