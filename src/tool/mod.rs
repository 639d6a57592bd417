//! Build tool capability.
//!
//! Every interaction with the external build toolchain goes through
//! [`BuildTool`], so the orchestration logic can run against a fake.

mod makepkg;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

pub use makepkg::Makepkg;

/// Environment variable naming the acting packager.
pub const PACKAGER_VAR: &str = "PACKAGER";

/// An environment variable injected into the build subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvOverride {
    pub key: String,
    pub value: String,
}

impl EnvOverride {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `PACKAGER=<identity>`.
    pub fn packager(identity: impl Into<String>) -> Self {
        Self::new(PACKAGER_VAR, identity)
    }
}

/// Operations the orchestrator needs from the build toolchain.
///
/// Each call blocks the run until the underlying tool exits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BuildTool: Send + Sync {
    /// Upgrade the system the builds run against.
    async fn refresh_environment(&self) -> Result<()>;

    /// Fetch and prepare sources without building, then regenerate the
    /// build-metadata file inside `dir`.
    async fn prepare_source(&self, dir: &Path) -> Result<()>;

    /// Build and install the package in `dir`, pulling in missing
    /// dependencies without prompting.
    async fn build_and_install(&self, dir: &Path, env: &[EnvOverride]) -> Result<()>;
}
