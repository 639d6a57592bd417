//! Reference repository used as the staleness oracle.

mod database;

use anyhow::Result;
use async_trait::async_trait;

use crate::package::PackageSource;

pub use database::LocalRepository;

/// Authoritative store of currently published package versions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRepository: Send + Sync {
    /// Return the subset of `pkgs` that is newer than, or absent from, the
    /// repository's current holdings.
    async fn get_updated(&self, pkgs: &[PackageSource]) -> Result<Vec<PackageSource>>;
}
