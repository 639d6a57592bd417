//! Package source fetching from the AUR.
//!
//! [`AurFetcher`] resolves requested names and their AUR-hosted build
//! dependencies, downloads one snapshot per package base and materializes
//! it as a [`PackageSource`] under the working directory.

mod rpc;
mod snapshot;

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::{Component, Path, PathBuf};

use crate::package::{PackageSource, strip_constraint};
use crate::runtime::Runtime;

pub use rpc::{AurClient, AurPackage, DEFAULT_AUR_URL};
pub use snapshot::unpack_snapshot;

/// Materializes package sources for requested names.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Resolve `names` plus their transitive build dependencies into package
    /// sources, dependencies first.
    async fn get(&self, names: &[String]) -> Result<Vec<PackageSource>>;
}

/// [`SourceFetcher`] backed by the AUR RPC interface and snapshot tarballs.
pub struct AurFetcher<'a, R: Runtime> {
    runtime: &'a R,
    client: AurClient,
    workdir: PathBuf,
}

impl<'a, R: Runtime> AurFetcher<'a, R> {
    pub fn new(runtime: &'a R, client: AurClient, workdir: PathBuf) -> Self {
        Self {
            runtime,
            client,
            workdir,
        }
    }

    /// Query the AUR for `names` and, transitively, for their build dependencies.
    ///
    /// Requested names must exist; dependencies that are not on the AUR are
    /// assumed to come from the official repositories.
    async fn resolve(&self, names: &[String]) -> Result<HashMap<String, AurPackage>> {
        let mut known: HashMap<String, AurPackage> = HashMap::new();
        let mut queried: HashSet<String> = HashSet::new();
        let mut pending: Vec<String> = names.to_vec();
        let mut first_round = true;

        while !pending.is_empty() {
            queried.extend(pending.iter().cloned());
            let found = self
                .client
                .info(&pending)
                .await
                .context("Failed to query the AUR")?;

            if first_round {
                let missing: Vec<&str> = pending
                    .iter()
                    .filter(|name| !found.iter().any(|p| &p.name == *name))
                    .map(String::as_str)
                    .collect();
                if !missing.is_empty() {
                    anyhow::bail!("Packages not found on the AUR: {}", missing.join(", "));
                }
                first_round = false;
            }

            let mut next = Vec::new();
            for pkg in found {
                for dep in pkg.build_depends().map(strip_constraint) {
                    if !queried.contains(dep) && !next.iter().any(|n| n == dep) {
                        next.push(dep.to_string());
                    }
                }
                known.insert(pkg.name.clone(), pkg);
            }
            pending = next;
        }

        Ok(known)
    }

    async fn materialize(&self, pkg: &AurPackage) -> Result<PackageSource> {
        if !is_single_component(&pkg.package_base) {
            anyhow::bail!("Refusing invalid package base '{}'", pkg.package_base);
        }

        let dir = self.workdir.join(&pkg.package_base);
        if self.runtime.exists(&dir) {
            debug!("Replacing previous sources in {:?}", dir);
            self.runtime.remove_dir_all(&dir)?;
        }

        let tarball = self
            .client
            .snapshot(pkg)
            .await
            .with_context(|| format!("Failed to download sources of {}", pkg.package_base))?;
        unpack_snapshot(&tarball, &self.workdir)
            .with_context(|| format!("Failed to unpack sources of {}", pkg.package_base))?;

        PackageSource::load(self.runtime, &dir)
    }
}

#[async_trait]
impl<'a, R: Runtime> SourceFetcher for AurFetcher<'a, R> {
    async fn get(&self, names: &[String]) -> Result<Vec<PackageSource>> {
        self.runtime.create_dir_all(&self.workdir)?;

        let known = self.resolve(names).await?;
        let order = build_order(names, &known);

        let mut sources = Vec::with_capacity(order.len());
        for pkg in order {
            info!("Downloading sources of {}", pkg.package_base);
            sources.push(self.materialize(pkg).await?);
        }
        Ok(sources)
    }
}

/// Whether `name` names an entry directly inside a directory.
fn is_single_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Order package bases so that dependencies precede their dependants.
///
/// Each base appears once; ties keep request order.
fn build_order<'k>(
    names: &[String],
    known: &'k HashMap<String, AurPackage>,
) -> Vec<&'k AurPackage> {
    fn visit<'k>(
        name: &str,
        known: &'k HashMap<String, AurPackage>,
        visited: &mut HashSet<String>,
        order: &mut Vec<&'k AurPackage>,
    ) {
        let Some(pkg) = known.get(name) else {
            return;
        };
        if !visited.insert(name.to_string()) {
            return;
        }
        for dep in pkg.build_depends().map(strip_constraint) {
            visit(dep, known, visited, order);
        }
        if !order.iter().any(|p| p.package_base == pkg.package_base) {
            order.push(pkg);
        }
    }

    let mut visited = HashSet::new();
    let mut order = Vec::new();
    for name in names {
        visit(name, known, &mut visited, &mut order);
    }
    order
}
