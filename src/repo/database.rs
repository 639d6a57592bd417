//! Repository backed by a pacman repository database (`<repo>.db.tar.gz`).

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use flate2::read::GzDecoder;
use log::debug;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tar::Archive;

use crate::package::{PackageSource, VersionDescriptor};
use crate::runtime::Runtime;

use super::ReferenceRepository;

/// Local package repository described by its database file.
pub struct LocalRepository<'a, R: Runtime> {
    runtime: &'a R,
    db_path: PathBuf,
}

impl<'a, R: Runtime> LocalRepository<'a, R> {
    pub fn new(runtime: &'a R, db_path: PathBuf) -> Self {
        Self { runtime, db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Read the versions currently held, keyed by package name.
    ///
    /// A missing database is an empty repository.
    pub fn held_versions(&self) -> Result<HashMap<String, VersionDescriptor>> {
        if !self.runtime.exists(&self.db_path) {
            debug!("Repository database {:?} does not exist yet", self.db_path);
            return Ok(HashMap::new());
        }

        let reader = self.runtime.open(&self.db_path)?;
        let mut archive = Archive::new(GzDecoder::new(reader));
        let mut held = HashMap::new();

        let entries = archive
            .entries()
            .with_context(|| format!("Failed to read repository database {:?}", self.db_path))?;

        for entry in entries {
            let mut entry = entry.context("Failed to read repository database entry")?;
            let path = entry.path()?.into_owned();
            if path.file_name().and_then(|n| n.to_str()) != Some("desc") {
                continue;
            }

            let mut desc = String::new();
            entry
                .read_to_string(&mut desc)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let (name, version) =
                parse_desc(&desc).with_context(|| format!("Invalid entry {:?}", path))?;
            held.insert(name, version);
        }

        Ok(held)
    }
}

#[async_trait]
impl<'a, R: Runtime> ReferenceRepository for LocalRepository<'a, R> {
    async fn get_updated(&self, pkgs: &[PackageSource]) -> Result<Vec<PackageSource>> {
        let held = self.held_versions()?;

        let updated = pkgs
            .iter()
            .filter(|pkg| {
                pkg.names().iter().any(|name| match held.get(name) {
                    Some(current) => pkg.version() > current,
                    None => true,
                })
            })
            .cloned()
            .collect();

        Ok(updated)
    }
}

/// Extract `%NAME%` and `%VERSION%` from a database `desc` file.
fn parse_desc(desc: &str) -> Result<(String, VersionDescriptor)> {
    let mut name = None;
    let mut version = None;
    let mut lines = desc.lines();

    while let Some(line) = lines.next() {
        match line.trim() {
            "%NAME%" => name = lines.next().map(|l| l.trim().to_string()),
            "%VERSION%" => version = lines.next().map(|l| l.trim().to_string()),
            _ => {}
        }
    }

    let name = name.ok_or_else(|| anyhow!("Missing %NAME%"))?;
    let mut version: VersionDescriptor = version
        .ok_or_else(|| anyhow!("Missing %VERSION% for {}", name))?
        .parse()?;
    // Same as a missing epoch, as in .SRCINFO.
    version.epoch = version.epoch.filter(|&e| e != 0);
    Ok((name, version))
}
