//! Parser for the `.SRCINFO` build-metadata file.

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use std::str::FromStr;

use crate::runtime::Runtime;

use super::VersionDescriptor;

/// File name of the build-metadata file inside a package source directory.
pub const SRCINFO_FILE: &str = ".SRCINFO";

/// Name suffixes of packages tracking a revision-control reference.
const LIVE_SOURCE_SUFFIXES: &[&str] = &["-git", "-svn", "-hg", "-bzr", "-cvs", "-darcs"];

/// Keys listing build-time dependencies (architecture-specific variants included).
const DEPENDENCY_KEYS: &[&str] = &["depends", "makedepends", "checkdepends"];

/// Parsed build metadata of a package source.
#[derive(Debug, Clone, PartialEq)]
pub struct SrcInfo {
    pub pkgbase: String,
    /// Output package names, in file order.
    pub pkgnames: Vec<String>,
    pub version: VersionDescriptor,
    /// Dependency names with version constraints stripped, deduplicated.
    pub depends: Vec<String>,
}

impl SrcInfo {
    /// Load `.SRCINFO` from a package source directory.
    pub fn load<R: Runtime + ?Sized>(runtime: &R, dir: &Path) -> Result<Self> {
        let path = dir.join(SRCINFO_FILE);
        let content = runtime
            .read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        content
            .parse()
            .with_context(|| format!("Failed to parse {:?}", path))
    }

    /// Whether the version can only be known after pulling upstream sources.
    pub fn is_live_source(&self) -> bool {
        self.pkgnames.iter().any(|name| {
            LIVE_SOURCE_SUFFIXES
                .iter()
                .any(|suffix| name.ends_with(suffix))
        })
    }
}

impl FromStr for SrcInfo {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let mut pkgbase = None;
        let mut pkgnames = Vec::new();
        let mut epoch = None;
        let mut pkgver = None;
        let mut pkgrel = None;
        let mut depends: Vec<String> = Vec::new();

        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .map(|(k, v)| (k.trim(), v.trim()))
                .ok_or_else(|| anyhow!("Malformed line {}: '{}'", lineno + 1, line))?;

            // Version fields only count in the pkgbase section.
            let in_base = pkgnames.is_empty();

            match key {
                "pkgbase" => pkgbase = Some(value.to_string()),
                "pkgname" => pkgnames.push(value.to_string()),
                "epoch" if in_base => {
                    let parsed = value
                        .parse::<u64>()
                        .with_context(|| format!("Invalid epoch '{}'", value))?;
                    // makepkg omits a zero epoch from full versions.
                    epoch = Some(parsed).filter(|&e| e != 0);
                }
                "pkgver" if in_base => pkgver = Some(value.to_string()),
                "pkgrel" if in_base => pkgrel = Some(value.to_string()),
                _ if is_dependency_key(key) => {
                    let name = strip_constraint(value);
                    if !name.is_empty() && !depends.iter().any(|d| d == name) {
                        depends.push(name.to_string());
                    }
                }
                _ => {}
            }
        }

        let pkgbase = pkgbase.ok_or_else(|| anyhow!("Missing pkgbase"))?;
        if pkgnames.is_empty() {
            anyhow::bail!("Missing pkgname for {}", pkgbase);
        }
        let pkgver = pkgver.ok_or_else(|| anyhow!("Missing pkgver for {}", pkgbase))?;

        Ok(Self {
            pkgbase,
            pkgnames,
            version: VersionDescriptor::new(epoch, pkgver, pkgrel.unwrap_or_else(|| "1".into())),
            depends,
        })
    }
}

fn is_dependency_key(key: &str) -> bool {
    DEPENDENCY_KEYS.iter().any(|base| {
        key == *base
            || key
                .strip_prefix(base)
                .is_some_and(|arch| arch.starts_with('_'))
    })
}

/// Strip a version constraint from a dependency, `foo>=1.2` -> `foo`.
pub fn strip_constraint(dependency: &str) -> &str {
    dependency
        .split(['<', '>', '='])
        .next()
        .unwrap_or(dependency)
        .trim()
}
