//! Discovery of built package files and their signatures.

use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

use super::BuildArtifact;

/// File name suffix of binary packages.
pub const PACKAGE_SUFFIX: &str = ".pkg.tar.xz";

/// Suffix appended to a package file name to form its detached signature.
pub const SIGNATURE_SUFFIX: &str = ".sig";

/// Scans a package directory after a build.
pub struct ArtifactHarvester<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> ArtifactHarvester<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }

    /// List the package files in `dir` (non-recursive), each paired with its
    /// signature when one exists. Results are sorted by file name; signatures
    /// without a matching package are ignored.
    pub fn harvest(&self, dir: &Path) -> Result<Vec<BuildArtifact>> {
        let entries = self.runtime.read_dir(dir)?;

        let names: Vec<String> = entries
            .iter()
            .filter(|path| self.runtime.is_file(path))
            .filter_map(|path| path.file_name()?.to_str().map(String::from))
            .collect();

        let mut packages: BTreeMap<&str, Option<PathBuf>> = names
            .iter()
            .filter(|name| name.ends_with(PACKAGE_SUFFIX))
            .map(|name| (name.as_str(), None))
            .collect();

        for name in &names {
            if let Some(package) = name.strip_suffix(SIGNATURE_SUFFIX)
                && let Some(signature) = packages.get_mut(package)
            {
                *signature = Some(dir.join(name));
            }
        }

        Ok(packages
            .into_iter()
            .map(|(name, signature)| BuildArtifact::new(dir.join(name), signature))
            .collect())
    }
}
