//! Build results.

use std::fmt;
use std::path::{Path, PathBuf};

/// A produced package file and its optional detached signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
    pub package: PathBuf,
    pub signature: Option<PathBuf>,
}

impl BuildArtifact {
    pub fn new(package: PathBuf, signature: Option<PathBuf>) -> Self {
        Self { package, signature }
    }
}

impl fmt::Display for BuildArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", file_name(&self.package))?;
        if let Some(signature) = &self.signature {
            write!(f, " ({})", file_name(signature))?;
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Artifacts of one orchestration run, in package-processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    artifacts: Vec<BuildArtifact>,
}

impl BuildReport {
    pub fn new(artifacts: Vec<BuildArtifact>) -> Self {
        Self { artifacts }
    }

    pub fn artifacts(&self) -> &[BuildArtifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<BuildArtifact> {
        self.artifacts
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Built packages:")?;
        for artifact in &self.artifacts {
            write!(f, "\n * {}", artifact)?;
        }
        Ok(())
    }
}

/// Successful outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Every requested package is already current in the reference repository.
    UpToDate,
    Built(BuildReport),
}

impl BuildOutcome {
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, BuildOutcome::UpToDate)
    }

    /// The report of the run; empty when nothing had to be built.
    pub fn into_report(self) -> BuildReport {
        match self {
            BuildOutcome::UpToDate => BuildReport::default(),
            BuildOutcome::Built(report) => report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_display() {
        let signed = BuildArtifact::new(
            PathBuf::from("/build/foo/foo-1-1-x86_64.pkg.tar.xz"),
            Some(PathBuf::from("/build/foo/foo-1-1-x86_64.pkg.tar.xz.sig")),
        );
        assert_eq!(
            signed.to_string(),
            "foo-1-1-x86_64.pkg.tar.xz (foo-1-1-x86_64.pkg.tar.xz.sig)"
        );

        let unsigned = BuildArtifact::new(PathBuf::from("/build/bar/bar-1-1-any.pkg.tar.xz"), None);
        assert_eq!(unsigned.to_string(), "bar-1-1-any.pkg.tar.xz");
    }

    #[test]
    fn test_report_summary() {
        let report = BuildReport::new(vec![
            BuildArtifact::new(PathBuf::from("/b/a.pkg.tar.xz"), None),
            BuildArtifact::new(
                PathBuf::from("/b/b.pkg.tar.xz"),
                Some(PathBuf::from("/b/b.pkg.tar.xz.sig")),
            ),
        ]);
        assert_eq!(
            report.to_string(),
            "Built packages:\n * a.pkg.tar.xz\n * b.pkg.tar.xz (b.pkg.tar.xz.sig)"
        );
    }

    #[test]
    fn test_up_to_date_has_empty_report() {
        let outcome = BuildOutcome::UpToDate;
        assert!(outcome.is_up_to_date());
        assert!(outcome.into_report().is_empty());
    }
}
