//! Error taxonomy of a build run.

use std::path::PathBuf;
use thiserror::Error;

use crate::build::LockError;

/// Errors that abort a build run.
///
/// A run either yields a complete report or one of these errors, never a
/// partial report.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to refresh the build environment")]
    Environment(#[source] anyhow::Error),

    #[error("Failed to fetch package sources")]
    Fetch(#[source] anyhow::Error),

    #[error("Failed to refresh version of live-source package {pkgbase}")]
    VersionRefresh {
        pkgbase: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to query the reference repository")]
    Repository(#[source] anyhow::Error),

    #[error("Failed to build package {pkgbase}")]
    Build {
        pkgbase: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to harvest artifacts of {pkgbase} from {path:?}")]
    Harvest {
        pkgbase: String,
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Lock(#[from] LockError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::error::Error as _;

    #[test]
    fn test_display_names_package() {
        let err = BuildError::Build {
            pkgbase: "imgur".into(),
            source: anyhow!("makepkg exited with status 4"),
        };
        assert_eq!(err.to_string(), "Failed to build package imgur");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("makepkg exited with status 4".to_string())
        );
    }

    #[test]
    fn test_converts_into_anyhow_with_chain() {
        let err: anyhow::Error = BuildError::VersionRefresh {
            pkgbase: "wlc-git".into(),
            source: anyhow!("git fetch failed"),
        }
        .into();
        let chain: Vec<String> = err.chain().map(|e| e.to_string()).collect();
        assert_eq!(
            chain,
            vec![
                "Failed to refresh version of live-source package wlc-git",
                "git fetch failed"
            ]
        );
    }
}
