//! Decides which package sources must be rebuilt.

use log::{debug, warn};

use crate::error::BuildError;
use crate::package::PackageSource;
use crate::repo::ReferenceRepository;
use crate::runtime::Runtime;
use crate::tool::BuildTool;

use super::VersionProbe;

/// Compares package sources against a reference repository, refreshing
/// live-source packages first.
pub struct StalenessResolver<'a, R: Runtime, T: BuildTool> {
    probe: VersionProbe<'a, R, T>,
}

impl<'a, R: Runtime, T: BuildTool> StalenessResolver<'a, R, T> {
    pub fn new(probe: VersionProbe<'a, R, T>) -> Self {
        Self { probe }
    }

    /// Return the packages that are outdated in or missing from `repo`.
    ///
    /// Live-source packages are refreshed one at a time in input order; the
    /// first refresh failure aborts the whole resolution. The result follows
    /// the order reported by the repository.
    pub async fn resolve(
        &self,
        pkgs: Vec<PackageSource>,
        repo: &dyn ReferenceRepository,
    ) -> Result<Vec<PackageSource>, BuildError> {
        if pkgs.is_empty() {
            return Ok(vec![]);
        }

        let live = pkgs.iter().filter(|p| p.is_live_source()).count();
        debug!(
            "Resolving {} package sources ({} live-source)",
            pkgs.len(),
            live
        );

        let mut refreshed = Vec::with_capacity(pkgs.len());
        for pkg in pkgs {
            refreshed.push(self.probe.refresh(pkg).await?);
        }

        let updated = repo
            .get_updated(&refreshed)
            .await
            .map_err(BuildError::Repository)?;

        Ok(updated
            .into_iter()
            .filter(|pkg| {
                let submitted = refreshed.iter().any(|r| r.base() == pkg.base());
                if !submitted {
                    warn!("Ignoring unrequested package {} reported by repository", pkg.base());
                }
                submitted
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::MockReferenceRepository;
    use crate::runtime::MockRuntime;
    use crate::test_utils::sample_source;
    use crate::tool::MockBuildTool;
    use anyhow::anyhow;
    use mockall::Sequence;

    #[tokio::test]
    async fn test_empty_input_skips_repository() {
        let runtime = MockRuntime::new();
        let tool = MockBuildTool::new();
        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated().never();

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let outdated = resolver.resolve(vec![], &repo).await.unwrap();
        assert!(outdated.is_empty());
    }

    #[tokio::test]
    async fn test_nothing_outdated_is_empty_not_error() {
        let runtime = MockRuntime::new();
        let tool = MockBuildTool::new();
        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated().times(1).returning(|_| Ok(vec![]));

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let outdated = resolver
            .resolve(vec![sample_source("imgur", &["imgur"], "1.0")], &repo)
            .await
            .unwrap();
        assert!(outdated.is_empty());
    }

    #[tokio::test]
    async fn test_refreshes_live_sources_in_order_before_comparing() {
        let mut runtime = MockRuntime::new();
        runtime.expect_read_to_string().returning(|path| {
            let base = path.parent().unwrap().file_name().unwrap().to_str().unwrap();
            Ok(format!("pkgbase = {0}\npkgver = r200\npkgname = {0}\n", base))
        });

        let mut seq = Sequence::new();
        let mut tool = MockBuildTool::new();
        tool.expect_prepare_source()
            .withf(|dir| dir.ends_with("a-git"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        tool.expect_prepare_source()
            .withf(|dir| dir.ends_with("b-git"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated()
            .withf(|pkgs| {
                pkgs.iter().map(|p| p.base()).collect::<Vec<_>>() == ["a-git", "pinned", "b-git"]
                    && pkgs[0].version().version == "r200"
                    && pkgs[1].version().version == "1.0"
            })
            .returning(|pkgs| Ok(pkgs.to_vec()));

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let outdated = resolver
            .resolve(
                vec![
                    sample_source("a-git", &["a-git"], "r100"),
                    sample_source("pinned", &["pinned"], "1.0"),
                    sample_source("b-git", &["b-git"], "r100"),
                ],
                &repo,
            )
            .await
            .unwrap();

        assert_eq!(outdated.len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_failure_aborts_without_querying_repository() {
        let runtime = MockRuntime::new();
        let mut tool = MockBuildTool::new();
        tool.expect_prepare_source()
            .times(1)
            .returning(|_| Err(anyhow!("network unreachable")));
        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated().never();

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let result = resolver
            .resolve(
                vec![
                    sample_source("a-git", &["a-git"], "r1"),
                    sample_source("b-git", &["b-git"], "r1"),
                ],
                &repo,
            )
            .await;

        assert!(matches!(result, Err(BuildError::VersionRefresh { .. })));
    }

    #[tokio::test]
    async fn test_keeps_repository_order() {
        let runtime = MockRuntime::new();
        let tool = MockBuildTool::new();
        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated()
            .returning(|pkgs| Ok(vec![pkgs[2].clone(), pkgs[0].clone()]));

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let outdated = resolver
            .resolve(
                vec![
                    sample_source("a", &["a"], "1"),
                    sample_source("b", &["b"], "1"),
                    sample_source("c", &["c"], "1"),
                ],
                &repo,
            )
            .await
            .unwrap();

        let bases: Vec<&str> = outdated.iter().map(|p| p.base()).collect();
        assert_eq!(bases, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_repository_failure() {
        let runtime = MockRuntime::new();
        let tool = MockBuildTool::new();
        let mut repo = MockReferenceRepository::new();
        repo.expect_get_updated()
            .returning(|_| Err(anyhow!("database locked")));

        let resolver = StalenessResolver::new(VersionProbe::new(&runtime, &tool));
        let result = resolver
            .resolve(vec![sample_source("a", &["a"], "1")], &repo)
            .await;

        assert!(matches!(result, Err(BuildError::Repository(_))));
    }
}
