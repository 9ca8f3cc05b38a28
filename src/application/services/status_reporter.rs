use super::remote_link_manager::{RemoteLinkError, RemoteLinkManager};
use super::topology_resolver::{RepoTopologyResolver, TopologyError};
use crate::domain::entities::{RepoTopology, SyncStatusSnapshot};
use crate::domain::value_objects::BranchName;
use crate::infrastructure::vcs::{ChangeScope, VcsError, VcsExecutor};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StatusReportError {
    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Remote(#[from] RemoteLinkError),

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// Combines working-tree state with local and remote commit counts into a
/// single [`SyncStatusSnapshot`]. Read-only: never fetches, never writes.
/// Unmerged index entries under the prefix report `CONFLICTED`.
pub struct SyncStatusReporter<'a> {
    vcs: &'a dyn VcsExecutor,
    resolver: &'a RepoTopologyResolver,
    remote: &'a str,
    branch: &'a BranchName,
}

impl<'a> SyncStatusReporter<'a> {
    pub fn new(
        vcs: &'a dyn VcsExecutor,
        resolver: &'a RepoTopologyResolver,
        remote: &'a str,
        branch: &'a BranchName,
    ) -> Self {
        Self {
            vcs,
            resolver,
            remote,
            branch,
        }
    }

    pub fn report(&self, project_root: &Path) -> Result<SyncStatusSnapshot, StatusReportError> {
        let topology = self.resolver.resolve(project_root)?;
        self.report_topology(&topology)
    }

    /// Snapshot for an already resolved topology
    pub fn report_topology(&self, topology: &RepoTopology) -> Result<SyncStatusSnapshot, StatusReportError> {
        let repo = topology.git_root();
        let prefix = topology.prefix().clone();

        let Some(remote) = RemoteLinkManager::new(self.vcs, repo).find(self.remote)? else {
            debug!(prefix = %prefix, remote = self.remote, "no remote binding");
            return Ok(SyncStatusSnapshot::unlinked(prefix, None));
        };

        let Some(counts) = self
            .vcs
            .ahead_behind(repo, &prefix, &remote.name, self.branch)?
        else {
            debug!(prefix = %prefix, remote = %remote.name, "remote bound but prefix never synced");
            return Ok(SyncStatusSnapshot::unlinked(prefix, Some(remote)));
        };

        let changes = self
            .vcs
            .dirty_paths(repo, &ChangeScope::prefix(prefix.clone()))?;
        let unmerged: Vec<String> = self
            .vcs
            .find_conflict_markers(repo, &prefix)?
            .unmerged_paths
            .into_iter()
            .filter(|path| prefix.contains(path))
            .collect();

        Ok(SyncStatusSnapshot::linked(prefix, remote, counts, changes).with_conflicts(unmerged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AheadBehind, SyncState};
    use crate::infrastructure::vcs::{ConflictReport, MockVcsExecutor};
    use std::fs;
    use tempfile::TempDir;

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn test_no_remote_is_unlinked() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get().returning(|_, _| Ok(None));
        vcs.expect_ahead_behind().never();

        let resolver = RepoTopologyResolver::new("paper");
        let branch = BranchName::master();
        let snapshot = SyncStatusReporter::new(&vcs, &resolver, "overleaf", &branch)
            .report(dir.path())
            .unwrap();

        assert_eq!(snapshot.state, SyncState::Unlinked);
        assert_eq!((snapshot.ahead, snapshot.behind), (0, 0));
        assert!(snapshot.remote.is_none());
    }

    #[test]
    fn test_never_synced_remote_is_unlinked_with_remote() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some("https://git.overleaf.com/abc".to_string())));
        vcs.expect_ahead_behind().returning(|_, _, _, _| Ok(None));
        vcs.expect_dirty_paths().never();

        let resolver = RepoTopologyResolver::new("paper");
        let branch = BranchName::master();
        let snapshot = SyncStatusReporter::new(&vcs, &resolver, "overleaf", &branch)
            .report(dir.path())
            .unwrap();

        assert_eq!(snapshot.state, SyncState::Unlinked);
        assert_eq!(snapshot.remote.map(|r| r.name), Some("overleaf".to_string()));
    }

    #[test]
    fn test_dirty_keeps_counts() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some("https://git.overleaf.com/abc".to_string())));
        vcs.expect_ahead_behind()
            .returning(|_, _, _, _| Ok(Some(AheadBehind::new(1, 2))));
        vcs.expect_dirty_paths()
            .withf(|_, scope| scope.include_untracked && scope.prefix.is_some())
            .returning(|_, _| Ok(vec!["paper/main.tex".to_string()]));
        vcs.expect_find_conflict_markers()
            .returning(|_, _| Ok(ConflictReport::default()));

        let resolver = RepoTopologyResolver::new("paper");
        let branch = BranchName::master();
        let snapshot = SyncStatusReporter::new(&vcs, &resolver, "overleaf", &branch)
            .report(dir.path())
            .unwrap();

        assert_eq!(snapshot.state, SyncState::Dirty);
        assert_eq!((snapshot.ahead, snapshot.behind), (1, 2));
        assert_eq!(snapshot.changes, vec!["paper/main.tex".to_string()]);
    }

    #[test]
    fn test_unmerged_prefix_paths_are_conflicted() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some("https://git.overleaf.com/abc".to_string())));
        vcs.expect_ahead_behind()
            .returning(|_, _, _, _| Ok(Some(AheadBehind::new(1, 1))));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_find_conflict_markers().returning(|_, _| {
            Ok(ConflictReport {
                unmerged_paths: vec!["paper/main.tex".to_string(), "src/model.py".to_string()],
                marker_paths: vec![],
            })
        });

        let resolver = RepoTopologyResolver::new("paper");
        let branch = BranchName::master();
        let snapshot = SyncStatusReporter::new(&vcs, &resolver, "overleaf", &branch)
            .report(dir.path())
            .unwrap();

        assert_eq!(snapshot.state, SyncState::Conflicted);
        assert_eq!(snapshot.changes, vec!["paper/main.tex".to_string()]);
    }
}
