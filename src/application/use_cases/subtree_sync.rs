//! Link, pull, push, status and unlink of a paper subtree.
//!
//! Every operation resolves the topology afresh, checks its preconditions
//! before git runs, and turns whatever git reports into a [`SyncOutcome`]
//! or a [`SyncError`].

use crate::application::services::failure_classifier::{FailureClass, FailureClassifier};
use crate::application::services::remote_link_manager::{
    LinkedRemote, RemoteChange, RemoteLinkError, RemoteLinkManager,
};
use crate::application::services::status_reporter::{StatusReportError, SyncStatusReporter};
use crate::application::services::topology_resolver::{RepoTopologyResolver, TopologyError};
use crate::common::{SyncError, SyncResult};
use crate::domain::entities::{
    RemoteBinding, RepoTopology, SyncAction, SyncOperation, SyncOutcome, SyncSettings,
    SyncStatusSnapshot,
};
use crate::domain::value_objects::{remote_url, BranchName, RemoteUrl, SubtreePrefix};
use crate::infrastructure::process::CommandExecutorError;
use crate::infrastructure::vcs::{
    ChangeScope, ConflictReport, SubtreeRequest, ToolOutput, VcsError, VcsExecutor,
};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parameters of a link
#[derive(Debug, Clone)]
pub struct LinkRequest {
    pub url: String,
    /// Remote branch; the configured branch when `None`
    pub branch: Option<String>,
    /// Repoint an existing remote instead of failing with a conflict
    pub replace_remote: bool,
}

impl LinkRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            branch: None,
            replace_remote: false,
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_replace_remote(mut self, replace: bool) -> Self {
        self.replace_remote = replace;
        self
    }
}

/// Operation, prefix, remote and branch in play; every error carries them
struct OperationContext {
    operation: SyncOperation,
    prefix: SubtreePrefix,
    remote: String,
    branch: BranchName,
}

impl OperationContext {
    fn request(&self) -> SubtreeRequest {
        SubtreeRequest::new(self.prefix.clone(), self.remote.clone(), self.branch.clone())
    }

    fn already_linked(&self, reason: impl Into<String>) -> SyncError {
        SyncError::PrefixAlreadyLinked {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
            reason: reason.into(),
        }
    }

    fn not_linked(&self) -> SyncError {
        SyncError::PrefixNotLinked {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
        }
    }

    fn dirty(&self, paths: Vec<String>) -> SyncError {
        SyncError::DirtyWorkingTree {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
            paths,
        }
    }

    fn conflicted(&self, paths: Vec<String>) -> SyncError {
        SyncError::Conflicted {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
            branch: self.branch.clone(),
            paths,
        }
    }

    fn network(&self, reason: impl Into<String>) -> SyncError {
        SyncError::NetworkOrAuthFailure {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
            branch: self.branch.clone(),
            reason: reason.into(),
        }
    }

    fn unknown(&self, command: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> SyncError {
        SyncError::UnknownToolFailure {
            operation: self.operation,
            prefix: self.prefix.clone(),
            remote: self.remote.clone(),
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    /// Classify a git run that exited non-zero
    fn tool_failure(&self, output: &ToolOutput) -> SyncError {
        let class = FailureClassifier::classify(&output.output);
        debug!(command = %output.command, exit_code = ?output.exit_code, ?class, "classified tool failure");

        match class {
            FailureClass::Conflicted { paths } => self.conflicted(paths),
            FailureClass::DirtyWorkingTree => self.dirty(Vec::new()),
            FailureClass::PrefixExists => self.already_linked("already exists in the working tree"),
            FailureClass::PushRejected => SyncError::PushRejected {
                operation: self.operation,
                prefix: self.prefix.clone(),
                remote: self.remote.clone(),
                branch: self.branch.clone(),
            },
            FailureClass::NetworkOrAuth { reason } => self.network(reason),
            FailureClass::Unknown => {
                self.unknown(output.command.clone(), output.exit_code, output.output.clone())
            }
        }
    }

    fn vcs_error(&self, err: VcsError) -> SyncError {
        if err.is_network() {
            return self.network(err.to_string());
        }
        let command = match &err {
            VcsError::Process(CommandExecutorError::SpawnFailed { command, .. })
            | VcsError::Process(CommandExecutorError::WaitFailed { command, .. }) => command.clone(),
            _ => "libgit2".to_string(),
        };
        self.unknown(command, None, err.to_string())
    }

    fn remote_error(&self, err: RemoteLinkError) -> SyncError {
        match err {
            RemoteLinkError::NotConfigured { name } => SyncError::RemoteNotConfigured {
                operation: self.operation,
                prefix: self.prefix.clone(),
                remote: name,
            },
            RemoteLinkError::Conflict {
                name,
                existing,
                requested,
            } => SyncError::RemoteConflict {
                operation: self.operation,
                prefix: self.prefix.clone(),
                remote: name,
                existing_url: existing,
                requested_url: requested,
            },
            RemoteLinkError::InvalidName { name, reason } => {
                SyncError::invalid_argument(self.operation, "remote name", name, reason)
            }
            RemoteLinkError::Vcs(err) => self.vcs_error(err),
        }
    }

    fn report_error(&self, err: StatusReportError) -> SyncError {
        match err {
            StatusReportError::Topology(err) => topology_error(self.operation, err),
            StatusReportError::Remote(err) => self.remote_error(err),
            StatusReportError::Vcs(err) => self.vcs_error(err),
        }
    }
}

fn topology_error(operation: SyncOperation, err: TopologyError) -> SyncError {
    match err {
        TopologyError::NotARepository { path } => SyncError::NotARepository { operation, path },
        TopologyError::InvalidProjectRoot { path, source } => {
            SyncError::invalid_argument(operation, "project root", path.display().to_string(), source)
        }
        TopologyError::InvalidPrefix { path, source } => {
            SyncError::invalid_argument(operation, "prefix", path.display().to_string(), source)
        }
    }
}

/// State of the paper directory before a link
enum PaperDir {
    Missing,
    EmptyPlaceholder,
}

/// Drives link/pull/push/status/unlink through a [`VcsExecutor`].
///
/// Holds no per-project state: the same engine may serve a standalone
/// project and a nested one in turn. Operations on one project root must
/// not run concurrently.
pub struct SubtreeSyncEngine {
    vcs: Arc<dyn VcsExecutor>,
    settings: SyncSettings,
    resolver: RepoTopologyResolver,
}

impl SubtreeSyncEngine {
    pub fn new(vcs: Arc<dyn VcsExecutor>, settings: SyncSettings) -> Self {
        let resolver = RepoTopologyResolver::new(settings.paper_dir.clone());
        Self {
            vcs,
            settings,
            resolver,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    fn resolve(&self, operation: SyncOperation, project_root: &Path) -> SyncResult<RepoTopology> {
        self.resolver
            .resolve(project_root)
            .map_err(|err| topology_error(operation, err))
    }

    fn context(&self, operation: SyncOperation, topology: &RepoTopology, branch: BranchName) -> OperationContext {
        OperationContext {
            operation,
            prefix: topology.prefix().clone(),
            remote: self.settings.remote.clone(),
            branch,
        }
    }

    fn snapshot(&self, ctx: &OperationContext, topology: &RepoTopology) -> SyncResult<SyncStatusSnapshot> {
        SyncStatusReporter::new(self.vcs.as_ref(), &self.resolver, &ctx.remote, &ctx.branch)
            .report_topology(topology)
            .map_err(|err| ctx.report_error(err))
    }

    fn require_remote(&self, ctx: &OperationContext, repo: &Path) -> SyncResult<RemoteBinding> {
        RemoteLinkManager::new(self.vcs.as_ref(), repo)
            .resolve(&ctx.remote)
            .map_err(|err| ctx.remote_error(err))
    }

    fn require_linked(&self, ctx: &OperationContext, repo: &Path) -> SyncResult<()> {
        let tracked = self
            .vcs
            .has_tracked_content(repo, &ctx.prefix)
            .map_err(|err| ctx.vcs_error(err))?;
        if tracked {
            Ok(())
        } else {
            Err(ctx.not_linked())
        }
    }

    fn require_clean(&self, ctx: &OperationContext, repo: &Path) -> SyncResult<()> {
        let dirty = self
            .vcs
            .dirty_paths(repo, &ChangeScope::repository())
            .map_err(|err| ctx.vcs_error(err))?;
        if dirty.is_empty() {
            Ok(())
        } else {
            debug!(count = dirty.len(), "uncommitted tracked changes");
            Err(ctx.dirty(dirty))
        }
    }

    /// Link the project's paper directory to a remote repository
    pub async fn link(&self, project_root: &Path, request: &LinkRequest) -> SyncResult<SyncOutcome> {
        let operation = SyncOperation::Link;

        let url = RemoteUrl::new(&request.url).map_err(|err| {
            SyncError::invalid_argument(operation, "remote url", remote_url::redact(&request.url), err)
        })?;
        let branch = match &request.branch {
            Some(branch) => BranchName::new(branch)
                .map_err(|err| SyncError::invalid_argument(operation, "branch", branch, err))?,
            None => self.settings.branch.clone(),
        };

        let topology = self.resolve(operation, project_root)?;
        let ctx = self.context(operation, &topology, branch);
        let repo = topology.git_root();

        info!(
            prefix = %ctx.prefix,
            remote = %ctx.remote,
            branch = %ctx.branch,
            mode = %topology.mode(),
            "linking paper"
        );
        if !url.is_overleaf() {
            warn!(url = %url, "remote url does not point at git.overleaf.com");
        }

        let manager = RemoteLinkManager::new(self.vcs.as_ref(), repo);
        if !request.replace_remote {
            manager
                .check_compatible(&ctx.remote, &url)
                .map_err(|err| ctx.remote_error(err))?;
        }

        if self
            .vcs
            .has_tracked_content(repo, &ctx.prefix)
            .map_err(|err| ctx.vcs_error(err))?
        {
            return Err(ctx.already_linked("already contains tracked files"));
        }
        let paper_dir = self.inspect_paper_dir(&ctx, &topology)?;
        self.require_clean(&ctx, repo)?;

        let linked = if request.replace_remote {
            manager.replace(&ctx.remote, &url)
        } else {
            manager.ensure(&ctx.remote, &url)
        }
        .map_err(|err| ctx.remote_error(err))?;

        if let Err(err) = self.add_subtree(&ctx, &topology, &paper_dir).await {
            self.roll_back_link(&manager, &linked, &topology, &paper_dir);
            return Err(err);
        }

        info!(prefix = %ctx.prefix, remote = %ctx.remote, "paper linked");
        let snapshot = self.snapshot(&ctx, &topology)?;
        Ok(SyncOutcome::new(operation, SyncAction::Linked, snapshot))
    }

    fn inspect_paper_dir(&self, ctx: &OperationContext, topology: &RepoTopology) -> SyncResult<PaperDir> {
        let path = topology.paper_path();

        match fs::read_dir(&path) {
            Ok(mut entries) => {
                if entries.next().is_none() {
                    Ok(PaperDir::EmptyPlaceholder)
                } else {
                    Err(ctx.already_linked(
                        "contains untracked files; move them away or commit them before linking",
                    ))
                }
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PaperDir::Missing),
            Err(_) if path.exists() && !path.is_dir() => {
                Err(ctx.already_linked("exists and is not a directory"))
            }
            Err(err) => Err(ctx.already_linked(format!("cannot be inspected: {err}"))),
        }
    }

    async fn add_subtree(&self, ctx: &OperationContext, topology: &RepoTopology, paper_dir: &PaperDir) -> SyncResult<()> {
        if let PaperDir::EmptyPlaceholder = paper_dir {
            let path = topology.paper_path();
            fs::remove_dir(&path).map_err(|err| {
                ctx.already_linked(format!("is an empty directory that could not be removed: {err}"))
            })?;
            debug!(path = %path.display(), "removed empty placeholder directory");
        }

        let request = ctx.request();
        let output = self
            .vcs
            .add_subtree(topology.git_root(), &request)
            .await
            .map_err(|err| ctx.vcs_error(err))?;

        if output.success() {
            Ok(())
        } else {
            Err(ctx.tool_failure(&output))
        }
    }

    fn roll_back_link(
        &self,
        manager: &RemoteLinkManager<'_>,
        linked: &LinkedRemote,
        topology: &RepoTopology,
        paper_dir: &PaperDir,
    ) {
        if linked.change != RemoteChange::Unchanged {
            match manager.revert(linked) {
                Ok(()) => warn!(remote = %linked.binding.name, "link failed, remote change rolled back"),
                Err(err) => warn!(remote = %linked.binding.name, error = %err, "could not roll back remote"),
            }
        }

        if let PaperDir::EmptyPlaceholder = paper_dir {
            let path = topology.paper_path();
            if !path.exists() {
                if let Err(err) = fs::create_dir_all(&path) {
                    warn!(path = %path.display(), error = %err, "could not restore placeholder directory");
                }
            }
        }
    }

    /// Merge new remote commits into the paper directory
    pub async fn pull(&self, project_root: &Path, squash: bool) -> SyncResult<SyncOutcome> {
        let operation = SyncOperation::Pull;
        let topology = self.resolve(operation, project_root)?;
        let ctx = self.context(operation, &topology, self.settings.branch.clone());
        let repo = topology.git_root();

        self.require_remote(&ctx, repo)?;
        self.require_linked(&ctx, repo)?;
        self.require_clean(&ctx, repo)?;

        info!(prefix = %ctx.prefix, remote = %ctx.remote, branch = %ctx.branch, squash, "pulling paper");
        let request = ctx.request().with_squash(squash);
        let output = self
            .vcs
            .pull_subtree(repo, &request)
            .await
            .map_err(|err| ctx.vcs_error(err))?;

        let conflicts = match self.vcs.find_conflict_markers(repo, &ctx.prefix) {
            Ok(conflicts) => conflicts,
            Err(err) if !output.success() => {
                warn!(error = %err, "conflict scan failed, classifying tool output only");
                ConflictReport::default()
            }
            Err(err) => return Err(ctx.vcs_error(err)),
        };

        if output.success() {
            if !conflicts.unmerged_paths.is_empty() {
                return Err(ctx.conflicted(conflicts.unmerged_paths));
            }
            info!(prefix = %ctx.prefix, "paper pulled");
            let snapshot = self.snapshot(&ctx, &topology)?;
            return Ok(SyncOutcome::new(operation, SyncAction::Pulled, snapshot));
        }

        Err(Self::pull_failure(&ctx, &output, conflicts))
    }

    fn pull_failure(ctx: &OperationContext, output: &ToolOutput, conflicts: ConflictReport) -> SyncError {
        if !conflicts.unmerged_paths.is_empty() {
            debug!("conflict detected from unmerged index entries");
            return ctx.conflicted(conflicts.unmerged_paths);
        }

        match FailureClassifier::classify(&output.output) {
            FailureClass::Conflicted { paths } if paths.is_empty() => ctx.conflicted(conflicts.marker_paths),
            FailureClass::Conflicted { paths } => ctx.conflicted(paths),
            _ if !conflicts.marker_paths.is_empty() => {
                debug!("conflict detected from markers left in the working tree");
                ctx.conflicted(conflicts.marker_paths)
            }
            _ => ctx.tool_failure(output),
        }
    }

    /// Publish local commits under the paper directory to the remote
    pub async fn push(&self, project_root: &Path) -> SyncResult<SyncOutcome> {
        let operation = SyncOperation::Push;
        let topology = self.resolve(operation, project_root)?;
        let ctx = self.context(operation, &topology, self.settings.branch.clone());
        let repo = topology.git_root();

        self.require_remote(&ctx, repo)?;
        self.require_linked(&ctx, repo)?;

        let counts = self
            .vcs
            .ahead_behind(repo, &ctx.prefix, &ctx.remote, &ctx.branch)
            .map_err(|err| ctx.vcs_error(err))?
            .ok_or_else(|| ctx.not_linked())?;

        if counts.ahead == 0 {
            info!(prefix = %ctx.prefix, "no local commits under the prefix, nothing to push");
            let snapshot = self.snapshot(&ctx, &topology)?;
            return Ok(SyncOutcome::new(operation, SyncAction::NothingToPush, snapshot));
        }

        info!(prefix = %ctx.prefix, remote = %ctx.remote, branch = %ctx.branch, ahead = counts.ahead, "pushing paper");
        let output = self
            .vcs
            .push_subtree(repo, &ctx.request())
            .await
            .map_err(|err| ctx.vcs_error(err))?;
        if !output.success() {
            return Err(ctx.tool_failure(&output));
        }

        info!(prefix = %ctx.prefix, "paper pushed");
        let snapshot = self.snapshot(&ctx, &topology)?;
        Ok(SyncOutcome::new(operation, SyncAction::Pushed, snapshot))
    }

    /// Report the sync state; with `fetch`, refresh remote-tracking refs first
    pub async fn status(&self, project_root: &Path, fetch: bool) -> SyncResult<SyncOutcome> {
        let operation = SyncOperation::Status;
        let topology = self.resolve(operation, project_root)?;
        let ctx = self.context(operation, &topology, self.settings.branch.clone());
        let repo = topology.git_root();

        if fetch {
            let remote = RemoteLinkManager::new(self.vcs.as_ref(), repo)
                .find(&ctx.remote)
                .map_err(|err| ctx.remote_error(err))?;
            if let Some(remote) = remote {
                debug!(remote = %remote.name, "fetching before status");
                let output = self
                    .vcs
                    .fetch(repo, &remote.name)
                    .await
                    .map_err(|err| ctx.vcs_error(err))?;
                if !output.success() {
                    return Err(ctx.tool_failure(&output));
                }
            }
        }

        let snapshot = self.snapshot(&ctx, &topology)?;
        Ok(SyncOutcome::new(operation, SyncAction::Reported, snapshot))
    }

    /// Remove the remote binding; paper content and history stay
    pub async fn unlink(&self, project_root: &Path) -> SyncResult<SyncOutcome> {
        let operation = SyncOperation::Unlink;
        let topology = self.resolve(operation, project_root)?;
        let ctx = self.context(operation, &topology, self.settings.branch.clone());

        let removed = RemoteLinkManager::new(self.vcs.as_ref(), topology.git_root())
            .remove(&ctx.remote)
            .map_err(|err| ctx.remote_error(err))?;
        info!(prefix = %ctx.prefix, remote = %removed.name, "paper unlinked");

        let snapshot = self.snapshot(&ctx, &topology)?;
        let mut outcome = SyncOutcome::new(operation, SyncAction::Unlinked, snapshot);
        outcome.remote = Some(removed);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::vcs::MockVcsExecutor;
    use tempfile::TempDir;

    const URL: &str = "https://git.overleaf.com/6523ab";

    fn project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    fn engine(vcs: MockVcsExecutor) -> SubtreeSyncEngine {
        SubtreeSyncEngine::new(Arc::new(vcs), SyncSettings::default())
    }

    fn failed(output: &str) -> ToolOutput {
        ToolOutput::new("git subtree", Some(1), output)
    }

    #[tokio::test]
    async fn test_pull_on_dirty_tree_never_merges() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_dirty_paths()
            .returning(|_, _| Ok(vec!["paper/main.tex".to_string()]));
        vcs.expect_pull_subtree().never();

        let err = engine(vcs).pull(dir.path(), true).await.unwrap_err();
        assert!(matches!(err, SyncError::DirtyWorkingTree { ref paths, .. } if paths.len() == 1));
        assert_eq!(err.exit_code(), 7);
    }

    #[tokio::test]
    async fn test_push_without_local_commits_is_noop() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_ahead_behind()
            .returning(|_, _, _, _| Ok(Some(Default::default())));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_find_conflict_markers()
            .returning(|_, _| Ok(ConflictReport::default()));
        vcs.expect_push_subtree().never();

        let outcome = engine(vcs).push(dir.path()).await.unwrap();
        assert_eq!(outcome.action, SyncAction::NothingToPush);
        assert!(outcome.is_noop());
    }

    #[tokio::test]
    async fn test_failed_link_removes_created_remote() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_has_tracked_content().returning(|_, _| Ok(false));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_remote_get().returning(|_, _| Ok(None));
        vcs.expect_remote_add().times(1).returning(|_, _, _| Ok(()));
        vcs.expect_add_subtree()
            .returning(|_, _| Ok(failed("fatal: Authentication failed for 'https://git.overleaf.com/6523ab/'")));
        vcs.expect_remote_remove().times(1).returning(|_, _| Ok(()));

        let err = engine(vcs)
            .link(dir.path(), &LinkRequest::new(URL))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::NetworkOrAuthFailure { .. }));
    }

    #[tokio::test]
    async fn test_link_over_tracked_content_touches_nothing() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_remote_add().never();
        vcs.expect_add_subtree().never();

        let err = engine(vcs)
            .link(dir.path(), &LinkRequest::new(URL))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::PrefixAlreadyLinked { .. }));
        assert_eq!(err.exit_code(), 6);
    }

    #[tokio::test]
    async fn test_relink_with_other_url_conflicts_before_prefix_check() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().never();
        vcs.expect_remote_set_url().never();
        vcs.expect_add_subtree().never();

        let err = engine(vcs)
            .link(dir.path(), &LinkRequest::new("https://git.overleaf.com/ffff00"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::RemoteConflict { .. }));
    }

    #[tokio::test]
    async fn test_link_rejects_bad_url_before_touching_git() {
        let dir = project();
        let vcs = MockVcsExecutor::new();

        let err = engine(vcs)
            .link(dir.path(), &LinkRequest::new("not a url"))
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_pull_conflict_prefers_index_paths() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_pull_subtree()
            .returning(|_, _| Ok(failed("Automatic merge failed; fix conflicts and then commit the result.")));
        vcs.expect_find_conflict_markers().returning(|_, _| {
            Ok(ConflictReport {
                unmerged_paths: vec!["paper/main.tex".to_string()],
                marker_paths: vec!["paper/other.tex".to_string()],
            })
        });

        let err = engine(vcs).pull(dir.path(), true).await.unwrap_err();
        assert_eq!(err.paths(), ["paper/main.tex".to_string()]);
        assert_eq!(err.exit_code(), 8);
    }

    #[tokio::test]
    async fn test_pull_failure_survives_conflict_scan_error() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_ahead_behind()
            .returning(|_, _, _, _| Ok(Some(Default::default())));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_pull_subtree()
            .returning(|_, _| Ok(failed("fatal: unable to access 'https://git.overleaf.com/6523ab/': Could not resolve host: git.overleaf.com")));
        vcs.expect_find_conflict_markers().returning(|_, _| {
            Err(VcsError::Io {
                context: "scanning paper for conflict markers".to_string(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            })
        });

        let err = engine(vcs).pull(dir.path(), true).await.unwrap_err();
        assert!(matches!(err, SyncError::NetworkOrAuthFailure { .. }));
    }

    #[tokio::test]
    async fn test_pull_falls_back_to_marker_scan() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_dirty_paths().returning(|_, _| Ok(vec![]));
        vcs.expect_pull_subtree()
            .returning(|_, _| Ok(failed("error: could not apply 1a2b3c")));
        vcs.expect_find_conflict_markers().returning(|_, _| {
            Ok(ConflictReport {
                unmerged_paths: vec![],
                marker_paths: vec!["paper/intro.tex".to_string()],
            })
        });

        let err = engine(vcs).pull(dir.path(), false).await.unwrap_err();
        assert!(matches!(err, SyncError::Conflicted { .. }));
        assert_eq!(err.paths(), ["paper/intro.tex".to_string()]);
    }

    #[tokio::test]
    async fn test_push_rejected_by_remote() {
        let dir = project();
        let mut vcs = MockVcsExecutor::new();
        vcs.expect_remote_get()
            .returning(|_, _| Ok(Some(URL.to_string())));
        vcs.expect_has_tracked_content().returning(|_, _| Ok(true));
        vcs.expect_ahead_behind()
            .returning(|_, _, _, _| Ok(Some(crate::domain::entities::AheadBehind::new(2, 1))));
        vcs.expect_push_subtree().times(1).returning(|_, _| {
            Ok(failed(" ! [rejected]  abc -> master (fetch first)\nerror: failed to push some refs"))
        });

        let err = engine(vcs).push(dir.path()).await.unwrap_err();
        assert!(matches!(err, SyncError::PushRejected { .. }));
    }
}
