use crate::domain::entities::AheadBehind;
use crate::domain::value_objects::{BranchName, SubtreePrefix};
use crate::infrastructure::process::CommandExecutorError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by a [`VcsExecutor`] itself, as opposed to a tool run that
/// completed with a non-zero exit (see [`ToolOutput`]).
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to open repository at {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: git2::Error,
    },

    #[error("{context}: {source}")]
    Git {
        context: String,
        #[source]
        source: git2::Error,
    },

    #[error(transparent)]
    Process(#[from] CommandExecutorError),

    #[error("I/O error while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl VcsError {
    pub fn git(context: impl Into<String>, source: git2::Error) -> Self {
        VcsError::Git {
            context: context.into(),
            source,
        }
    }

    /// Whether the failure came from the transport layer
    pub fn is_network(&self) -> bool {
        match self {
            VcsError::Git { source, .. } | VcsError::Open { source, .. } => matches!(
                source.class(),
                git2::ErrorClass::Net | git2::ErrorClass::Http | git2::ErrorClass::Ssh
            ),
            _ => false,
        }
    }
}

/// Parameters shared by subtree add, pull and push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtreeRequest {
    pub prefix: SubtreePrefix,
    pub remote: String,
    pub branch: BranchName,
    /// Collapse remote history into one commit. Ignored by push.
    pub squash: bool,
}

impl SubtreeRequest {
    pub fn new(prefix: SubtreePrefix, remote: impl Into<String>, branch: BranchName) -> Self {
        Self {
            prefix,
            remote: remote.into(),
            branch,
            squash: true,
        }
    }

    pub fn with_squash(mut self, squash: bool) -> Self {
        self.squash = squash;
        self
    }
}

/// Captured result of one external tool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub command: String,
    pub exit_code: Option<i32>,
    /// stderr and stdout, in that order
    pub output: String,
}

impl ToolOutput {
    pub fn new(command: impl Into<String>, exit_code: Option<i32>, output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            exit_code,
            output: output.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Which uncommitted changes count when checking for a dirty tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeScope {
    /// Restrict to paths under this prefix; `None` means the whole repository
    pub prefix: Option<SubtreePrefix>,
    pub include_untracked: bool,
}

impl ChangeScope {
    /// Tracked changes anywhere in the repository; what `git subtree`
    /// refuses to run on
    pub fn repository() -> Self {
        Self {
            prefix: None,
            include_untracked: false,
        }
    }

    /// Every pending change under `prefix`, untracked files included
    pub fn prefix(prefix: SubtreePrefix) -> Self {
        Self {
            prefix: Some(prefix),
            include_untracked: true,
        }
    }
}

/// Conflict evidence left in a working tree after a merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    /// Paths with unmerged index entries
    pub unmerged_paths: Vec<String>,
    /// Files under the prefix that still contain conflict markers
    pub marker_paths: Vec<String>,
}

impl ConflictReport {
    pub fn is_empty(&self) -> bool {
        self.unmerged_paths.is_empty() && self.marker_paths.is_empty()
    }
}

/// Version-control capabilities the sync engine needs.
///
/// Subtree operations and fetches talk to the network and return the
/// captured [`ToolOutput`] even on failure, leaving classification to the
/// caller. The remaining queries are local and fail only on I/O or
/// repository corruption.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VcsExecutor: Send + Sync {
    /// Import `branch` of `remote` under the prefix
    async fn add_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError>;

    /// Merge new remote commits into the prefix
    async fn pull_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError>;

    /// Split local prefix history and push it to the remote branch
    async fn push_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError>;

    /// Update remote-tracking refs for `remote`
    async fn fetch(&self, repo: &Path, remote: &str) -> Result<ToolOutput, VcsError>;

    /// URL of `name`, `None` when no such remote exists
    fn remote_get(&self, repo: &Path, name: &str) -> Result<Option<String>, VcsError>;

    fn remote_add(&self, repo: &Path, name: &str, url: &str) -> Result<(), VcsError>;

    fn remote_set_url(&self, repo: &Path, name: &str, url: &str) -> Result<(), VcsError>;

    fn remote_remove(&self, repo: &Path, name: &str) -> Result<(), VcsError>;

    /// Repository-relative paths with uncommitted changes in `scope`; empty
    /// when the scope is clean
    fn dirty_paths(&self, repo: &Path, scope: &ChangeScope) -> Result<Vec<String>, VcsError>;

    /// Whether the index holds any file under `prefix`
    fn has_tracked_content(&self, repo: &Path, prefix: &SubtreePrefix) -> Result<bool, VcsError>;

    /// Commit counts on each side since the last sync of `prefix`; `None`
    /// when the prefix was never added as a subtree
    fn ahead_behind(
        &self,
        repo: &Path,
        prefix: &SubtreePrefix,
        remote: &str,
        branch: &BranchName,
    ) -> Result<Option<AheadBehind>, VcsError>;

    /// Unmerged index entries anywhere, and marker-bearing files under `prefix`
    fn find_conflict_markers(&self, repo: &Path, prefix: &SubtreePrefix) -> Result<ConflictReport, VcsError>;
}
