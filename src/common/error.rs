use crate::domain::entities::{SyncOperation, SyncState};
use crate::domain::value_objects::{BranchName, SubtreePrefix};
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a sync operation.
///
/// Every variant names the operation that failed and, once the topology is
/// known, the prefix and remote involved. Messages end with a remediation
/// hint where one exists.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{operation} failed: {} is not inside a git repository\n  hint: run `git init` first, or pass -C <dir>", .path.display())]
    NotARepository {
        operation: SyncOperation,
        path: PathBuf,
    },

    #[error("{operation} failed: no remote named '{remote}' is configured for prefix '{prefix}'\n  hint: link the paper first with `expaper link-overleaf <url>`")]
    RemoteNotConfigured {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
    },

    #[error("{operation} failed: prefix '{prefix}' has not been added as a subtree from remote '{remote}'\n  hint: link the paper first with `expaper link-overleaf <url>`")]
    PrefixNotLinked {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
    },

    #[error("{operation} failed: remote '{remote}' already points at {existing_url}, not {requested_url}\n  hint: pass --replace-remote to repoint it, or run `expaper unlink-overleaf` first")]
    RemoteConflict {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        existing_url: String,
        requested_url: String,
    },

    #[error("{operation} failed: prefix '{prefix}' {reason}\n  hint: the paper is already linked; use `expaper sync pull` instead, or move the directory away")]
    PrefixAlreadyLinked {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        reason: String,
    },

    #[error("{operation} refused: working tree is DIRTY ({} uncommitted path(s){})\n  hint: commit or stash your changes, then retry", .paths.len(), path_list(.paths))]
    DirtyWorkingTree {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        paths: Vec<String>,
    },

    #[error("{operation} stopped: merge from {remote}/{branch} into '{prefix}' is CONFLICTED{}\n  hint: resolve the conflicts, `git add` the files and `git commit`, then run `expaper sync push`", path_list(.paths))]
    Conflicted {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        branch: BranchName,
        paths: Vec<String>,
    },

    #[error("{operation} rejected: {remote}/{branch} has commits that are not in '{prefix}' yet\n  hint: run `expaper sync pull` first, then push again")]
    PushRejected {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        branch: BranchName,
    },

    #[error("{operation} failed: could not reach remote '{remote}' ({reason})\n  hint: check your network connection and Overleaf credentials (a git token is required for Overleaf)")]
    NetworkOrAuthFailure {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        branch: BranchName,
        reason: String,
    },

    #[error("{operation} failed: `{command}` exited with {}\n{output}", exit_description(.exit_code))]
    UnknownToolFailure {
        operation: SyncOperation,
        prefix: SubtreePrefix,
        remote: String,
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("{operation} failed: invalid {field} '{value}': {reason}")]
    InvalidArgument {
        operation: SyncOperation,
        field: String,
        value: String,
        reason: String,
    },

    #[error("configuration error in {}: {message}", .path.display())]
    Configuration { path: PathBuf, message: String },
}

fn path_list(paths: &[String]) -> String {
    const SHOWN: usize = 10;

    if paths.is_empty() {
        return String::new();
    }
    let mut listed = paths
        .iter()
        .take(SHOWN)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if paths.len() > SHOWN {
        listed.push_str(&format!(", and {} more", paths.len() - SHOWN));
    }
    format!(": {listed}")
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

impl SyncError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::UnknownToolFailure { .. } => 1,
            SyncError::NotARepository { .. } => 3,
            SyncError::RemoteNotConfigured { .. } => 4,
            SyncError::RemoteConflict { .. } => 5,
            SyncError::PrefixAlreadyLinked { .. } => 6,
            SyncError::DirtyWorkingTree { .. } => 7,
            SyncError::Conflicted { .. } => 8,
            SyncError::NetworkOrAuthFailure { .. } => 9,
            SyncError::InvalidArgument { .. } => 10,
            SyncError::Configuration { .. } => 11,
            SyncError::PrefixNotLinked { .. } => 12,
            SyncError::PushRejected { .. } => 13,
        }
    }

    /// Stable machine-readable name of the failure kind
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::NotARepository { .. } => "NotARepository",
            SyncError::RemoteNotConfigured { .. } => "RemoteNotConfigured",
            SyncError::PrefixNotLinked { .. } => "PrefixNotLinked",
            SyncError::RemoteConflict { .. } => "RemoteConflict",
            SyncError::PrefixAlreadyLinked { .. } => "PrefixAlreadyLinked",
            SyncError::DirtyWorkingTree { .. } => "DirtyWorkingTree",
            SyncError::Conflicted { .. } => "Conflicted",
            SyncError::PushRejected { .. } => "PushRejected",
            SyncError::NetworkOrAuthFailure { .. } => "NetworkOrAuthFailure",
            SyncError::UnknownToolFailure { .. } => "UnknownToolFailure",
            SyncError::InvalidArgument { .. } => "InvalidArgument",
            SyncError::Configuration { .. } => "Configuration",
        }
    }

    /// Sync state this failure leaves the project in, when it maps to one
    pub fn sync_state(&self) -> Option<SyncState> {
        match self {
            SyncError::DirtyWorkingTree { .. } => Some(SyncState::Dirty),
            SyncError::Conflicted { .. } => Some(SyncState::Conflicted),
            SyncError::RemoteNotConfigured { .. } | SyncError::PrefixNotLinked { .. } => {
                Some(SyncState::Unlinked)
            }
            _ => None,
        }
    }

    /// Operation that failed, `None` for configuration errors raised before
    /// any operation started
    pub fn operation(&self) -> Option<SyncOperation> {
        match self {
            SyncError::NotARepository { operation, .. }
            | SyncError::RemoteNotConfigured { operation, .. }
            | SyncError::PrefixNotLinked { operation, .. }
            | SyncError::RemoteConflict { operation, .. }
            | SyncError::PrefixAlreadyLinked { operation, .. }
            | SyncError::DirtyWorkingTree { operation, .. }
            | SyncError::Conflicted { operation, .. }
            | SyncError::PushRejected { operation, .. }
            | SyncError::NetworkOrAuthFailure { operation, .. }
            | SyncError::UnknownToolFailure { operation, .. }
            | SyncError::InvalidArgument { operation, .. } => Some(*operation),
            SyncError::Configuration { .. } => None,
        }
    }

    /// Paths a user has to act on (dirty or conflicted files)
    pub fn paths(&self) -> &[String] {
        match self {
            SyncError::DirtyWorkingTree { paths, .. } | SyncError::Conflicted { paths, .. } => paths,
            _ => &[],
        }
    }

    pub fn invalid_argument(
        operation: SyncOperation,
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        SyncError::InvalidArgument {
            operation,
            field: field.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn configuration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        SyncError::Configuration {
            path: path.into(),
            message: message.into(),
        }
    }
}
