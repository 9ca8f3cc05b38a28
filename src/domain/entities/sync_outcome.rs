use super::remote_binding::RemoteBinding;
use super::sync_status::SyncStatusSnapshot;
use crate::domain::value_objects::SubtreePrefix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync operations exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Link,
    Pull,
    Push,
    Status,
    Unlink,
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncOperation::Link => "link",
            SyncOperation::Pull => "pull",
            SyncOperation::Push => "push",
            SyncOperation::Status => "status",
            SyncOperation::Unlink => "unlink",
        };
        f.write_str(name)
    }
}

/// What an operation actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncAction {
    Linked,
    Pulled,
    Pushed,
    /// Push found no local commits under the prefix; the tool was not run
    NothingToPush,
    Unlinked,
    /// Read-only status report
    Reported,
}

/// Result of a successful sync operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub operation: SyncOperation,
    pub action: SyncAction,
    pub prefix: SubtreePrefix,
    pub remote: Option<RemoteBinding>,
    /// Status right after the operation
    pub snapshot: SyncStatusSnapshot,
}

impl SyncOutcome {
    pub fn new(operation: SyncOperation, action: SyncAction, snapshot: SyncStatusSnapshot) -> Self {
        Self {
            operation,
            action,
            prefix: snapshot.prefix.clone(),
            remote: snapshot.remote.clone(),
            snapshot,
        }
    }

    /// Whether the operation left the repository untouched
    pub fn is_noop(&self) -> bool {
        matches!(self.action, SyncAction::NothingToPush | SyncAction::Reported)
    }
}
