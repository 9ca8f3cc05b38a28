use super::remote_binding::RemoteBinding;
use crate::domain::value_objects::SubtreePrefix;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived sync state of a paper subtree.
///
/// Never stored: it is recomputed from the working tree and the commit graph
/// on every call, since edits on either side change it behind our back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    /// No remote binding, or the subtree was never added
    Unlinked,
    /// Nothing to pull, nothing to push
    Clean,
    /// Local commits under the prefix not yet pushed
    Ahead,
    /// Remote commits not yet pulled
    Behind,
    /// Both sides have new commits
    Diverged,
    /// Uncommitted changes under the prefix
    Dirty,
    /// A pull stopped on merge conflicts
    Conflicted,
}

impl SyncState {
    /// State implied by commit counts alone
    pub fn from_counts(counts: AheadBehind) -> Self {
        match (counts.ahead, counts.behind) {
            (0, 0) => SyncState::Clean,
            (_, 0) => SyncState::Ahead,
            (0, _) => SyncState::Behind,
            _ => SyncState::Diverged,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Unlinked => "UNLINKED",
            SyncState::Clean => "CLEAN",
            SyncState::Ahead => "AHEAD",
            SyncState::Behind => "BEHIND",
            SyncState::Diverged => "DIVERGED",
            SyncState::Dirty => "DIRTY",
            SyncState::Conflicted => "CONFLICTED",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commits since the last sync point, on each side
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AheadBehind {
    /// Local commits touching the prefix since the last link/pull
    pub ahead: usize,
    /// Remote-tracking commits not yet merged into the prefix
    pub behind: usize,
}

impl AheadBehind {
    pub fn new(ahead: usize, behind: usize) -> Self {
        Self { ahead, behind }
    }
}

/// Point-in-time view of a project's sync status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatusSnapshot {
    pub state: SyncState,
    pub ahead: usize,
    pub behind: usize,
    pub remote: Option<RemoteBinding>,
    pub prefix: SubtreePrefix,
    /// Uncommitted paths under the prefix, repository-relative
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<String>,
}

impl SyncStatusSnapshot {
    /// Snapshot for a prefix that is not linked; counts are reported as zero
    pub fn unlinked(prefix: SubtreePrefix, remote: Option<RemoteBinding>) -> Self {
        Self {
            state: SyncState::Unlinked,
            ahead: 0,
            behind: 0,
            remote,
            prefix,
            changes: Vec::new(),
        }
    }

    /// Snapshot for a linked prefix. Pending changes take precedence over
    /// the commit counts.
    pub fn linked(
        prefix: SubtreePrefix,
        remote: RemoteBinding,
        counts: AheadBehind,
        changes: Vec<String>,
    ) -> Self {
        let state = if changes.is_empty() {
            SyncState::from_counts(counts)
        } else {
            SyncState::Dirty
        };

        Self {
            state,
            ahead: counts.ahead,
            behind: counts.behind,
            remote: Some(remote),
            prefix,
            changes,
        }
    }

    /// Mark a linked snapshot as stopped mid-merge when `unmerged` is not
    /// empty; conflicts outrank every other state
    pub fn with_conflicts(mut self, unmerged: Vec<String>) -> Self {
        if self.is_linked() && !unmerged.is_empty() {
            self.state = SyncState::Conflicted;
            for path in unmerged {
                if !self.changes.contains(&path) {
                    self.changes.push(path);
                }
            }
            self.changes.sort();
        }
        self
    }

    pub fn is_linked(&self) -> bool {
        self.state != SyncState::Unlinked
    }
}
