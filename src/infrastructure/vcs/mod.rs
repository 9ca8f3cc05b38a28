//! Version-control seam: the [`VcsExecutor`] capability set and its git
//! implementation.

pub mod conflict_scan;
pub mod git_cli;
pub mod sync_history;
pub mod vcs_interface;

pub use git_cli::GitCliExecutor;
pub use vcs_interface::{
    ChangeScope, ConflictReport, SubtreeRequest, ToolOutput, VcsError, VcsExecutor,
};

#[cfg(test)]
pub use vcs_interface::MockVcsExecutor;
