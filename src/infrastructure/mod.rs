/// Infrastructure layer modules
///
/// Concrete implementations for external system interactions:
/// - version control (libgit2 queries, `git subtree` subprocesses)
/// - file system (settings file, project root discovery)
/// - process execution
pub mod filesystem;
pub mod process;
pub mod vcs;

pub use filesystem::{locate_project_root, SettingsStore, SettingsStoreError};
pub use process::CommandExecutor;
pub use vcs::{GitCliExecutor, VcsError, VcsExecutor};
