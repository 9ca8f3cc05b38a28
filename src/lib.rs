//! # expaper - paper subtree synchronization
//!
//! `expaper` keeps the `paper/` directory of a research project in sync with an
//! Overleaf project through `git subtree`. The paper's history lives in the
//! host repository; the only sync state is a named git remote.
//!
//! ## Topologies
//!
//! - **Standalone**: the project root is the git root, the subtree prefix is
//!   `paper`.
//! - **Nested**: the project lives inside a larger repository, e.g.
//!   `/repo/projects/first-paper`, and the prefix becomes
//!   `projects/first-paper/paper`.
//!
//! ## Quick Start
//!
//! ```bash
//! expaper link-overleaf https://git.overleaf.com/6523ab...
//! expaper sync pull
//! git commit -am "tighten the abstract"
//! expaper sync push
//! expaper sync status
//! ```
//!
//! An optional `.expaper.yml` in the project root overrides the defaults:
//!
//! ```yaml
//! sync:
//!   remote: overleaf
//!   branch: master
//!   paper_dir: paper
//!   interactive_auth: true
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: topology, remote bindings, sync states and settings
//! - [`application`]: topology resolution, remote management, status
//!   reporting and the [`SubtreeSyncEngine`]
//! - [`infrastructure`]: git access (libgit2 queries, `git subtree`
//!   subprocesses), settings file, process execution
//! - [`presentation`]: CLI interface and terminal rendering
//! - [`common`]: the [`SyncError`] taxonomy
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use expaper::{GitCliExecutor, SubtreeSyncEngine, SyncSettings};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> expaper::Result<()> {
//! let engine = SubtreeSyncEngine::new(Arc::new(GitCliExecutor::new()), SyncSettings::default());
//!
//! let outcome = engine.status(Path::new("/repo/paper-a"), false).await?;
//! println!("{} is {}", outcome.prefix, outcome.snapshot.state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Operations run one git step at a time and never in parallel. Running two
//! commands against the same project at once is not supported.

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::application::use_cases::{LinkRequest, SubtreeSyncEngine};
pub use crate::common::error::SyncError;
pub use crate::common::result::SyncResult as Result;
pub use crate::domain::entities::{SyncAction, SyncOutcome, SyncSettings, SyncState, SyncStatusSnapshot};
pub use crate::infrastructure::vcs::{GitCliExecutor, VcsExecutor};
