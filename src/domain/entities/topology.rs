use crate::domain::value_objects::SubtreePrefix;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where the project sits relative to its enclosing repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TopologyMode {
    /// The project directory is the repository root
    Standalone,
    /// The project directory is a subdirectory of a larger repository
    Nested,
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopologyMode::Standalone => f.write_str("standalone"),
            TopologyMode::Nested => f.write_str("nested"),
        }
    }
}

/// Resolved layout of a project inside its repository.
///
/// Built fresh for every sync operation; the same binary may be run from a
/// standalone root and from a nested child in one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoTopology {
    git_root: PathBuf,
    project_root: PathBuf,
    mode: TopologyMode,
    prefix: SubtreePrefix,
}

impl RepoTopology {
    /// `git_root` must be `project_root` or one of its ancestors. The mode is
    /// derived from whether the two are equal.
    pub fn new(git_root: PathBuf, project_root: PathBuf, prefix: SubtreePrefix) -> Self {
        debug_assert!(project_root.starts_with(&git_root));

        let mode = if git_root == project_root {
            TopologyMode::Standalone
        } else {
            TopologyMode::Nested
        };

        Self {
            git_root,
            project_root,
            mode,
            prefix,
        }
    }

    pub fn git_root(&self) -> &Path {
        &self.git_root
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn mode(&self) -> TopologyMode {
        self.mode
    }

    pub fn prefix(&self) -> &SubtreePrefix {
        &self.prefix
    }

    pub fn is_standalone(&self) -> bool {
        self.mode == TopologyMode::Standalone
    }

    /// Absolute path of the synced paper directory
    pub fn paper_path(&self) -> PathBuf {
        self.git_root.join(self.prefix.to_path())
    }
}
