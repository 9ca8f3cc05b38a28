use crate::domain::entities::RepoTopology;
use crate::domain::value_objects::{SubtreePrefix, SubtreePrefixError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Topology resolution errors
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{} is not inside a git repository", .path.display())]
    NotARepository { path: PathBuf },

    #[error("project root {} is not accessible: {source}", .path.display())]
    InvalidProjectRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot derive a subtree prefix for {}: {source}", .path.display())]
    InvalidPrefix {
        path: PathBuf,
        #[source]
        source: SubtreePrefixError,
    },
}

/// Decides whether a project is the root of its own repository or nested
/// inside a larger one, and computes the subtree prefix accordingly.
///
/// Resolution depends only on its argument and the filesystem, never on the
/// process working directory.
#[derive(Debug, Clone)]
pub struct RepoTopologyResolver {
    paper_dir: String,
}

impl RepoTopologyResolver {
    pub fn new(paper_dir: impl Into<String>) -> Self {
        Self {
            paper_dir: paper_dir.into(),
        }
    }

    pub fn paper_dir(&self) -> &str {
        &self.paper_dir
    }

    /// Resolve the topology of `project_root`. The paper directory itself
    /// does not need to exist yet.
    pub fn resolve(&self, project_root: &Path) -> Result<RepoTopology, TopologyError> {
        let project_root =
            fs::canonicalize(project_root).map_err(|source| TopologyError::InvalidProjectRoot {
                path: project_root.to_path_buf(),
                source,
            })?;

        if !project_root.is_dir() {
            return Err(TopologyError::InvalidProjectRoot {
                source: io::Error::new(io::ErrorKind::Other, "not a directory"),
                path: project_root,
            });
        }

        let git_root = find_git_root(&project_root).ok_or_else(|| TopologyError::NotARepository {
            path: project_root.clone(),
        })?;

        let relative = pathdiff::diff_paths(&project_root, &git_root).unwrap_or_default();
        let prefix = SubtreePrefix::from_relative_path(&relative, &self.paper_dir).map_err(
            |source| TopologyError::InvalidPrefix {
                path: project_root.clone(),
                source,
            },
        )?;

        let topology = RepoTopology::new(git_root, project_root, prefix);
        debug!(
            git_root = %topology.git_root().display(),
            mode = %topology.mode(),
            prefix = %topology.prefix(),
            "resolved repository topology"
        );
        Ok(topology)
    }
}

/// Nearest ancestor of `start` (inclusive) holding a `.git` entry. A `.git`
/// file counts too, as used by worktrees and submodules.
pub fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
