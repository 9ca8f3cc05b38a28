use crate::domain::value_objects::BranchName;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REMOTE: &str = "overleaf";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_PAPER_DIR: &str = "paper";

/// Per-project sync settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Name of the git remote bound to the paper
    pub remote: String,
    /// Remote branch to sync with; Overleaf serves `master`
    pub branch: BranchName,
    /// Paper directory, relative to the project root
    pub paper_dir: String,
    /// Let git prompt for credentials on the terminal
    pub interactive_auth: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            branch: BranchName::master(),
            paper_dir: DEFAULT_PAPER_DIR.to_string(),
            interactive_auth: true,
        }
    }
}

impl SyncSettings {
    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    pub fn with_branch(mut self, branch: BranchName) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_paper_dir(mut self, paper_dir: impl Into<String>) -> Self {
        self.paper_dir = paper_dir.into();
        self
    }

    pub fn with_interactive_auth(mut self, interactive: bool) -> Self {
        self.interactive_auth = interactive;
        self
    }
}
