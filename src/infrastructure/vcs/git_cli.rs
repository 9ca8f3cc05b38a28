use super::conflict_scan;
use super::sync_history;
use super::vcs_interface::{
    ChangeScope, ConflictReport, SubtreeRequest, ToolOutput, VcsError, VcsExecutor,
};
use crate::domain::entities::AheadBehind;
use crate::domain::value_objects::{BranchName, SubtreePrefix};
use crate::infrastructure::process::{CommandExecutor, ExecutionConfig};
use async_trait::async_trait;
use git2::{ErrorCode, Repository, Status, StatusOptions};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

const GIT: &str = "git";

/// [`VcsExecutor`] backed by the `git` binary for subtree and network
/// operations, and by libgit2 for everything that stays local.
pub struct GitCliExecutor {
    interactive_auth: bool,
}

impl Default for GitCliExecutor {
    fn default() -> Self {
        Self {
            interactive_auth: true,
        }
    }
}

impl GitCliExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// When disabled, git fails instead of prompting for credentials
    pub fn with_interactive_auth(mut self, interactive: bool) -> Self {
        self.interactive_auth = interactive;
        self
    }

    fn open(&self, repo: &Path) -> Result<Repository, VcsError> {
        Repository::open(repo).map_err(|source| VcsError::Open {
            path: repo.to_path_buf(),
            source,
        })
    }

    fn execution_config(&self, repo: &Path) -> ExecutionConfig {
        // C locale keeps git's messages stable for failure classification
        let config = ExecutionConfig::new()
            .with_working_directory(repo)
            .with_environment_variable("LC_ALL", "C");

        if self.interactive_auth {
            config
        } else {
            config.with_environment_variable("GIT_TERMINAL_PROMPT", "0")
        }
    }

    async fn run_git(&self, repo: &Path, args: Vec<String>) -> Result<ToolOutput, VcsError> {
        let config = self.execution_config(repo);
        let result = CommandExecutor::execute(GIT, &args, &config).await?;

        Ok(ToolOutput::new(
            CommandExecutor::command_line(GIT, &args),
            result.exit_code,
            result.combined_output(),
        ))
    }

    fn subtree_args(subcommand: &str, request: &SubtreeRequest) -> Vec<String> {
        let mut args = vec![
            "subtree".to_string(),
            subcommand.to_string(),
            format!("--prefix={}", request.prefix),
        ];
        // recent git rejects --squash on push
        if request.squash && subcommand != "push" {
            args.push("--squash".to_string());
        }
        args.push(request.remote.clone());
        args.push(request.branch.to_string());
        args
    }
}

#[async_trait]
impl VcsExecutor for GitCliExecutor {
    async fn add_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.run_git(repo, Self::subtree_args("add", request)).await
    }

    async fn pull_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.run_git(repo, Self::subtree_args("pull", request)).await
    }

    async fn push_subtree(&self, repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.run_git(repo, Self::subtree_args("push", request)).await
    }

    async fn fetch(&self, repo: &Path, remote: &str) -> Result<ToolOutput, VcsError> {
        self.run_git(repo, vec!["fetch".to_string(), remote.to_string()])
            .await
    }

    fn remote_get(&self, repo: &Path, name: &str) -> Result<Option<String>, VcsError> {
        let repo = self.open(repo)?;
        let url = match repo.find_remote(name) {
            Ok(remote) => Ok(Some(String::from_utf8_lossy(remote.url_bytes()).into_owned())),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(VcsError::git(format!("looking up remote '{name}'"), e)),
        };
        url
    }

    fn remote_add(&self, repo: &Path, name: &str, url: &str) -> Result<(), VcsError> {
        let repo = self.open(repo)?;
        repo.remote(name, url)
            .map_err(|e| VcsError::git(format!("adding remote '{name}'"), e))?;
        debug!(remote = name, "remote added");
        Ok(())
    }

    fn remote_set_url(&self, repo: &Path, name: &str, url: &str) -> Result<(), VcsError> {
        let repo = self.open(repo)?;
        repo.remote_set_url(name, url)
            .map_err(|e| VcsError::git(format!("updating url of remote '{name}'"), e))
    }

    fn remote_remove(&self, repo: &Path, name: &str) -> Result<(), VcsError> {
        let repo = self.open(repo)?;
        repo.remote_delete(name)
            .map_err(|e| VcsError::git(format!("removing remote '{name}'"), e))?;
        debug!(remote = name, "remote removed");
        Ok(())
    }

    fn dirty_paths(&self, repo: &Path, scope: &ChangeScope) -> Result<Vec<String>, VcsError> {
        let repo = self.open(repo)?;

        let mut options = StatusOptions::new();
        options
            .include_untracked(scope.include_untracked)
            .recurse_untracked_dirs(scope.include_untracked)
            .include_ignored(false)
            .exclude_submodules(true);
        if let Some(prefix) = &scope.prefix {
            options.pathspec(prefix.as_str());
        }

        let statuses = repo
            .statuses(Some(&mut options))
            .map_err(|e| VcsError::git("reading working tree status", e))?;

        let paths: BTreeSet<String> = statuses
            .iter()
            .filter(|entry| {
                let status = entry.status();
                status != Status::CURRENT && !status.contains(Status::IGNORED)
            })
            .filter_map(|entry| entry.path().map(str::to_string))
            .filter(|path| {
                scope
                    .prefix
                    .as_ref()
                    .map_or(true, |prefix| prefix.contains(path))
            })
            .collect();

        Ok(paths.into_iter().collect())
    }

    fn has_tracked_content(&self, repo: &Path, prefix: &SubtreePrefix) -> Result<bool, VcsError> {
        let repo = self.open(repo)?;
        let index = repo
            .index()
            .map_err(|e| VcsError::git("reading the index", e))?;

        let tracked = index
            .iter()
            .any(|entry| prefix.contains(&String::from_utf8_lossy(&entry.path)));
        Ok(tracked)
    }

    fn ahead_behind(
        &self,
        repo: &Path,
        prefix: &SubtreePrefix,
        remote: &str,
        branch: &BranchName,
    ) -> Result<Option<AheadBehind>, VcsError> {
        let repo = self.open(repo)?;
        let tracking_ref = format!("refs/remotes/{remote}/{branch}");

        let counts = sync_history::ahead_behind(&repo, prefix, &tracking_ref)
            .map_err(|e| VcsError::git(format!("computing sync state of '{prefix}'"), e))?;
        debug!(prefix = %prefix, tracking_ref, ?counts, "computed ahead/behind");
        Ok(counts)
    }

    fn find_conflict_markers(&self, repo_path: &Path, prefix: &SubtreePrefix) -> Result<ConflictReport, VcsError> {
        let repo = self.open(repo_path)?;
        let index = repo
            .index()
            .map_err(|e| VcsError::git("reading the index", e))?;

        let mut unmerged = BTreeSet::new();
        if index.has_conflicts() {
            let conflicts = index
                .conflicts()
                .map_err(|e| VcsError::git("listing index conflicts", e))?;
            for conflict in conflicts {
                let conflict = conflict.map_err(|e| VcsError::git("reading index conflict", e))?;
                if let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) {
                    unmerged.insert(String::from_utf8_lossy(&entry.path).into_owned());
                }
            }
        }

        let workdir = repo.workdir().unwrap_or(repo_path);
        let marker_paths =
            conflict_scan::scan_prefix(workdir, prefix).map_err(|source| VcsError::Io {
                context: format!("scanning '{prefix}' for conflict markers"),
                source,
            })?;

        Ok(ConflictReport {
            unmerged_paths: unmerged.into_iter().collect(),
            marker_paths,
        })
    }
}
