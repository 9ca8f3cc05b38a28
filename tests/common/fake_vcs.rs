//! In-memory [`VcsExecutor`] for engine scenarios.
//!
//! Models the repository as a handful of facts (remotes, whether the prefix
//! is tracked, pending changes, commit counts) and records every call, so
//! tests can assert both outcomes and which git steps were attempted.

use async_trait::async_trait;
use expaper::domain::entities::AheadBehind;
use expaper::domain::value_objects::{BranchName, SubtreePrefix};
use expaper::infrastructure::vcs::{
    ChangeScope, ConflictReport, SubtreeRequest, ToolOutput, VcsError, VcsExecutor,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct FakeState {
    remotes: BTreeMap<String, String>,
    tracked: bool,
    subtree_added: bool,
    dirty: Vec<String>,
    prefix_changes: Vec<String>,
    counts: AheadBehind,
    conflicts: ConflictReport,
    add_failure: Option<String>,
    pull_failure: Option<String>,
    push_failure: Option<String>,
    fetch_failure: Option<String>,
    calls: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeVcs {
    state: Mutex<FakeState>,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository where the paper was already added from `remote`
    pub fn linked(remote: &str, url: &str) -> Self {
        let fake = Self::new().with_remote(remote, url);
        {
            let mut state = fake.lock();
            state.tracked = true;
            state.subtree_added = true;
        }
        fake
    }

    pub fn with_remote(self, name: &str, url: &str) -> Self {
        self.lock().remotes.insert(name.to_string(), url.to_string());
        self
    }

    /// Files under the prefix are tracked, but no subtree merge exists
    pub fn with_tracked_content(self) -> Self {
        self.lock().tracked = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn set_dirty(&self, paths: &[&str]) {
        let mut state = self.lock();
        state.dirty = paths.iter().map(|p| p.to_string()).collect();
        state.prefix_changes = state.dirty.clone();
    }

    pub fn set_untracked_in_prefix(&self, paths: &[&str]) {
        self.lock().prefix_changes = paths.iter().map(|p| p.to_string()).collect();
    }

    pub fn set_counts(&self, ahead: usize, behind: usize) {
        self.lock().counts = AheadBehind::new(ahead, behind);
    }

    /// Commit pending changes under the prefix
    pub fn commit(&self) {
        let mut state = self.lock();
        if !state.dirty.is_empty() {
            state.counts.ahead += 1;
        }
        state.dirty.clear();
        state.prefix_changes.clear();
    }

    pub fn fail_add(&self, output: &str) {
        self.lock().add_failure = Some(output.to_string());
    }

    pub fn fail_pull(&self, output: &str) {
        self.lock().pull_failure = Some(output.to_string());
    }

    pub fn fail_push(&self, output: &str) {
        self.lock().push_failure = Some(output.to_string());
    }

    pub fn fail_fetch(&self, output: &str) {
        self.lock().fetch_failure = Some(output.to_string());
    }

    pub fn set_conflicts(&self, unmerged: &[&str], markers: &[&str]) {
        self.lock().conflicts = ConflictReport {
            unmerged_paths: unmerged.iter().map(|p| p.to_string()).collect(),
            marker_paths: markers.iter().map(|p| p.to_string()).collect(),
        };
    }

    pub fn remote(&self, name: &str) -> Option<String> {
        self.lock().remotes.get(name).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.lock().calls.iter().any(|call| call.starts_with(operation))
    }

    fn record(&self, call: String) {
        self.lock().calls.push(call);
    }

    fn output(command: &str, failure: Option<String>) -> ToolOutput {
        match failure {
            Some(output) => ToolOutput::new(command, Some(1), output),
            None => ToolOutput::new(command, Some(0), ""),
        }
    }
}

#[async_trait]
impl VcsExecutor for FakeVcs {
    async fn add_subtree(&self, _repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.record(format!("add_subtree {} {} {}", request.prefix, request.remote, request.branch));
        let failure = self.lock().add_failure.clone();
        if failure.is_none() {
            let mut state = self.lock();
            state.tracked = true;
            state.subtree_added = true;
            state.counts = AheadBehind::default();
        }
        Ok(Self::output("git subtree add", failure))
    }

    async fn pull_subtree(&self, _repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.record(format!("pull_subtree {} squash={}", request.prefix, request.squash));
        let failure = self.lock().pull_failure.clone();
        if failure.is_none() {
            self.lock().counts.behind = 0;
        }
        Ok(Self::output("git subtree pull", failure))
    }

    async fn push_subtree(&self, _repo: &Path, request: &SubtreeRequest) -> Result<ToolOutput, VcsError> {
        self.record(format!("push_subtree {} squash={}", request.prefix, request.squash));
        let failure = self.lock().push_failure.clone();
        if failure.is_none() {
            self.lock().counts.ahead = 0;
        }
        Ok(Self::output("git subtree push", failure))
    }

    async fn fetch(&self, _repo: &Path, remote: &str) -> Result<ToolOutput, VcsError> {
        self.record(format!("fetch {remote}"));
        let failure = self.lock().fetch_failure.clone();
        Ok(Self::output("git fetch", failure))
    }

    fn remote_get(&self, _repo: &Path, name: &str) -> Result<Option<String>, VcsError> {
        Ok(self.remote(name))
    }

    fn remote_add(&self, _repo: &Path, name: &str, url: &str) -> Result<(), VcsError> {
        self.record(format!("remote_add {name}"));
        self.lock().remotes.insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn remote_set_url(&self, _repo: &Path, name: &str, url: &str) -> Result<(), VcsError> {
        self.record(format!("remote_set_url {name}"));
        self.lock().remotes.insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn remote_remove(&self, _repo: &Path, name: &str) -> Result<(), VcsError> {
        self.record(format!("remote_remove {name}"));
        self.lock().remotes.remove(name);
        Ok(())
    }

    fn dirty_paths(&self, _repo: &Path, scope: &ChangeScope) -> Result<Vec<String>, VcsError> {
        let state = self.lock();
        Ok(match scope.prefix {
            Some(_) => state.prefix_changes.clone(),
            None => state.dirty.clone(),
        })
    }

    fn has_tracked_content(&self, _repo: &Path, _prefix: &SubtreePrefix) -> Result<bool, VcsError> {
        Ok(self.lock().tracked)
    }

    fn ahead_behind(
        &self,
        _repo: &Path,
        _prefix: &SubtreePrefix,
        _remote: &str,
        _branch: &BranchName,
    ) -> Result<Option<AheadBehind>, VcsError> {
        let state = self.lock();
        Ok(state.subtree_added.then_some(state.counts))
    }

    fn find_conflict_markers(&self, _repo: &Path, _prefix: &SubtreePrefix) -> Result<ConflictReport, VcsError> {
        Ok(self.lock().conflicts.clone())
    }
}
