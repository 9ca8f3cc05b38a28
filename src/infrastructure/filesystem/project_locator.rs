use super::settings_store::SETTINGS_FILE_NAMES;
use std::path::{Path, PathBuf};

/// Directory that marks a scaffolded project next to the paper
pub const EXPERIMENTS_DIR: &str = "experiments";

/// Find the project root for an invocation from `start`.
///
/// Walks upward to the nearest directory holding the paper directory, an
/// `experiments/` directory or a settings file. The walk stops at the first
/// directory containing `.git`; when nothing matches, `start` itself is the
/// project root.
pub fn locate_project_root(start: &Path, paper_dir: &str) -> PathBuf {
    for dir in start.ancestors() {
        if is_project_root(dir, paper_dir) {
            return dir.to_path_buf();
        }
        if dir.join(".git").exists() {
            break;
        }
    }
    start.to_path_buf()
}

fn is_project_root(dir: &Path, paper_dir: &str) -> bool {
    dir.join(paper_dir).is_dir()
        || dir.join(EXPERIMENTS_DIR).is_dir()
        || SETTINGS_FILE_NAMES.iter().any(|name| dir.join(name).is_file())
}
