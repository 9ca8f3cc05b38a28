use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Errors raised while building a [`SubtreePrefix`]
#[derive(Debug, Error, PartialEq)]
pub enum SubtreePrefixError {
    #[error("Subtree prefix cannot be empty")]
    Empty,

    #[error("Subtree prefix must be relative to the repository root: {0}")]
    Absolute(String),

    #[error("Subtree prefix '{prefix}' contains an invalid segment '{segment}'")]
    InvalidSegment { prefix: String, segment: String },
}

/// Relative path from the repository root to the synced paper directory.
///
/// Always non-empty, `/`-separated, with no leading or trailing slash and no
/// `.` or `..` segments. This is the exact string handed to
/// `git subtree --prefix=<prefix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubtreePrefix {
    prefix: String,
}

impl SubtreePrefix {
    /// Parse and normalize a prefix string
    pub fn new(prefix: &str) -> Result<Self, SubtreePrefixError> {
        let normalized = prefix.trim().replace('\\', "/");

        let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
        if segments.is_empty() {
            return Err(SubtreePrefixError::Empty);
        }

        if normalized.starts_with('/') {
            return Err(SubtreePrefixError::Absolute(prefix.to_string()));
        }

        if let Some(bad) = segments.iter().find(|s| **s == "." || **s == "..") {
            return Err(SubtreePrefixError::InvalidSegment {
                prefix: prefix.to_string(),
                segment: bad.to_string(),
            });
        }

        Ok(Self {
            prefix: segments.join("/"),
        })
    }

    /// Build the prefix for a project sitting at `relative` below the
    /// repository root, with the paper living in `paper_dir`.
    ///
    /// An empty `relative` path (standalone project) yields just `paper_dir`.
    pub fn from_relative_path(relative: &Path, paper_dir: &str) -> Result<Self, SubtreePrefixError> {
        let mut segments = Vec::new();

        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::CurDir => {}
                other => {
                    return Err(SubtreePrefixError::InvalidSegment {
                        prefix: relative.display().to_string(),
                        segment: other.as_os_str().to_string_lossy().into_owned(),
                    })
                }
            }
        }

        segments.push(paper_dir.to_string());
        Self::new(&segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.prefix
    }

    /// Number of path segments
    pub fn depth(&self) -> usize {
        self.prefix.split('/').count()
    }

    /// Native path relative to the repository root
    pub fn to_path(&self) -> PathBuf {
        self.prefix.split('/').collect()
    }

    /// Whether a repository-relative `/`-separated path lies under this prefix
    pub fn contains(&self, repo_path: &str) -> bool {
        repo_path == self.prefix
            || repo_path
                .strip_prefix(&self.prefix)
                .map_or(false, |rest| rest.starts_with('/'))
    }
}

impl fmt::Display for SubtreePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)
    }
}

impl TryFrom<String> for SubtreePrefix {
    type Error = SubtreePrefixError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<SubtreePrefix> for String {
    fn from(value: SubtreePrefix) -> Self {
        value.prefix
    }
}
