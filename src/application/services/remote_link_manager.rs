use crate::domain::entities::RemoteBinding;
use crate::domain::value_objects::{remote_url, RemoteUrl};
use crate::infrastructure::vcs::{VcsError, VcsExecutor};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Remote binding errors
#[derive(Debug, Error)]
pub enum RemoteLinkError {
    #[error("no remote named '{name}' is configured")]
    NotConfigured { name: String },

    #[error("remote '{name}' already points at {existing}, not {requested}")]
    Conflict {
        name: String,
        existing: String,
        requested: String,
    },

    #[error("invalid remote name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error(transparent)]
    Vcs(#[from] VcsError),
}

/// How [`RemoteLinkManager::ensure`] or [`RemoteLinkManager::replace`]
/// arrived at the binding, so that a failed link can be undone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteChange {
    /// The remote already pointed at the requested repository
    Unchanged,
    /// The remote did not exist before
    Created,
    /// The remote existed with another URL, kept here
    Replaced { previous_url: String },
}

/// Binding returned by a mutating call, together with what changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedRemote {
    pub binding: RemoteBinding,
    pub change: RemoteChange,
}

/// Manages the named remote pointing at the collaborative repository.
///
/// Never repoints an existing remote unless asked to through
/// [`replace`](Self::replace).
pub struct RemoteLinkManager<'a> {
    vcs: &'a dyn VcsExecutor,
    repo: &'a Path,
}

impl<'a> RemoteLinkManager<'a> {
    pub fn new(vcs: &'a dyn VcsExecutor, repo: &'a Path) -> Self {
        Self { vcs, repo }
    }

    /// Binding for `name`, if the remote exists
    pub fn find(&self, name: &str) -> Result<Option<RemoteBinding>, RemoteLinkError> {
        validate_remote_name(name)?;
        let url = self.vcs.remote_get(self.repo, name)?;
        Ok(url.map(|url| RemoteBinding::new(name, url)))
    }

    /// Binding for `name`, failing when the remote is missing
    pub fn resolve(&self, name: &str) -> Result<RemoteBinding, RemoteLinkError> {
        self.find(name)?.ok_or_else(|| RemoteLinkError::NotConfigured {
            name: name.to_string(),
        })
    }

    /// Fail with a conflict when `name` already points at another
    /// repository. Read-only.
    pub fn check_compatible(&self, name: &str, url: &RemoteUrl) -> Result<(), RemoteLinkError> {
        match self.find(name)? {
            Some(existing) if !url.same_repository(&existing.url) => Err(Self::conflict(name, &existing, url)),
            _ => Ok(()),
        }
    }

    fn conflict(name: &str, existing: &RemoteBinding, url: &RemoteUrl) -> RemoteLinkError {
        RemoteLinkError::Conflict {
            name: name.to_string(),
            existing: existing.display_url(),
            requested: url.redacted(),
        }
    }

    /// Create the remote if absent. An existing remote pointing elsewhere is
    /// a conflict and is left untouched.
    pub fn ensure(&self, name: &str, url: &RemoteUrl) -> Result<LinkedRemote, RemoteLinkError> {
        match self.find(name)? {
            Some(existing) if url.same_repository(&existing.url) => {
                debug!(remote = name, "remote already configured");
                Ok(LinkedRemote {
                    binding: existing,
                    change: RemoteChange::Unchanged,
                })
            }
            Some(existing) => Err(Self::conflict(name, &existing, url)),
            None => {
                self.vcs.remote_add(self.repo, name, url.as_str())?;
                info!(remote = name, url = %url, "remote created");
                Ok(LinkedRemote {
                    binding: RemoteBinding::new(name, url.as_str()),
                    change: RemoteChange::Created,
                })
            }
        }
    }

    /// Point `name` at `url`, creating the remote if needed
    pub fn replace(&self, name: &str, url: &RemoteUrl) -> Result<LinkedRemote, RemoteLinkError> {
        match self.find(name)? {
            Some(existing) if url.same_repository(&existing.url) => Ok(LinkedRemote {
                binding: existing,
                change: RemoteChange::Unchanged,
            }),
            Some(existing) => {
                self.vcs.remote_set_url(self.repo, name, url.as_str())?;
                info!(
                    remote = name,
                    from = %existing.display_url(),
                    to = %url,
                    "remote repointed"
                );
                Ok(LinkedRemote {
                    binding: RemoteBinding::new(name, url.as_str()),
                    change: RemoteChange::Replaced {
                        previous_url: existing.url,
                    },
                })
            }
            None => self.ensure(name, url),
        }
    }

    /// Delete the remote; the binding that was removed is returned
    pub fn remove(&self, name: &str) -> Result<RemoteBinding, RemoteLinkError> {
        let binding = self.resolve(name)?;
        self.vcs.remote_remove(self.repo, name)?;
        info!(remote = name, "remote removed");
        Ok(binding)
    }

    /// Undo what a failed link did to the remote configuration
    pub fn revert(&self, linked: &LinkedRemote) -> Result<(), RemoteLinkError> {
        match &linked.change {
            RemoteChange::Unchanged => Ok(()),
            RemoteChange::Created => {
                self.vcs.remote_remove(self.repo, &linked.binding.name)?;
                Ok(())
            }
            RemoteChange::Replaced { previous_url } => {
                self.vcs
                    .remote_set_url(self.repo, &linked.binding.name, previous_url)?;
                debug!(
                    remote = %linked.binding.name,
                    url = %remote_url::redact(previous_url),
                    "remote url restored"
                );
                Ok(())
            }
        }
    }
}

/// Git remote naming rules
pub fn validate_remote_name(name: &str) -> Result<(), RemoteLinkError> {
    let invalid = |reason: &str| RemoteLinkError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if name.is_empty() {
        return Err(invalid("remote name cannot be empty"));
    }
    if name.starts_with('.') {
        return Err(invalid("remote name cannot start with '.'"));
    }
    if name == "HEAD" {
        return Err(invalid("remote name cannot be 'HEAD'"));
    }

    let forbidden = [':', '?', '*', '[', '\\', '^', '~'];
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_ascii_control() || forbidden.contains(&c))
    {
        return Err(invalid("remote name contains invalid characters"));
    }

    Ok(())
}
