use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Host serving Overleaf's git bridge
pub const OVERLEAF_GIT_HOST: &str = "git.overleaf.com";

/// Remote URL errors
#[derive(Debug, Error, PartialEq)]
pub enum RemoteUrlError {
    #[error("Remote URL cannot be empty")]
    Empty,

    #[error("Invalid remote URL format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported remote URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in remote URL: {0}")]
    MissingHost(String),
}

/// URL of the collaborative repository a paper is linked to.
///
/// Accepts what `git remote add` accepts in practice: scheme URLs
/// (`https`, `http`, `ssh`, `git`, `file`), scp-like `user@host:path`
/// addresses and explicit local paths. The string is kept verbatim so the
/// configured remote matches what the user typed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteUrl {
    url: String,
}

impl RemoteUrl {
    pub fn new(url: &str) -> Result<Self, RemoteUrlError> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(RemoteUrlError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(RemoteUrlError::InvalidFormat(trimmed.to_string()));
        }

        if trimmed.contains("://") {
            let parsed =
                Url::parse(trimmed).map_err(|_| RemoteUrlError::InvalidFormat(trimmed.to_string()))?;

            match parsed.scheme() {
                "https" | "http" | "ssh" | "git" => {
                    if parsed.host_str().map_or(true, str::is_empty) {
                        return Err(RemoteUrlError::MissingHost(trimmed.to_string()));
                    }
                }
                "file" => {}
                other => return Err(RemoteUrlError::UnsupportedScheme(other.to_string())),
            }
        } else if !is_scp_like(trimmed) && !is_local_path(trimmed) {
            return Err(RemoteUrlError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Self {
            url: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Whether the URL points at Overleaf's git bridge
    pub fn is_overleaf(&self) -> bool {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.eq_ignore_ascii_case(OVERLEAF_GIT_HOST)))
            .unwrap_or(false)
    }

    /// Whether `other` names the same repository as this URL
    pub fn same_repository(&self, other: &str) -> bool {
        normalize_for_comparison(&self.url) == normalize_for_comparison(other)
    }

    /// URL with any embedded password or token removed
    pub fn redacted(&self) -> String {
        redact(&self.url)
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Strip credentials from a URL string so it can be logged or printed.
///
/// Overleaf git URLs are frequently configured as
/// `https://git:<token>@git.overleaf.com/<id>`.
pub fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some("***")).is_ok() {
                parsed.to_string()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}

fn normalize_for_comparison(url: &str) -> String {
    let trimmed = url.trim();
    let without_credentials = match Url::parse(trimmed) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        _ => trimmed.to_string(),
    };

    let without_slash = without_credentials.trim_end_matches('/');
    without_slash
        .strip_suffix(".git")
        .unwrap_or(without_slash)
        .to_string()
}

// `[user@]host:path`, where the part before the first ':' has no '/'
fn is_scp_like(url: &str) -> bool {
    match url.split_once(':') {
        Some((host, path)) => {
            let host = host.rsplit('@').next().unwrap_or(host);
            !host.is_empty() && !host.contains('/') && !path.is_empty() && host.len() > 1
        }
        None => false,
    }
}

fn is_local_path(url: &str) -> bool {
    url.starts_with('/') || url.starts_with("./") || url.starts_with("../") || url.starts_with('~')
}
