use regex::Regex;
use std::sync::OnceLock;

/// What a failed git run most likely means
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    /// Merge stopped on conflicts; paths parsed from the output, possibly none
    Conflicted { paths: Vec<String> },
    DirtyWorkingTree,
    PrefixExists,
    /// The remote branch moved on; a pull is needed before pushing
    PushRejected,
    /// Credentials or connectivity; `reason` is the offending output line
    NetworkOrAuth { reason: String },
    Unknown,
}

struct Signatures {
    conflict: Regex,
    conflict_path: Regex,
    dirty: Regex,
    prefix_exists: Regex,
    network: Regex,
    push_rejected: Regex,
}

fn signatures() -> &'static Signatures {
    static SIGNATURES: OnceLock<Signatures> = OnceLock::new();
    SIGNATURES.get_or_init(|| Signatures {
        conflict: Regex::new(r"^CONFLICT \(|(?i)automatic merge failed").expect("valid pattern"),
        conflict_path: Regex::new(r"^CONFLICT \([^)]*\): Merge conflict in (.+?)\s*$")
            .expect("valid pattern"),
        dirty: Regex::new(r"(?i)working tree has modifications").expect("valid pattern"),
        prefix_exists: Regex::new(r"(?i)prefix '.*' already exists").expect("valid pattern"),
        network: Regex::new(concat!(
            r"(?i)authentication failed",
            r"|could not read (username|password)",
            r"|invalid username or password",
            r"|terminal prompts disabled",
            r"|permission denied \(publickey",
            r"|could not read from remote repository",
            r"|could not resolve host",
            r"|unable to access '",
            r"|failed to connect to",
            r"|connection (refused|timed out|reset)",
            r"|network is unreachable",
            r"|the requested url returned error: [45]\d\d",
            r"|\bhttp [45]\d\d\b",
        ))
        .expect("valid pattern"),
        push_rejected: Regex::new(
            r"(?i)non-fast-forward|failed to push some refs|\(fetch first\)|updates were rejected",
        )
        .expect("valid pattern"),
    })
}

/// Maps captured git output onto failure classes.
///
/// Signatures assume the C locale, which is how the executor runs git.
pub struct FailureClassifier;

impl FailureClassifier {
    pub fn classify(output: &str) -> FailureClass {
        let sigs = signatures();
        let lines = || output.lines().map(str::trim).filter(|line| !line.is_empty());

        if lines().any(|line| sigs.conflict.is_match(line)) {
            return FailureClass::Conflicted {
                paths: Self::conflicted_paths(output),
            };
        }
        if lines().any(|line| sigs.dirty.is_match(line)) {
            return FailureClass::DirtyWorkingTree;
        }
        if lines().any(|line| sigs.prefix_exists.is_match(line)) {
            return FailureClass::PrefixExists;
        }
        if let Some(line) = lines().find(|line| sigs.network.is_match(line)) {
            let reason = line
                .strip_prefix("fatal: ")
                .or_else(|| line.strip_prefix("error: "))
                .unwrap_or(line);
            return FailureClass::NetworkOrAuth {
                reason: reason.to_string(),
            };
        }
        if lines().any(|line| sigs.push_rejected.is_match(line)) {
            return FailureClass::PushRejected;
        }

        FailureClass::Unknown
    }

    /// Paths named by `CONFLICT (...): Merge conflict in <path>` lines
    pub fn conflicted_paths(output: &str) -> Vec<String> {
        let mut paths: Vec<String> = output
            .lines()
            .filter_map(|line| signatures().conflict_path.captures(line.trim()))
            .filter_map(|captures| captures.get(1))
            .map(|path| path.as_str().to_string())
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }
}
