//! Commit-graph queries for subtree sync state.
//!
//! `git subtree` leaves no state file behind. The last sync point is
//! recovered from the mainline: a merge whose side parent is a squash commit
//! carrying a `git-subtree-dir` trailer for our prefix (squashed add/pull),
//! a merge carrying that trailer itself (unsquashed add), or a merge whose
//! side parent is already part of the remote-tracking history (unsquashed
//! pull).
//!
//! Counts compare content as well as ancestry, so that the split commits
//! produced by `git subtree push` are recognized as local work already
//! published instead of showing up as new remote commits.

use crate::domain::entities::AheadBehind;
use crate::domain::value_objects::SubtreePrefix;
use git2::{Commit, ErrorCode, Oid, Repository};
use std::collections::HashSet;

const SUBTREE_DIR_TRAILER: &str = "git-subtree-dir:";
const SUBTREE_SPLIT_TRAILER: &str = "git-subtree-split:";

/// Mainline merge where the prefix was last reconciled with its remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPoint {
    pub merge: Oid,
    /// Remote commit the merge brought in, when it can be recovered
    pub split: Option<Oid>,
}

/// Value of the first `key` trailer in a commit message
pub fn trailer<'m>(message: &'m str, key: &str) -> Option<&'m str> {
    message
        .lines()
        .find_map(|line| line.trim().strip_prefix(key))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn records_prefix(message: &str, prefix: &SubtreePrefix) -> bool {
    trailer(message, SUBTREE_DIR_TRAILER)
        .and_then(|dir| SubtreePrefix::new(dir).ok())
        .map_or(false, |dir| &dir == prefix)
}

fn recorded_split(message: &str) -> Option<Oid> {
    trailer(message, SUBTREE_SPLIT_TRAILER).and_then(|sha| Oid::from_str(sha).ok())
}

/// Tree id of `prefix` inside `commit`, `None` if the directory is absent
pub fn prefix_tree(commit: &Commit<'_>, prefix: &SubtreePrefix) -> Option<Oid> {
    let tree = commit.tree().ok()?;
    let entry = tree.get_path(&prefix.to_path()).ok()?;
    Some(entry.id())
}

/// Walk the first-parent chain from `head` to the most recent sync point
pub fn find_sync_point(
    repo: &Repository,
    head: &Commit<'_>,
    prefix: &SubtreePrefix,
    tracking_tip: Option<Oid>,
) -> Result<Option<SyncPoint>, git2::Error> {
    let mut current = Some(head.clone());
    while let Some(commit) = current {
        if commit.parent_count() > 1 {
            if let Some(point) = sync_point_at(repo, &commit, prefix, tracking_tip)? {
                return Ok(Some(point));
            }
        }
        current = commit.parent(0).ok();
    }
    Ok(None)
}

fn sync_point_at(
    repo: &Repository,
    merge: &Commit<'_>,
    prefix: &SubtreePrefix,
    tracking_tip: Option<Oid>,
) -> Result<Option<SyncPoint>, git2::Error> {
    let message = merge.message().unwrap_or_default();
    if records_prefix(message, prefix) {
        return Ok(Some(SyncPoint {
            merge: merge.id(),
            split: recorded_split(message),
        }));
    }

    for parent in merge.parents().skip(1) {
        let parent_message = parent.message().unwrap_or_default();
        if records_prefix(parent_message, prefix) {
            return Ok(Some(SyncPoint {
                merge: merge.id(),
                split: recorded_split(parent_message),
            }));
        }

        if let Some(tip) = tracking_tip {
            if parent.id() == tip || repo.graph_descendant_of(tip, parent.id())? {
                return Ok(Some(SyncPoint {
                    merge: merge.id(),
                    split: Some(parent.id()),
                }));
            }
        }
    }

    Ok(None)
}

/// Ahead/behind counts of `prefix` against `tracking_ref`.
///
/// Returns `None` when HEAD is unborn or the prefix was never synced. A
/// missing tracking ref yields a behind count of zero.
pub fn ahead_behind(
    repo: &Repository,
    prefix: &SubtreePrefix,
    tracking_ref: &str,
) -> Result<Option<AheadBehind>, git2::Error> {
    let head = match repo.head() {
        Ok(reference) => reference.peel_to_commit()?,
        Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
            return Ok(None)
        }
        Err(e) => return Err(e),
    };

    let tip = match repo.find_reference(tracking_ref) {
        Ok(reference) => Some(reference.peel_to_commit()?),
        Err(e) if e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(e),
    };

    let Some(point) = find_sync_point(repo, &head, prefix, tip.as_ref().map(Commit::id))? else {
        return Ok(None);
    };

    let head_tree = prefix_tree(&head, prefix);
    if let (Some(tip), Some(tree)) = (&tip, head_tree) {
        if tip.tree_id() == tree {
            return Ok(Some(AheadBehind::default()));
        }
    }

    let remote_trees = remote_trees(repo, &head, prefix, tip.as_ref(), point.split)?;
    let ahead = count_ahead(&head, prefix, &remote_trees);

    let behind = match &tip {
        Some(tip) => {
            let local_trees = local_trees(repo, &head, prefix)?;
            count_behind(repo, tip, point.split, &local_trees)?
        }
        None => 0,
    };

    Ok(Some(AheadBehind::new(ahead, behind)))
}

/// Mainline commits changing the prefix since its content last matched
/// something the remote has seen
fn count_ahead(head: &Commit<'_>, prefix: &SubtreePrefix, remote_trees: &HashSet<Oid>) -> usize {
    let mut ahead = 0;
    let mut current = Some(head.clone());

    while let Some(commit) = current {
        let Some(tree) = prefix_tree(&commit, prefix) else {
            break;
        };
        if remote_trees.contains(&tree) {
            break;
        }

        let parent = commit.parent(0).ok();
        let parent_tree = parent.as_ref().and_then(|p| prefix_tree(p, prefix));
        if parent_tree != Some(tree) {
            ahead += 1;
        }
        current = parent;
    }

    ahead
}

/// Remote commits after the last sync whose content never existed locally
fn count_behind(
    repo: &Repository,
    tip: &Commit<'_>,
    split: Option<Oid>,
    local_trees: &HashSet<Oid>,
) -> Result<usize, git2::Error> {
    let Some(split) = split.filter(|oid| repo.find_commit(*oid).is_ok()) else {
        return Ok(usize::from(!local_trees.contains(&tip.tree_id())));
    };

    let mut walk = repo.revwalk()?;
    walk.push(tip.id())?;
    walk.hide(split)?;

    let mut behind = 0;
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        if !local_trees.contains(&commit.tree_id()) {
            behind += 1;
        }
    }
    Ok(behind)
}

fn remote_trees(
    repo: &Repository,
    head: &Commit<'_>,
    prefix: &SubtreePrefix,
    tip: Option<&Commit<'_>>,
    split: Option<Oid>,
) -> Result<HashSet<Oid>, git2::Error> {
    let mut trees = HashSet::new();

    // squash commits carry the remote tree at the time of each sync
    let mut current = Some(head.clone());
    while let Some(commit) = current {
        for parent in commit.parents().skip(1) {
            if records_prefix(parent.message().unwrap_or_default(), prefix) {
                trees.insert(parent.tree_id());
            }
        }
        current = commit.parent(0).ok();
    }

    let mut walk = repo.revwalk()?;
    let mut seeded = false;
    if let Some(tip) = tip {
        walk.push(tip.id())?;
        seeded = true;
    }
    if let Some(split) = split {
        if repo.find_commit(split).is_ok() {
            walk.push(split)?;
            seeded = true;
        }
    }
    if seeded {
        for oid in walk {
            trees.insert(repo.find_commit(oid?)?.tree_id());
        }
    }

    Ok(trees)
}

fn local_trees(
    repo: &Repository,
    head: &Commit<'_>,
    prefix: &SubtreePrefix,
) -> Result<HashSet<Oid>, git2::Error> {
    let mut walk = repo.revwalk()?;
    walk.push(head.id())?;

    let mut trees = HashSet::new();
    for oid in walk {
        let commit = repo.find_commit(oid?)?;
        if let Some(tree) = prefix_tree(&commit, prefix) {
            trees.insert(tree);
        }
    }
    Ok(trees)
}
