//! Test helper functions and utilities
//!
//! Project trees on disk for topology tests, and real repositories built
//! with libgit2 for backend tests. Nothing here shells out to git.

use git2::{Commit, Oid, Repository, Signature, Tree};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A project directory inside a temporary "repository" holding a bare
/// `.git` directory, enough for topology resolution
pub struct TestProject {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    /// Project root is the git root
    pub fn standalone() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
        let root = dir.path().to_path_buf();
        Self { dir, root }
    }

    /// Project root at `relative` below the git root
    pub fn nested(relative: &str) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join(".git")).expect("Failed to create .git");
        let root = dir.path().join(relative);
        fs::create_dir_all(&root).expect("Failed to create project dir");
        Self { dir, root }
    }

    pub fn paper_dir(&self) -> PathBuf {
        self.root.join("paper")
    }

    pub fn write(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }
}

/// A real repository with a configured identity
pub struct GitFixture {
    pub dir: TempDir,
    pub repo: Repository,
}

impl GitFixture {
    pub fn init() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let repo = Repository::init(dir.path()).expect("Failed to init repository");
        {
            let mut config = repo.config().expect("Failed to open config");
            config.set_str("user.name", "Test Author").unwrap();
            config.set_str("user.email", "author@example.com").unwrap();
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn signature() -> Signature<'static> {
        Signature::now("Test Author", "author@example.com").unwrap()
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Stage everything in the working tree and commit it on HEAD
    pub fn commit_all(&self, message: &str) -> Oid {
        let mut index = self.repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let parents = self.head_commit().into_iter().collect::<Vec<_>>();
        let parent_refs = parents.iter().collect::<Vec<_>>();
        let sig = Self::signature();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn head_commit(&self) -> Option<Commit<'_>> {
        self.repo.head().ok().and_then(|head| head.peel_to_commit().ok())
    }

    /// Tree holding the given files at its root
    pub fn tree_with(&self, files: &[(&str, &str)]) -> Oid {
        let mut builder = self.repo.treebuilder(None).unwrap();
        for (name, content) in files {
            let blob = self.repo.blob(content.as_bytes()).unwrap();
            builder.insert(*name, blob, 0o100644).unwrap();
        }
        builder.write().unwrap()
    }

    /// `base` with `subtree` mounted at the single-segment `dir`
    pub fn mount(&self, base: &Tree<'_>, dir: &str, subtree: Oid) -> Oid {
        let mut builder = self.repo.treebuilder(Some(base)).unwrap();
        builder.insert(dir, subtree, 0o040000).unwrap();
        builder.write().unwrap()
    }

    /// Commit `tree` without moving any ref
    pub fn detached_commit(&self, tree: Oid, parents: &[Oid], message: &str) -> Oid {
        let tree = self.repo.find_tree(tree).unwrap();
        let parents = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect::<Vec<_>>();
        let parent_refs = parents.iter().collect::<Vec<_>>();
        let sig = Self::signature();
        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Commit `tree` on HEAD with the given parents; the first must be HEAD
    pub fn head_commit_with(&self, tree: Oid, parents: &[Oid], message: &str) -> Oid {
        let tree = self.repo.find_tree(tree).unwrap();
        let parents = parents
            .iter()
            .map(|oid| self.repo.find_commit(*oid).unwrap())
            .collect::<Vec<_>>();
        let parent_refs = parents.iter().collect::<Vec<_>>();
        let sig = Self::signature();
        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn set_ref(&self, name: &str, target: Oid) {
        self.repo.reference(name, target, true, "test").unwrap();
    }
}

/// Whether `path` sits inside some git repository, in which case tests that
/// expect "not a repository" cannot run
pub fn inside_git_repository(path: &Path) -> bool {
    path.ancestors().any(|dir| dir.join(".git").exists())
}
