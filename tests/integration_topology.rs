//! Topology resolution and project discovery on synthetic directory trees

mod common;

use common::test_helpers::{inside_git_repository, TestProject};
use expaper::application::services::{RepoTopologyResolver, TopologyError};
use expaper::domain::entities::TopologyMode;
use expaper::infrastructure::{locate_project_root, SettingsStore};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_standalone_project_prefix() {
    let project = TestProject::standalone();
    let topology = RepoTopologyResolver::new("paper").resolve(&project.root).unwrap();

    assert_eq!(topology.mode(), TopologyMode::Standalone);
    assert_eq!(topology.prefix().as_str(), "paper");
    assert_eq!(topology.prefix().depth(), 1);
}

#[test]
fn test_nested_prefix_has_one_segment_per_level() {
    for (relative, expected) in [
        ("paper-a", "paper-a/paper"),
        ("projects/first-paper", "projects/first-paper/paper"),
        ("a/b/c", "a/b/c/paper"),
    ] {
        let project = TestProject::nested(relative);
        let topology = RepoTopologyResolver::new("paper").resolve(&project.root).unwrap();

        assert_eq!(topology.mode(), TopologyMode::Nested);
        assert_eq!(topology.prefix().as_str(), expected);
        assert_eq!(topology.prefix().depth(), relative.split('/').count() + 1);
    }
}

#[test]
fn test_resolution_ignores_working_directory() {
    let project = TestProject::nested("paper-a");
    let resolver = RepoTopologyResolver::new("paper");

    let first = resolver.resolve(&project.root).unwrap();
    let second = resolver.resolve(&project.root.join(".").join("..").join("paper-a")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_directory_outside_any_repository() {
    let dir = TempDir::new().unwrap();
    if inside_git_repository(dir.path()) {
        // temp dir lives inside a checkout on this machine
        return;
    }

    let err = RepoTopologyResolver::new("paper").resolve(dir.path()).unwrap_err();
    assert!(matches!(err, TopologyError::NotARepository { .. }));
}

#[test]
fn test_project_found_from_paper_subdirectory() {
    let project = TestProject::nested("paper-a");
    let figures = project.paper_dir().join("figures");
    fs::create_dir_all(&figures).unwrap();

    assert_eq!(locate_project_root(&figures, "paper"), project.root);
}

#[test]
fn test_settings_file_marks_project_and_configures_it() {
    let project = TestProject::nested("studies/ablation");
    project.write(".expaper.yml", "sync:\n  remote: ol\n  paper_dir: manuscript\n");
    let scripts = project.root.join("scripts");
    fs::create_dir_all(&scripts).unwrap();

    let root = locate_project_root(&scripts, "paper");
    assert_eq!(root, project.root);

    let settings = SettingsStore::new(&root).load().unwrap();
    let topology = RepoTopologyResolver::new(settings.paper_dir.clone())
        .resolve(&root)
        .unwrap();
    assert_eq!(topology.prefix().as_str(), "studies/ablation/manuscript");
    assert_eq!(settings.remote, "ol");
}

#[test]
fn test_custom_paper_dir_project_found_from_inside_paper() {
    let project = TestProject::nested("studies/ablation");
    project.write(".expaper.yml", "sync:\n  paper_dir: manuscript\n");
    let sections = project.root.join("manuscript").join("sections");
    fs::create_dir_all(&sections).unwrap();

    // no `paper/` anywhere; the settings file marks the root
    assert_eq!(locate_project_root(&sections, "paper"), project.root);
}
