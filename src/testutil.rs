// src/testutil.rs

//! Shared fixtures for tests that need a real repository: committing with
//! fixed timestamps makes cohort and sampling behavior reproducible.

use git2::{Oid, Repository, Signature, Time};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

pub const DAY: i64 = 24 * 60 * 60;
/// 2020-01-01T00:00:00Z
pub const T2020: i64 = 1_577_836_800;
/// 2021-01-01T00:00:00Z
pub const T2021: i64 = 1_609_459_200;

pub fn init_repo() -> (TempDir, Repository) {
    let dir = tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    (dir, repo)
}

pub fn commit_file(repo: &Repository, path: &str, content: &str, when: i64) -> Oid {
    let workdir = repo.workdir().unwrap();
    fs::write(workdir.join(path), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::new("Test User", "test@example.com", &Time::new(when, 0)).unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parents)
        .unwrap()
}

pub fn remove_file(repo: &Repository, path: &str, when: i64) -> Oid {
    let workdir = repo.workdir().unwrap();
    fs::remove_file(workdir.join(path)).unwrap();

    let mut index = repo.index().unwrap();
    index.remove_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let sig = Signature::new("Test User", "test@example.com", &Time::new(when, 0)).unwrap();
    let parent = repo.head().unwrap().peel_to_commit().unwrap();
    repo.commit(Some("HEAD"), &sig, &sig, "remove", &tree, &[&parent])
        .unwrap()
}
