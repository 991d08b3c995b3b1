// src/repo.rs

use crate::cohort;
use crate::error::AttributionError;
use crate::filter::FileFilter;
use crate::model::{CommitIndex, SampledCommit, TreeEntry};
use anyhow::{Context, Result};
use git2::{BlameOptions, DiffOptions, ObjectType, Oid, Repository, TreeWalkMode, TreeWalkResult};
use std::collections::HashSet;
use std::path::Path;

/// Line-level attribution for one file at one snapshot: which commit
/// introduced how many of its current lines. The analyzer only ever sees
/// this trait, so its caching can be tested without a real repository.
pub trait AttributionSource {
    fn blame(&self, snapshot: Oid, path: &str) -> Result<Vec<(Oid, usize)>, AttributionError>;
}

/// Read-only view of one repository's history.
pub struct GitHistory {
    repo: Repository,
}

impl GitHistory {
    pub fn open(path: &Path) -> Result<Self> {
        let repo = Repository::discover(path)
            .with_context(|| format!("failed to open git repository at {}", path.display()))?;
        Ok(Self { repo })
    }

    /// Walk the full ancestry of HEAD and classify every reachable commit:
    /// cohort label for all of them, timestamp only for code commits
    /// (exactly one parent, so merges and the root stay untracked as
    /// origins while their lines still count toward cohorts).
    pub fn index_commits(&self, cohort_format: &str) -> Result<CommitIndex> {
        let mut index = CommitIndex::default();
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push_head()?;

        for oid in revwalk {
            let oid = oid?;
            let commit = self.repo.find_commit(oid)?;
            let timestamp = commit.time().seconds();
            let cohort = cohort::classify(timestamp, cohort_format);
            index.cohorts.insert(cohort.clone());
            index.cohort_of.insert(oid, cohort);
            if commit.parent_count() == 1 {
                index.timestamp_of.insert(oid, timestamp);
            }
        }
        Ok(index)
    }

    /// Backtrack the main line of history via first-parent links, keeping
    /// commits at least `interval` seconds apart. Returned oldest first,
    /// which is the order the analyzer must consume them in.
    pub fn sample_timeline(&self, interval: i64) -> Result<Vec<SampledCommit>> {
        let mut samples = Vec::new();
        let mut commit = self.repo.head()?.peel_to_commit()?;
        let mut last_kept: Option<i64> = None;

        loop {
            if commit.parent_count() == 0 {
                break;
            }
            let timestamp = commit.time().seconds();
            if last_kept.map_or(true, |last| timestamp < last - interval) {
                samples.push(SampledCommit {
                    oid: commit.id(),
                    timestamp,
                });
                last_kept = Some(timestamp);
            }
            commit = commit.parent(0)?;
        }

        samples.reverse();
        Ok(samples)
    }

    /// All in-scope blobs in a snapshot's tree.
    pub fn tree_entries(&self, snapshot: Oid, filter: &FileFilter) -> Result<Vec<TreeEntry>> {
        let tree = self.repo.find_commit(snapshot)?.tree()?;
        let mut entries = Vec::new();

        tree.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    let path = format!("{}{}", root, name);
                    if filter.is_included(&path) {
                        let extension = Path::new(&path)
                            .extension()
                            .and_then(|e| e.to_str())
                            .unwrap_or("")
                            .to_string();
                        entries.push(TreeEntry { path, extension });
                    }
                }
            }
            TreeWalkResult::Ok
        })?;

        Ok(entries)
    }

    /// Paths whose content differs between two snapshots. Both sides of a
    /// rename are reported so either spelling invalidates the cache.
    pub fn changed_paths(&self, old: Oid, new: Oid) -> Result<HashSet<String>> {
        let old_tree = self.repo.find_commit(old)?.tree()?;
        let new_tree = self.repo.find_commit(new)?.tree()?;

        let mut diff_opts = DiffOptions::new();
        diff_opts.ignore_filemode(true);
        let diff =
            self.repo
                .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), Some(&mut diff_opts))?;

        let mut changed = HashSet::new();
        for delta in diff.deltas() {
            if let Some(path) = delta.old_file().path().and_then(|p| p.to_str()) {
                changed.insert(path.to_string());
            }
            if let Some(path) = delta.new_file().path().and_then(|p| p.to_str()) {
                changed.insert(path.to_string());
            }
        }
        Ok(changed)
    }
}

impl AttributionSource for GitHistory {
    fn blame(&self, snapshot: Oid, path: &str) -> Result<Vec<(Oid, usize)>, AttributionError> {
        let mut opts = BlameOptions::new();
        opts.newest_commit(snapshot);

        let blame = self
            .repo
            .blame_file(Path::new(path), Some(&mut opts))
            .map_err(|source| AttributionError {
                path: path.into(),
                snapshot,
                source,
            })?;

        Ok(blame
            .iter()
            .map(|hunk| (hunk.final_commit_id(), hunk.lines_in_hunk()))
            .collect())
    }
}
