// src/model.rs

use git2::Oid;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Key space of an attribution histogram. The three namespaces share one
/// map but can never collide (a year label and an extension label stay
/// distinct even when the strings match).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HistKey {
    /// Time bucket of the commit that introduced the line.
    Cohort(String),
    /// The introducing commit itself. Only present for code commits
    /// (exactly one parent, known timestamp).
    Origin(Oid),
    /// Extension of the file the line lives in.
    Extension(String),
}

/// Line counts for one file at one snapshot, keyed by cohort, origin
/// commit and extension at once.
pub type Histogram = HashMap<HistKey, usize>;

/// Everything learned about the full commit graph in the listing pass.
/// Immutable once built.
#[derive(Debug, Default)]
pub struct CommitIndex {
    /// Cohort label for every commit reachable from HEAD.
    pub cohort_of: HashMap<Oid, String>,
    /// Commit timestamp, recorded only for code commits (exactly one
    /// parent). Membership doubles as the "is a tracked origin" test.
    pub timestamp_of: HashMap<Oid, i64>,
    /// All cohort labels seen, in sorted order.
    pub cohorts: BTreeSet<String>,
}

/// One commit on the sampled timeline.
#[derive(Debug, Clone, Copy)]
pub struct SampledCommit {
    pub oid: Oid,
    pub timestamp: i64,
}

/// A blob in a snapshot's tree that passed the file filter.
#[derive(Debug, Clone)]
pub struct TreeEntry {
    pub path: String,
    pub extension: String,
}

/// The three chart series produced by a run.
#[derive(Debug)]
pub struct AnalysisResult {
    /// Timestamps of the sampled snapshots, oldest first.
    pub timestamps: Vec<i64>,
    /// Per-cohort line counts, one value per sampled snapshot.
    pub cohort_curves: BTreeMap<String, Vec<usize>>,
    /// Per-extension line counts, same shape.
    pub extension_curves: BTreeMap<String, Vec<usize>>,
    /// Aggregate survival curve as (elapsed years, percent remaining).
    pub survival: Vec<(f64, f64)>,
}
