// src/analyzer.rs

use crate::cli::Args;
use crate::filter::FileFilter;
use crate::model::{AnalysisResult, CommitIndex, HistKey, Histogram, TreeEntry};
use crate::repo::{AttributionSource, GitHistory};
use crate::survival::{self, SECONDS_PER_YEAR};
use anyhow::Result;
use chrono::Utc;
use git2::Oid;
use indicatif::ProgressBar;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::warn;

/// Walks the sampled timeline oldest-first, memoizing per-file attribution
/// histograms and accumulating the chart series. The memo is only
/// invalidated for paths that changed between consecutive sampled
/// snapshots, so the total attribution work is proportional to the number
/// of line-introduction events rather than snapshots × tree size.
pub struct Analyzer<'a, P: AttributionSource> {
    index: &'a CommitIndex,
    provider: &'a P,
    /// Most recently computed histogram per path. Entries for deleted
    /// files linger harmlessly; they stop being summed once the path
    /// leaves the tree.
    file_histograms: HashMap<String, Histogram>,
    timestamps: Vec<i64>,
    cohort_curves: BTreeMap<String, Vec<usize>>,
    extension_curves: BTreeMap<String, Vec<usize>>,
    origin_series: HashMap<Oid, Vec<(i64, usize)>>,
}

impl<'a, P: AttributionSource> Analyzer<'a, P> {
    /// The cohort and extension sets are fixed up front so every curve has
    /// one value per sampled snapshot, zero-filled where a bucket is absent.
    pub fn new(index: &'a CommitIndex, provider: &'a P, extensions: &BTreeSet<String>) -> Self {
        let cohort_curves = index
            .cohorts
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();
        let extension_curves = extensions.iter().map(|e| (e.clone(), Vec::new())).collect();
        Self {
            index,
            provider,
            file_histograms: HashMap::new(),
            timestamps: Vec::new(),
            cohort_curves,
            extension_curves,
            origin_series: HashMap::new(),
        }
    }

    /// Process one sampled snapshot. Must be called in increasing time
    /// order: the first observation of an origin is taken as its
    /// introduction count, and the cache is only valid against the
    /// immediately preceding sampled snapshot.
    pub fn step(
        &mut self,
        snapshot: Oid,
        timestamp: i64,
        entries: &[TreeEntry],
        changed: &HashSet<String>,
    ) {
        self.timestamps.push(timestamp);

        let mut global = Histogram::new();
        for entry in entries {
            if changed.contains(&entry.path) || !self.file_histograms.contains_key(&entry.path) {
                let histogram = self.file_histogram(snapshot, entry);
                self.file_histograms.insert(entry.path.clone(), histogram);
            }
            for (key, count) in &self.file_histograms[&entry.path] {
                *global.entry(key.clone()).or_default() += count;
            }
        }

        let mut cohort_counts: HashMap<&str, usize> = HashMap::new();
        let mut extension_counts: HashMap<&str, usize> = HashMap::new();
        for (key, count) in &global {
            match key {
                HistKey::Cohort(cohort) => {
                    cohort_counts.insert(cohort, *count);
                }
                HistKey::Extension(ext) => {
                    extension_counts.insert(ext, *count);
                }
                HistKey::Origin(origin) => {
                    self.origin_series
                        .entry(*origin)
                        .or_default()
                        .push((timestamp, *count));
                }
            }
        }

        for (cohort, series) in self.cohort_curves.iter_mut() {
            series.push(cohort_counts.get(cohort.as_str()).copied().unwrap_or(0));
        }
        for (ext, series) in self.extension_curves.iter_mut() {
            series.push(extension_counts.get(ext.as_str()).copied().unwrap_or(0));
        }
    }

    /// Attribute one file at one snapshot. A provider failure is logged
    /// and yields an empty histogram; one unreadable file never aborts
    /// the run.
    fn file_histogram(&self, snapshot: Oid, entry: &TreeEntry) -> Histogram {
        let origins = match self.provider.blame(snapshot, &entry.path) {
            Ok(origins) => origins,
            Err(err) => {
                warn!("{}", err);
                return Histogram::new();
            }
        };

        let mut histogram = Histogram::new();
        for (origin, lines) in origins {
            let Some(cohort) = self.index.cohort_of.get(&origin) else {
                // A line from outside the indexed ancestry would count in
                // one partition but not the other; skip it entirely.
                continue;
            };
            *histogram.entry(HistKey::Cohort(cohort.clone())).or_default() += lines;
            if self.index.timestamp_of.contains_key(&origin) {
                *histogram.entry(HistKey::Origin(origin)).or_default() += lines;
            }
            *histogram
                .entry(HistKey::Extension(entry.extension.clone()))
                .or_default() += lines;
        }
        histogram
    }

    pub fn origin_series(&self) -> &HashMap<Oid, Vec<(i64, usize)>> {
        &self.origin_series
    }

    pub fn into_result(self, survival: Vec<(f64, f64)>) -> AnalysisResult {
        AnalysisResult {
            timestamps: self.timestamps,
            cohort_curves: self.cohort_curves,
            extension_curves: self.extension_curves,
            survival,
        }
    }
}

/// Run the whole analysis over a repository.
pub fn analyze(history: &GitHistory, args: &Args, filter: &FileFilter) -> Result<AnalysisResult> {
    println!("Listing all commits");
    let index = history.index_commits(&args.cohort_format)?;

    println!("Backtracking the main branch");
    let timeline = history.sample_timeline(args.interval)?;

    println!("Counting entries to analyze");
    let bar = ProgressBar::new(timeline.len() as u64);
    let mut extensions = BTreeSet::new();
    let mut entries_total = 0u64;
    let mut trees = Vec::with_capacity(timeline.len());
    for sample in &timeline {
        let entries = history.tree_entries(sample.oid, filter)?;
        for entry in &entries {
            extensions.insert(entry.extension.clone());
        }
        entries_total += entries.len() as u64;
        trees.push(entries);
        bar.inc(1);
    }
    bar.finish();

    println!("Analyzing commit history");
    let bar = ProgressBar::new(entries_total);
    bar.set_message("Analyzing commits");
    let mut analyzer = Analyzer::new(&index, history, &extensions);
    let mut previous: Option<Oid> = None;
    for (sample, entries) in timeline.iter().zip(&trees) {
        let changed = match previous {
            Some(prev) => history.changed_paths(prev, sample.oid)?,
            None => HashSet::new(),
        };
        previous = Some(sample.oid);
        analyzer.step(sample.oid, sample.timestamp, entries, &changed);
        bar.inc(entries.len() as u64);
    }
    bar.finish_with_message("Analysis complete");

    let now = Utc::now().timestamp();
    let horizon = args.horizon_years * SECONDS_PER_YEAR;
    let curve = survival::build_survival_curve(
        analyzer.origin_series(),
        &index.timestamp_of,
        now,
        horizon,
    );

    Ok(analyzer.into_result(curve))
}
