// src/main.rs

mod analyzer;
mod cli;
mod cohort;
mod error;
mod filter;
mod model;
mod renderer;
mod repo;
mod survival;
#[cfg(test)]
mod testutil;

use anyhow::Result;
use chrono::TimeZone;
use clap::Parser;
use cli::Args;
use filter::FileFilter;
use repo::GitHistory;
use std::time::Instant;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let start_time = Instant::now();

    // Configuration problems are fatal before any history is touched.
    cohort::validate_format(&args.cohort_format)?;
    let filter = FileFilter::new(&args.only, &args.ignore)?;

    let history = GitHistory::open(&args.repo)?;
    let result = analyzer::analyze(&history, &args, &filter)?;

    if let (Some(&first), Some(&last)) = (result.timestamps.first(), result.timestamps.last()) {
        println!(
            "Analyzed {} snapshots spanning {} to {}, {} cohorts, {} extensions.",
            result.timestamps.len(),
            format_timestamp(first),
            format_timestamp(last),
            result.cohort_curves.len(),
            result.extension_curves.len(),
        );
    } else {
        println!("No snapshots matched the sampling interval; nothing to plot.");
    }

    let render_start = Instant::now();
    renderer::render_charts(&result, &args)?;
    println!("Rendering finished in {:.2?}.", render_start.elapsed());

    println!("Total time: {:.2?}", start_time.elapsed());
    Ok(())
}

fn format_timestamp(timestamp: i64) -> String {
    match chrono::Utc.timestamp_opt(timestamp, 0).single() {
        Some(dt) => dt.to_rfc2822(),
        None => timestamp.to_string(),
    }
}
