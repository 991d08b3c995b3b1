// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    #[arg(short, long)]
    pub repo: PathBuf,

    /// Directory to save the output charts
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// strftime format that buckets commits into cohorts, e.g. "%Y" or "%Y-%m"
    #[arg(long, default_value = "%Y")]
    pub cohort_format: String,

    /// Minimum time between analyzed commits, in seconds
    #[arg(long, default_value_t = 7 * 24 * 60 * 60)]
    pub interval: i64,

    /// File patterns that all have to match (can provide multiple)
    #[arg(long)]
    pub only: Vec<String>,

    /// File patterns that should be ignored (can provide multiple)
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Truncate the survival curve after this many years
    #[arg(long, default_value_t = 3.0)]
    pub horizon_years: f64,

    /// Width of the output images in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Height of the output images in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}
