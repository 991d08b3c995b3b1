// src/renderer.rs

use crate::cli::Args;
use crate::model::AnalysisResult;
use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use indicatif::{ParallelProgressIterator, ProgressBar};
use palette::{FromColor, Lch, Srgb};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;

const BACKGROUND: Rgb<u8> = Rgb([8, 8, 12]);
const GRID: Rgb<u8> = Rgb([40, 40, 48]);
const SURVIVAL_LINE: Rgb<u8> = Rgb([235, 140, 50]);

enum ChartKind<'a> {
    Stacked {
        curves: &'a BTreeMap<String, Vec<usize>>,
        colors: &'a [Rgb<u8>],
    },
    Survival {
        points: &'a [(f64, f64)],
    },
}

/// Draw the three output charts: stacked lines-per-cohort, stacked
/// lines-per-extension, and the survival curve.
pub fn render_charts(result: &AnalysisResult, args: &Args) -> Result<()> {
    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;

    let cohort_colors = generate_band_colors(result.cohort_curves.len());
    let extension_colors = generate_band_colors(result.extension_curves.len());

    let jobs: Vec<(&str, ChartKind)> = vec![
        (
            "cohorts.png",
            ChartKind::Stacked {
                curves: &result.cohort_curves,
                colors: &cohort_colors,
            },
        ),
        (
            "extensions.png",
            ChartKind::Stacked {
                curves: &result.extension_curves,
                colors: &extension_colors,
            },
        ),
        (
            "survival.png",
            ChartKind::Survival {
                points: &result.survival,
            },
        ),
    ];

    let bar = ProgressBar::new(jobs.len() as u64);
    bar.set_message("Rendering charts");
    jobs.into_par_iter()
        .progress_with(bar)
        .map(|(file, kind)| {
            let image = match kind {
                ChartKind::Stacked { curves, colors } => {
                    render_stacked(&result.timestamps, curves, colors, args.width, args.height)
                }
                ChartKind::Survival { points } => {
                    render_survival(points, args.width, args.height)
                }
            };
            let path = args.output.join(file);
            image
                .save(&path)
                .with_context(|| format!("failed to save {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(())
}

/// Stacked area chart: x is the sampled timeline, bands are the map's
/// keys in sorted order, heights are line counts linearly interpolated
/// between samples.
fn render_stacked(
    timestamps: &[i64],
    curves: &BTreeMap<String, Vec<usize>>,
    colors: &[Rgb<u8>],
    width: u32,
    height: u32,
) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);
    let n = timestamps.len();
    if n == 0 || curves.is_empty() {
        return image;
    }

    // Cumulative stack, one row per band.
    let mut stacks: Vec<Vec<f64>> = Vec::with_capacity(curves.len());
    let mut running = vec![0.0f64; n];
    for series in curves.values() {
        for (acc, value) in running.iter_mut().zip(series) {
            *acc += *value as f64;
        }
        stacks.push(running.clone());
    }
    let top = stacks.last().map(|row| row.as_slice()).unwrap_or(&[]);
    let max_total = top.iter().cloned().fold(0.0f64, f64::max);
    if max_total <= 0.0 {
        return image;
    }

    let t0 = timestamps[0] as f64;
    let span = (timestamps[n - 1] - timestamps[0]) as f64;

    for x in 0..width {
        let t = if span > 0.0 {
            t0 + x as f64 / (width - 1).max(1) as f64 * span
        } else {
            t0
        };
        let hi = timestamps
            .partition_point(|&ts| (ts as f64) < t)
            .min(n - 1);
        let lo = hi.saturating_sub(1);
        let weight = if timestamps[hi] > timestamps[lo] {
            (t - timestamps[lo] as f64) / (timestamps[hi] - timestamps[lo]) as f64
        } else {
            0.0
        };

        let column: Vec<f64> = stacks
            .iter()
            .map(|row| row[lo] + (row[hi] - row[lo]) * weight)
            .collect();

        for y in 0..height {
            let value = (height - 1 - y) as f64 / (height - 1).max(1) as f64 * max_total;
            if let Some(band) = column.iter().position(|&cum| value < cum) {
                image.put_pixel(x, y, colors[band]);
            }
        }
    }
    image
}

/// Survival curve on a fixed 0..100% axis with quarter gridlines. Straight
/// segments between recorded points, like a plain line plot.
fn render_survival(points: &[(f64, f64)], width: u32, height: u32) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, BACKGROUND);

    for pct in [25.0f64, 50.0, 75.0] {
        let y = percent_to_row(pct, height);
        for x in 0..width {
            image.put_pixel(x, y, GRID);
        }
    }

    if points.is_empty() {
        return image;
    }
    let x_max = points.last().map(|&(t, _)| t).unwrap_or(0.0).max(f64::EPSILON);

    let mut prev_row: Option<u32> = None;
    for x in 0..width {
        let elapsed = x as f64 / (width - 1).max(1) as f64 * x_max;
        let pct = sample_percent(points, elapsed);
        let row = percent_to_row(pct, height);

        // Connect to the previous column so steep drops stay visible.
        let from = prev_row.unwrap_or(row);
        for y in from.min(row)..=from.max(row) {
            image.put_pixel(x, y, SURVIVAL_LINE);
        }
        prev_row = Some(row);
    }
    image
}

fn percent_to_row(pct: f64, height: u32) -> u32 {
    let row = (100.0 - pct.clamp(0.0, 100.0)) / 100.0 * (height - 1).max(1) as f64;
    (row.round() as u32).min(height - 1)
}

/// Linear interpolation over the recorded curve points.
fn sample_percent(points: &[(f64, f64)], elapsed: f64) -> f64 {
    let hi = points
        .partition_point(|&(t, _)| t < elapsed)
        .min(points.len() - 1);
    let lo = hi.saturating_sub(1);
    let (t_lo, p_lo) = points[lo];
    let (t_hi, p_hi) = points[hi];
    if t_hi > t_lo {
        let w = ((elapsed - t_lo) / (t_hi - t_lo)).clamp(0.0, 1.0);
        p_lo + (p_hi - p_lo) * w
    } else {
        p_hi
    }
}

/// One stable color per band. Seeded so the same input always renders the
/// same chart.
fn generate_band_colors(count: usize) -> Vec<Rgb<u8>> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let hue = rng.gen_range(0.0f32..360.0f32);
            let color = Lch::new(70.0f32, 60.0f32, hue);
            let srgb: Srgb<f32> = Srgb::from_color(color);
            let (r, g, b) = srgb.into_components();
            Rgb([
                (r.clamp(0.0, 1.0) * 255.0) as u8,
                (g.clamp(0.0, 1.0) * 255.0) as u8,
                (b.clamp(0.0, 1.0) * 255.0) as u8,
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_colors_are_deterministic() {
        assert_eq!(generate_band_colors(5), generate_band_colors(5));
        assert_eq!(generate_band_colors(5).len(), 5);
    }

    #[test]
    fn stacked_chart_paints_bands() {
        let mut curves = BTreeMap::new();
        curves.insert("2020".to_string(), vec![10, 10, 5]);
        curves.insert("2021".to_string(), vec![0, 5, 10]);
        let colors = generate_band_colors(2);

        let image = render_stacked(&[0, 100, 200], &curves, &colors, 64, 48);
        assert_eq!(image.dimensions(), (64, 48));
        let painted = image.pixels().filter(|p| **p != BACKGROUND).count();
        assert!(painted > 0);
        // Bottom-left pixel sits inside the first band.
        assert_eq!(*image.get_pixel(0, 47), colors[0]);
    }

    #[test]
    fn stacked_chart_with_no_samples_is_blank() {
        let curves = BTreeMap::new();
        let image = render_stacked(&[], &curves, &[], 16, 16);
        assert!(image.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn survival_chart_draws_the_curve() {
        let points = vec![(0.0, 100.0), (1.0, 50.0), (2.0, 25.0)];
        let image = render_survival(&points, 64, 48);
        let line_pixels = image.pixels().filter(|p| **p == SURVIVAL_LINE).count();
        assert!(line_pixels >= 64);
    }

    #[test]
    fn sample_percent_interpolates_between_points() {
        let points = vec![(0.0, 100.0), (2.0, 50.0)];
        assert!((sample_percent(&points, 1.0) - 75.0).abs() < 1e-9);
        assert!((sample_percent(&points, 0.0) - 100.0).abs() < 1e-9);
        assert!((sample_percent(&points, 2.0) - 50.0).abs() < 1e-9);
    }
}
