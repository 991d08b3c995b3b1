// src/survival.rs

use git2::Oid;
use std::collections::HashMap;

pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 60.0 * 60.0;

/// Merge every origin's observation series into one aggregate decay curve:
/// what percentage of the lines each commit introduced is still present
/// after a given elapsed time.
///
/// Each origin contributes one delta event per observation after its first
/// (the change in visible lines) plus a terminal event at `now` that
/// removes the origin from both the surviving count and the baseline.
/// The events are merged on elapsed time since the origin's own commit,
/// then swept with a running (surviving, baseline) pair; each point is
/// recorded before its event applies. The curve need not be monotonic:
/// a young origin's attrition can interleave with an old one's terminal
/// event, which is accepted.
pub fn build_survival_curve(
    origin_series: &HashMap<Oid, Vec<(i64, usize)>>,
    origin_timestamps: &HashMap<Oid, i64>,
    now: i64,
    horizon_seconds: f64,
) -> Vec<(f64, f64)> {
    // (elapsed, Δsurviving, Δbaseline); tuple order doubles as sort order.
    let mut deltas: Vec<(i64, i64, i64)> = Vec::new();
    let mut baseline: i64 = 0;

    for (origin, history) in origin_series {
        let Some(&t0) = origin_timestamps.get(origin) else {
            continue;
        };
        let Some(&(_, first_count)) = history.first() else {
            continue;
        };
        let orig_count = first_count as i64;
        baseline += orig_count;

        let mut last_count = orig_count;
        for &(t, count) in &history[1..] {
            deltas.push((t - t0, count as i64 - last_count, 0));
            last_count = count as i64;
        }
        deltas.push((now - t0, -last_count, -orig_count));
    }

    if baseline == 0 {
        return Vec::new();
    }
    deltas.sort_unstable();

    let mut surviving = baseline;
    let mut curve = Vec::new();
    for (elapsed, delta_surviving, delta_baseline) in deltas {
        if elapsed as f64 > horizon_seconds {
            break;
        }
        curve.push((
            elapsed as f64 / SECONDS_PER_YEAR,
            100.0 * surviving as f64 / baseline as f64,
        ));
        surviving += delta_surviving;
        baseline += delta_baseline;
    }
    curve
}
