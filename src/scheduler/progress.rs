//! Progress tracking for the region scheduler: completed base pairs against
//! total target size, with an ETA estimated from a moving window of recent
//! per-region completion durations.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use ordered_float::OrderedFloat;

/// One progress event, as exposed to the calling layer.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub region_label: String,
    pub elapsed: Duration,
    pub percent_complete: f64,
    pub eta: Option<Duration>,
}

/// Running mean/variance accumulator, via the standard incremental
/// (Welford) update.
#[derive(Debug, Clone, Copy, Default)]
struct RunningStats {
    mean: f64,
    sum_sq_dev: f64,
    count: usize,
}

impl RunningStats {
    fn add(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_sq_dev += delta * (value - self.mean);
    }

    fn stddev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.sum_sq_dev / (self.count - 1) as f64).sqrt()
        }
    }
}

const WINDOW_CAPACITY: usize = 64;
const TRIM_SIGMA: f64 = 2.0;

struct ProgressState {
    total_base_pairs: u64,
    completed_base_pairs: u64,
    started_at: Instant,
    recent_durations: Vec<Duration>,
    last_report_percent: u32,
}

/// Mutex-guarded shared progress meter. Contention is negligible, one
/// mutation per completed region, so a plain `Mutex` is used rather than
/// anything lock-free.
pub struct ProgressMeter {
    state: Mutex<ProgressState>,
    /// Report a new log line every time completion crosses a multiple of
    /// this many percentage points (default: every 1% completion).
    report_every_percent: u32,
}

impl ProgressMeter {
    pub fn new(total_base_pairs: u64) -> Self {
        Self::with_report_interval(total_base_pairs, 1)
    }

    pub fn with_report_interval(total_base_pairs: u64, report_every_percent: u32) -> Self {
        ProgressMeter {
            state: Mutex::new(ProgressState {
                total_base_pairs,
                completed_base_pairs: 0,
                started_at: Instant::now(),
                recent_durations: Vec::with_capacity(WINDOW_CAPACITY),
                last_report_percent: 0,
            }),
            report_every_percent: report_every_percent.max(1),
        }
    }

    /// Records a completed region of `base_pairs` length, taking
    /// `duration` wall time. Returns `Some(event)` exactly when a new
    /// reporting threshold was crossed, so the caller logs at most one line
    /// per block rather than one per region.
    pub fn report_completed(
        &self,
        region_label: &str,
        base_pairs: u64,
        duration: Duration,
    ) -> Option<ProgressEvent> {
        let mut state = self.state.lock().expect("progress meter mutex poisoned");

        state.completed_base_pairs += base_pairs;
        if state.recent_durations.len() == WINDOW_CAPACITY {
            state.recent_durations.remove(0);
        }
        state.recent_durations.push(duration);

        let percent_complete = if state.total_base_pairs == 0 {
            100.0
        } else {
            100.0 * state.completed_base_pairs as f64 / state.total_base_pairs as f64
        };
        let elapsed = state.started_at.elapsed();
        let threshold = (percent_complete / self.report_every_percent as f64) as u32;

        if threshold <= state.last_report_percent && state.completed_base_pairs < state.total_base_pairs {
            return None;
        }
        state.last_report_percent = threshold;

        let eta = estimate_eta(
            &state.recent_durations,
            state.total_base_pairs.saturating_sub(state.completed_base_pairs),
            base_pairs,
        );

        Some(ProgressEvent {
            region_label: region_label.to_string(),
            elapsed,
            percent_complete,
            eta,
        })
    }
}

/// ETA from the mean per-base-pair rate over the trimmed window of recent
/// completion durations, after discarding durations more than `TRIM_SIGMA`
/// standard deviations from the window mean. Trimming protects the estimate
/// from being skewed by a handful of trivially small regions, which would
/// otherwise make the rate look faster than it really is.
fn estimate_eta(recent_durations: &[Duration], remaining_base_pairs: u64, last_base_pairs: u64) -> Option<Duration> {
    if recent_durations.is_empty() || last_base_pairs == 0 {
        return None;
    }

    let seconds: Vec<f64> = recent_durations.iter().map(Duration::as_secs_f64).collect();
    let mut stats = RunningStats::default();
    for &s in &seconds {
        stats.add(s);
    }
    let stddev = stats.stddev();

    let trimmed: Vec<f64> = seconds
        .iter()
        .cloned()
        .filter(|&s| stddev == 0.0 || (s - stats.mean).abs() <= TRIM_SIGMA * stddev)
        .collect();
    let trimmed = if trimmed.is_empty() { seconds } else { trimmed };

    let mean_seconds_per_region = trimmed.iter().sum::<f64>() / trimmed.len() as f64;
    // Rough per-base-pair rate using the most recently completed region's
    // size as the representative unit, good enough for a moving estimate,
    // not meant to be exact.
    let seconds_per_base_pair = mean_seconds_per_region / last_base_pairs.max(1) as f64;
    let eta_seconds = seconds_per_base_pair * remaining_base_pairs as f64;
    Some(Duration::from_secs_f64(eta_seconds.max(0.0)))
}

/// Sorts a window of durations descending by magnitude. Used only to pick
/// the outliers out for a debug log line, never for the ETA arithmetic
/// itself (that uses the unsorted window via `estimate_eta`).
pub fn largest_durations(window: &[Duration], n: usize) -> Vec<Duration> {
    let mut sorted = window.to_vec();
    sorted.sort_by_key(|d| OrderedFloat(d.as_secs_f64()));
    sorted.reverse();
    sorted.truncate(n);
    sorted
}
