pub mod progress;
pub mod read_budget;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::{info, warn};
use rayon::prelude::*;

use crate::errors::OctopusError;
use crate::external::interfaces::GenotypeLogLikelihoods;
use progress::ProgressMeter;

/// A contiguous genomic interval processed as one unit of work.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Region {
    pub contig: String,
    pub contig_index: usize,
    pub start: u64,
    pub end: u64,
}

impl Region {
    pub fn new(contig: impl Into<String>, contig_index: usize, start: u64, end: u64) -> Self {
        Region {
            contig: contig.into(),
            contig_index,
            start,
            end,
        }
    }

    pub fn length(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn label(&self) -> String {
        format!("{}:{}-{}", self.contig, self.start, self.end)
    }
}

/// `Pending -> InProgress -> (Completed | Skipped | Failed)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionState {
    Pending,
    InProgress,
    Completed,
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct RegionOutcome {
    pub region: Region,
    pub state: RegionState,
    pub likelihoods: Option<GenotypeLogLikelihoods>,
}

/// How regions are ordered in the final output, independent of the order in
/// which their worker finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputOrder {
    ReferenceIndex,
    LexicographicAscending,
    LexicographicDescending,
    ContigSize { contig_lengths_descending: bool },
}

impl OutputOrder {
    fn sort_key(&self, outcomes: &mut [RegionOutcome]) {
        match self {
            OutputOrder::ReferenceIndex => {
                outcomes.sort_by_key(|o| (o.region.contig_index, o.region.start))
            }
            OutputOrder::LexicographicAscending => {
                outcomes.sort_by(|a, b| {
                    (&a.region.contig, a.region.start).cmp(&(&b.region.contig, b.region.start))
                })
            }
            OutputOrder::LexicographicDescending => {
                outcomes.sort_by(|a, b| {
                    (&b.region.contig, b.region.start).cmp(&(&a.region.contig, a.region.start))
                })
            }
            OutputOrder::ContigSize { contig_lengths_descending } => {
                // Approximates "contig-size ordered" using each region's own
                // span as a stand-in for full contig length, since the
                // scheduler only ever sees the regions it was given, not
                // the reference dictionary (that lives with the external
                // reference reader, out of scope here).
                outcomes.sort_by_key(|o| o.region.length());
                if *contig_lengths_descending {
                    outcomes.reverse();
                }
            }
        }
    }
}

/// Cooperative cancellation, checked at region boundaries so in-flight
/// regions always complete.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Partitions the target genome into processing units, dispatches each
/// through the caller-supplied pipeline (candidate gen -> haplotype build ->
/// likelihood -> calling, all external collaborators), and reports
/// progress. Parallelism is coarse-grained at the region level: each worker
/// runs one region end-to-end, synchronously.
pub struct RegionScheduler {
    threads: usize,
    output_order: OutputOrder,
    progress: Arc<ProgressMeter>,
    cancellation: CancellationToken,
}

impl RegionScheduler {
    pub fn new(total_base_pairs: u64, threads: usize, output_order: OutputOrder) -> Self {
        RegionScheduler {
            threads: threads.max(1),
            output_order,
            progress: Arc::new(ProgressMeter::new(total_base_pairs)),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Runs `pipeline` over every region in `regions`, in parallel, and
    /// returns outcomes ordered per this scheduler's `OutputOrder`, not
    /// completion order, which is nondeterministic under the worker pool.
    pub fn run<F>(&self, regions: Vec<Region>, pipeline: F) -> Vec<RegionOutcome>
    where
        F: Fn(&Region, &CancellationToken) -> Result<GenotypeLogLikelihoods, OctopusError>
            + Sync
            + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .expect("failed to build region worker pool");

        let mut outcomes: Vec<RegionOutcome> = pool.install(|| {
            regions
                .par_iter()
                .map(|region| self.process_one(region, &pipeline))
                .collect()
        });

        self.output_order.sort_key(&mut outcomes);
        outcomes
    }

    fn process_one<F>(&self, region: &Region, pipeline: &F) -> RegionOutcome
    where
        F: Fn(&Region, &CancellationToken) -> Result<GenotypeLogLikelihoods, OctopusError>,
    {
        if self.cancellation.is_cancelled() {
            return RegionOutcome {
                region: region.clone(),
                state: RegionState::Skipped {
                    reason: "cancelled before region started".to_string(),
                },
                likelihoods: None,
            };
        }

        let started = Instant::now();
        let result = pipeline(region, &self.cancellation);
        let elapsed = started.elapsed();

        match result {
            Ok(likelihoods) => {
                if let Some(event) = self
                    .progress
                    .report_completed(&region.label(), region.length(), elapsed)
                {
                    info!(
                        "{:.1}% complete ({} elapsed, eta {})",
                        event.percent_complete,
                        humantime(event.elapsed),
                        event
                            .eta
                            .map(humantime)
                            .unwrap_or_else(|| "unknown".to_string())
                    );
                }
                RegionOutcome {
                    region: region.clone(),
                    state: RegionState::Completed,
                    likelihoods: Some(likelihoods),
                }
            }
            Err(OctopusError::RegionSkipped { reason }) => {
                warn!("region {} skipped: {}", region.label(), reason);
                self.progress.report_completed(&region.label(), region.length(), elapsed);
                RegionOutcome {
                    region: region.clone(),
                    state: RegionState::Skipped { reason },
                    likelihoods: None,
                }
            }
            Err(other) => {
                warn!("region {} failed: {}", region.label(), other);
                RegionOutcome {
                    region: region.clone(),
                    state: RegionState::Failed {
                        reason: other.to_string(),
                    },
                    likelihoods: None,
                }
            }
        }
    }
}

fn humantime(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
