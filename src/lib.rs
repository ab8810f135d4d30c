//! Probabilistic inference core for a germline/somatic variant caller:
//! per-read/per-haplotype likelihood caching, and a genotype likelihood
//! model marginalizing over haplotypes under arbitrary ploidy.
//!
//! This crate owns the statistical core only. Candidate generation,
//! haplotype assembly, read alignment, and variant output are external
//! collaborators this crate calls into through the traits in
//! [`external::interfaces`], never implements itself.

pub mod config;
pub mod errors;
pub mod external;
pub mod genotype;
pub mod handle;
pub mod likelihoods;
pub mod log_arith;
pub mod refcache;
pub mod scheduler;

pub use config::Config;
pub use errors::{OctopusError, PreconditionViolation};
pub use genotype::Genotype;
pub use genotype::enumerator::GenotypeEnumerator;
pub use genotype::likelihood_model::GermlineLikelihoodModel;
pub use handle::{HaplotypeHandle, SampleId};
pub use likelihoods::HaplotypeLikelihoodCache;
pub use scheduler::{CancellationToken, Region, RegionOutcome, RegionScheduler};
