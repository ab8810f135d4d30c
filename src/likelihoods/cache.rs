use std::collections::HashMap;

use crate::errors::PreconditionViolation;
use crate::handle::{HaplotypeHandle, SampleId};

/// Stores, per (haplotype, sample), the vector of per-read log-likelihoods
/// produced by the pairwise aligner.
///
/// Lifetime: primed at the start of region processing by the worker that
/// owns it, dropped at region end via `clear` (or by dropping the cache
/// itself). One cache per worker, see the scheduler's resource model, it
/// is never shared across workers or regions.
#[derive(Debug, Default)]
pub struct HaplotypeLikelihoodCache {
    by_sample: HashMap<SampleId, HashMap<HaplotypeHandle, Vec<f64>>>,
    current_sample: Option<SampleId>,
    primed: bool,
}

impl HaplotypeLikelihoodCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the set of (haplotype, vector) pairs for one sample.
    ///
    /// Precondition: all vectors have the same length (the sample's read
    /// count). Violating it is a programmer error in the upstream loader
    /// that populated the vectors, not a data condition this cache should
    /// paper over, so it panics immediately rather than deferring the
    /// failure to the first mismatched query.
    pub fn prime(
        &mut self,
        sample: SampleId,
        per_haplotype_vectors: impl IntoIterator<Item = (HaplotypeHandle, Vec<f64>)>,
    ) {
        let mut haplotypes = HashMap::new();
        let mut expected_len: Option<usize> = None;
        for (handle, vector) in per_haplotype_vectors {
            match expected_len {
                None => expected_len = Some(vector.len()),
                Some(expected) if expected != vector.len() => {
                    PreconditionViolation::VectorLengthMismatch(expected, vector.len()).fault();
                }
                Some(_) => {}
            }
            haplotypes.insert(handle, vector);
        }
        self.by_sample.insert(sample.clone(), haplotypes);
        self.current_sample = Some(sample);
        self.primed = true;
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Queries the log-likelihood vector for `haplotype` against the most
    /// recently primed sample.
    pub fn get(&self, haplotype: HaplotypeHandle) -> Result<&[f64], PreconditionViolation> {
        self.require_primed()?;
        let sample = self
            .current_sample
            .as_ref()
            .expect("primed implies current_sample is set");
        self.get_for_sample(sample, haplotype)
    }

    /// Queries the log-likelihood vector for `haplotype` against an
    /// explicit sample, independent of whichever sample was primed last.
    pub fn get_for_sample(
        &self,
        sample: &SampleId,
        haplotype: HaplotypeHandle,
    ) -> Result<&[f64], PreconditionViolation> {
        self.require_primed()?;
        self.by_sample
            .get(sample)
            .and_then(|haplotypes| haplotypes.get(&haplotype))
            .map(|v| v.as_slice())
            .ok_or(PreconditionViolation::UnknownHaplotype(haplotype))
    }

    /// Drops all state; `is_primed()` returns `false` afterwards.
    pub fn clear(&mut self) {
        self.by_sample.clear();
        self.current_sample = None;
        self.primed = false;
    }

    fn require_primed(&self) -> Result<(), PreconditionViolation> {
        if self.primed {
            Ok(())
        } else {
            Err(PreconditionViolation::CacheNotPrimed)
        }
    }
}
