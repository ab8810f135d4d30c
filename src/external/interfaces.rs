//! The boundary of this crate's responsibility. Everything
//! here is either a trait the caller implements (candidate generation,
//! haplotype construction, read access, pairwise alignment) or a plain data
//! type this crate hands back to the calling layer. No default
//! implementations live here on purpose: providing one would blur the line
//! between the inference core and the collaborators it deliberately does
//! not own.

use std::collections::HashMap;

use crate::genotype::Genotype;
use crate::handle::{HaplotypeHandle, SampleId};

/// A candidate variant at a genomic position, as produced by candidate
/// generation (CIGAR-derived, assembly-derived, or external-VCF-derived).
/// Left fully opaque to callers beyond position/ref/alt: this
/// crate never interprets variant content itself, only haplotypes that
/// already encode it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub position: u64,
    pub reference_bases: Vec<u8>,
    pub alt_bases: Vec<u8>,
}

/// Per-read log-likelihood against one haplotype, as produced by the
/// pairwise aligner.
pub trait Aligner {
    fn align(&self, read_index: usize, haplotype: HaplotypeHandle) -> f64;
}

/// Variant candidates for a region. Implementations are
/// expected to be unioned and deduplicated upstream of this crate; this
/// trait only describes the shape of one source.
pub trait CandidateGenerator {
    fn generate(&self, region: &crate::scheduler::Region) -> Vec<Variant>;
}

/// Builds the working haplotype set (plus the distinguished reference
/// haplotype) for a region from its candidate variants.
pub trait HaplotypeBuilder {
    fn build(
        &self,
        region: &crate::scheduler::Region,
        variants: &[Variant],
    ) -> (Vec<HaplotypeHandle>, HaplotypeHandle);
}

/// Aligned reads for one (region, sample) pair.
pub trait ReadSource {
    fn reads(&self, region: &crate::scheduler::Region, sample: &SampleId) -> Vec<Read>;
}

/// An aligned read, reduced to what this crate's boundary needs: enough to
/// size per-sample likelihood vectors and account read-buffer memory for
/// backpressure. Sequence/quality/CIGAR content lives with the caller.
#[derive(Debug, Clone)]
pub struct Read {
    pub index_within_sample: usize,
    pub size_in_bytes: u64,
}

/// A mapping from genotype to its log-likelihood, one per sample, the
/// primary output the calling layer consumes.
/// Priors and posterior calculation are the caller's job; this crate only
/// ever produces likelihoods.
#[derive(Debug, Clone, Default)]
pub struct GenotypeLogLikelihoods {
    per_sample: HashMap<SampleId, Vec<(Genotype, f64)>>,
}

impl GenotypeLogLikelihoods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: SampleId, genotype: Genotype, log_likelihood: f64) {
        self.per_sample.entry(sample).or_default().push((genotype, log_likelihood));
    }

    pub fn for_sample(&self, sample: &SampleId) -> Option<&[(Genotype, f64)]> {
        self.per_sample.get(sample).map(|v| v.as_slice())
    }

    pub fn samples(&self) -> impl Iterator<Item = &SampleId> {
        self.per_sample.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.per_sample.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::HaplotypeHandle;

    #[test]
    fn insert_and_lookup_round_trips() {
        let mut gll = GenotypeLogLikelihoods::new();
        let sample = SampleId::new("s1");
        let genotype = Genotype::new(vec![HaplotypeHandle::new(0)]);
        gll.insert(sample.clone(), genotype.clone(), -1.23);
        let entries = gll.for_sample(&sample).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, genotype);
        assert_eq!(entries[0].1, -1.23);
    }

    #[test]
    fn unknown_sample_is_none() {
        let gll = GenotypeLogLikelihoods::new();
        assert!(gll.for_sample(&SampleId::new("missing")).is_none());
    }
}
