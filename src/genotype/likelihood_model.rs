//! `ln P(reads | genotype, sample)` under a uniform haplotype-mixture model.
//!
//! The ploidy specializations (haploid/diploid/triploid) exist purely for
//! performance, the inner loop runs over millions of reads times thousands
//! of haplotypes, and are required to agree with the general polyploid
//! path to within the tolerance exercised in this module's tests. The
//! general path is the one source of truth; nothing here hand-derives a
//! different formula per ploidy, every branch is the same mixture model
//! evaluated with fewer redundant `log_sum_exp` terms.

use crate::errors::PreconditionViolation;
use crate::genotype::Genotype;
use crate::handle::HaplotypeHandle;
use crate::likelihoods::HaplotypeLikelihoodCache;
use crate::log_arith;

pub struct GermlineLikelihoodModel;

impl GermlineLikelihoodModel {
    /// `ln P(R | G)` for the sample most recently primed into `cache`.
    ///
    /// Precondition: `cache` is primed and every haplotype in `genotype`
    /// has an entry in it. Violating either is a programmer error and
    /// panics (see [`PreconditionViolation::fault`]), not something this
    /// function recovers from.
    pub fn evaluate(cache: &HaplotypeLikelihoodCache, genotype: &Genotype) -> f64 {
        Self::try_evaluate(cache, genotype).unwrap_or_else(|e| e.fault())
    }

    /// Fallible form of [`Self::evaluate`], for callers (tests, the worker
    /// loop itself) that want to log the offending state before panicking
    /// rather than let the panic message alone carry it.
    pub fn try_evaluate(
        cache: &HaplotypeLikelihoodCache,
        genotype: &Genotype,
    ) -> Result<f64, PreconditionViolation> {
        let ploidy = genotype.ploidy();
        if ploidy == 0 {
            return Ok(0.0);
        }

        let vectors: Vec<&[f64]> = genotype
            .iter()
            .map(|&h| cache.get(h))
            .collect::<Result<_, _>>()?;

        let read_count = vectors[0].len();
        if read_count == 0 {
            return Ok(0.0);
        }

        let result = match ploidy {
            1 => Self::haploid(&vectors),
            2 => Self::diploid(genotype, &vectors),
            3 => Self::triploid(genotype, &vectors),
            _ => Self::polyploid(genotype, &vectors),
        };
        Ok(result)
    }

    fn haploid(vectors: &[&[f64]]) -> f64 {
        vectors[0].iter().sum()
    }

    fn diploid(genotype: &Genotype, vectors: &[&[f64]]) -> f64 {
        if genotype.is_homozygous() {
            return vectors[0].iter().sum();
        }
        let ln2 = log_arith::ln_small(2);
        let (l1, l2) = (vectors[0], vectors[1]);
        (0..l1.len())
            .map(|r| log_arith::log_sum_exp2(l1[r], l2[r]) - ln2)
            .sum()
    }

    fn triploid(genotype: &Genotype, vectors: &[&[f64]]) -> f64 {
        match genotype.zygosity() {
            1 => vectors[0].iter().sum(),
            3 => {
                let ln3 = log_arith::ln_small(3);
                let (l1, l2, l3) = (vectors[0], vectors[1], vectors[2]);
                (0..l1.len())
                    .map(|r| log_arith::log_sum_exp3(l1[r], l2[r], l3[r]) - ln3)
                    .sum()
            }
            2 => {
                // One handle occurs twice, one once. `genotype` is in
                // canonical order, so either the first pair or the last
                // pair of `vectors` matches; which one is "double" vs
                // "single" must not change the result.
                let ln2 = log_arith::ln_small(2);
                let ln3 = log_arith::ln_small(3);
                let (single, double) = split_triploid_zygosity_two(genotype, vectors);
                (0..single.len())
                    .map(|r| log_arith::log_sum_exp2(single[r], ln2 + double[r]) - ln3)
                    .sum()
            }
            z => unreachable!("triploid genotype cannot have zygosity {}", z),
        }
    }

    fn polyploid(genotype: &Genotype, vectors: &[&[f64]]) -> f64 {
        let ploidy = genotype.ploidy();
        let ln_k = log_arith::ln_small(ploidy as u32);
        let read_count = vectors[0].len();

        match genotype.zygosity() {
            1 => vectors[0].iter().sum(),
            2 => {
                let unique = genotype.unique_with_counts();
                let (ha, ma) = unique[0];
                let (_hb, mb) = unique[1];
                let la = vector_for(genotype, vectors, ha);
                let lb = vector_for(genotype, vectors, unique[1].0);
                let ln_ma = log_arith::ln_small(ma as u32);
                let ln_mb = log_arith::ln_small(mb as u32);
                (0..read_count)
                    .map(|r| log_arith::log_sum_exp2(ln_ma + la[r], ln_mb + lb[r]) - ln_k)
                    .sum()
            }
            _ => {
                let unique = genotype.unique_with_counts();
                let per_haplotype: Vec<(&[f64], f64)> = unique
                    .iter()
                    .map(|&(h, m)| (vector_for(genotype, vectors, h), log_arith::ln_small(m as u32)))
                    .collect();
                let mut scratch = vec![0.0_f64; per_haplotype.len()];
                (0..read_count)
                    .map(|r| {
                        for (slot, (vector, ln_m)) in scratch.iter_mut().zip(per_haplotype.iter()) {
                            *slot = ln_m + vector[r];
                        }
                        log_arith::log_sum_exp(&scratch) - ln_k
                    })
                    .sum()
            }
        }
    }
}

/// Looks up the per-read vector belonging to `handle` among the already
/// fetched `vectors`, which are in `genotype`'s canonical (sorted) order.
fn vector_for<'a>(genotype: &Genotype, vectors: &[&'a [f64]], handle: HaplotypeHandle) -> &'a [f64] {
    let position = (0..genotype.ploidy())
        .find(|&i| genotype[i] == handle)
        .expect("handle came from this genotype's own unique() listing");
    vectors[position]
}

/// Splits a zygosity-2 triploid genotype's vectors into (single, double)
/// without caring which of the two distinct handles happens to sort first;
/// both `genotype[0] != genotype[1]` and `genotype[1] != genotype[2]` are
/// valid shapes for a zygosity-2 triploid in canonical order, and both must
/// produce the same per-read contribution.
fn split_triploid_zygosity_two<'a>(
    genotype: &Genotype,
    vectors: &[&'a [f64]],
) -> (&'a [f64], &'a [f64]) {
    if genotype[0] == genotype[1] {
        (vectors[2], vectors[0])
    } else {
        (vectors[0], vectors[2])
    }
}
