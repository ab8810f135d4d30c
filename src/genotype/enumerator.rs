//! Ordered enumeration of genotypes of a fixed ploidy over a haplotype set.
//!
//! The interesting part of this component is its contract, not its
//! implementation: produce every multiset of size `ploidy` drawn with
//! replacement from the haplotype set, in a deterministic order, without
//! materializing more than one genotype at a time. The combinatorics
//! themselves are a standard "next combination with repetition" walk.

use crate::genotype::Genotype;
use crate::handle::HaplotypeHandle;

/// Produces all multisets of size `ploidy` drawn with replacement from
/// `haplotypes`, in colex order over sorted haplotype indices.
///
/// `haplotypes` need not already be sorted; the enumerator sorts its own
/// copy so that the emitted order is deterministic regardless of input
/// order (matching the canonical order `Genotype` itself imposes).
pub struct GenotypeEnumerator {
    haplotypes: Vec<HaplotypeHandle>,
    ploidy: u32,
    // Indices into `haplotypes`, non-decreasing, length == ploidy.
    // `None` once enumeration is exhausted.
    state: Option<Vec<usize>>,
}

impl GenotypeEnumerator {
    pub fn new(haplotypes: &[HaplotypeHandle], ploidy: u32) -> Self {
        let mut haplotypes = haplotypes.to_vec();
        haplotypes.sort_unstable();
        haplotypes.dedup();
        let state = if haplotypes.is_empty() && ploidy > 0 {
            None
        } else {
            Some(vec![0usize; ploidy as usize])
        };
        GenotypeEnumerator {
            haplotypes,
            ploidy,
            state,
        }
    }

    /// `C(n + k - 1, k)` where `n` is the number of distinct haplotypes and
    /// `k` is the ploidy, the total size of the enumeration, computed
    /// without ever materializing it.
    pub fn len(&self) -> u64 {
        let n = self.haplotypes.len() as u64;
        let k = self.ploidy as u64;
        if k == 0 {
            return 1;
        }
        binomial(n + k - 1, k)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Iterator for GenotypeEnumerator {
    type Item = Genotype;

    fn next(&mut self) -> Option<Genotype> {
        let indices = self.state.as_ref()?.clone();

        if self.ploidy == 0 {
            self.state = None;
            return Some(Genotype::new(vec![]));
        }

        let handles = indices.iter().map(|&i| self.haplotypes[i]).collect();

        // Advance to the next non-decreasing index tuple: find the
        // rightmost position that can still be incremented without
        // exceeding the last haplotype index, bump it, and reset everything
        // to its right to match (keeping the tuple non-decreasing).
        let n = self.haplotypes.len();
        let mut pos = indices.len();
        let mut next_state = indices.clone();
        loop {
            if pos == 0 {
                self.state = None;
                break;
            }
            pos -= 1;
            if next_state[pos] + 1 < n {
                next_state[pos] += 1;
                let bump = next_state[pos];
                for slot in next_state.iter_mut().skip(pos + 1) {
                    *slot = bump;
                }
                self.state = Some(next_state);
                break;
            }
        }

        Some(Genotype::new(handles))
    }
}

fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 0..k {
        result = result * (n - i) / (i + 1);
    }
    result
}
