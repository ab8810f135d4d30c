//! The one narrow external-VCF contract this crate depends on: turning a
//! VCF record's REF/ALT pairs into [`Variant`](super::interfaces::Variant)s.
//! Full VCF/BCF I/O is out of scope, this is just the left-trim rule a
//! record-to-variant conversion needs, kept independently testable rather
//! than folded into a parser this crate doesn't own.

use super::interfaces::Variant;

/// One VCF record reduced to what the trim rule needs: a 1-based position
/// and the REF/ALT byte strings. Multi-ALT records are the caller's
/// responsibility to split into one `VcfRecord` per ALT before calling this.
#[derive(Debug, Clone)]
pub struct VcfRecord {
    pub position: u64,
    pub reference_bases: Vec<u8>,
    pub alt_bases: Vec<u8>,
}

/// Converts one VCF record into its `Variant`: ref/alt pairs of unequal
/// length are left-trimmed by their common prefix
/// (advancing the position by the prefix length); equal-length pairs are
/// emitted verbatim at the record position. No right-trimming is performed.
pub fn variant_from_record(record: &VcfRecord) -> Variant {
    if record.reference_bases.len() == record.alt_bases.len() {
        return Variant {
            position: record.position,
            reference_bases: record.reference_bases.clone(),
            alt_bases: record.alt_bases.clone(),
        };
    }

    let prefix_len = record
        .reference_bases
        .iter()
        .zip(record.alt_bases.iter())
        .take_while(|(a, b)| a == b)
        .count();

    Variant {
        position: record.position + prefix_len as u64,
        reference_bases: record.reference_bases[prefix_len..].to_vec(),
        alt_bases: record.alt_bases[prefix_len..].to_vec(),
    }
}

/// Yields one `Variant` per ALT allele in `alts`, applying
/// [`variant_from_record`] to each (REF, ALT) pair independently. ALTs in
/// one VCF record are trimmed against REF individually, never against each
/// other.
pub fn variants_from_record(position: u64, reference_bases: &[u8], alts: &[Vec<u8>]) -> Vec<Variant> {
    alts.iter()
        .map(|alt| {
            variant_from_record(&VcfRecord {
                position,
                reference_bases: reference_bases.to_vec(),
                alt_bases: alt.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(position: u64, reference: &str, alt: &str) -> Variant {
        variant_from_record(&VcfRecord {
            position,
            reference_bases: reference.as_bytes().to_vec(),
            alt_bases: alt.as_bytes().to_vec(),
        })
    }

    #[test]
    fn unequal_length_pair_left_trims_and_advances_position() {
        let variant = v(100, "ACGT", "ACGG");
        assert_eq!(variant.position, 103);
        assert_eq!(variant.reference_bases, b"T");
        assert_eq!(variant.alt_bases, b"G");
    }

    #[test]
    fn deletion_trims_shared_prefix_and_leaves_empty_alt() {
        let variant = v(100, "AT", "A");
        assert_eq!(variant.position, 101);
        assert_eq!(variant.reference_bases, b"T");
        assert_eq!(variant.alt_bases, b"");
    }

    #[test]
    fn equal_length_pair_is_emitted_verbatim() {
        let variant = v(100, "A", "T");
        assert_eq!(variant.position, 100);
        assert_eq!(variant.reference_bases, b"A");
        assert_eq!(variant.alt_bases, b"T");
    }

    #[test]
    fn no_right_trimming_even_with_shared_suffix() {
        // REF=ACGT, ALT=TCGT share a 3-base suffix "CGT" but differ at the
        // first base; the shared *prefix* is empty, so nothing is trimmed.
        let variant = v(50, "ACGT", "TCGT");
        assert_eq!(variant.position, 50);
        assert_eq!(variant.reference_bases, b"ACGT");
        assert_eq!(variant.alt_bases, b"TCGT");
    }

    #[test]
    fn multi_alt_record_trims_each_alt_independently() {
        let variants = variants_from_record(100, b"ACGT", &[b"ACGG".to_vec(), b"ACCT".to_vec()]);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].position, 103);
        assert_eq!(variants[0].reference_bases, b"T");
        assert_eq!(variants[0].alt_bases, b"G");
        assert_eq!(variants[1].position, 102);
        assert_eq!(variants[1].reference_bases, b"GT");
        assert_eq!(variants[1].alt_bases, b"CT");
    }
}
