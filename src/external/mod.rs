pub mod interfaces;
pub mod vcf_candidates;
