pub mod cache;

pub use cache::HaplotypeLikelihoodCache;
