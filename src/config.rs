//! Run configuration: the knobs that vary from run to run rather than
//! being compiled in (`haplotype-overflow`, `max-holdout-depth`, the
//! reference-cache and read-buffer caps, worker count, output ordering).
//! Loadable from a TOML file, or built directly with defaults.

use serde::{Deserialize, Serialize};

use crate::errors::OctopusError;
use crate::scheduler::OutputOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputOrderConfig {
    ReferenceIndex,
    LexicographicAscending,
    LexicographicDescending,
    ContigSizeAscending,
    ContigSizeDescending,
}

impl From<OutputOrderConfig> for OutputOrder {
    fn from(value: OutputOrderConfig) -> Self {
        match value {
            OutputOrderConfig::ReferenceIndex => OutputOrder::ReferenceIndex,
            OutputOrderConfig::LexicographicAscending => OutputOrder::LexicographicAscending,
            OutputOrderConfig::LexicographicDescending => OutputOrder::LexicographicDescending,
            OutputOrderConfig::ContigSizeAscending => OutputOrder::ContigSize {
                contig_lengths_descending: false,
            },
            OutputOrderConfig::ContigSizeDescending => OutputOrder::ContigSize {
                contig_lengths_descending: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Maximum haplotypes considered per region before it is skipped
    /// with `RegionSkipped`.
    pub haplotype_overflow: usize,
    /// Maximum holdout re-attempts before a region is skipped.
    pub max_holdout_depth: u32,
    /// Reference-sequence cache cap, in bytes (default: 500 MiB).
    pub reference_cache_cap_bytes: u64,
    /// Per-process read-buffer soft cap, in bytes (default: 2 GiB).
    pub read_buffer_cap_bytes: u64,
    pub worker_threads: usize,
    pub output_order: OutputOrderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            haplotype_overflow: 128,
            max_holdout_depth: 8,
            reference_cache_cap_bytes: 500 * 1024 * 1024,
            read_buffer_cap_bytes: 2 * 1024 * 1024 * 1024,
            worker_threads: num_cpus(),
            output_order: OutputOrderConfig::ReferenceIndex,
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, OctopusError> {
        let config: Config =
            toml::from_str(contents).map_err(|e| OctopusError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OctopusError> {
        if self.worker_threads == 0 {
            return Err(OctopusError::InvalidConfig(
                "worker-threads must be at least 1".to_string(),
            ));
        }
        if self.haplotype_overflow == 0 {
            return Err(OctopusError::InvalidConfig(
                "haplotype-overflow must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_worker_threads_is_invalid_config() {
        let mut config = Config::default();
        config.worker_threads = 0;
        assert!(matches!(config.validate(), Err(OctopusError::InvalidConfig(_))));
    }

    #[test]
    fn parses_from_toml() {
        let toml = r#"
            haplotype-overflow = 64
            max-holdout-depth = 4
            reference-cache-cap-bytes = 1048576
            read-buffer-cap-bytes = 2097152
            worker-threads = 4
            output-order = "lexicographic-ascending"
        "#;
        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.haplotype_overflow, 64);
        assert_eq!(config.output_order, OutputOrderConfig::LexicographicAscending);
    }

    #[test]
    fn invalid_toml_is_invalid_config_error() {
        assert!(matches!(
            Config::from_toml_str("not valid toml {{{"),
            Err(OctopusError::InvalidConfig(_))
        ));
    }
}
