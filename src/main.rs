// main.rs

// --- External Crate Imports ---
use anyhow::{Error, Result};
use clap::Parser;
use log::{debug, info};
use std::time::Instant;
use tsv_pca::RunConfig;

// --- Main Function ---
fn main() -> Result<(), Error> {
    let total_time_start = Instant::now();
    let cli_args = cli::CliArgs::parse();

    // Initialize logger
    let log_level = cli_args
        .log_level
        .parse::<log::LevelFilter>()
        .unwrap_or_else(|_| {
            eprintln!(
                "Warning: Invalid log level '{}' provided. Defaulting to Info.",
                cli_args.log_level
            );
            log::LevelFilter::Info
        });
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_micros()
        .init();

    info!("Starting tsv_pca with args: {:?}", cli_args);

    let config = RunConfig::from(cli_args);
    let outputs = tsv_pca::run(&config)?;
    debug!("Run outputs: {:?}", outputs);

    info!(
        "tsv_pca finished successfully in {:.2?}.",
        total_time_start.elapsed()
    );
    Ok(())
}

// --- Module Implementations ---

mod cli {
    use clap::Parser;
    use std::path::PathBuf;
    use tsv_pca::RunConfig;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Two-component PCA over the samples of a tab-delimited matrix.", long_about = None, propagate_version = true)]
    pub(crate) struct CliArgs {
        /// The input matrix (tab-delimited; features as rows, samples as columns).
        #[arg(short = 'i', long = "input", required = true)]
        pub(crate) input_matrix: PathBuf,

        /// A comma-delimited list of the samples to run PCA on. Without this argument,
        /// PCA is run on all samples.
        #[arg(short = 's', long = "samples")]
        pub(crate) samples: Option<String>,

        #[arg(long, default_value = "Info")]
        pub(crate) log_level: String,
    }

    impl From<CliArgs> for RunConfig {
        fn from(args: CliArgs) -> Self {
            RunConfig {
                input: args.input_matrix,
                samples: args.samples,
            }
        }
    }
}
