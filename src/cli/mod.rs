// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, routes to Layer 2, and prints the
// results. This is the only layer that writes reports to stdout.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use std::path::Path;

use crate::application::pipeline::{PipelineConfig, PipelineOutcome, PipelineUseCase};
use crate::data::synthetic::{generate, write_csv, SyntheticConfig};
use commands::{Commands, SynthArgs};

#[derive(Parser, Debug)]
#[command(
    name = "antibody-classifier",
    version,
    about = "Train boosted-tree or attention classifiers on tabular antibody data."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Boost(args) => {
                let config = resolve(args.data.config.clone(), || args.into())?;
                run_pipeline(config)
            }
            Commands::Attention(args) => {
                let config = resolve(args.data.config.clone(), || args.into())?;
                run_pipeline(config)
            }
            Commands::Synth(args) => run_synth(&args),
        }
    }
}

/// `--config` wins over every other flag
fn resolve(config_path: Option<String>, from_flags: impl FnOnce() -> PipelineConfig) -> Result<PipelineConfig> {
    match config_path {
        Some(path) => {
            tracing::info!("Loading run configuration from '{}'", path);
            PipelineConfig::from_json_file(path)
        }
        None => Ok(from_flags()),
    }
}

fn run_pipeline(config: PipelineConfig) -> Result<()> {
    tracing::info!("Starting run on '{}'", config.data.csv_path);
    let outcome = PipelineUseCase::new(config).execute()?;
    print_outcome(&outcome);
    Ok(())
}

fn print_outcome(out: &PipelineOutcome) {
    println!("\nModel: {}", out.estimator);
    println!(
        "Rows: {} train / {} test ({} dropped during cleaning)",
        out.n_train, out.n_test, out.dropped_rows
    );
    println!("Classes: {}", out.classes.join(", "));
    println!("\n=== Training set (accuracy {:.4}) ===\n", out.train_report.accuracy);
    println!("{}", out.train_report);
    println!("=== Test set (accuracy {:.4}) ===\n", out.test_report.accuracy);
    println!("{}", out.test_report);
}

fn run_synth(args: &SynthArgs) -> Result<()> {
    let cfg: SyntheticConfig = args.into();
    let table = generate(&cfg)?;
    write_csv(&table, Path::new(&args.output))?;
    println!(
        "Wrote {} rows ({} features, {} classes) to {}",
        cfg.rows, cfg.features, cfg.classes, args.output
    );
    Ok(())
}
