// levelcat-cli/src/main.rs
//
// CLI entry point for the levelcat batch pipeline.
//
// Responsibilities:
// - Parsing command-line arguments (`cli.rs`).
// - Initializing logging (env_logger, RUST_LOG controlled, default info).
// - Mapping arguments onto the core `PipelineConfig`.
// - Invoking the core pipeline and printing a per-batch summary.
// - Mapping the result to the process exit code: zero on completion,
//   including the "nothing to do" case, non-zero on any fatal error.

mod cli;

use clap::Parser;
use cli::Cli;
use console::style;
use levelcat_core::{run_pipeline, BatchResult, FailurePolicy, PipelineConfig};
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(cli);

    println!(
        "{} levelcat run starting at {}",
        style("==>").bold().cyan(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!("    Source:  {}", config.source_dir.display());
    println!("    Output:  {}", config.output_dir.display());
    println!("    Engine:  {}", config.engine);
    println!(
        "    Targets: {} LUFS, {} dBTP peak, {} LU range",
        config.targets.integrated, config.targets.true_peak, config.targets.loudness_range
    );

    match run_pipeline(&config) {
        Ok(result) => print_summary(&result),
        Err(e) => {
            eprintln!("{} {}", style("Error:").bold().red(), e);
            process::exit(1);
        }
    }
}

/// Maps parsed arguments onto the core configuration, starting from the
/// documented defaults.
fn build_config(cli: Cli) -> PipelineConfig {
    let mut config = PipelineConfig::new(cli.source_dir, cli.output_dir);
    config.engine = cli.engine;
    config.manifest_name = cli.manifest;
    if let Some(integrated) = cli.target_i {
        config.targets.integrated = integrated;
    }
    if let Some(true_peak) = cli.target_tp {
        config.targets.true_peak = true_peak;
    }
    if let Some(loudness_range) = cli.target_lra {
        config.targets.loudness_range = loudness_range;
    }
    if cli.abort_on_failure {
        config.failure_policy = FailurePolicy::Abort;
    }
    config
}

fn print_summary(result: &BatchResult) {
    match &result.concatenated {
        None => {
            println!(
                "{} Nothing to do: the manifest has no usable entries",
                style("==>").bold().yellow()
            );
        }
        Some(path) => {
            println!("{} Batch complete", style("==>").bold().green());
            println!("    Normalized: {} file(s)", result.processed.len());
            if !result.skipped.is_empty() {
                println!("    Skipped:    {} file(s)", result.skipped.len());
                for skip in &result.skipped {
                    println!("      - {}: {}", skip.path.display(), skip.reason);
                }
            }
            println!("    Final output: {}", path.display());
        }
    }
}
