//! Wellmerge CLI - merge partial well-log records.

mod cli;
mod commands;

use std::io;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let result = match cli.command {
        Commands::Merge {
            files,
            name,
            output,
            report,
            tolerance,
            tolerance_factor,
            fallback_step,
            strict_units,
            null_value,
        } => commands::merge::run(commands::merge::MergeArgs {
            files,
            name,
            output,
            report,
            tolerance,
            tolerance_factor,
            fallback_step,
            strict_units,
            null_value,
            verbose: cli.verbose,
        }),

        Commands::Inspect { file, json } => commands::inspect::run(file, json, cli.verbose),

        Commands::Batch {
            files,
            output_dir,
            name_from,
            format,
        } => commands::batch::run(files, output_dir, name_from, format, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
