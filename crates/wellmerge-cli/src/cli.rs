//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wellmerge: consolidate partial well-log records
#[derive(Parser)]
#[command(name = "wellmerge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge partial records of one well into a single table
    Merge {
        /// Partial record files (CSV/TSV)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Name of the merged well
        #[arg(short, long)]
        name: String,

        /// Output path; .las writes LAS 2.0, anything else delimited text
        /// (default: <name>_MERGED.las)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the merge report as JSON
        #[arg(long)]
        report: Option<PathBuf>,

        /// Absolute depth tolerance for nearest-row lookup
        #[arg(long)]
        tolerance: Option<f64>,

        /// Tolerance as a fraction of each input's step
        #[arg(long, default_value = "0.5")]
        tolerance_factor: f64,

        /// Step used when every input has a single row
        #[arg(long, default_value = "1.0")]
        fallback_step: f64,

        /// Fail instead of warning when inputs disagree on a curve unit
        #[arg(long)]
        strict_units: bool,

        /// "No data" value read as null and written for null cells
        #[arg(long, default_value = "-999.25", allow_hyphen_values = true)]
        null_value: f64,
    },

    /// Show a summary of a record file
    Inspect {
        /// Path to the record file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Group many files by well and merge every well with several records
    Batch {
        /// Record files (CSV/TSV)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Directory for merged outputs
        #[arg(short = 'd', long)]
        output_dir: PathBuf,

        /// How to derive the well name from a file name
        #[arg(long, default_value = "stem")]
        name_from: NameSource,

        /// Output format
        #[arg(short, long, default_value = "las")]
        format: OutputFormat,
    },
}

/// Where a file's well name comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameSource {
    /// Whole file stem (`POZO-1.csv` -> `POZO-1`)
    #[default]
    Stem,
    /// Stem up to the first underscore (`POZO-1_run2.csv` -> `POZO-1`)
    Prefix,
}

impl NameSource {
    pub fn well_name(&self, path: &std::path::Path) -> String {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "well".to_string());
        match self {
            NameSource::Stem => stem,
            NameSource::Prefix => match stem.split_once('_') {
                Some((prefix, _)) if !prefix.is_empty() => prefix.to_string(),
                _ => stem,
            },
        }
    }
}

impl std::str::FromStr for NameSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stem" => Ok(NameSource::Stem),
            "prefix" => Ok(NameSource::Prefix),
            _ => Err(format!("Unknown name source: {}. Use stem or prefix.", s)),
        }
    }
}

impl std::fmt::Display for NameSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameSource::Stem => write!(f, "stem"),
            NameSource::Prefix => write!(f, "prefix"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Las,
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Las => "las",
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "las" => Ok(OutputFormat::Las),
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            _ => Err(format!("Unknown format: {}. Use las, csv, or tsv.", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_name_source() {
        let path = Path::new("data/POZO-1_run2.csv");
        assert_eq!(NameSource::Stem.well_name(path), "POZO-1_run2");
        assert_eq!(NameSource::Prefix.well_name(path), "POZO-1");
        assert_eq!(NameSource::Prefix.well_name(Path::new("POZO-3.csv")), "POZO-3");
    }

    #[test]
    fn test_parse_merge_args() {
        let cli = Cli::try_parse_from([
            "wellmerge",
            "merge",
            "a.csv",
            "b.csv",
            "--name",
            "POZO-1",
            "--null-value",
            "-9999",
            "--strict-units",
        ])
        .unwrap();

        match cli.command {
            Commands::Merge {
                files,
                name,
                null_value,
                strict_units,
                tolerance_factor,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(name, "POZO-1");
                assert_eq!(null_value, -9999.0);
                assert!(strict_units);
                assert_eq!(tolerance_factor, 0.5);
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!("xlsx".parse::<OutputFormat>().is_err());
        assert_eq!("LAS".parse::<OutputFormat>().unwrap(), OutputFormat::Las);
    }
}
