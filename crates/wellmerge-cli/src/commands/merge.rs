//! Merge command - consolidate partial records of one well.

use std::path::PathBuf;

use colored::Colorize;
use wellmerge::{DelimitedReader, MergeConfig, MergeEngine, UnitPolicy};

use super::{reader_config, write_table};

pub struct MergeArgs {
    pub files: Vec<PathBuf>,
    pub name: String,
    pub output: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub tolerance_factor: f64,
    pub fallback_step: f64,
    pub strict_units: bool,
    pub null_value: f64,
    pub verbose: bool,
}

pub fn run(args: MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    for file in &args.files {
        if !file.exists() {
            return Err(format!("File not found: {}", file.display()).into());
        }
    }

    println!(
        "{} {} record(s) into {}",
        "Merging".cyan().bold(),
        args.files.len(),
        args.name.white().bold()
    );

    let reader = DelimitedReader::with_config(
        reader_config(args.null_value).with_well_name(args.name.clone()),
    );
    let tables = args
        .files
        .iter()
        .map(|file| reader.read_file(file))
        .collect::<Result<Vec<_>, _>>()?;

    if args.verbose {
        println!();
        println!("{}", "Inputs:".yellow().bold());
        for (file, table) in args.files.iter().zip(&tables) {
            let (min, max) = table.depth_range()?;
            println!(
                "  {:30} {:>10.2} - {:<10.2} {:>6} rows  {} curves",
                file.display().to_string(),
                min,
                max,
                table.row_count(),
                table.curve_count()
            );
        }
        println!();
    }

    let mut config = MergeConfig::default()
        .with_tolerance_factor(args.tolerance_factor)
        .with_fallback_step(args.fallback_step);
    if let Some(tolerance) = args.tolerance {
        config = config.with_tolerance(tolerance);
    }
    if args.strict_units {
        config = config.with_unit_policy(UnitPolicy::Reject);
    }

    let merged = MergeEngine::with_config(config).merge(&tables, &args.name)?;
    let report = &merged.report;

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(format!("{}_MERGED.las", args.name)));
    write_table(&merged.table, Some(report), &output, args.null_value)?;

    if let Some(report_path) = &args.report {
        report.save(report_path)?;
    }

    println!();
    println!(
        "  Depth:   {:.2} - {:.2} {}(step {})",
        report.depth_range.0,
        report.depth_range.1,
        report.depth_unit.as_deref().map(|u| format!("{} ", u)).unwrap_or_default(),
        report.step
    );
    println!("  Rows:    {}", report.row_count.to_string().white());
    println!("  Curves:  {}", report.curve_count.to_string().white());
    println!(
        "  Overlap: {} point(s) averaged in {} curve(s)",
        report.total_overlap_points().to_string().yellow(),
        report.overlaps_processed()
    );

    if args.verbose {
        println!();
        println!("{}", "Curves:".yellow().bold());
        for (name, stats) in &report.curves {
            println!(
                "  {:12} {:>2} source(s)  {:>6} single  {:>6} averaged  {:>6} null",
                name, stats.sources, stats.single_source_points, stats.overlap_points, stats.null_points
            );
        }
    }

    if !report.unit_conflicts.is_empty() {
        println!();
        println!("{}", "Unit conflicts:".red().bold());
        for conflict in &report.unit_conflicts {
            println!(
                "  {}: kept {}, ignored {} from {}",
                conflict.curve.white(),
                conflict.kept.green(),
                conflict.found.red(),
                conflict.source
            );
        }
    }

    println!();
    println!(
        "{} {}",
        "Wrote".green().bold(),
        output.display().to_string().white()
    );
    if let Some(report_path) = &args.report {
        println!(
            "{} {}",
            "Report".green().bold(),
            report_path.display().to_string().white()
        );
    }

    Ok(())
}
