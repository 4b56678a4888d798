//! Inspect command - summarize a record file.

use std::path::PathBuf;

use colored::Colorize;
use wellmerge::DelimitedReader;

pub fn run(file: PathBuf, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let table = DelimitedReader::new().read_file(&file)?;
    let summary = table.summary();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {}",
        "Well".cyan().bold(),
        summary.name.white().bold()
    );
    println!();

    match summary.depth_range {
        Some((min, max)) => println!(
            "  Depth:  {:.2} - {:.2} ({:.2} logged)",
            min,
            max,
            summary.interval()
        ),
        None => println!("  Depth:  {}", "no rows".red()),
    }
    match summary.step {
        Some(step) => println!("  Step:   {}", step),
        None => println!("  Step:   {}", "undefined".yellow()),
    }
    println!("  Rows:   {}", summary.row_count.to_string().white());
    println!("  Curves: {}", summary.curve_count.to_string().white());
    println!();

    println!("{}", "Curves:".yellow().bold());
    for (name, stats) in &summary.curves {
        let completeness = format!("{:5.1}%", stats.completeness * 100.0);
        let completeness = if stats.completeness >= 0.9 {
            completeness.green()
        } else if stats.completeness >= 0.5 {
            completeness.yellow()
        } else {
            completeness.red()
        };

        let range = match (stats.min, stats.max) {
            (Some(min), Some(max)) => format!("{:.2} .. {:.2}", min, max),
            _ => "-".to_string(),
        };

        println!(
            "  {:12} {:8} {} valid  {}",
            name,
            stats.unit,
            completeness,
            range
        );
    }

    if verbose && !summary.metadata.is_empty() {
        println!();
        println!("{}", "Metadata:".yellow().bold());
        for (key, value) in &summary.metadata {
            println!("  {:14} {}", key, value);
        }
    }

    Ok(())
}
