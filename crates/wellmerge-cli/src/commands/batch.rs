//! Batch command - merge every well that has several records.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use tracing::info;
use wellmerge::io::DEFAULT_NULL_VALUE;
use wellmerge::{DelimitedReader, MergeEngine, ReaderConfig, WellRegistry};

use crate::cli::{NameSource, OutputFormat};

use super::write_table;

pub fn run(
    files: Vec<PathBuf>,
    output_dir: PathBuf,
    name_from: NameSource,
    format: OutputFormat,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = WellRegistry::new();

    for file in &files {
        if !file.exists() {
            return Err(format!("File not found: {}", file.display()).into());
        }
        let name = name_from.well_name(file);
        let reader = DelimitedReader::with_config(ReaderConfig::default().with_well_name(&name));
        let table = reader.read_file(file)?;
        info!(file = %file.display(), well = %name, "loaded record");

        if verbose {
            println!(
                "  {} {} -> {}",
                "Loaded".cyan(),
                file.display(),
                name.white()
            );
        }
        registry.insert(table);
    }

    let to_merge = registry.duplicates().len();
    println!(
        "{} {} file(s): {} well(s), {} to merge",
        "Loaded".cyan().bold(),
        files.len(),
        registry.len(),
        to_merge
    );

    let reports = registry.merge_all(&MergeEngine::new())?;

    fs::create_dir_all(&output_dir)?;
    let names: Vec<String> = registry.names().map(str::to_string).collect();
    for name in names {
        let Some(table) = registry.get(&name).and_then(|group| group.first()) else {
            continue;
        };
        let report = reports.get(&name);
        let path = output_dir.join(format!(
            "{}{}.{}",
            name,
            if report.is_some() { "_MERGED" } else { "" },
            format.extension()
        ));

        write_table(table, report, &path, DEFAULT_NULL_VALUE)?;

        match report {
            Some(report) => println!(
                "  {} {:20} {} sources, {} averaged point(s) -> {}",
                "merged".green(),
                name,
                report.sources.len(),
                report.total_overlap_points(),
                path.display()
            ),
            None => println!(
                "  {} {:20} single record -> {}",
                "copied".white(),
                name,
                path.display()
            ),
        }
    }

    println!();
    println!(
        "{} {} well(s) to {}",
        "Wrote".green().bold(),
        registry.len(),
        output_dir.display().to_string().white()
    );

    Ok(())
}
