//! CLI command implementations.

pub mod batch;
pub mod inspect;
pub mod merge;

use std::path::Path;

use wellmerge::{
    CurveTable, DelimitedWriter, LasConfig, LasWriter, MergeReport, ReaderConfig, WriterConfig,
};

/// Reader config that treats `null_value` as "no data" on top of the usual sentinels.
pub fn reader_config(null_value: f64) -> ReaderConfig {
    let mut config = ReaderConfig::default();
    if !config.null_values.contains(&null_value) {
        config.null_values.push(null_value);
    }
    config
}

/// Write `table` as LAS when `path` ends in `.las`, delimited text otherwise.
pub fn write_table(
    table: &CurveTable,
    report: Option<&MergeReport>,
    path: &Path,
    null_value: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "las" => {
            let config = LasConfig {
                null_value,
                ..LasConfig::default()
            };
            LasWriter::with_config(config).write_file(table, report, path)?;
        }
        ext => {
            let config = WriterConfig {
                delimiter: if ext == "tsv" { b'\t' } else { b',' },
                null_value,
                ..WriterConfig::default()
            };
            DelimitedWriter::with_config(config).write_file(table, path)?;
        }
    }
    Ok(())
}
