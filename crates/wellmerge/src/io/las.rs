//! LAS 2.0 writer.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::{Result, WellMergeError};
use crate::merge::MergeReport;
use crate::table::CurveTable;

use super::DEFAULT_NULL_VALUE;

/// Relative spread under which consecutive depth deltas count as one step.
const REGULAR_STEP_SLACK: f64 = 1e-6;

/// LAS writer configuration.
#[derive(Debug, Clone)]
pub struct LasConfig {
    /// Value written for null cells and declared in `NULL.`.
    pub null_value: f64,
    /// Decimal places for depths and values.
    pub precision: usize,
    /// Depth unit used when the table has no `depth_unit` metadata.
    pub depth_unit: String,
    /// Text for the `SRVC.` header line.
    pub service: String,
}

impl Default for LasConfig {
    fn default() -> Self {
        Self {
            null_value: DEFAULT_NULL_VALUE,
            precision: 4,
            depth_unit: "M".to_string(),
            service: "WELLMERGE".to_string(),
        }
    }
}

/// Writes curve tables as LAS 2.0 files.
pub struct LasWriter {
    config: LasConfig,
}

impl LasWriter {
    pub fn new() -> Self {
        Self {
            config: LasConfig::default(),
        }
    }

    pub fn with_config(config: LasConfig) -> Self {
        Self { config }
    }

    /// Write a table to a LAS file, creating parent directories.
    ///
    /// When `report` is given, its provenance goes into the `~Other` section.
    pub fn write_file(
        &self,
        table: &CurveTable,
        report: Option<&MergeReport>,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| WellMergeError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| WellMergeError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.write_to(table, report, &mut writer)
            .and_then(|_| writer.flush())
            .map_err(|e| WellMergeError::io(path, e))?;

        info!(path = %path.display(), well = table.name(), "wrote LAS file");
        Ok(())
    }

    /// Write a table in LAS 2.0 format to any writer.
    pub fn write_to<W: Write>(
        &self,
        table: &CurveTable,
        report: Option<&MergeReport>,
        out: &mut W,
    ) -> io::Result<()> {
        let p = self.config.precision;
        let depth_unit = table
            .metadata_value("depth_unit")
            .unwrap_or(self.config.depth_unit.as_str());
        let (start, stop) = table.depth_range().unwrap_or((0.0, 0.0));
        let step = regular_step(table.depths()).unwrap_or(0.0);

        writeln!(out, "~VERSION INFORMATION")?;
        writeln!(out, " VERS.                 2.0 :   CWLS LOG ASCII STANDARD - VERSION 2.0")?;
        writeln!(out, " WRAP.                  NO :   ONE LINE PER DEPTH STEP")?;

        writeln!(out, "~WELL INFORMATION")?;
        writeln!(out, "#MNEM.UNIT       DATA                  : DESCRIPTION")?;
        writeln!(out, " STRT.{:<10} {:>20.*} : START DEPTH", depth_unit, p, start)?;
        writeln!(out, " STOP.{:<10} {:>20.*} : STOP DEPTH", depth_unit, p, stop)?;
        writeln!(out, " STEP.{:<10} {:>20.*} : STEP", depth_unit, p, step)?;
        writeln!(out, " NULL.{:<10} {:>20.*} : NULL VALUE", "", p, self.config.null_value)?;
        writeln!(out, " WELL.{:<10} {:>20} : WELL", "", table.name())?;
        writeln!(
            out,
            " DATE.{:<10} {:>20} : LOG DATE",
            "",
            Utc::now().format("%Y-%m-%d")
        )?;
        writeln!(out, " SRVC.{:<10} {:>20} : SERVICE COMPANY", "", self.config.service)?;

        writeln!(out, "~CURVE INFORMATION")?;
        writeln!(out, "#MNEM.UNIT                     : DESCRIPTION")?;
        writeln!(out, " {:<10}.{:<20}: Depth", "DEPTH", depth_unit)?;
        for curve in table.curves() {
            writeln!(
                out,
                " {:<10}.{:<20}: {}",
                curve.name(),
                curve.unit(),
                curve.description().unwrap_or(curve.name())
            )?;
        }

        if let Some(report) = report {
            writeln!(out, "~OTHER INFORMATION")?;
            writeln!(
                out,
                " Merged from {} source(s) on {}",
                report.sources.len(),
                report.merged_at.format("%Y-%m-%d %H:%M:%S")
            )?;
            for (i, label) in report.source_labels().iter().enumerate() {
                writeln!(out, "   {}. {}", i + 1, label)?;
            }
            writeln!(
                out,
                " Curves merged: {}, curves with overlaps: {}",
                report.curve_count,
                report.overlaps_processed()
            )?;
            for (name, stats) in report.curves.iter().filter(|(_, s)| s.overlap_points > 0) {
                writeln!(out, "   {}: {} averaged point(s)", name, stats.overlap_points)?;
            }
            for conflict in &report.unit_conflicts {
                writeln!(
                    out,
                    "   Unit conflict {}: kept {}, {} in {}",
                    conflict.curve, conflict.kept, conflict.found, conflict.source
                )?;
            }
        }

        write!(out, "~A  DEPTH")?;
        for curve in table.curves() {
            write!(out, " {}", curve.name())?;
        }
        writeln!(out)?;

        let width = 12 + p;
        for (row, depth) in table.depths().iter().enumerate() {
            write!(out, "{:>w$.p$}", depth, w = width, p = p)?;
            for curve in table.curves() {
                let value = curve.values()[row].unwrap_or(self.config.null_value);
                write!(out, " {:>w$.p$}", value, w = width, p = p)?;
            }
            writeln!(out)?;
        }

        Ok(())
    }
}

impl Default for LasWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// The common spacing of a depth index, or `None` if irregular or too short.
fn regular_step(depths: &[f64]) -> Option<f64> {
    let first = depths.windows(2).next().map(|w| w[1] - w[0])?;
    let regular = depths
        .windows(2)
        .all(|w| ((w[1] - w[0]) - first).abs() <= first * REGULAR_STEP_SLACK);
    regular.then_some(first)
}
