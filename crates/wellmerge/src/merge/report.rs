//! Merge provenance report.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WellMergeError};

/// One input table as seen by a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Well name of the input table.
    pub well_name: String,
    /// `source_file` metadata of the input, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    pub depth_range: (f64, f64),
    pub row_count: usize,
    pub curve_count: usize,
}

impl SourceInfo {
    /// Label used in provenance listings: the source file if known, else the well name.
    pub fn label(&self) -> &str {
        self.source_file.as_deref().unwrap_or(self.well_name.as_str())
    }
}

/// How the output rows of one curve were resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveMergeStats {
    /// Number of inputs defining the curve.
    pub sources: usize,
    /// Rows averaged from two or more inputs.
    pub overlap_points: usize,
    /// Rows taken from exactly one input.
    pub single_source_points: usize,
    /// Rows with no valid contributor.
    pub null_points: usize,
}

impl CurveMergeStats {
    /// Rows holding a value.
    pub fn valid_points(&self) -> usize {
        self.overlap_points + self.single_source_points
    }
}

/// A curve defined with different units by different inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitConflict {
    pub curve: String,
    /// Unit kept in the output.
    pub kept: String,
    /// Unit found on a later input.
    pub found: String,
    /// Label of the input carrying `found`.
    pub source: String,
}

/// Summary of a merge, owned by the caller after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    /// Name of the merged well.
    pub well_name: String,
    /// Inputs in the order they were given.
    pub sources: Vec<SourceInfo>,
    /// Number of curves in the output.
    pub curve_count: usize,
    /// Per-curve resolution counts, in output curve order.
    pub curves: IndexMap<String, CurveMergeStats>,
    pub depth_range: (f64, f64),
    /// Spacing of the merged depth index.
    pub step: f64,
    /// Unit of the merged depth index, when any input declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_unit: Option<String>,
    pub row_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unit_conflicts: Vec<UnitConflict>,
    pub merged_at: DateTime<Utc>,
}

impl MergeReport {
    /// Overlap rows for one curve (zero if the curve is unknown).
    pub fn overlap_points(&self, curve: &str) -> usize {
        self.curves.get(curve).map(|c| c.overlap_points).unwrap_or(0)
    }

    /// Overlap rows across all curves.
    pub fn total_overlap_points(&self) -> usize {
        self.curves.values().map(|c| c.overlap_points).sum()
    }

    /// Number of curves with at least one averaged row.
    pub fn overlaps_processed(&self) -> usize {
        self.curves.values().filter(|c| c.overlap_points > 0).count()
    }

    /// Provenance labels of all inputs.
    pub fn source_labels(&self) -> Vec<&str> {
        self.sources.iter().map(SourceInfo::label).collect()
    }

    /// Save the report as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| WellMergeError::io(parent, e))?;
            }
        }

        let file = File::create(path).map_err(|e| WellMergeError::io(path, e))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Load a report saved with [`MergeReport::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| WellMergeError::io(path, e))?;
        let report = serde_json::from_reader(BufReader::new(file))?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> MergeReport {
        let mut curves = IndexMap::new();
        curves.insert(
            "GR".to_string(),
            CurveMergeStats {
                sources: 2,
                overlap_points: 3,
                single_source_points: 5,
                null_points: 1,
            },
        );
        curves.insert(
            "RT".to_string(),
            CurveMergeStats {
                sources: 1,
                overlap_points: 0,
                single_source_points: 9,
                null_points: 0,
            },
        );

        MergeReport {
            well_name: "POZO-1".to_string(),
            sources: vec![
                SourceInfo {
                    well_name: "POZO-1".to_string(),
                    source_file: Some("run1.csv".to_string()),
                    depth_range: (100.0, 102.0),
                    row_count: 5,
                    curve_count: 2,
                },
                SourceInfo {
                    well_name: "POZO-1".to_string(),
                    source_file: None,
                    depth_range: (101.0, 104.0),
                    row_count: 7,
                    curve_count: 1,
                },
            ],
            curve_count: 2,
            curves,
            depth_range: (100.0, 104.0),
            step: 0.5,
            depth_unit: Some("M".to_string()),
            row_count: 9,
            unit_conflicts: Vec::new(),
            merged_at: Utc::now(),
        }
    }

    #[test]
    fn test_overlap_accessors() {
        let report = report();
        assert_eq!(report.overlap_points("GR"), 3);
        assert_eq!(report.overlap_points("NPHI"), 0);
        assert_eq!(report.total_overlap_points(), 3);
        assert_eq!(report.overlaps_processed(), 1);
        assert_eq!(report.curves["GR"].valid_points(), 8);
    }

    #[test]
    fn test_source_labels_fall_back_to_well_name() {
        assert_eq!(report().source_labels(), vec!["run1.csv", "POZO-1"]);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("pozo1.json");

        let original = report();
        original.save(&path).unwrap();
        let loaded = MergeReport::load(&path).unwrap();

        assert_eq!(loaded.well_name, original.well_name);
        assert_eq!(loaded.sources, original.sources);
        assert_eq!(loaded.curves, original.curves);
        assert_eq!(loaded.merged_at, original.merged_at);
    }
}
