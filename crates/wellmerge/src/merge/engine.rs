//! Merge engine that consolidates partial well records into one table.

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::error::{InvalidReason, Result, WellMergeError};
use crate::table::{Curve, CurveTable};

use super::grid::{align_rows, regular_index};
use super::report::{CurveMergeStats, MergeReport, SourceInfo, UnitConflict};

/// Default nearest-neighbor tolerance, as a fraction of a source's step.
pub const DEFAULT_TOLERANCE_FACTOR: f64 = 0.5;

/// Default target step when no input has two or more rows.
pub const DEFAULT_FALLBACK_STEP: f64 = 1.0;

/// Name used for the depth index in unit conflicts.
const DEPTH_CURVE: &str = "DEPTH";

/// What to do when inputs disagree on a curve's or the depth index's unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnitPolicy {
    /// Keep the first input's unit, warn, and record the conflict in the report.
    #[default]
    FirstWins,
    /// Fail the merge with [`WellMergeError::UnitMismatch`].
    Reject,
}

/// Configuration for a merge.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Absolute nearest-neighbor tolerance. Overrides `tolerance_factor`.
    pub tolerance: Option<f64>,
    /// Tolerance per source as a fraction of that source's nominal step.
    pub tolerance_factor: f64,
    /// Target step used when every input is a single row.
    pub fallback_step: f64,
    pub unit_policy: UnitPolicy,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            tolerance: None,
            tolerance_factor: DEFAULT_TOLERANCE_FACTOR,
            fallback_step: DEFAULT_FALLBACK_STEP,
            unit_policy: UnitPolicy::FirstWins,
        }
    }
}

impl MergeConfig {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_tolerance_factor(mut self, factor: f64) -> Self {
        self.tolerance_factor = factor;
        self
    }

    pub fn with_fallback_step(mut self, step: f64) -> Self {
        self.fallback_step = step;
        self
    }

    pub fn with_unit_policy(mut self, policy: UnitPolicy) -> Self {
        self.unit_policy = policy;
        self
    }
}

/// Result of a merge: the consolidated table and its report.
#[derive(Debug, Clone)]
pub struct MergeResult {
    pub table: CurveTable,
    pub report: MergeReport,
}

/// Engine for merging partial well records.
///
/// Merging is a pure function of its inputs: tables are only read, and the
/// engine holds no state beyond its configuration, so one engine can serve
/// many threads.
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: MergeConfig,
}

/// Unit and description chosen for an output curve.
struct CurveLabel {
    unit: String,
    description: Option<String>,
}

impl MergeEngine {
    /// Create a merge engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(MergeConfig::default())
    }

    /// Create a merge engine with custom configuration.
    pub fn with_config(config: MergeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Merge `tables` into a single table named `name`.
    ///
    /// The output depth index spans the union of all input ranges at the
    /// finest nominal input step (see [`CurveTable::nominal_step`]). Every
    /// curve of every input appears in the output; rows where two or more
    /// inputs hold a valid value are averaged. The depth unit is taken from
    /// the inputs' `depth_unit` metadata under the same unit policy as curves.
    ///
    /// # Errors
    ///
    /// - [`WellMergeError::InsufficientInput`] if `tables` is empty.
    /// - [`WellMergeError::EmptyTable`] if any input has no rows.
    /// - [`WellMergeError::InvalidTable`] if `name` is blank.
    /// - [`WellMergeError::UnitMismatch`] under [`UnitPolicy::Reject`].
    /// - [`WellMergeError::IndexTooLarge`] if the index would exceed
    ///   [`MAX_INDEX_ROWS`](super::MAX_INDEX_ROWS) rows.
    pub fn merge(&self, tables: &[CurveTable], name: &str) -> Result<MergeResult> {
        if tables.is_empty() {
            return Err(WellMergeError::InsufficientInput);
        }
        if name.trim().is_empty() {
            return Err(WellMergeError::invalid(name, InvalidReason::EmptyName));
        }

        info!(well = name, inputs = tables.len(), "merging well records");

        let mut sources = Vec::with_capacity(tables.len());
        for table in tables {
            let depth_range = table.depth_range()?;
            debug!(
                source = table.metadata_value("source_file").unwrap_or(table.name()),
                min = depth_range.0,
                max = depth_range.1,
                curves = table.curve_count(),
                "input record"
            );
            sources.push(SourceInfo {
                well_name: table.name().to_string(),
                source_file: table.metadata_value("source_file").map(str::to_string),
                depth_range,
                row_count: table.row_count(),
                curve_count: table.curve_count(),
            });
        }

        let min_depth = sources
            .iter()
            .map(|s| s.depth_range.0)
            .fold(f64::INFINITY, f64::min);
        let max_depth = sources
            .iter()
            .map(|s| s.depth_range.1)
            .fold(f64::NEG_INFINITY, f64::max);

        let step = self.target_step(tables);
        let depths = regular_index(min_depth, max_depth, step)?;

        let (labels, mut unit_conflicts) = self.resolve_labels(tables, &sources)?;
        let depth_unit = self.resolve_depth_unit(tables, &sources, &mut unit_conflicts)?;

        // One row alignment per source, shared by all of its curves.
        let alignments: Vec<Vec<Option<usize>>> = tables
            .iter()
            .map(|t| align_rows(t.depths(), &depths, self.source_tolerance(t, step)))
            .collect();

        let mut curves = Vec::with_capacity(labels.len());
        let mut curve_stats = IndexMap::with_capacity(labels.len());

        for (curve_name, label) in labels {
            let (values, stats) = merge_curve(&curve_name, tables, &alignments, depths.len());

            debug!(
                curve = curve_name.as_str(),
                valid = stats.valid_points(),
                overlaps = stats.overlap_points,
                "merged curve"
            );

            let mut curve = Curve::new(curve_name.clone(), values).with_unit(label.unit);
            if let Some(description) = label.description {
                curve = curve.with_description(description);
            }
            curves.push(curve);
            curve_stats.insert(curve_name, stats);
        }

        let merged_at = Utc::now();
        let overlaps_processed = curve_stats.values().filter(|s| s.overlap_points > 0).count();

        let mut metadata = IndexMap::new();
        metadata.insert("source_file".to_string(), format!("{}_MERGED.las", name));
        if let Some(unit) = &depth_unit {
            metadata.insert("depth_unit".to_string(), unit.clone());
        }
        metadata.insert(
            "original_files".to_string(),
            sources
                .iter()
                .map(SourceInfo::label)
                .collect::<Vec<_>>()
                .join("; "),
        );
        metadata.insert(
            "merge_date".to_string(),
            merged_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        );
        metadata.insert("curves_merged".to_string(), curves.len().to_string());
        metadata.insert(
            "overlaps_processed".to_string(),
            overlaps_processed.to_string(),
        );

        let row_count = depths.len();
        let curve_count = curves.len();
        let table = CurveTable::new(name, depths, curves, metadata)?;

        info!(
            well = name,
            curves = curve_count,
            rows = row_count,
            overlaps = overlaps_processed,
            "merge complete"
        );

        let report = MergeReport {
            well_name: name.to_string(),
            sources,
            curve_count,
            curves: curve_stats,
            depth_range: (min_depth, max_depth),
            step,
            depth_unit,
            row_count,
            unit_conflicts,
            merged_at,
        };

        Ok(MergeResult { table, report })
    }

    /// Finest nominal step across inputs with at least two rows.
    fn target_step(&self, tables: &[CurveTable]) -> f64 {
        let finest = tables
            .iter()
            .filter_map(|t| t.nominal_step().ok())
            .min_by(|a, b| a.total_cmp(b));

        match finest {
            Some(step) => step,
            None if self.config.fallback_step.is_finite() && self.config.fallback_step > 0.0 => {
                self.config.fallback_step
            }
            None => {
                warn!(
                    fallback_step = self.config.fallback_step,
                    "fallback step is not positive; using {}", DEFAULT_FALLBACK_STEP
                );
                DEFAULT_FALLBACK_STEP
            }
        }
    }

    /// Nearest-neighbor tolerance for one source.
    fn source_tolerance(&self, table: &CurveTable, target_step: f64) -> f64 {
        match self.config.tolerance {
            Some(tolerance) => tolerance.max(0.0),
            None => {
                let local_step = table.nominal_step().unwrap_or(target_step);
                (self.config.tolerance_factor * local_step).max(0.0)
            }
        }
    }

    /// Pick unit and description per output curve, sorted by curve name.
    ///
    /// The first input defining a curve with a non-empty unit supplies both
    /// the unit and the description. Inputs without a unit only lend a
    /// description when no unit-bearing input has one.
    fn resolve_labels(
        &self,
        tables: &[CurveTable],
        sources: &[SourceInfo],
    ) -> Result<(Vec<(String, CurveLabel)>, Vec<UnitConflict>)> {
        let mut labels: IndexMap<String, CurveLabel> = IndexMap::new();
        let mut conflicts = Vec::new();

        for (table, source) in tables.iter().zip(sources) {
            for curve in table.curves() {
                let label = labels
                    .entry(curve.name().to_string())
                    .or_insert_with(|| CurveLabel {
                        unit: String::new(),
                        description: None,
                    });

                let description = curve.description().map(str::to_string);
                let unit = curve.unit().trim();
                if unit.is_empty() {
                    if label.unit.is_empty() && label.description.is_none() {
                        label.description = description;
                    }
                    continue;
                }
                if label.unit.is_empty() {
                    label.unit = unit.to_string();
                    if description.is_some() {
                        label.description = description;
                    }
                    continue;
                }
                if !label.unit.eq_ignore_ascii_case(unit) {
                    conflicts.push(self.unit_conflict(curve.name(), &label.unit, unit, source)?);
                }
            }
        }

        let mut labels: Vec<(String, CurveLabel)> = labels.into_iter().collect();
        labels.sort_by(|a, b| a.0.cmp(&b.0));
        Ok((labels, conflicts))
    }

    /// Unit of the merged depth index from the inputs' `depth_unit` metadata.
    fn resolve_depth_unit(
        &self,
        tables: &[CurveTable],
        sources: &[SourceInfo],
        conflicts: &mut Vec<UnitConflict>,
    ) -> Result<Option<String>> {
        let mut kept: Option<&str> = None;

        for (table, source) in tables.iter().zip(sources) {
            let unit = match table.metadata_value("depth_unit").map(str::trim) {
                Some(unit) if !unit.is_empty() => unit,
                _ => continue,
            };
            match kept {
                None => kept = Some(unit),
                Some(first) if first.eq_ignore_ascii_case(unit) => {}
                Some(first) => conflicts.push(self.unit_conflict(DEPTH_CURVE, first, unit, source)?),
            }
        }

        Ok(kept.map(str::to_string))
    }

    /// Apply the unit policy to one disagreement.
    fn unit_conflict(
        &self,
        curve: &str,
        kept: &str,
        found: &str,
        source: &SourceInfo,
    ) -> Result<UnitConflict> {
        match self.config.unit_policy {
            UnitPolicy::Reject => Err(WellMergeError::UnitMismatch {
                curve: curve.to_string(),
                expected: kept.to_string(),
                found: found.to_string(),
            }),
            UnitPolicy::FirstWins => {
                warn!(
                    curve,
                    kept,
                    found,
                    source = source.label(),
                    "unit mismatch; keeping first unit"
                );
                Ok(UnitConflict {
                    curve: curve.to_string(),
                    kept: kept.to_string(),
                    found: found.to_string(),
                    source: source.label().to_string(),
                })
            }
        }
    }
}

/// Resolve one curve on the target index.
///
/// Contributions are sorted before summing so the mean does not depend on
/// input order.
fn merge_curve(
    curve_name: &str,
    tables: &[CurveTable],
    alignments: &[Vec<Option<usize>>],
    rows: usize,
) -> (Vec<Option<f64>>, CurveMergeStats) {
    let contributors: Vec<(&[Option<f64>], &[Option<usize>])> = tables
        .iter()
        .zip(alignments)
        .filter_map(|(table, alignment)| {
            table
                .values_for(curve_name)
                .ok()
                .map(|values| (values, alignment.as_slice()))
        })
        .collect();

    let mut stats = CurveMergeStats {
        sources: contributors.len(),
        ..CurveMergeStats::default()
    };
    let mut values = Vec::with_capacity(rows);
    let mut found: Vec<f64> = Vec::with_capacity(contributors.len());

    for row in 0..rows {
        found.clear();
        found.extend(
            contributors
                .iter()
                .filter_map(|(source_values, alignment)| alignment[row].and_then(|r| source_values[r]))
                .filter(|v| v.is_finite()),
        );

        let value = match found.len() {
            0 => {
                stats.null_points += 1;
                None
            }
            1 => {
                stats.single_source_points += 1;
                Some(found[0])
            }
            n => {
                stats.overlap_points += 1;
                found.sort_by(|a, b| a.total_cmp(b));
                Some(found.iter().sum::<f64>() / n as f64)
            }
        };
        values.push(value);
    }

    (values, stats)
}
