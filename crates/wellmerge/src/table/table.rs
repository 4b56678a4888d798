//! Depth-indexed curve table.

use indexmap::{IndexMap, IndexSet};

use crate::error::{InvalidReason, Result, WellMergeError};

use super::curve::Curve;
use super::stats::{CurveStatistics, WellSummary};

/// Slack allowed when comparing a depth distance against a tolerance.
pub(crate) const DEPTH_EPSILON: f64 = 1e-9;

/// One well's curve data, sampled on a strictly increasing depth index.
///
/// Tables are validated on construction and immutable afterwards. Curves keep
/// their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveTable {
    name: String,
    depths: Vec<f64>,
    curves: IndexMap<String, Curve>,
    metadata: IndexMap<String, String>,
}

impl CurveTable {
    /// Build a table, validating every invariant.
    ///
    /// Fails with [`WellMergeError::InvalidTable`] if a depth is non-finite,
    /// the depth index is not strictly increasing, a curve's length differs
    /// from the index, or a curve name repeats.
    pub fn new(
        name: impl Into<String>,
        depths: Vec<f64>,
        curves: Vec<Curve>,
        metadata: IndexMap<String, String>,
    ) -> Result<Self> {
        let name = name.into();

        for (row, &depth) in depths.iter().enumerate() {
            if !depth.is_finite() {
                return Err(WellMergeError::invalid(
                    &name,
                    InvalidReason::NonFiniteDepth { row },
                ));
            }
        }

        if let Some(row) = depths.windows(2).position(|w| w[1] <= w[0]) {
            return Err(WellMergeError::invalid(
                &name,
                InvalidReason::NonMonotonicDepth {
                    row: row + 1,
                    previous: depths[row],
                    depth: depths[row + 1],
                },
            ));
        }

        let mut by_name = IndexMap::with_capacity(curves.len());
        for curve in curves {
            if curve.len() != depths.len() {
                return Err(WellMergeError::invalid(
                    &name,
                    InvalidReason::LengthMismatch {
                        curve: curve.name().to_string(),
                        expected: depths.len(),
                        actual: curve.len(),
                    },
                ));
            }
            if by_name.contains_key(curve.name()) {
                return Err(WellMergeError::invalid(
                    &name,
                    InvalidReason::DuplicateCurve(curve.name().to_string()),
                ));
            }
            by_name.insert(curve.name().to_string(), curve);
        }

        Ok(Self {
            name,
            depths,
            curves: by_name,
            metadata,
        })
    }

    /// Start building a table.
    pub fn builder(name: impl Into<String>) -> CurveTableBuilder {
        CurveTableBuilder::new(name)
    }

    /// Well name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The depth index.
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn row_count(&self) -> usize {
        self.depths.len()
    }

    pub fn curve_count(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Shallowest and deepest sampled depth.
    pub fn depth_range(&self) -> Result<(f64, f64)> {
        match (self.depths.first(), self.depths.last()) {
            (Some(&min), Some(&max)) => Ok((min, max)),
            _ => Err(self.empty_error()),
        }
    }

    /// Smallest spacing between consecutive depths.
    ///
    /// Undefined for tables with fewer than two rows.
    pub fn finest_step(&self) -> Result<f64> {
        self.depths
            .windows(2)
            .map(|w| w[1] - w[0])
            .min_by(|a, b| a.total_cmp(b))
            .ok_or_else(|| self.empty_error())
    }

    /// Sampling step used for resampling decisions.
    ///
    /// Like [`finest_step`](Self::finest_step), but the final interval is
    /// ignored when the table has three or more rows: a merged index ends
    /// exactly at the deepest depth, so its last interval may be a remainder
    /// shorter than the step it was built with.
    pub fn nominal_step(&self) -> Result<f64> {
        let body = match self.depths.len() {
            0..=2 => &self.depths[..],
            n => &self.depths[..n - 1],
        };
        body.windows(2)
            .map(|w| w[1] - w[0])
            .min_by(|a, b| a.total_cmp(b))
            .ok_or_else(|| self.empty_error())
    }

    /// Curve names in table order.
    pub fn curve_names(&self) -> IndexSet<&str> {
        self.curves.keys().map(|k| k.as_str()).collect()
    }

    pub fn has_curve(&self, name: &str) -> bool {
        self.curves.contains_key(name)
    }

    pub fn curve(&self, name: &str) -> Option<&Curve> {
        self.curves.get(name)
    }

    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.curves.values()
    }

    /// Values of a curve, aligned to [`CurveTable::depths`].
    pub fn values_for(&self, curve_name: &str) -> Result<&[Option<f64>]> {
        self.curves
            .get(curve_name)
            .map(|c| c.values())
            .ok_or_else(|| self.not_found(curve_name))
    }

    /// Unit of a curve.
    pub fn unit_of(&self, curve_name: &str) -> Result<&str> {
        self.curves
            .get(curve_name)
            .map(|c| c.unit())
            .ok_or_else(|| self.not_found(curve_name))
    }

    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(|s| s.as_str())
    }

    /// Index of the row nearest to `depth`, if it lies within `tolerance`.
    ///
    /// When two rows are equally near, the shallower one wins.
    pub fn nearest_row(&self, depth: f64, tolerance: f64) -> Option<usize> {
        nearest_row(&self.depths, depth, tolerance)
    }

    /// Value of a curve at the row nearest to `depth` within `tolerance`.
    ///
    /// Returns `Ok(None)` when no row is close enough or the value is null.
    pub fn value_at(&self, curve_name: &str, depth: f64, tolerance: f64) -> Result<Option<f64>> {
        let values = self.values_for(curve_name)?;
        Ok(self.nearest_row(depth, tolerance).and_then(|row| values[row]))
    }

    /// Statistics for a single curve.
    pub fn curve_statistics(&self, curve_name: &str) -> Result<CurveStatistics> {
        self.curves
            .get(curve_name)
            .map(CurveStatistics::from_curve)
            .ok_or_else(|| self.not_found(curve_name))
    }

    /// Summary of the whole table.
    pub fn summary(&self) -> WellSummary {
        WellSummary {
            name: self.name.clone(),
            curve_count: self.curve_count(),
            row_count: self.row_count(),
            depth_range: self.depth_range().ok(),
            step: self.nominal_step().ok(),
            curves: self
                .curves
                .iter()
                .map(|(name, curve)| (name.clone(), CurveStatistics::from_curve(curve)))
                .collect(),
            metadata: self.metadata.clone(),
        }
    }

    fn empty_error(&self) -> WellMergeError {
        WellMergeError::EmptyTable {
            well: self.name.clone(),
            rows: self.depths.len(),
        }
    }

    fn not_found(&self, curve_name: &str) -> WellMergeError {
        WellMergeError::CurveNotFound {
            well: self.name.clone(),
            curve: curve_name.to_string(),
        }
    }
}

/// Nearest-row search over a strictly increasing depth slice.
pub(crate) fn nearest_row(depths: &[f64], depth: f64, tolerance: f64) -> Option<usize> {
    let pos = depths.partition_point(|&d| d < depth);

    let below = pos.checked_sub(1).map(|i| (i, depth - depths[i]));
    let above = depths.get(pos).map(|&d| (pos, d - depth));

    let (row, distance) = match (below, above) {
        (Some(b), Some(a)) => {
            if a.1 < b.1 {
                a
            } else {
                b
            }
        }
        (Some(b), None) => b,
        (None, Some(a)) => a,
        (None, None) => return None,
    };

    if distance <= tolerance + DEPTH_EPSILON {
        Some(row)
    } else {
        None
    }
}

/// Incremental builder for [`CurveTable`].
#[derive(Debug, Clone)]
pub struct CurveTableBuilder {
    name: String,
    depths: Vec<f64>,
    curves: Vec<Curve>,
    metadata: IndexMap<String, String>,
}

impl CurveTableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depths: Vec::new(),
            curves: Vec::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Set the depth index.
    pub fn depths(mut self, depths: Vec<f64>) -> Self {
        self.depths = depths;
        self
    }

    /// Add a curve.
    pub fn curve(mut self, curve: Curve) -> Self {
        self.curves.push(curve);
        self
    }

    /// Add a curve from raw readings (NaN/inf become null).
    pub fn readings(self, name: impl Into<String>, readings: &[f64]) -> Self {
        self.curve(Curve::from_readings(name, readings))
    }

    /// Add a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Validate and build the table.
    pub fn build(self) -> Result<CurveTable> {
        CurveTable::new(self.name, self.depths, self.curves, self.metadata)
    }
}
