//! Curve statistics and well summaries.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::curve::Curve;

/// Statistics computed for a curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveStatistics {
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of non-null values.
    pub valid_points: usize,
    /// Number of rows, null or not.
    pub total_points: usize,
    /// Fraction of rows holding a value (0.0-1.0).
    pub completeness: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl CurveStatistics {
    pub(crate) fn from_curve(curve: &Curve) -> Self {
        let valid: Vec<f64> = curve.values().iter().flatten().copied().collect();
        let total_points = curve.len();

        let (min, max, mean) = if valid.is_empty() {
            (None, None, None)
        } else {
            let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
            let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let mean = valid.iter().sum::<f64>() / valid.len() as f64;
            (Some(min), Some(max), Some(mean))
        };

        Self {
            unit: curve.unit().to_string(),
            description: curve.description().map(str::to_string),
            valid_points: valid.len(),
            total_points,
            completeness: if total_points == 0 {
                0.0
            } else {
                valid.len() as f64 / total_points as f64
            },
            min,
            max,
            mean,
        }
    }

    /// Get the null percentage.
    pub fn null_percentage(&self) -> f64 {
        (1.0 - self.completeness) * 100.0
    }
}

/// Overview of a whole table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WellSummary {
    pub name: String,
    pub curve_count: usize,
    pub row_count: usize,
    /// `None` for a table with no rows.
    pub depth_range: Option<(f64, f64)>,
    /// `None` for tables with fewer than two rows.
    pub step: Option<f64>,
    pub curves: IndexMap<String, CurveStatistics>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
}

impl WellSummary {
    /// Thickness of the logged interval.
    pub fn interval(&self) -> f64 {
        self.depth_range.map(|(min, max)| max - min).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CurveTable;

    #[test]
    fn test_statistics_ignore_nulls() {
        let curve = Curve::new("GR", vec![Some(40.0), None, Some(60.0), None]).with_unit("API");
        let stats = CurveStatistics::from_curve(&curve);

        assert_eq!(stats.valid_points, 2);
        assert_eq!(stats.total_points, 4);
        assert_eq!(stats.completeness, 0.5);
        assert_eq!(stats.null_percentage(), 50.0);
        assert_eq!(stats.min, Some(40.0));
        assert_eq!(stats.max, Some(60.0));
        assert_eq!(stats.mean, Some(50.0));
        assert_eq!(stats.unit, "API");
    }

    #[test]
    fn test_all_null_curve_has_no_extremes() {
        let curve = Curve::new("RT", vec![None, None]);
        let stats = CurveStatistics::from_curve(&curve);
        assert_eq!(stats.valid_points, 0);
        assert!(stats.min.is_none());
        assert!(stats.mean.is_none());
    }

    #[test]
    fn test_summary() {
        let table = CurveTable::builder("POZO-2")
            .depths(vec![1000.0, 1000.5, 1001.0])
            .readings("GR", &[10.0, 20.0, 30.0])
            .readings("NPHI", &[0.2, f64::NAN, 0.3])
            .build()
            .unwrap();

        let summary = table.summary();
        assert_eq!(summary.curve_count, 2);
        assert_eq!(summary.row_count, 3);
        assert_eq!(summary.depth_range, Some((1000.0, 1001.0)));
        assert_eq!(summary.step, Some(0.5));
        assert_eq!(summary.interval(), 1.0);
        assert_eq!(summary.curves["NPHI"].valid_points, 2);
    }
}
