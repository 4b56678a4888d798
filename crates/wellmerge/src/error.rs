//! Error types for the wellmerge library.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Why a curve table failed construction.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidReason {
    /// Depth at `row` is not strictly greater than the depth before it.
    NonMonotonicDepth { row: usize, previous: f64, depth: f64 },
    /// Depth at `row` is NaN or infinite.
    NonFiniteDepth { row: usize },
    /// A curve's value count differs from the depth index length.
    LengthMismatch {
        curve: String,
        expected: usize,
        actual: usize,
    },
    /// The same curve name was defined twice.
    DuplicateCurve(String),
    /// The well name is empty.
    EmptyName,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::NonMonotonicDepth {
                row,
                previous,
                depth,
            } => write!(
                f,
                "depth {} at row {} does not increase past {}",
                depth, row, previous
            ),
            InvalidReason::NonFiniteDepth { row } => {
                write!(f, "depth at row {} is not a finite number", row)
            }
            InvalidReason::LengthMismatch {
                curve,
                expected,
                actual,
            } => write!(
                f,
                "curve '{}' has {} values but the depth index has {} rows",
                curve, actual, expected
            ),
            InvalidReason::DuplicateCurve(name) => write!(f, "curve '{}' defined twice", name),
            InvalidReason::EmptyName => write!(f, "well name is empty"),
        }
    }
}

/// Main error type for wellmerge operations.
#[derive(Debug, Error)]
pub enum WellMergeError {
    /// A curve table violates a construction invariant.
    #[error("Invalid table '{well}': {reason}")]
    InvalidTable { well: String, reason: InvalidReason },

    /// Depth range or step requested from a table too short to define it.
    #[error("Table '{well}' has {rows} row(s); not enough to define a depth range or step")]
    EmptyTable { well: String, rows: usize },

    /// A curve name is not defined in the table.
    #[error("Curve '{curve}' not found in '{well}'")]
    CurveNotFound { well: String, curve: String },

    /// Merge called with no input tables.
    #[error("Merge requires at least one input table")]
    InsufficientInput,

    /// Two inputs define the same curve with different units.
    #[error("Curve '{curve}' has unit '{found}' but an earlier input uses '{expected}'")]
    UnitMismatch {
        curve: String,
        expected: String,
        found: String,
    },

    /// The merged depth index would hold more rows than allowed.
    #[error("Depth span {span} at step {step} needs more than {limit} rows")]
    IndexTooLarge { span: f64, step: f64, limit: usize },

    /// No tables registered under the well name.
    #[error("Well not found: {0}")]
    WellNotFound(String),

    /// Error reading or writing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing a cell of delimited data.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data rows.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WellMergeError {
    pub(crate) fn invalid(well: &str, reason: InvalidReason) -> Self {
        WellMergeError::InvalidTable {
            well: well.to_string(),
            reason,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WellMergeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for wellmerge operations.
pub type Result<T> = std::result::Result<T, WellMergeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_table_message_names_reason() {
        let err = WellMergeError::invalid(
            "POZO-1",
            InvalidReason::LengthMismatch {
                curve: "GR".to_string(),
                expected: 3,
                actual: 2,
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("POZO-1"));
        assert!(msg.contains("'GR' has 2 values"));
    }

    #[test]
    fn test_non_monotonic_message() {
        let reason = InvalidReason::NonMonotonicDepth {
            row: 2,
            previous: 101.0,
            depth: 100.5,
        };
        assert_eq!(
            reason.to_string(),
            "depth 100.5 at row 2 does not increase past 101"
        );
    }
}
