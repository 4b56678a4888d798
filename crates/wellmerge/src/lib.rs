//! Wellmerge: depth-aligned merging of partial well-log records.
//!
//! A well is often logged in several runs, each covering part of the depth
//! interval and part of the curve set. Wellmerge consolidates those partial
//! records into one table on a regular depth index, averaging values where
//! runs overlap and keeping a per-curve report of how each row was resolved.
//!
//! # Core Principles
//!
//! - **Non-destructive**: Input tables are only read, never modified
//! - **Order independent**: The same inputs in any order give the same table
//! - **Full provenance**: Every merge reports its sources and overlaps
//!
//! # Example
//!
//! ```no_run
//! use wellmerge::{DelimitedReader, MergeEngine};
//!
//! let reader = DelimitedReader::new();
//! let run1 = reader.read_file("run1.csv").unwrap();
//! let run2 = reader.read_file("run2.csv").unwrap();
//!
//! let merged = MergeEngine::new().merge(&[run1, run2], "POZO-1").unwrap();
//!
//! println!("Rows: {}", merged.table.row_count());
//! println!("Overlaps: {}", merged.report.total_overlap_points());
//! ```

pub mod error;
pub mod io;
pub mod merge;
pub mod registry;
pub mod table;

pub use error::{InvalidReason, Result, WellMergeError};
pub use io::{DelimitedReader, DelimitedWriter, LasConfig, LasWriter, ReaderConfig, WriterConfig};
pub use merge::{MergeConfig, MergeEngine, MergeReport, MergeResult, UnitPolicy};
pub use registry::WellRegistry;
pub use table::{Curve, CurveStatistics, CurveTable, WellSummary};
