//! In-memory curve table model.

mod curve;
mod stats;
mod table;

pub use curve::Curve;
pub use stats::{CurveStatistics, WellSummary};
pub use table::{CurveTable, CurveTableBuilder};

pub(crate) use table::{nearest_row, DEPTH_EPSILON};
