//! Merging partial well records onto a common depth index.

mod engine;
mod grid;
mod report;

pub use engine::{
    MergeConfig, MergeEngine, MergeResult, UnitPolicy, DEFAULT_FALLBACK_STEP,
    DEFAULT_TOLERANCE_FACTOR,
};
pub use grid::MAX_INDEX_ROWS;
pub use report::{CurveMergeStats, MergeReport, SourceInfo, UnitConflict};
