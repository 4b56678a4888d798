//! Target depth grid and source-to-grid row alignment.

use crate::error::{Result, WellMergeError};
use crate::table::{nearest_row, DEPTH_EPSILON};

/// Points closer than this fraction of a step to the deepest depth collapse into it.
const END_SNAP_FRACTION: f64 = 1e-6;

/// Upper bound on the rows of a merged depth index.
pub const MAX_INDEX_ROWS: usize = 50_000_000;

/// Build a regular depth index from `min` to `max` spaced by `step`.
///
/// Samples are computed as `min + i * step` so rounding does not accumulate.
/// The last sample is exactly `max`; if the span is not a whole number of
/// steps the final interval is shorter than `step`.
///
/// Fails with [`WellMergeError::IndexTooLarge`] when the span needs more than
/// [`MAX_INDEX_ROWS`] samples.
pub(crate) fn regular_index(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    if max <= min {
        return Ok(vec![min]);
    }

    let steps = (max - min) / step;
    // Also catches a NaN ratio.
    if !(steps < MAX_INDEX_ROWS as f64) {
        return Err(WellMergeError::IndexTooLarge {
            span: max - min,
            step,
            limit: MAX_INDEX_ROWS,
        });
    }

    let snap = step * END_SNAP_FRACTION;
    let whole_steps = steps.floor() as usize;

    let mut depths = Vec::with_capacity(whole_steps + 2);
    for i in 0..=whole_steps {
        let depth = min + i as f64 * step;
        if depth >= max - snap {
            break;
        }
        depths.push(depth);
    }
    depths.push(max);
    Ok(depths)
}

/// For each grid depth, the source row nearest to it within `tolerance`.
///
/// Grid depths outside the source's own depth range get no row.
pub(crate) fn align_rows(source: &[f64], grid: &[f64], tolerance: f64) -> Vec<Option<usize>> {
    let (first, last) = match (source.first(), source.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return vec![None; grid.len()],
    };

    grid.iter()
        .map(|&depth| {
            if depth < first - DEPTH_EPSILON || depth > last + DEPTH_EPSILON {
                None
            } else {
                nearest_row(source, depth, tolerance)
            }
        })
        .collect()
}
