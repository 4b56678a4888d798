//! Fuzz target for the merge engine.
//!
//! Builds a few records from raw bytes (depth increments, values, nulls) and
//! checks the merged depth index stays strictly increasing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use wellmerge::{Curve, CurveTable, MergeEngine};

fuzz_target!(|data: &[u8]| {
    if data.len() > 4_096 {
        return;
    }

    let tables: Vec<CurveTable> = data
        .chunks(64)
        .filter_map(|chunk| {
            let start = chunk.first().copied().unwrap_or(0) as f64;
            let mut depth = start;
            let mut depths = Vec::new();
            let mut values = Vec::new();
            for pair in chunk[1..].chunks(2) {
                depth += 0.05 + pair[0] as f64 / 16.0;
                depths.push(depth);
                values.push(pair.get(1).filter(|v| **v != 0).map(|v| *v as f64));
            }
            CurveTable::builder("FUZZ-1")
                .depths(depths)
                .curve(Curve::new(if start as u8 % 2 == 0 { "GR" } else { "RT" }, values))
                .build()
                .ok()
        })
        .collect();

    if let Ok(merged) = MergeEngine::new().merge(&tables, "FUZZ-1") {
        assert!(merged.table.depths().windows(2).all(|w| w[1] > w[0]));
    }
});
