//! Fuzz target for the delimited reader.
//!
//! The reader must never panic on malformed input; every failure surfaces
//! as an error.

#![no_main]

use indexmap::IndexMap;
use libfuzzer_sys::fuzz_target;
use wellmerge::DelimitedReader;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let reader = DelimitedReader::new();
    let _ = reader.read_bytes(data, "FUZZ-1", IndexMap::new());
});
