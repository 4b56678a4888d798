//! Reading and writing curve tables.
//!
//! The codecs map the on-disk "no data" sentinel to the null marker on read
//! and back on write; the merge engine only ever sees `None`.

mod delimited;
mod las;

pub use delimited::{DelimitedReader, DelimitedWriter, ReaderConfig, WriterConfig};
pub use las::{LasConfig, LasWriter};

/// Conventional LAS "no data" value.
pub const DEFAULT_NULL_VALUE: f64 = -999.25;

fn is_null_sentinel(value: f64, sentinels: &[f64]) -> bool {
    sentinels.iter().any(|s| (value - s).abs() < 1e-9)
}

fn format_value(value: f64, precision: Option<usize>) -> String {
    match precision {
        Some(p) => format!("{:.*}", p, value),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel_match() {
        assert!(is_null_sentinel(-999.25, &[DEFAULT_NULL_VALUE]));
        assert!(!is_null_sentinel(-999.0, &[DEFAULT_NULL_VALUE]));
        assert!(!is_null_sentinel(0.0, &[]));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.5, None), "1.5");
        assert_eq!(format_value(1.5, Some(3)), "1.500");
    }
}
