//! CSV/TSV curve-table reader and writer with delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Result, WellMergeError};
use crate::table::{Curve, CurveTable};

use super::{DEFAULT_NULL_VALUE, format_value, is_null_sentinel};

/// Delimiters to try when auto-detecting, preferred first on ties.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Lines starting with this byte are comments.
const COMMENT: u8 = b'#';

/// Non-comment lines sampled when detecting the delimiter.
const SNIFF_LINES: usize = 10;

/// Header names recognized as the depth column, in priority order.
const DEPTH_NAMES: &[&str] = &["DEPTH", "DEPT", "MD"];

/// `NAME (UNIT)` or `NAME[UNIT]`.
static HEADER_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<name>[^\[\(]+?)\s*(?:\[(?P<bracket>[^\]]*)\]|\((?P<paren>[^\)]*)\))\s*$")
        .unwrap()
});

/// Reader configuration.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Depth column name (None = DEPTH/DEPT/MD, else the first column).
    pub depth_column: Option<String>,
    /// Numeric sentinels that mean "no data".
    pub null_values: Vec<f64>,
    /// Well name (None = file stem).
    pub well_name: Option<String>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            depth_column: None,
            null_values: vec![DEFAULT_NULL_VALUE, -999.0, -9999.0],
            well_name: None,
            quote: b'"',
        }
    }
}

impl ReaderConfig {
    pub fn with_well_name(mut self, name: impl Into<String>) -> Self {
        self.well_name = Some(name.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_depth_column(mut self, column: impl Into<String>) -> Self {
        self.depth_column = Some(column.into());
        self
    }

    pub fn with_null_values(mut self, values: Vec<f64>) -> Self {
        self.null_values = values;
        self
    }
}

/// Reads curve tables from delimited text files.
pub struct DelimitedReader {
    config: ReaderConfig,
}

impl DelimitedReader {
    /// Create a reader with default configuration.
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
        }
    }

    /// Create a reader with custom configuration.
    pub fn with_config(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a file into a curve table.
    ///
    /// The table's metadata records `source_file`, `source_path`, `hash`,
    /// `format`, `depth_unit` (when the header carries one) and `loaded_at`.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<CurveTable> {
        let path = path.as_ref();

        let mut file = File::open(path).map_err(|e| WellMergeError::io(path, e))?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)
            .map_err(|e| WellMergeError::io(path, e))?;

        let mut hasher = Sha256::new();
        hasher.update(&contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        let name = match &self.config.well_name {
            Some(name) => name.clone(),
            None => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        let mut metadata = IndexMap::new();
        if let Some(file_name) = path.file_name() {
            metadata.insert(
                "source_file".to_string(),
                file_name.to_string_lossy().into_owned(),
            );
        }
        metadata.insert(
            "source_path".to_string(),
            path.to_string_lossy().into_owned(),
        );
        metadata.insert("hash".to_string(), hash);

        let table = self.read_bytes(&contents, &name, metadata)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            curves = table.curve_count(),
            "read curve table"
        );
        Ok(table)
    }

    /// Parse delimited bytes into a curve table named `name`.
    pub fn read_bytes(
        &self,
        bytes: &[u8],
        name: &str,
        mut metadata: IndexMap<String, String>,
    ) -> Result<CurveTable> {
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(bytes, self.config.quote)?,
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .quote(self.config.quote)
            .comment(Some(COMMENT))
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(bytes);

        let headers: Vec<(String, String)> =
            reader.headers()?.iter().map(split_header).collect();
        if headers.is_empty() || headers.iter().all(|(name, _)| name.is_empty()) {
            return Err(WellMergeError::EmptyData("No columns found".to_string()));
        }

        let depth_idx = self.depth_column_index(&headers)?;

        let mut depths = Vec::new();
        let mut columns: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }

            for (col_idx, column) in columns.iter_mut().enumerate() {
                let cell = record.get(col_idx).unwrap_or("");
                let value = self.parse_cell(cell, row_idx, col_idx)?;

                if col_idx == depth_idx {
                    match value {
                        Some(depth) => depths.push(depth),
                        None => {
                            return Err(WellMergeError::Parse {
                                row: row_idx,
                                column: col_idx,
                                message: "missing depth value".to_string(),
                            });
                        }
                    }
                } else {
                    column.push(value);
                }
            }
        }

        if depths.is_empty() {
            return Err(WellMergeError::EmptyData("No data rows found".to_string()));
        }

        // Logs recorded bottom-up are flipped to increasing depth.
        let descending = depths.len() > 1 && depths.windows(2).all(|w| w[1] < w[0]);
        if descending {
            depths.reverse();
            for column in &mut columns {
                column.reverse();
            }
        }

        let curves: Vec<Curve> = headers
            .iter()
            .zip(columns)
            .enumerate()
            .filter(|(idx, ((name, _), _))| *idx != depth_idx && !name.is_empty())
            .map(|(_, ((name, unit), values))| Curve::new(name.clone(), values).with_unit(unit.clone()))
            .collect();

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        };
        metadata.insert("format".to_string(), format.to_string());
        let depth_unit = &headers[depth_idx].1;
        if !depth_unit.is_empty() {
            metadata.insert("depth_unit".to_string(), depth_unit.clone());
        }
        metadata.insert("loaded_at".to_string(), Utc::now().to_rfc3339());

        CurveTable::new(name, depths, curves, metadata)
    }

    fn depth_column_index(&self, headers: &[(String, String)]) -> Result<usize> {
        match &self.config.depth_column {
            Some(wanted) => headers
                .iter()
                .position(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| WellMergeError::Parse {
                    row: 0,
                    column: 0,
                    message: format!("depth column '{}' not found", wanted),
                }),
            None => Ok(DEPTH_NAMES
                .iter()
                .find_map(|candidate| {
                    headers
                        .iter()
                        .position(|(name, _)| name.eq_ignore_ascii_case(candidate))
                })
                .unwrap_or(0)),
        }
    }

    fn parse_cell(&self, cell: &str, row: usize, column: usize) -> Result<Option<f64>> {
        if is_null_text(cell) {
            return Ok(None);
        }

        let value: f64 = cell.parse().map_err(|_| WellMergeError::Parse {
            row,
            column,
            message: format!("'{}' is not a number", cell),
        })?;

        if !value.is_finite() || is_null_sentinel(value, &self.config.null_values) {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

impl Default for DelimitedReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Writer configuration.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    pub delimiter: u8,
    /// Sentinel written for null cells.
    pub null_value: f64,
    /// Decimal places (None = shortest exact representation).
    pub precision: Option<usize>,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            null_value: DEFAULT_NULL_VALUE,
            precision: None,
        }
    }
}

/// Writes curve tables as delimited text.
pub struct DelimitedWriter {
    config: WriterConfig,
}

impl DelimitedWriter {
    pub fn new() -> Self {
        Self {
            config: WriterConfig::default(),
        }
    }

    pub fn with_config(config: WriterConfig) -> Self {
        Self { config }
    }

    /// Write a table to a file.
    pub fn write_file(&self, table: &CurveTable, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| WellMergeError::io(path, e))?;
        self.write_to(table, file)
    }

    /// Write a table to any writer: a header row, then one row per depth.
    pub fn write_to<W: Write>(&self, table: &CurveTable, writer: W) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .from_writer(writer);

        let mut header = Vec::with_capacity(table.curve_count() + 1);
        header.push(match table.metadata_value("depth_unit") {
            Some(unit) => format!("DEPTH ({})", unit),
            None => "DEPTH".to_string(),
        });
        for curve in table.curves() {
            header.push(if curve.unit().is_empty() {
                curve.name().to_string()
            } else {
                format!("{} ({})", curve.name(), curve.unit())
            });
        }
        out.write_record(&header)?;

        let mut record = Vec::with_capacity(header.len());
        for (row, depth) in table.depths().iter().enumerate() {
            record.clear();
            record.push(format_value(*depth, self.config.precision));
            for curve in table.curves() {
                let value = curve.values()[row].unwrap_or(self.config.null_value);
                record.push(format_value(value, self.config.precision));
            }
            out.write_record(&record)?;
        }

        out.flush()
            .map_err(|e| WellMergeError::Csv(csv::Error::from(e)))?;
        Ok(())
    }
}

impl Default for DelimitedWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a header cell into curve name and unit.
fn split_header(cell: &str) -> (String, String) {
    match HEADER_UNIT.captures(cell) {
        Some(caps) => {
            let name = caps["name"].trim().to_string();
            let unit = caps
                .name("bracket")
                .or_else(|| caps.name("paren"))
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            (name, unit)
        }
        None => (cell.trim().to_string(), String::new()),
    }
}

/// Check if a cell spells out a missing value.
fn is_null_text(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed == "-"
}

/// Pick the delimiter from the header and the first data lines.
///
/// A candidate must split every sampled line into the same number of fields,
/// at least two. The candidate yielding the most numeric data cells wins,
/// then the one yielding the most columns. If no candidate splits
/// consistently, the one splitting the header widest is used.
fn detect_delimiter(bytes: &[u8], quote: u8) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty() && !l.as_bytes().starts_with(&[COMMENT]))
        .take(SNIFF_LINES)
        .collect();

    let Some((header, data)) = lines.split_first() else {
        return Err(WellMergeError::EmptyData("No lines to analyze".to_string()));
    };

    // (delimiter, numeric cells, width)
    let mut best: Option<(u8, usize, usize)> = None;
    for &delim in DELIMITERS {
        let width = split_fields(header, delim, quote).len();
        if width < 2 {
            continue;
        }

        let mut numeric = 0;
        let mut consistent = true;
        for line in data {
            let fields = split_fields(line, delim, quote);
            if fields.len() != width {
                consistent = false;
                break;
            }
            numeric += fields.iter().filter(|f| is_numeric(f, quote)).count();
        }
        if !consistent {
            continue;
        }

        if best.is_none_or(|(_, n, w)| (numeric, width) > (n, w)) {
            best = Some((delim, numeric, width));
        }
    }

    if let Some((delim, numeric, width)) = best {
        debug!(delimiter = %(delim as char).escape_default(), numeric, width, "detected delimiter");
        return Ok(delim);
    }

    let widest = DELIMITERS
        .iter()
        .map(|&d| (d, split_fields(header, d, quote).len()))
        .filter(|&(_, width)| width > 1)
        .fold(None, |acc: Option<(u8, usize)>, cur| match acc {
            Some(prev) if prev.1 >= cur.1 => Some(prev),
            _ => Some(cur),
        });
    Ok(widest.map(|(d, _)| d).unwrap_or(b','))
}

/// Split a line on `delimiter`, ignoring delimiters inside quotes.
fn split_fields(line: &str, delimiter: u8, quote: u8) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, byte) in line.bytes().enumerate() {
        if byte == quote {
            in_quotes = !in_quotes;
        } else if byte == delimiter && !in_quotes {
            fields.push(&line[start..i]);
            start = i + 1;
        }
    }
    fields.push(&line[start..]);
    fields
}

fn is_numeric(field: &str, quote: u8) -> bool {
    field
        .trim()
        .trim_matches(quote as char)
        .parse::<f64>()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(data: &str) -> Result<CurveTable> {
        DelimitedReader::new().read_bytes(data.as_bytes(), "POZO-1", IndexMap::new())
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter(b"DEPTH,GR\n100,50\n", b'"').unwrap(), b',');
        assert_eq!(detect_delimiter(b"DEPTH\tGR\n100\t50\n", b'"').unwrap(), b'\t');
        assert_eq!(detect_delimiter(b"DEPTH;GR;RT\n100;50;2\n", b'"').unwrap(), b';');
        assert!(matches!(
            detect_delimiter(b"\n# only a comment\n", b'"'),
            Err(WellMergeError::EmptyData(_))
        ));
    }

    #[test]
    fn test_detect_delimiter_prefers_numeric_columns() {
        // Commas split every line in two as well, but leave no numeric cells.
        let data = b"DEPTH;GR, API;RT\n100;45,5;2\n100.5;46,0;3\n";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b';');
    }

    #[test]
    fn test_detect_delimiter_ignores_quoted_delimiters() {
        let data = b"DEPTH|\"GR, API\"|RT\n100|50|2\n100.5|51|3\n";
        assert_eq!(detect_delimiter(data, b'"').unwrap(), b'|');
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let table = read(
            "# Run 2; logged 2023-05-01, truck 7\n\
             DEPTH\tGR\n\
             # depth shifted, +0.5\n\
             100\t50\n\
             100.5\t55\n",
        )
        .unwrap();
        assert_eq!(table.metadata_value("format"), Some("tsv"));
        assert_eq!(table.depths(), &[100.0, 100.5]);
        assert_eq!(table.values_for("GR").unwrap(), &[Some(50.0), Some(55.0)]);
    }

    #[test]
    fn test_explicit_delimiter() {
        let reader = DelimitedReader::with_config(ReaderConfig::default().with_delimiter(b';'));
        let table = reader
            .read_bytes(b"DEPTH;GR,RAW\n100;50\n100.5;55\n", "POZO-1", IndexMap::new())
            .unwrap();
        assert_eq!(table.metadata_value("format"), Some("csv-semicolon"));
        assert!(table.has_curve("GR,RAW"));
    }

    #[test]
    fn test_explicit_depth_column() {
        let data = b"TVD,MD,GR\n98.0,100.0,50\n98.4,100.5,55\n";
        let reader = DelimitedReader::with_config(ReaderConfig::default().with_depth_column("md"));
        let table = reader.read_bytes(data, "POZO-1", IndexMap::new()).unwrap();
        assert_eq!(table.depths(), &[100.0, 100.5]);
        assert_eq!(table.values_for("TVD").unwrap(), &[Some(98.0), Some(98.4)]);

        let reader = DelimitedReader::with_config(ReaderConfig::default().with_depth_column("TVDSS"));
        let err = reader.read_bytes(data, "POZO-1", IndexMap::new()).unwrap_err();
        assert!(matches!(err, WellMergeError::Parse { .. }));
    }

    #[test]
    fn test_custom_null_values() {
        let data = b"DEPTH,GR\n100,0\n100.5,-999.25\n";
        let reader = DelimitedReader::with_config(ReaderConfig::default().with_null_values(vec![0.0]));
        let table = reader.read_bytes(data, "POZO-1", IndexMap::new()).unwrap();
        assert_eq!(table.values_for("GR").unwrap(), &[None, Some(-999.25)]);
    }

    #[test]
    fn test_split_header() {
        assert_eq!(split_header("GR (API)"), ("GR".to_string(), "API".to_string()));
        assert_eq!(split_header("RT[ohm.m]"), ("RT".to_string(), "ohm.m".to_string()));
        assert_eq!(split_header(" NPHI "), ("NPHI".to_string(), String::new()));
    }

    #[test]
    fn test_read_with_units_and_nulls() {
        let table = read(
            "DEPTH (M),GR (API),RT\n\
             100.0,50,-999.25\n\
             100.5,,2.5\n\
             101.0,NaN,3.0\n",
        )
        .unwrap();

        assert_eq!(table.depths(), &[100.0, 100.5, 101.0]);
        assert_eq!(table.values_for("GR").unwrap(), &[Some(50.0), None, None]);
        assert_eq!(table.values_for("RT").unwrap(), &[None, Some(2.5), Some(3.0)]);
        assert_eq!(table.unit_of("GR").unwrap(), "API");
        assert_eq!(table.metadata_value("depth_unit"), Some("M"));
        assert_eq!(table.metadata_value("format"), Some("csv"));
        assert!(!table.has_curve("DEPTH"));
    }

    #[test]
    fn test_depth_column_found_by_name() {
        let table = read("GR\tDEPT\n50\t100\n55\t100.5\n").unwrap();
        assert_eq!(table.depths(), &[100.0, 100.5]);
        assert_eq!(table.curve_names().len(), 1);
    }

    #[test]
    fn test_descending_log_is_flipped() {
        let table = read("DEPTH,GR\n101,60\n100.5,55\n100,50\n").unwrap();
        assert_eq!(table.depths(), &[100.0, 100.5, 101.0]);
        assert_eq!(table.values_for("GR").unwrap(), &[Some(50.0), Some(55.0), Some(60.0)]);
    }

    #[test]
    fn test_unparseable_cell_is_an_error() {
        let err = read("DEPTH,GR\n100,abc\n").unwrap_err();
        assert!(matches!(err, WellMergeError::Parse { row: 0, column: 1, .. }));
    }

    #[test]
    fn test_missing_depth_is_an_error() {
        let err = read("DEPTH,GR\n,50\n").unwrap_err();
        assert!(matches!(err, WellMergeError::Parse { .. }));
    }

    #[test]
    fn test_unordered_depths_are_invalid() {
        let err = read("DEPTH,GR\n100,1\n102,2\n101,3\n").unwrap_err();
        assert!(matches!(err, WellMergeError::InvalidTable { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = read("DEPTH,GR\n").unwrap_err();
        assert!(matches!(err, WellMergeError::EmptyData(_)));
    }

    #[test]
    fn test_write_nulls_as_sentinel() {
        let table = CurveTable::builder("POZO-1")
            .depths(vec![100.0, 100.5])
            .curve(Curve::new("GR", vec![Some(50.0), None]).with_unit("API"))
            .build()
            .unwrap();

        let mut out = Vec::new();
        DelimitedWriter::new().write_to(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text, "DEPTH,GR (API)\n100,50\n100.5,-999.25\n");
    }

    #[test]
    fn test_write_with_precision() {
        let table = CurveTable::builder("POZO-1")
            .depths(vec![100.0])
            .readings("GR", &[50.123456])
            .build()
            .unwrap();

        let writer = DelimitedWriter::with_config(WriterConfig {
            delimiter: b'\t',
            precision: Some(2),
            ..WriterConfig::default()
        });
        let mut out = Vec::new();
        writer.write_to(&table, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "DEPTH\tGR\n100.00\t50.12\n");
    }
}
