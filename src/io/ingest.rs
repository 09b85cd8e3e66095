//! CSV ingest and normalization.
//!
//! This module turns a quarterly fundamentals export into a list of `Record`s:
//!
//! - the header row supplies field names (matched case-insensitively)
//! - price and TTM EPS are coerced to `f64`; blank cells become `None`
//! - rows that fail coercion or are malformed are skipped and reported, never fatal
//! - a missing or unreadable file is fatal (exit code 2), including read failures mid-file

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::{ColumnMap, Record};
use crate::error::AppError;

/// How many skipped rows are logged individually before going quiet.
const LOGGED_ROW_ERRORS: usize = 5;

/// A row that was dropped during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line in the source file (the header is line 1).
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: records in file order plus the rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    pub records: Vec<Record>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl LoadedData {
    pub fn skipped(&self) -> usize {
        self.row_errors.len()
    }
}

/// Load `path` into `Record`s using the given column names.
pub fn load_records(path: &Path, columns: &ColumnMap) -> Result<LoadedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let loaded = read_records(file, columns)?;
    info!(
        path = %path.display(),
        loaded = loaded.records.len(),
        skipped = loaded.skipped(),
        "loaded fundamentals"
    );
    Ok(loaded)
}

/// Parse records from any reader; `load_records` is a thin file wrapper around this.
pub fn read_records<R: Read>(source: R, columns: &ColumnMap) -> Result<LoadedData, AppError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let layout = ColumnLayout::resolve(&headers, columns);
    if let Some(missing) = layout.missing.first() {
        warn!(column = %missing, "required column not found in header; every row will be skipped");
    }

    let mut out = LoadedData::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let outcome = match result {
            Ok(row) => parse_row(&row, &layout),
            Err(e) if e.is_io_error() => {
                return Err(AppError::input(format!("Failed to read CSV at line {line}: {e}")));
            }
            Err(e) => Err(RowError {
                line,
                id: None,
                message: format!("CSV parse error: {e}"),
            }),
        };

        match outcome {
            Ok(record) => out.records.push(record),
            Err(mut err) => {
                err.line = line;
                if out.row_errors.len() < LOGGED_ROW_ERRORS {
                    warn!(line, id = ?err.id, "skipping row: {}", err.message);
                }
                out.row_errors.push(err);
            }
        }
    }

    debug!(rows_read = out.rows_read, "finished reading CSV");
    Ok(out)
}

/// Header positions for the four required fields plus the pass-through columns.
#[derive(Debug)]
struct ColumnLayout {
    /// `None` when any required column is absent from the header.
    required: Option<RequiredColumns>,
    /// Required column names that are absent from the header.
    missing: Vec<String>,
    passthrough: Vec<(usize, String)>,
}

#[derive(Debug, Clone, Copy)]
struct RequiredColumns {
    identifier: usize,
    period: usize,
    price: usize,
    trailing_metric: usize,
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord, columns: &ColumnMap) -> Self {
        let header_map = build_header_map(headers);
        let find = |name: &str| header_map.get(&normalize_header_name(name)).copied();

        let found = [
            (find(&columns.identifier), &columns.identifier),
            (find(&columns.period), &columns.period),
            (find(&columns.price), &columns.price),
            (find(&columns.trailing_metric), &columns.trailing_metric),
        ];

        let missing = found
            .iter()
            .filter(|(idx, _)| idx.is_none())
            .map(|(_, name)| (*name).clone())
            .collect();

        let required = match found.map(|(idx, _)| idx) {
            [Some(identifier), Some(period), Some(price), Some(trailing_metric)] => Some(RequiredColumns {
                identifier,
                period,
                price,
                trailing_metric,
            }),
            _ => None,
        };

        let required_idx: Vec<usize> = found.iter().filter_map(|(idx, _)| *idx).collect();
        let passthrough = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| !required_idx.contains(idx))
            .map(|(idx, name)| (idx, name.trim_start_matches('\u{feff}').trim().to_string()))
            .collect();

        Self {
            required,
            missing,
            passthrough,
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated header names.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Build a `Record` from one CSV row. The returned error's `line` is filled in by the caller.
fn parse_row(row: &StringRecord, layout: &ColumnLayout) -> Result<Record, RowError> {
    let fail = |id: Option<&str>, message: String| RowError {
        line: 0,
        id: id.map(str::to_string),
        message,
    };

    let Some(cols) = layout.required else {
        let name = layout.missing.first().map(String::as_str).unwrap_or_default();
        return Err(fail(None, format!("Missing required column: `{name}`")));
    };

    let identifier = row
        .get(cols.identifier)
        .map(str::trim)
        .ok_or_else(|| fail(None, "Missing identifier value.".to_string()))?;
    let period = row
        .get(cols.period)
        .map(str::trim)
        .ok_or_else(|| fail(Some(identifier), "Missing period value.".to_string()))?;

    let numeric = |idx: usize, label: &str| -> Result<Option<f64>, RowError> {
        let cell = row
            .get(idx)
            .ok_or_else(|| fail(Some(identifier), format!("Missing {label} value.")))?;
        parse_opt_f64(cell).map_err(|e| fail(Some(identifier), format!("Invalid {label}: {e}")))
    };
    let price = numeric(cols.price, "price")?;
    let trailing_metric = numeric(cols.trailing_metric, "TTM EPS")?;

    let attributes = layout
        .passthrough
        .iter()
        .filter_map(|(idx, name)| row.get(*idx).map(|value| (name.clone(), value.to_string())))
        .collect();

    Ok(Record {
        identifier: identifier.to_string(),
        period: period.to_string(),
        price,
        trailing_metric,
        attributes,
    })
}

/// Blank cells are `Ok(None)`; anything else must be a finite float.
fn parse_opt_f64(s: &str) -> Result<Option<f64>, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("could not convert '{s}' to float"))?;
    if v.is_finite() {
        Ok(Some(v))
    } else {
        Err(format!("non-finite value '{s}'"))
    }
}
