//! CSV ingest and validation.
//!
//! This module turns a `(thickness, measured, sigma)` table into a clean list of
//! observations that are safe to fit.
//!
//! Design goals:
//! - **Positional schema**: three numeric columns, optional header row
//! - **Row-level validation** (skip bad rows and report them, or fail fast)
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ByteRecord;
use tracing::{debug, warn};

use crate::domain::{DatasetStats, IngestOptions, Observation, RecordPolicy};
use crate::error::{AppError, ErrorKind};

const FIELD_NAMES: [&str; 3] = ["thickness", "measured", "sigma"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load an observation table from `path`.
pub fn load_observations(path: &Path, opts: &IngestOptions) -> Result<IngestedData, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::table_access(format!("Failed to open CSV '{}': {e}", path.display()))
    })?;
    debug!(path = %path.display(), include_header = opts.include_header, "reading observation table");
    read_observations(file, opts)
}

/// Parse an observation table from any reader.
pub fn read_observations<R: Read>(reader: R, opts: &IngestOptions) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;
    let mut header_pending = opts.include_header;

    // Byte records: the header is skipped before any UTF-8 decoding, so a
    // Latin-1 title row never shifts which record counts as the header.
    for result in reader.byte_records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                // I/O failures are not row problems; everything else is.
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(AppError::table_access(format!("Failed to read CSV: {e}")));
                }
                let line = e.position().map(|p| p.line() as usize).unwrap_or(0);
                if std::mem::take(&mut header_pending) {
                    debug!(line, "skipping unreadable header record");
                    continue;
                }
                rows_read += 1;
                reject_row(opts.record_policy, &mut row_errors, line, e.to_string())?;
                continue;
            }
        };

        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

        if std::mem::take(&mut header_pending) {
            debug!(line, header = ?record, "skipping header record");
            continue;
        }

        rows_read += 1;
        match parse_record(&record) {
            Ok(obs) => observations.push(obs),
            Err(message) => reject_row(opts.record_policy, &mut row_errors, line, message)?,
        }
    }

    let rows_used = observations.len();
    let stats = compute_stats(&observations).ok_or_else(|| {
        AppError::new(
            ErrorKind::EmptyTable,
            format!("No valid observations in table ({rows_read} data rows read)."),
        )
    })?;

    Ok(IngestedData {
        observations,
        stats,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn reject_row(
    policy: RecordPolicy,
    row_errors: &mut Vec<RowError>,
    line: usize,
    message: String,
) -> Result<(), AppError> {
    match policy {
        RecordPolicy::Fail => Err(AppError::malformed(format!("Line {line}: {message}"))),
        RecordPolicy::Skip => {
            warn!(line, "skipping record: {message}");
            row_errors.push(RowError { line, message });
            Ok(())
        }
    }
}

fn parse_record(record: &ByteRecord) -> Result<Observation, String> {
    if record.len() != FIELD_NAMES.len() {
        return Err(format!(
            "Expected {} fields (thickness, measured, sigma), found {}.",
            FIELD_NAMES.len(),
            record.len()
        ));
    }

    let mut values = [0.0_f64; 3];
    for (idx, name) in FIELD_NAMES.iter().enumerate() {
        values[idx] = parse_field(record.get(idx), name)?;
    }
    let [thickness, measured, sigma] = values;

    if sigma < 0.0 {
        return Err(format!("Invalid `sigma` {sigma} (must be >= 0)."));
    }

    Ok(Observation {
        thickness,
        measured,
        sigma,
    })
}

fn parse_field(raw: Option<&[u8]>, name: &str) -> Result<f64, String> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing `{name}` value."))?;
    let raw = std::str::from_utf8(raw)
        .map_err(|_| format!("Invalid `{name}` value '{}' (not UTF-8).", String::from_utf8_lossy(raw)))?;
    let v = raw
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{raw}' (not a number)."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value '{raw}'."))
    }
}

fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    if observations.is_empty() {
        return None;
    }

    let mut thickness_min = f64::INFINITY;
    let mut thickness_max = f64::NEG_INFINITY;
    for o in observations {
        thickness_min = thickness_min.min(o.thickness);
        thickness_max = thickness_max.max(o.thickness);
    }

    Some(DatasetStats {
        n_points: observations.len(),
        excluded: observations.iter().filter(|o| !o.is_weighted()).count(),
        thickness_min,
        thickness_max,
    })
}
