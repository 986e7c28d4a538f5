//! Delimited matrix ingest.
//!
//! Reads an n×d numeric matrix (one row per peak, one column per replicate):
//! - `#` starts a comment line
//! - an optional non-numeric first row is treated as a header
//! - every other row must have the same number of numeric fields

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use nalgebra::DMatrix;

use crate::error::AppError;

/// Ingest output: the raw matrix plus the header, if one was present.
#[derive(Debug, Clone)]
pub struct InputMatrix {
    pub values: DMatrix<f64>,
    pub header: Option<Vec<String>>,
}

/// Pick a delimiter from the file extension: tab for `.tsv`/`.tab`, comma
/// otherwise.
pub fn infer_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") || ext.eq_ignore_ascii_case("tab") => b'\t',
        _ => b',',
    }
}

/// Load a numeric matrix from `path`.
pub fn load_matrix(path: &Path, delimiter: u8) -> Result<InputMatrix, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open input '{}': {e}", path.display())))?;
    read_matrix(file, delimiter)
}

/// Parse a numeric matrix from any reader.
pub fn read_matrix<R: std::io::Read>(reader: R, delimiter: u8) -> Result<InputMatrix, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut header = None;
    let mut flat = Vec::new();
    let mut n_cols: Option<usize> = None;
    let mut n_rows = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::new(2, format!("Input parse error: {e}")))?;
        let line = record.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let parsed = match parse_record(&record) {
            Ok(values) => values,
            Err(_) if n_rows == 0 && header.is_none() => {
                header = Some(record.iter().map(str::to_string).collect());
                continue;
            }
            Err(field) => {
                return Err(AppError::new(
                    2,
                    format!("Line {line}: '{field}' is not a number."),
                ));
            }
        };

        match n_cols {
            None => n_cols = Some(parsed.len()),
            Some(expected) if expected != parsed.len() => {
                return Err(AppError::new(
                    2,
                    format!(
                        "Line {line}: expected {expected} columns, found {}.",
                        parsed.len()
                    ),
                ));
            }
            Some(_) => {}
        }
        flat.extend(parsed);
        n_rows += 1;
    }

    let Some(n_cols) = n_cols else {
        return Err(AppError::new(3, "Input contains no numeric rows."));
    };
    if n_cols < 2 {
        return Err(AppError::new(
            3,
            format!("Input has {n_cols} column; at least 2 replicates are required."),
        ));
    }

    Ok(InputMatrix {
        values: DMatrix::from_row_slice(n_rows, n_cols, &flat),
        header,
    })
}

/// Parse every field as `f64`; on failure return the offending field.
fn parse_record(record: &StringRecord) -> Result<Vec<f64>, String> {
    record
        .iter()
        .map(|field| field.parse::<f64>().map_err(|_| field.to_string()))
        .collect()
}
