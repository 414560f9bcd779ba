//! Uploaded review spreadsheets (CSV and XLSX).
//!
//! The first row is the header. Reviews are read from the first column whose
//! header matches one of [`REVIEW_COLUMNS`], in that priority order, and are
//! returned in row order as JSON values so blank and numeric cells survive
//! as non-string reviews.

use calamine::{Data, Reader, Xlsx};
use serde_json::Value;
use std::io::Cursor;

use crate::error::ApiError;

/// Accepted review column headers, highest priority first.
pub const REVIEW_COLUMNS: [&str; 5] = ["reviewText", "review_text", "review", "text", "comment"];

pub const INVALID_FILE_FORMAT: &str = "Invalid file format. Please upload a CSV or XLSX file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Csv,
    Xlsx,
}

impl SpreadsheetFormat {
    /// Picks the format from the file name suffix (case-sensitive).
    pub fn from_filename(filename: &str) -> Option<Self> {
        if filename.ends_with(".csv") {
            Some(Self::Csv)
        } else if filename.ends_with(".xlsx") {
            Some(Self::Xlsx)
        } else {
            None
        }
    }
}

/// Reads the review column out of an uploaded file.
pub fn read_reviews(filename: &str, bytes: &[u8]) -> Result<Vec<Value>, ApiError> {
    let format = SpreadsheetFormat::from_filename(filename)
        .ok_or_else(|| ApiError::bad_request(INVALID_FILE_FORMAT))?;

    let table = match format {
        SpreadsheetFormat::Csv => read_csv(bytes)?,
        SpreadsheetFormat::Xlsx => read_xlsx(bytes)?,
    };

    let column = find_review_column(&table.headers)?;
    Ok(table
        .rows
        .into_iter()
        .map(|mut row| {
            if column < row.len() {
                row.swap_remove(column)
            } else {
                Value::Null
            }
        })
        .collect())
}

/// Index of the highest-priority review column present in `headers`.
pub fn find_review_column(headers: &[String]) -> Result<usize, ApiError> {
    REVIEW_COLUMNS
        .iter()
        .find_map(|name| headers.iter().position(|header| header == name))
        .ok_or_else(|| {
            ApiError::bad_request(format!(
                "No valid review column found. Expected one of: {}",
                REVIEW_COLUMNS.join(", ")
            ))
        })
}

struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

fn read_csv(bytes: &[u8]) -> Result<Table, ApiError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ApiError::internal(format!("Failed to read CSV header: {}", e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ApiError::internal(format!("Failed to read CSV row: {}", e)))?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Value::Null
                    } else {
                        Value::String(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table { headers, rows })
}

fn read_xlsx(bytes: &[u8]) -> Result<Table, ApiError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| ApiError::internal(format!("Failed to open XLSX workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ApiError::internal("XLSX workbook has no worksheets"))?
        .map_err(|e| ApiError::internal(format!("Failed to read XLSX worksheet: {}", e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| header.iter().map(|cell| cell.to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<Value>> = rows.map(|row| row.iter().map(cell_value).collect()).collect();

    Ok(Table { headers, rows })
}

/// Largest magnitude at which every whole `f64` is exactly an integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Int(i) => Value::from(*i),
        // Workbooks store every number as a float; whole ones read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INTEGER => Value::from(*f as i64),
        Data::Float(f) => Value::from(*f),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}
