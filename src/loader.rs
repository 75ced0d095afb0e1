// Source loading. CSV cells arrive as text; JSON keeps native numbers.
use crate::error::{DashboardError, Result};
use crate::types::{Dataset, RawValue, Record};
use csv::ReaderBuilder;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub skipped_rows: usize,
}

/// Load a dataset from a `.csv` or `.json` file.
pub fn load(path: impl AsRef<Path>) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let file = File::open(path)
        .map_err(|e| DashboardError::SourceUnavailable(format!("{}: {}", path.display(), e)))?;
    let reader = BufReader::new(file);
    let (dataset, report) = match ext.as_str() {
        "csv" => read_csv(reader)?,
        "json" => read_json(reader)?,
        other => return Err(DashboardError::UnsupportedFormat(other.to_string())),
    };
    info!(
        path = %path.display(),
        rows = report.total_rows,
        columns = report.total_columns,
        skipped = report.skipped_rows,
        "loaded source"
    );
    Ok((dataset, report))
}

/// Read CSV with a header row. Empty cells become `Missing`.
pub fn read_csv<R: Read>(reader: R) -> Result<(Dataset, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for result in rdr.records() {
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                skipped_rows += 1;
                continue;
            }
        };
        let mut record = Record::with_capacity(columns.len());
        for (name, cell) in columns.iter().zip(row.iter()) {
            let raw = if cell.trim().is_empty() {
                RawValue::Missing
            } else {
                RawValue::text(cell)
            };
            record.insert(name.clone(), raw);
        }
        records.push(record);
    }

    let report = LoadReport {
        total_rows: records.len(),
        total_columns: columns.len(),
        skipped_rows,
    };
    Ok((Dataset::new(columns, records), report))
}

/// Read a JSON array of flat objects.
///
/// Columns are ordered by first appearance across all objects. Non-object
/// array elements are skipped.
pub fn read_json<R: Read>(reader: R) -> Result<(Dataset, LoadReport)> {
    let value: Value = serde_json::from_reader(reader)?;
    let Value::Array(items) = value else {
        return Err(DashboardError::UnsupportedFormat(
            "expected a JSON array of objects".to_string(),
        ));
    };

    let mut columns: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(items.len());
    let mut skipped_rows = 0usize;
    for item in items {
        let Value::Object(map) = item else {
            skipped_rows += 1;
            continue;
        };
        let mut record = Record::with_capacity(map.len());
        for (name, v) in map {
            if !columns.contains(&name) {
                columns.push(name.clone());
            }
            record.insert(name, json_to_raw(v));
        }
        records.push(record);
    }

    let report = LoadReport {
        total_rows: records.len(),
        total_columns: columns.len(),
        skipped_rows,
    };
    Ok((Dataset::new(columns, records), report))
}

fn json_to_raw(v: Value) -> RawValue {
    match v {
        Value::Null => RawValue::Missing,
        Value::Number(n) => n.as_f64().map_or(RawValue::Missing, RawValue::Number),
        Value::String(s) if s.trim().is_empty() => RawValue::Missing,
        Value::String(s) => RawValue::Text(s),
        Value::Bool(b) => RawValue::Text(b.to_string()),
        other => RawValue::Text(other.to_string()),
    }
}
