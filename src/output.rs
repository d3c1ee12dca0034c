//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing to the log, JSON files, and CSV files. Every
//! writer replaces an existing file so re-running a report for the same day
//! overwrites its artifacts.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::ComparisonRecord;
use crate::dataset::{Row, Value};
use csv::WriterBuilder;
use std::fmt::Debug;
use std::path::Path;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes a value as pretty-printed JSON.
pub fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let body = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    debug!(path = %path.display(), "JSON written");
    Ok(())
}

/// Writes rows as CSV with the given column order. Missing cells are empty.
pub fn write_rows_csv(path: &Path, columns: &[String], rows: &[Row]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| match row.get(c) {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Text(s)) => s.clone(),
            None => String::new(),
        }))?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes comparison records flattened to `<metric>_this_week`-style columns.
pub fn write_comparison_csv(
    path: &Path,
    key_column: &str,
    metrics: &[String],
    records: &[ComparisonRecord],
) -> Result<()> {
    let columns = ComparisonRecord::columns(key_column, metrics);
    let rows: Vec<Row> = records.iter().map(ComparisonRecord::to_row).collect();
    write_rows_csv(path, &columns, &rows)
}

/// Serializes each item as one CSV row, with a header from the field names.
pub fn write_serialized_csv<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for item in items {
        writer.serialize(item)?;
    }
    writer.flush()?;

    Ok(())
}
