//! Spreadsheet exports (the bank's `operations.xlsx`) via calamine.
//! The first worksheet is read; its first row is the header.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use cardwise_core::Dataset;
use cardwise_core::time::EXPORT_TIMESTAMP_FORMAT;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::columns::{Cell, DatasetBuilder};

pub fn read_spreadsheet(path: &Path) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).with_context(|| format!("open {}", path.display()))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("{} has no worksheets", path.display()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("read worksheet '{sheet}' of {}", path.display()))?;
    debug!(sheet = %sheet, rows = range.height(), "reading worksheet");

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Dataset::default());
    };
    let mut builder = DatasetBuilder::from_headers(header.iter().map(header_text));
    for row in rows {
        builder.push_row(row.iter().map(cell_from_data));
    }

    Ok(builder.finish())
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Convert a calamine cell. Date cells become export-layout text so the
/// timestamp parse rules apply to them like to any other export.
pub fn cell_from_data(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::text(s),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(ts) => Cell::Text(ts.format(EXPORT_TIMESTAMP_FORMAT).to_string()),
            None => Cell::Empty,
        },
    }
}

/// Excel serial day number (day 0 = 1899-12-30) to a timestamp, rounded to
/// the second.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch.checked_add_signed(Duration::seconds(seconds))
}
