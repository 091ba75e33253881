//! CSV exports. The bank writes `;`-separated files with decimal commas;
//! hand-made exports often use `,`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use cardwise_core::Dataset;
use tracing::debug;

use crate::columns::{Cell, DatasetBuilder};

pub fn read_csv_export(path: &Path) -> Result<Dataset> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_csv_export(&text).with_context(|| format!("parse {}", path.display()))
}

/// Parse CSV text whose first line is the header.
pub fn parse_csv_export(text: &str) -> Result<Dataset> {
    let text = text.trim_start_matches('\u{feff}');
    let delimiter = detect_delimiter(text);
    debug!(delimiter = %(delimiter as char), "reading csv export");

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().context("reading header row")?.clone();
    let mut builder = DatasetBuilder::from_headers(headers.iter());

    for (i, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("reading row {}", i + 2))?;
        builder.push_row(record.iter().map(Cell::text));
    }

    Ok(builder.finish())
}

/// `;` when the header line has more semicolons than commas, else `,`.
fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or_default();
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}
