//! Writing report text to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cardwise_core::{Clock, Dataset};
use chrono::NaiveDateTime;
use tracing::info;

/// `report_YYYYmmdd_HHMMSS.txt`
pub fn default_report_name(now: NaiveDateTime) -> PathBuf {
    PathBuf::from(format!("report_{}.txt", now.format("%Y%m%d_%H%M%S")))
}

/// Write `text` as UTF-8 to `file_name`, or to a timestamped default name.
/// Returns the path written.
pub fn write_report(text: &str, file_name: Option<&Path>, clock: &dyn Clock) -> Result<PathBuf> {
    let path = match file_name {
        Some(p) => p.to_path_buf(),
        None => default_report_name(clock.now()),
    };
    fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
    info!(path = %path.display(), bytes = text.len(), "report written");
    Ok(path)
}

/// Plain-text table of a dataset: a header of column names, then one line
/// per row, columns padded to their widest cell. Absent cells print as `NaN`.
pub fn render_table(dataset: &Dataset) -> String {
    let columns = dataset.columns();
    let cells: Vec<Vec<String>> = dataset
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.field_text(*c).unwrap_or_else(|| "NaN".to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.name().len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(pad_line(columns.iter().map(|c| c.name().to_string()), &widths));
    for row in cells {
        lines.push(pad_line(row.into_iter(), &widths));
    }
    lines.join("\n")
}

fn pad_line(values: impl Iterator<Item = String>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(v, w)| format!("{v:<w$}", w = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
