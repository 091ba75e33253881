//! cardwise-ingest: bank-card exports (XLSX, CSV) into a `Dataset`, plus the
//! user-settings loader.

pub mod columns;
pub mod parsers;
pub mod settings;

use std::path::Path;

use anyhow::{Result, bail};
use cardwise_core::Dataset;
use tracing::info;

pub use columns::{Cell, DatasetBuilder, column_for_header, parse_amount};
pub use settings::{UserSettings, load_user_settings};

/// Read a transaction export, choosing the reader by file extension.
pub fn load_transactions(path: &Path) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    info!(path = %path.display(), "loading transactions");
    let dataset = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => parsers::spreadsheet::read_spreadsheet(path)?,
        "csv" => parsers::csv_export::read_csv_export(path)?,
        other => bail!("unsupported transaction file type '{other}': {}", path.display()),
    };
    info!(rows = dataset.len(), columns = dataset.columns().len(), "transactions loaded");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_rejects_unknown_extension() {
        let err = load_transactions(&PathBuf::from("operations.pdf")).unwrap_err();
        assert!(err.to_string().contains("unsupported transaction file type 'pdf'"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = load_transactions(&PathBuf::from("/nonexistent/operations.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/operations.csv"));
    }
}
