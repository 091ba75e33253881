//! Date-window filtering over operation timestamps.

use cardwise_core::time::parse_reference_timestamp;
use cardwise_core::{Dataset, OperationTime, ReportError, TimestampStyle};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

/// Length of the as-of snapshot ending at the reference timestamp.
pub const SNAPSHOT_DAYS: i64 = 1;

/// As-of snapshot: rows posted in `[reference - 1 day, reference]`.
///
/// `reference` must be exactly `YYYY-MM-DD HH:MM:SS`. Operation timestamps are
/// read strictly as `DD.MM.YYYY HH:MM:SS`; rows that do not match are dropped.
/// The input is left untouched and the returned rows carry parsed timestamps.
pub fn filter_transactions_by_date(dataset: &Dataset, reference: &str) -> Result<Dataset, ReportError> {
    let end = parse_reference_timestamp(reference)?;
    let start = end - Duration::days(SNAPSHOT_DAYS);
    info!(%start, %end, rows = dataset.len(), "filtering transactions by date");

    let snapshot = filter_window(dataset, start, end, TimestampStyle::Strict);
    info!(rows = snapshot.len(), "as-of snapshot ready");
    Ok(snapshot)
}

/// Rows whose timestamp, normalized under `style`, lies in `[start, end]`.
///
/// Unparseable timestamps never satisfy the comparison.
pub fn filter_window(
    dataset: &Dataset,
    start: NaiveDateTime,
    end: NaiveDateTime,
    style: TimestampStyle,
) -> Dataset {
    let rows: Vec<_> = dataset
        .iter()
        .map(|row| row.normalized(style))
        .filter(|row| match row.operation_timestamp {
            OperationTime::Parsed(dt) => start <= dt && dt <= end,
            OperationTime::Text(_) | OperationTime::Missing => false,
        })
        .collect();

    debug!(kept = rows.len(), dropped = dataset.len() - rows.len(), "window applied");
    dataset.with_rows(rows)
}
