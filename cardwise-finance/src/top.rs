//! Largest transactions by payment amount.

use std::cmp::Ordering;

use cardwise_core::time::DISPLAY_DATE_FORMAT;
use cardwise_core::{Column, Dataset, ReportError, TimestampStyle};
use serde::{Deserialize, Serialize};
use tracing::info;

pub const TOP_N: usize = 5;

/// A ranked transaction reshaped for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTransaction {
    /// `DD.MM.YYYY`, null when the timestamp did not parse
    pub date: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Top 5 rows by `amount_of_payment`, descending.
pub fn get_top_5_transactions(dataset: &Dataset) -> Result<Vec<TopTransaction>, ReportError> {
    top_transactions(dataset, TOP_N)
}

/// Top `n` rows by `amount_of_payment`, descending.
///
/// The sort is stable, so equal amounts keep their input order. Rows without
/// a payment amount rank last. Unparseable timestamps keep the row and yield
/// a null date.
pub fn top_transactions(dataset: &Dataset, n: usize) -> Result<Vec<TopTransaction>, ReportError> {
    dataset.require(&[Column::OperationTimestamp, Column::AmountOfPayment])?;

    let mut ranked: Vec<_> = dataset.iter().collect();
    ranked.sort_by(|a, b| descending(a.amount_of_payment, b.amount_of_payment));

    let top: Vec<TopTransaction> = ranked
        .into_iter()
        .take(n)
        .map(|row| TopTransaction {
            date: row
                .operation_timestamp
                .resolve(TimestampStyle::Strict)
                .map(|dt| dt.format(DISPLAY_DATE_FORMAT).to_string()),
            amount: row.amount_of_payment,
            category: row.category.clone(),
            description: row.description.clone(),
        })
        .collect();

    info!(selected = top.len(), rows = dataset.len(), "ranked top transactions");
    Ok(top)
}

/// NaN ranks with the missing amounts so the comparator stays a total order.
fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    let a = a.filter(|v| !v.is_nan());
    let b = b.filter(|v| !v.is_nan());
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwise_core::TransactionRecord;

    fn paid(ts: &str, amount: f64, description: &str) -> TransactionRecord {
        TransactionRecord::new(ts)
            .with_payment_amount(amount)
            .with_category("Супермаркеты")
            .with_description(description)
    }

    fn amounts(top: &[TopTransaction]) -> Vec<f64> {
        top.iter().filter_map(|t| t.amount).collect()
    }

    #[test]
    fn test_six_rows_yield_top_five_descending() {
        let rows = (1..=6)
            .map(|i| paid("27.04.2020 10:00:00", f64::from(i) * 100.0, "shop"))
            .collect();
        let top = get_top_5_transactions(&Dataset::from_records(rows)).unwrap();
        assert_eq!(amounts(&top), vec![600.0, 500.0, 400.0, 300.0, 200.0]);
    }

    #[test]
    fn test_fewer_than_five_rows() {
        let ds = Dataset::from_records(vec![
            paid("27.04.2020 10:00:00", 10.0, "a"),
            paid("27.04.2020 11:00:00", 30.0, "b"),
        ]);
        let top = get_top_5_transactions(&ds).unwrap();
        assert_eq!(amounts(&top), vec![30.0, 10.0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let ds = Dataset::from_records(vec![
            paid("27.04.2020 10:00:00", 50.0, "first"),
            paid("27.04.2020 10:00:00", 90.0, "big"),
            paid("27.04.2020 10:00:00", 50.0, "second"),
            paid("27.04.2020 10:00:00", 50.0, "third"),
        ]);
        let top = get_top_5_transactions(&ds).unwrap();
        let order: Vec<_> = top.iter().map(|t| t.description.as_deref().unwrap()).collect();
        assert_eq!(order, vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn test_output_is_non_increasing() {
        let ds = Dataset::from_records(vec![
            paid("27.04.2020 10:00:00", -5.0, "refund"),
            paid("27.04.2020 10:00:00", 12.5, "a"),
            paid("27.04.2020 10:00:00", 0.0, "zero"),
            paid("27.04.2020 10:00:00", 700.0, "b"),
            paid("27.04.2020 10:00:00", 12.5, "c"),
            paid("27.04.2020 10:00:00", 3.0, "d"),
            paid("27.04.2020 10:00:00", 44.0, "e"),
        ]);
        let top = get_top_5_transactions(&ds).unwrap();
        assert_eq!(top.len(), 5);
        let values = amounts(&top);
        assert!(values.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_nan_amount_ranks_last() {
        let ds = Dataset::from_records(vec![
            paid("27.04.2020 10:00:00", 10.0, "a"),
            paid("27.04.2020 10:00:00", f64::NAN, "nan"),
            paid("27.04.2020 10:00:00", 30.0, "b"),
        ]);
        let top = get_top_5_transactions(&ds).unwrap();
        let order: Vec<_> = top.iter().map(|t| t.description.as_deref().unwrap()).collect();
        assert_eq!(order, vec!["b", "a", "nan"]);
        assert!(top[2].amount.unwrap().is_nan());
    }

    #[test]
    fn test_reshapes_date_and_fields() {
        let ds = Dataset::from_records(vec![paid("31.12.2021 16:44:00", 160.89, "Колхоз")]);
        let top = get_top_5_transactions(&ds).unwrap();
        assert_eq!(
            top,
            vec![TopTransaction {
                date: Some("31.12.2021".to_string()),
                amount: Some(160.89),
                category: Some("Супермаркеты".to_string()),
                description: Some("Колхоз".to_string()),
            }]
        );
    }

    #[test]
    fn test_unparseable_date_keeps_row() {
        let ds = Dataset::from_records(vec![paid("someday", 10.0, "x")]);
        let top = get_top_5_transactions(&ds).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].date, None);
    }

    #[test]
    fn test_missing_payment_ranks_last() {
        let ds = Dataset::from_records(vec![
            TransactionRecord::new("27.04.2020 10:00:00").with_description("no amount"),
            paid("27.04.2020 10:00:00", 1.0, "one"),
        ]);
        let top = get_top_5_transactions(&ds).unwrap();
        assert_eq!(top[0].description.as_deref(), Some("one"));
        assert_eq!(top[1].amount, None);
    }

    #[test]
    fn test_missing_columns() {
        let ds = Dataset::new([Column::OperationTimestamp, Column::AmountOfOperation], vec![]);
        let err = get_top_5_transactions(&ds).unwrap_err();
        assert_eq!(err, ReportError::MissingColumns(vec![Column::AmountOfPayment]));
    }

    #[test]
    fn test_serialized_field_names() {
        let top = TopTransaction {
            date: Some("31.12.2021".to_string()),
            amount: Some(1.0),
            category: None,
            description: Some("x".to_string()),
        };
        let value = serde_json::to_value(&top).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"date": "31.12.2021", "amount": 1.0, "category": null, "description": "x"})
        );
    }
}
