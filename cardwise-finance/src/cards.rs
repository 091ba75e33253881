//! Per-card spend and cashback.

use std::collections::HashMap;

use cardwise_core::{Column, Dataset, ReportError};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Share of spend returned as cashback
pub const CASHBACK_RATE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub last_digits: String,
    pub total_spent: f64,
    pub cashback: f64,
}

/// Final 4 characters of a card identifier, or the whole string if shorter.
pub fn last_digits(card_number: &str) -> String {
    let len = card_number.chars().count();
    card_number.chars().skip(len.saturating_sub(4)).collect()
}

/// Group rows by exact card number and total `amount_of_operation` per card.
///
/// Cards are listed in order of first appearance. Rows without a card number
/// belong to no group; rows without an amount count as zero.
pub fn calculate_card_info(dataset: &Dataset) -> Result<Vec<CardSummary>, ReportError> {
    dataset.require(&[Column::CardNumber, Column::AmountOfOperation])?;

    let mut order: Vec<&str> = Vec::new();
    let mut totals: HashMap<&str, f64> = HashMap::new();

    for row in dataset {
        let Some(card) = row.card_number.as_deref() else {
            continue;
        };
        let total = totals.entry(card).or_insert_with(|| {
            order.push(card);
            0.0
        });
        *total += row.amount_of_operation.unwrap_or(0.0);
    }

    let cards: Vec<CardSummary> = order
        .into_iter()
        .map(|card| {
            let total_spent = totals.get(card).copied().unwrap_or(0.0);
            CardSummary {
                last_digits: last_digits(card),
                total_spent,
                cashback: total_spent * CASHBACK_RATE,
            }
        })
        .collect();

    info!(cards = cards.len(), rows = dataset.len(), "calculated card info");
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardwise_core::TransactionRecord;

    fn spend(card: &str, amount: f64) -> TransactionRecord {
        TransactionRecord::new("27.04.2020 10:00:00")
            .with_card(card)
            .with_operation_amount(amount)
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let ds = Dataset::from_records(vec![
            spend("1234567812345678", 100.0),
            spend("8765432187654321", 300.0),
            spend("1234567812345678", 200.0),
        ]);

        let cards = calculate_card_info(&ds).unwrap();
        assert_eq!(
            cards,
            vec![
                CardSummary {
                    last_digits: "5678".to_string(),
                    total_spent: 300.0,
                    cashback: 3.0,
                },
                CardSummary {
                    last_digits: "4321".to_string(),
                    total_spent: 300.0,
                    cashback: 3.0,
                },
            ]
        );
    }

    #[test]
    fn test_order_is_not_sorted() {
        let ds = Dataset::from_records(vec![spend("*9999", 1.0), spend("*1111", 2.0)]);
        let cards = calculate_card_info(&ds).unwrap();
        let digits: Vec<_> = cards.iter().map(|c| c.last_digits.as_str()).collect();
        assert_eq!(digits, vec!["9999", "1111"]);
    }

    #[test]
    fn test_sum_is_conserved_and_cashback_is_one_percent() {
        let ds = Dataset::from_records(vec![
            spend("*7197", -160.0),
            spend("*5091", -64.0),
            spend("*7197", -78.0),
            spend("*4556", 5000.0),
            spend("*5091", -18.0),
        ]);
        let cards = calculate_card_info(&ds).unwrap();
        let total: f64 = cards.iter().map(|c| c.total_spent).sum();
        assert_eq!(total, ds.total_operation_amount());
        for card in &cards {
            assert_eq!(card.cashback, card.total_spent * 0.01);
        }
    }

    #[test]
    fn test_distinct_cards_with_same_suffix_stay_separate() {
        let ds = Dataset::from_records(vec![spend("11115678", 1.0), spend("22225678", 2.0)]);
        let cards = calculate_card_info(&ds).unwrap();
        assert_eq!(cards.len(), 2);
        assert!(cards.iter().all(|c| c.last_digits == "5678"));
    }

    #[test]
    fn test_short_card_numbers() {
        assert_eq!(last_digits("*71"), "*71");
        assert_eq!(last_digits(""), "");
        assert_eq!(last_digits("*7197"), "7197");
    }

    #[test]
    fn test_empty_dataset_is_empty_result() {
        let cards = calculate_card_info(&Dataset::from_records(vec![])).unwrap();
        assert!(cards.is_empty());
    }

    #[test]
    fn test_missing_columns() {
        let ds = Dataset::new([Column::OperationTimestamp, Column::CardNumber], vec![]);
        let err = calculate_card_info(&ds).unwrap_err();
        assert_eq!(err, ReportError::MissingColumns(vec![Column::AmountOfOperation]));
    }

    #[test]
    fn test_rows_without_card_are_skipped() {
        let ds = Dataset::from_records(vec![
            spend("*7197", 10.0),
            TransactionRecord::new("27.04.2020 10:00:00").with_operation_amount(99.0),
        ]);
        let cards = calculate_card_info(&ds).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].total_spent, 10.0);
    }
}
