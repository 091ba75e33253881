//! Header mapping and cell conversion shared by the export readers.

use cardwise_core::{Column, Dataset, OperationTime, TransactionRecord};
use tracing::debug;

/// Column for a header cell. Accepts the bank export's Russian headers and
/// the snake_case column names; anything else is ignored.
pub fn column_for_header(header: &str) -> Option<Column> {
    let header = header.trim().trim_start_matches('\u{feff}');
    let column = match header {
        "Дата операции" => Column::OperationTimestamp,
        "Дата платежа" => Column::PaymentDate,
        "Номер карты" => Column::CardNumber,
        "Статус" => Column::Status,
        "Сумма операции" => Column::AmountOfOperation,
        "Валюта операции" => Column::CurrencyOfOperation,
        "Сумма платежа" => Column::AmountOfPayment,
        "Валюта платежа" => Column::CurrencyOfPayment,
        "Категория" => Column::Category,
        "MCC" => Column::Mcc,
        "Описание" => Column::Description,
        other => return Column::from_name(other),
    };
    Some(column)
}

/// Parse an amount written the way bank exports write them: optional
/// thousands separators as spaces, decimal comma or point.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// A cell value as it comes out of a reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    /// Text cell, or `Empty` for blank text.
    pub fn text(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    fn into_text(self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => Some(s),
            Cell::Number(n) => Some(format_number(n)),
        }
    }

    fn into_amount(self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(n).filter(|v| v.is_finite()),
            Cell::Text(s) => {
                let amount = parse_amount(&s);
                if amount.is_none() {
                    debug!(value = %s, "amount cell is not a number");
                }
                amount
            }
        }
    }
}

/// Integral numbers print without a fractional part (MCC 5411, not 5411.0).
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Accumulates rows under a header, keeping only the mapped columns.
pub struct DatasetBuilder {
    mapping: Vec<Option<Column>>,
    rows: Vec<TransactionRecord>,
}

impl DatasetBuilder {
    pub fn from_headers<S: AsRef<str>>(headers: impl IntoIterator<Item = S>) -> Self {
        let mapping: Vec<Option<Column>> = headers
            .into_iter()
            .map(|h| {
                let column = column_for_header(h.as_ref());
                if column.is_none() {
                    debug!(header = h.as_ref(), "ignoring unknown column");
                }
                column
            })
            .collect();
        Self {
            mapping,
            rows: Vec::new(),
        }
    }

    /// Add one row. Rows with no values at all are skipped.
    pub fn push_row(&mut self, cells: impl IntoIterator<Item = Cell>) {
        let mut record = TransactionRecord::default();
        let mut any = false;

        for (column, cell) in self.mapping.iter().zip(cells) {
            let Some(column) = column else { continue };
            if cell == Cell::Empty {
                continue;
            }
            any = true;
            assign(&mut record, *column, cell);
        }

        if any {
            self.rows.push(record);
        }
    }

    pub fn finish(self) -> Dataset {
        Dataset::new(self.mapping.into_iter().flatten(), self.rows)
    }
}

fn assign(record: &mut TransactionRecord, column: Column, cell: Cell) {
    match column {
        Column::OperationTimestamp => {
            record.operation_timestamp = match cell.into_text() {
                Some(text) => OperationTime::Text(text),
                None => OperationTime::Missing,
            }
        }
        Column::AmountOfOperation => record.amount_of_operation = cell.into_amount(),
        Column::AmountOfPayment => record.amount_of_payment = cell.into_amount(),
        Column::PaymentDate => record.payment_date = cell.into_text(),
        Column::CardNumber => record.card_number = cell.into_text(),
        Column::Status => record.status = cell.into_text(),
        Column::CurrencyOfOperation => record.currency_of_operation = cell.into_text(),
        Column::CurrencyOfPayment => record.currency_of_payment = cell.into_text(),
        Column::Category => record.category = cell.into_text(),
        Column::Mcc => record.mcc = cell.into_text(),
        Column::Description => record.description = cell.into_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_mapping() {
        assert_eq!(column_for_header("Дата операции"), Some(Column::OperationTimestamp));
        assert_eq!(column_for_header(" Номер карты "), Some(Column::CardNumber));
        assert_eq!(column_for_header("\u{feff}Дата операции"), Some(Column::OperationTimestamp));
        assert_eq!(column_for_header("amount_of_payment"), Some(Column::AmountOfPayment));
        assert_eq!(column_for_header("Кэшбэк"), None);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("-160,89"), Some(-160.89));
        assert_eq!(parse_amount("-20 000,00"), Some(-20000.0));
        assert_eq!(parse_amount("1\u{a0}200.50"), Some(1200.5));
        assert_eq!(parse_amount("  "), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("inf"), None);
        assert_eq!(parse_amount("-infinity"), None);
    }

    #[test]
    fn test_builder_keeps_only_mapped_columns() {
        let mut builder = DatasetBuilder::from_headers(["Дата операции", "Кэшбэк", "Сумма операции", "MCC"]);
        builder.push_row([
            Cell::text("31.12.2021 16:44:00"),
            Cell::text("3"),
            Cell::text("-160,89"),
            Cell::Number(5411.0),
        ]);
        let ds = builder.finish();

        assert_eq!(
            ds.columns(),
            &[Column::OperationTimestamp, Column::AmountOfOperation, Column::Mcc]
        );
        let row = &ds.rows()[0];
        assert_eq!(row.operation_timestamp, OperationTime::from("31.12.2021 16:44:00"));
        assert_eq!(row.amount_of_operation, Some(-160.89));
        assert_eq!(row.mcc.as_deref(), Some("5411"));
    }

    #[test]
    fn test_non_finite_amounts_are_absent() {
        let mut builder = DatasetBuilder::from_headers(["Сумма операции", "Сумма платежа"]);
        builder.push_row([Cell::text("NaN"), Cell::Number(f64::INFINITY)]);
        builder.push_row([Cell::text("inf"), Cell::text("-64,00")]);
        let ds = builder.finish();

        assert_eq!(ds.rows()[0].amount_of_operation, None);
        assert_eq!(ds.rows()[0].amount_of_payment, None);
        assert_eq!(ds.rows()[1].amount_of_operation, None);
        assert_eq!(ds.rows()[1].amount_of_payment, Some(-64.0));
    }

    #[test]
    fn test_builder_skips_blank_rows_and_cells() {
        let mut builder = DatasetBuilder::from_headers(["Номер карты", "Описание"]);
        builder.push_row([Cell::Empty, Cell::text("  ")]);
        builder.push_row([Cell::Empty, Cell::text("Перевод")]);
        let ds = builder.finish();

        assert_eq!(ds.len(), 1);
        assert_eq!(ds.rows()[0].card_number, None);
        assert_eq!(ds.rows()[0].description.as_deref(), Some("Перевод"));
    }

    #[test]
    fn test_short_rows_leave_fields_absent() {
        let mut builder = DatasetBuilder::from_headers(["Категория", "Сумма платежа"]);
        builder.push_row([Cell::text("Фастфуд")]);
        let ds = builder.finish();
        assert_eq!(ds.rows()[0].amount_of_payment, None);
        assert!(ds.has_column(Column::AmountOfPayment));
    }
}
