//! Transaction records and the in-memory dataset every report reads.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportError;
use crate::time::{REFERENCE_TIMESTAMP_FORMAT, TimestampStyle};

/// Columns a bank-card export can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    OperationTimestamp,
    PaymentDate,
    CardNumber,
    Status,
    AmountOfOperation,
    CurrencyOfOperation,
    AmountOfPayment,
    CurrencyOfPayment,
    Category,
    Mcc,
    Description,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::OperationTimestamp,
        Column::PaymentDate,
        Column::CardNumber,
        Column::Status,
        Column::AmountOfOperation,
        Column::CurrencyOfOperation,
        Column::AmountOfPayment,
        Column::CurrencyOfPayment,
        Column::Category,
        Column::Mcc,
        Column::Description,
    ];

    /// Field name used in JSON records and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Column::OperationTimestamp => "operation_timestamp",
            Column::PaymentDate => "payment_date",
            Column::CardNumber => "card_number",
            Column::Status => "status",
            Column::AmountOfOperation => "amount_of_operation",
            Column::CurrencyOfOperation => "currency_of_operation",
            Column::AmountOfPayment => "amount_of_payment",
            Column::CurrencyOfPayment => "currency_of_payment",
            Column::Category => "category",
            Column::Mcc => "mcc",
            Column::Description => "description",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operation timestamp of a row, before or after normalization.
///
/// Rows arrive as `Text`. Reports that compare dates normalize a copy to
/// `Parsed`, or to `Missing` when the text does not match their layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationTime {
    Text(String),
    Parsed(NaiveDateTime),
    #[default]
    Missing,
}

impl OperationTime {
    /// Resolve to a date-time using `style` for raw text.
    pub fn resolve(&self, style: TimestampStyle) -> Option<NaiveDateTime> {
        match self {
            OperationTime::Text(raw) => style.parse(raw),
            OperationTime::Parsed(dt) => Some(*dt),
            OperationTime::Missing => None,
        }
    }

    /// Normalized form: `Parsed` when resolvable, `Missing` otherwise.
    pub fn normalized(&self, style: TimestampStyle) -> OperationTime {
        match self.resolve(style) {
            Some(dt) => OperationTime::Parsed(dt),
            None => OperationTime::Missing,
        }
    }
}

impl From<&str> for OperationTime {
    fn from(raw: &str) -> Self {
        OperationTime::Text(raw.to_string())
    }
}

/// One row of a card transaction export
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default)]
    pub operation_timestamp: OperationTime,
    pub payment_date: Option<String>,
    /// Free-form card identifier, e.g. "*7197"
    pub card_number: Option<String>,
    pub status: Option<String>,
    /// Signed amount in the operation currency
    pub amount_of_operation: Option<f64>,
    pub currency_of_operation: Option<String>,
    /// Signed amount in the payment currency; used for ranking
    pub amount_of_payment: Option<f64>,
    pub currency_of_payment: Option<String>,
    pub category: Option<String>,
    pub mcc: Option<String>,
    pub description: Option<String>,
}

impl TransactionRecord {
    pub fn new(operation_timestamp: impl Into<OperationTime>) -> Self {
        Self {
            operation_timestamp: operation_timestamp.into(),
            ..Self::default()
        }
    }

    pub fn with_card(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = Some(card_number.into());
        self
    }

    pub fn with_operation_amount(mut self, amount: f64) -> Self {
        self.amount_of_operation = Some(amount);
        self
    }

    pub fn with_payment_amount(mut self, amount: f64) -> Self {
        self.amount_of_payment = Some(amount);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Display text of one column, `None` when the field is absent.
    pub fn field_text(&self, column: Column) -> Option<String> {
        let text = |v: &Option<String>| v.clone();
        let number = |v: Option<f64>| v.map(|n| n.to_string());
        match column {
            Column::OperationTimestamp => match &self.operation_timestamp {
                OperationTime::Text(raw) => Some(raw.clone()),
                OperationTime::Parsed(dt) => Some(dt.format(REFERENCE_TIMESTAMP_FORMAT).to_string()),
                OperationTime::Missing => None,
            },
            Column::PaymentDate => text(&self.payment_date),
            Column::CardNumber => text(&self.card_number),
            Column::Status => text(&self.status),
            Column::AmountOfOperation => number(self.amount_of_operation),
            Column::CurrencyOfOperation => text(&self.currency_of_operation),
            Column::AmountOfPayment => number(self.amount_of_payment),
            Column::CurrencyOfPayment => text(&self.currency_of_payment),
            Column::Category => text(&self.category),
            Column::Mcc => text(&self.mcc),
            Column::Description => text(&self.description),
        }
    }

    /// Copy of this row with its timestamp normalized under `style`.
    pub fn normalized(&self, style: TimestampStyle) -> TransactionRecord {
        TransactionRecord {
            operation_timestamp: self.operation_timestamp.normalized(style),
            ..self.clone()
        }
    }
}

/// Ordered rows plus the set of columns the source actually provided.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: Vec<TransactionRecord>,
}

impl Dataset {
    pub fn new(columns: impl IntoIterator<Item = Column>, rows: Vec<TransactionRecord>) -> Self {
        let mut unique = Vec::new();
        for column in columns {
            if !unique.contains(&column) {
                unique.push(column);
            }
        }
        Self {
            columns: unique,
            rows,
        }
    }

    /// Dataset carrying every known column.
    pub fn from_records(rows: Vec<TransactionRecord>) -> Self {
        Self::new(Column::ALL, rows)
    }

    /// Build a dataset from a JSON array of objects keyed by column name.
    ///
    /// Columns are the union of recognised keys across all rows.
    pub fn from_json(value: &Value) -> Result<Self, ReportError> {
        let items = value
            .as_array()
            .ok_or_else(|| ReportError::invalid_argument("transactions must be a table"))?;

        let mut columns = Vec::new();
        let mut rows = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let object = item.as_object().ok_or_else(|| {
                ReportError::invalid_argument(format!("transactions must be a table: row {i} is not a record"))
            })?;
            columns.extend(object.keys().filter_map(|k| Column::from_name(k)));
            let row: TransactionRecord = serde_json::from_value(item.clone()).map_err(|e| {
                ReportError::invalid_argument(format!("transactions must be a table: row {i}: {e}"))
            })?;
            rows.push(row);
        }

        Ok(Self::new(columns, rows))
    }

    /// Same columns, different rows.
    pub fn with_rows(&self, rows: Vec<TransactionRecord>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[TransactionRecord] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<TransactionRecord> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TransactionRecord> {
        self.rows.iter()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Fail with `MissingColumns` listing every absent column.
    pub fn require(&self, required: &[Column]) -> Result<(), ReportError> {
        let missing: Vec<Column> = required
            .iter()
            .copied()
            .filter(|c| !self.has_column(*c))
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReportError::MissingColumns(missing))
        }
    }

    /// Sum of `amount_of_operation`, skipping rows without an amount.
    pub fn total_operation_amount(&self) -> f64 {
        self.rows
            .iter()
            .filter_map(|r| r.amount_of_operation)
            .fold(0.0, |acc, amount| acc + amount)
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a TransactionRecord;
    type IntoIter = std::slice::Iter<'a, TransactionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
