//! Category spend over the trailing 90 days.
//!
//! Two entry points share one filter: [`category_expenses`] returns the sum,
//! [`spending_by_category`] returns the matching rows. They accept different
//! reference-date layouts; see [`DateArg`].

use cardwise_core::time::{ISO_DATE_FORMAT, REFERENCE_TIMESTAMP_FORMAT};
use cardwise_core::{Clock, Dataset, ReportError, TimestampStyle};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::Value;
use tracing::info;

use crate::window::filter_window;

/// Width of the trailing window, inclusive at both ends.
pub const WINDOW_DAYS: i64 = 90;

/// Reference point for the trailing window.
#[derive(Debug, Clone, PartialEq)]
pub enum DateArg {
    Text(String),
    DateTime(NaiveDateTime),
}

impl DateArg {
    /// `null` or absent means "now"; strings are kept as text for the
    /// variant-specific parse; anything else is a type error.
    pub fn from_json(value: Option<&Value>) -> Result<Option<Self>, ReportError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(DateArg::Text(s.clone()))),
            Some(other) => Err(ReportError::invalid_argument(format!(
                "date must be text or a datetime, got {other}"
            ))),
        }
    }
}

impl From<&str> for DateArg {
    fn from(text: &str) -> Self {
        DateArg::Text(text.to_string())
    }
}

impl From<NaiveDateTime> for DateArg {
    fn from(dt: NaiveDateTime) -> Self {
        DateArg::DateTime(dt)
    }
}

/// Layouts a variant accepts for a textual date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateLayouts {
    /// `YYYY-MM-DD` only
    DateOnly,
    /// `YYYY-MM-DD HH:MM:SS`, then `YYYY-MM-DD`
    DateTimeThenDate,
}

impl DateLayouts {
    fn accepted(self) -> &'static str {
        match self {
            DateLayouts::DateOnly => "'YYYY-MM-DD'",
            DateLayouts::DateTimeThenDate => "'YYYY-MM-DD' or 'YYYY-MM-DD HH:MM:SS'",
        }
    }

    fn parse(self, text: &str) -> Result<NaiveDateTime, ReportError> {
        let date_only = || {
            NaiveDate::parse_from_str(text, ISO_DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        };
        let parsed = match self {
            DateLayouts::DateOnly => date_only(),
            DateLayouts::DateTimeThenDate => NaiveDateTime::parse_from_str(text, REFERENCE_TIMESTAMP_FORMAT)
                .ok()
                .or_else(date_only),
        };
        parsed.ok_or_else(|| ReportError::invalid_date("date", text, self.accepted()))
    }
}

fn reference_point(
    date: Option<&DateArg>,
    layouts: DateLayouts,
    clock: &dyn Clock,
) -> Result<NaiveDateTime, ReportError> {
    match date {
        Some(DateArg::Text(text)) => layouts.parse(text),
        Some(DateArg::DateTime(dt)) => Ok(*dt),
        None => Ok(clock.now()),
    }
}

/// Rows of `category` (exact, case-sensitive) dated within
/// `[reference - 90 days, reference]`, timestamps parsed leniently.
fn select(dataset: &Dataset, category: &str, reference: NaiveDateTime) -> Dataset {
    let by_category = dataset.with_rows(
        dataset
            .iter()
            .filter(|row| row.category.as_deref() == Some(category))
            .cloned()
            .collect(),
    );
    info!(category, rows = by_category.len(), "transactions in category");

    let start = reference - Duration::days(WINDOW_DAYS);
    let in_window = filter_window(&by_category, start, reference, TimestampStyle::Lenient);
    info!(category, rows = in_window.len(), %start, %reference, "transactions in trailing window");
    in_window
}

/// Total `amount_of_operation` for `category` over the trailing 90 days.
///
/// A textual `date` must be `YYYY-MM-DD`. Without a date the clock supplies
/// the reference point. No matching rows sums to `0.0`.
pub fn category_expenses(
    dataset: &Dataset,
    category: &str,
    date: Option<&DateArg>,
    clock: &dyn Clock,
) -> Result<f64, ReportError> {
    let reference = reference_point(date, DateLayouts::DateOnly, clock)?;
    info!(category, %reference, "calculating category expenses");

    let total = select(dataset, category, reference).total_operation_amount();
    info!(category, "category expenses calculated: {total:.2}");
    Ok(total)
}

/// Rows for `category` over the trailing 90 days, with parsed timestamps.
///
/// A textual `date` may be `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
pub fn spending_by_category(
    dataset: &Dataset,
    category: &str,
    date: Option<&DateArg>,
    clock: &dyn Clock,
) -> Result<Dataset, ReportError> {
    let reference = reference_point(date, DateLayouts::DateTimeThenDate, clock)?;
    info!(category, %reference, "selecting spending by category");
    Ok(select(dataset, category, reference))
}

/// Category request decoded from loosely-typed JSON, e.g.
/// `{"category": "Супермаркеты", "date": "2021-12-31"}`.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQuery {
    pub category: String,
    pub date: Option<DateArg>,
}

impl CategoryQuery {
    pub fn new(category: impl Into<String>, date: Option<DateArg>) -> Self {
        Self {
            category: category.into(),
            date,
        }
    }

    pub fn from_json(value: &Value) -> Result<Self, ReportError> {
        let object = value
            .as_object()
            .ok_or_else(|| ReportError::invalid_argument("category request must be an object"))?;
        let category = match object.get("category") {
            Some(Value::String(s)) => s.clone(),
            _ => return Err(ReportError::invalid_argument("category must be text")),
        };
        let date = DateArg::from_json(object.get("date"))?;
        Ok(Self { category, date })
    }

    pub fn sum(&self, dataset: &Dataset, clock: &dyn Clock) -> Result<f64, ReportError> {
        category_expenses(dataset, &self.category, self.date.as_ref(), clock)
    }

    pub fn rows(&self, dataset: &Dataset, clock: &dyn Clock) -> Result<Dataset, ReportError> {
        spending_by_category(dataset, &self.category, self.date.as_ref(), clock)
    }
}
