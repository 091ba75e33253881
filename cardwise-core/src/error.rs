//! Error taxonomy shared by every report operation.

use thiserror::Error;

use crate::transaction::Column;

/// Argument-level failures. Individual unparseable timestamp values are never
/// reported through this type; they are coerced to a missing marker instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("invalid argument type: {0}")]
    InvalidArgumentType(String),

    #[error("{argument} must be in {accepted} format, got '{value}'")]
    InvalidDateFormat {
        argument: &'static str,
        value: String,
        accepted: &'static str,
    },

    #[error("dataset is missing required columns: {}", join_columns(.0))]
    MissingColumns(Vec<Column>),
}

impl ReportError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgumentType(message.into())
    }

    pub fn invalid_date(argument: &'static str, value: &str, accepted: &'static str) -> Self {
        Self::InvalidDateFormat {
            argument,
            value: value.to_string(),
            accepted,
        }
    }
}

fn join_columns(columns: &[Column]) -> String {
    columns
        .iter()
        .map(|c| c.name())
        .collect::<Vec<_>>()
        .join(", ")
}
