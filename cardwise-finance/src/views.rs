//! Greeting selection and the daily summary envelope.

use cardwise_core::time::REFERENCE_TIMESTAMP_FORMAT;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::{info, warn};

use crate::cards::CardSummary;
use crate::market::{CurrencyRate, StockPrice};
use crate::top::TopTransaction;

pub const INVALID_TIMESTAMP_GREETING: &str = "Некорректный формат даты и времени";

/// Greeting for the hour of `time`.
pub fn greeting_for(time: NaiveDateTime) -> &'static str {
    match time.hour() {
        5..=11 => "Доброе утро",
        12..=17 => "Добрый день",
        18..=21 => "Добрый вечер",
        _ => "Доброй ночи",
    }
}

/// Greeting for a `YYYY-MM-DD HH:MM:SS` timestamp; never fails.
pub fn generate_greeting(timestamp: &str) -> &'static str {
    match NaiveDateTime::parse_from_str(timestamp, REFERENCE_TIMESTAMP_FORMAT) {
        Ok(time) => greeting_for(time),
        Err(_) => {
            warn!(timestamp, "invalid timestamp for greeting");
            INVALID_TIMESTAMP_GREETING
        }
    }
}

/// The JSON document printed by the daily report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub greeting: String,
    pub cards: Vec<CardSummary>,
    pub top_transactions: Vec<TopTransaction>,
    pub currency_rates: Vec<CurrencyRate>,
    pub stock_prices: Vec<StockPrice>,
}

impl DailySummary {
    /// Pretty JSON, 4-space indent, non-ASCII left unescaped.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        info!("forming JSON response");
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
