//! Free-text search over transaction descriptions and categories.

use cardwise_core::{Dataset, TransactionRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// A searchable record: optional text fields plus whatever else it carries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchRecord {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn category_or_empty(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    /// `query_lower` must already be lowercased.
    fn matches(&self, query_lower: &str) -> bool {
        self.description_or_empty().to_lowercase().contains(query_lower)
            || self.category_or_empty().to_lowercase().contains(query_lower)
    }
}

impl From<&TransactionRecord> for SearchRecord {
    fn from(row: &TransactionRecord) -> Self {
        let mut fields = match serde_json::to_value(row) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        fields.retain(|_, v| !v.is_null());
        fields.remove("description");
        fields.remove("category");
        SearchRecord {
            description: row.description.clone(),
            category: row.category.clone(),
            fields,
        }
    }
}

/// One input element: a record, or something that is not a record at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchEntry {
    Record(SearchRecord),
    Malformed(Value),
}

/// Convert dataset rows to search entries, omitting absent fields.
pub fn records_from_dataset(dataset: &Dataset) -> Vec<SearchEntry> {
    dataset
        .iter()
        .map(|row| SearchEntry::Record(SearchRecord::from(row)))
        .collect()
}

/// Records whose description or category contains `query`, ignoring case.
/// Malformed entries are skipped; input order is preserved.
pub fn find_matches<'a>(entries: &'a [SearchEntry], query: &str) -> Vec<&'a SearchRecord> {
    let query_lower = query.to_lowercase();
    entries
        .iter()
        .filter_map(|entry| match entry {
            SearchEntry::Record(record) => Some(record),
            SearchEntry::Malformed(value) => {
                debug!(%value, "skipping malformed search entry");
                None
            }
        })
        .filter(|record| record.matches(&query_lower))
        .collect()
}

/// JSON array text of the matching records. Non-ASCII text is kept as is.
pub fn search_transactions(entries: &[SearchEntry], query: &str) -> serde_json::Result<String> {
    info!(query, entries = entries.len(), "searching transactions");
    let matches = find_matches(entries, query);
    info!(found = matches.len(), "search finished");
    serde_json::to_string(&matches)
}
