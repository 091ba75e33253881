//! `user_settings.json`: which currencies and stocks the summary quotes.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_currencies: Vec<String>,
    pub user_stocks: Vec<String>,
}

const CURRENCIES_KEY: &str = "user_currencies";
const STOCKS_KEY: &str = "user_stocks";

pub fn load_user_settings(path: &Path) -> Result<UserSettings> {
    info!(path = %path.display(), "loading user settings");

    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!(path = %path.display(), "settings file not found");
            bail!("settings file '{}' not found", path.display());
        }
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };

    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("settings file '{}' is not valid JSON", path.display()))?;

    let settings = UserSettings {
        user_currencies: string_list(&value, CURRENCIES_KEY, path)?,
        user_stocks: string_list(&value, STOCKS_KEY, path)?,
    };
    info!(
        currencies = ?settings.user_currencies,
        stocks = ?settings.user_stocks,
        "user settings loaded"
    );
    Ok(settings)
}

fn string_list(value: &Value, key: &str, path: &Path) -> Result<Vec<String>> {
    let Some(entry) = value.get(key) else {
        error!(key, "settings key missing");
        bail!("key '{key}' not found in {}", path.display());
    };

    let items = entry.as_array().map(|items| {
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
    });
    match items {
        Some(Some(list)) => Ok(list),
        _ => {
            error!(key, "settings value is not a list of strings");
            bail!("'{key}' must be a list of strings");
        }
    }
}
