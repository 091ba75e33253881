use anyhow::{Context, Result};
use cardwise_finance::market::{DEFAULT_CURRENCY_API_URL, DEFAULT_STOCK_API_URL, MarketConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::state::ensure_cardwise_home;

pub const CURRENCY_KEY_ENV: &str = "API_KEY_CURRENCY";
pub const STOCK_KEY_ENV: &str = "API_KEY_STOCK";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportSection,
    pub market: MarketSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Currency the rates are quoted in
    pub base_currency: String,
    /// IANA zone for "now" (e.g. "Europe/Moscow"); local time when unset
    pub timezone: Option<String>,
    pub log_level: String,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            base_currency: "RUB".to_string(),
            timezone: None,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketSection {
    pub currency_api_url: String,
    pub stock_api_url: String,
}

impl Default for MarketSection {
    fn default() -> Self {
        Self {
            currency_api_url: DEFAULT_CURRENCY_API_URL.to_string(),
            stock_api_url: DEFAULT_STOCK_API_URL.to_string(),
        }
    }
}

impl MarketSection {
    /// Provider settings with keys read from the environment.
    pub fn with_env_keys(&self) -> Result<MarketConfig> {
        let currency_api_key =
            std::env::var(CURRENCY_KEY_ENV).with_context(|| format!("{CURRENCY_KEY_ENV} is not set"))?;
        let stock_api_key = std::env::var(STOCK_KEY_ENV).with_context(|| format!("{STOCK_KEY_ENV} is not set"))?;
        Ok(MarketConfig {
            currency_api_url: self.currency_api_url.clone(),
            currency_api_key,
            stock_api_url: self.stock_api_url.clone(),
            stock_api_key,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_cardwise_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config_to(cfg: &Config, p: &Path) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config_to(&Config::default(), &p)?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.report.base_currency, "RUB");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[report]\ntimezone = \"Europe/Moscow\"\n").unwrap();

        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.report.timezone.as_deref(), Some("Europe/Moscow"));
        assert_eq!(cfg.report.log_level, "info");
        assert_eq!(cfg.market, MarketSection::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.report.base_currency = "USD".to_string();
        cfg.market.stock_api_url = "http://localhost:9000".to_string();

        save_config_to(&cfg, &p).unwrap();
        assert_eq!(load_config_from(&p).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[report\n").unwrap();
        let err = load_config_from(&p).unwrap_err();
        assert!(err.to_string().contains("config.toml"));
    }
}
