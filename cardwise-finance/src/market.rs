//! Currency rates and stock quotes from HTTP market data providers.
//!
//! Currency: exchangerates-style API, `GET {base}/latest?base=USD&symbols=RUB`
//! with an `apikey` header, answering `{"rates": {"RUB": 91.2}}`.
//!
//! Stocks: Alpha Vantage-style API,
//! `GET {base}/query?function=GLOBAL_QUOTE&symbol=AAPL&apikey=...`, answering
//! `{"Global Quote": {"05. price": "189.9800"}}`.

use anyhow::{Context, Result, bail};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_CURRENCY_API_URL: &str = "https://api.apilayer.com/exchangerates_data";
pub const DEFAULT_STOCK_API_URL: &str = "https://www.alphavantage.co";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    /// Price of one unit of `currency` in the base currency
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    pub stock: String,
    pub price: f64,
}

/// Endpoints and credentials for the two providers
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub currency_api_url: String,
    pub currency_api_key: String,
    pub stock_api_url: String,
    pub stock_api_key: String,
}

impl MarketConfig {
    /// Default endpoints with the given keys
    pub fn with_keys(currency_api_key: impl Into<String>, stock_api_key: impl Into<String>) -> Self {
        Self {
            currency_api_url: DEFAULT_CURRENCY_API_URL.to_string(),
            currency_api_key: currency_api_key.into(),
            stock_api_url: DEFAULT_STOCK_API_URL.to_string(),
            stock_api_key: stock_api_key.into(),
        }
    }
}

pub struct MarketClient {
    http: reqwest::Client,
    config: MarketConfig,
}

impl MarketClient {
    pub fn new(config: MarketConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Rates of each currency against `base`. Currencies whose lookup fails
    /// are logged and left out.
    pub async fn fetch_currency_rates(&self, base: &str, currencies: &[String]) -> Vec<CurrencyRate> {
        info!(base, count = currencies.len(), "fetching currency rates");
        let mut rates = Vec::with_capacity(currencies.len());

        for currency in currencies {
            match self.fetch_currency_rate(base, currency).await {
                Ok(rate) => rates.push(CurrencyRate {
                    currency: currency.clone(),
                    rate,
                }),
                Err(e) => warn!(currency = currency.as_str(), error = %format!("{e:#}"), "currency rate unavailable"),
            }
        }

        rates
    }

    async fn fetch_currency_rate(&self, base: &str, currency: &str) -> Result<f64> {
        let url = format!("{}/latest", self.config.currency_api_url.trim_end_matches('/'));
        let request = self
            .http
            .get(&url)
            .header("apikey", &self.config.currency_api_key)
            .query(&[("base", currency), ("symbols", base)]);
        let body = get_json(request).await.with_context(|| format!("GET {url} for {currency}"))?;
        parse_currency_rate(&body, base)
    }

    /// Latest price for each ticker. Tickers whose lookup fails are logged
    /// and left out.
    pub async fn fetch_stock_prices(&self, stocks: &[String]) -> Vec<StockPrice> {
        info!(count = stocks.len(), "fetching stock prices");
        let mut prices = Vec::with_capacity(stocks.len());

        for stock in stocks {
            match self.fetch_stock_price(stock).await {
                Ok(price) => prices.push(StockPrice {
                    stock: stock.clone(),
                    price,
                }),
                Err(e) => warn!(stock = stock.as_str(), error = %format!("{e:#}"), "stock price unavailable"),
            }
        }

        prices
    }

    async fn fetch_stock_price(&self, symbol: &str) -> Result<f64> {
        let url = format!("{}/query", self.config.stock_api_url.trim_end_matches('/'));
        let request = self.http.get(&url).query(&[
            ("function", "GLOBAL_QUOTE"),
            ("symbol", symbol),
            ("apikey", self.config.stock_api_key.as_str()),
        ]);
        let body = get_json(request).await.with_context(|| format!("GET {url} for {symbol}"))?;
        parse_stock_price(&body)
    }
}

async fn get_json(request: RequestBuilder) -> Result<Value> {
    let response = request.send().await.context("sending request")?;
    let status = response.status();
    if !status.is_success() {
        bail!("provider answered {status}");
    }
    response.json::<Value>().await.context("decoding response body")
}

/// Extract `rates.<symbol>` from a currency provider response.
pub fn parse_currency_rate(body: &Value, symbol: &str) -> Result<f64> {
    body.get("rates")
        .and_then(|rates| rates.get(symbol))
        .and_then(Value::as_f64)
        .ok_or_else(|| anyhow::anyhow!("response has no rate for {symbol}"))
}

/// Extract the price from a `GLOBAL_QUOTE` response. Prices arrive as text.
pub fn parse_stock_price(body: &Value) -> Result<f64> {
    let raw = body
        .get("Global Quote")
        .and_then(|quote| quote.get("05. price"))
        .ok_or_else(|| anyhow::anyhow!("response has no 'Global Quote' price"))?;

    match raw {
        Value::String(s) => s
            .trim()
            .parse()
            .with_context(|| format!("price is not a number: {s}")),
        Value::Number(n) => n.as_f64().context("price out of range"),
        other => bail!("unexpected price value: {other}"),
    }
}
