use anyhow::{Context, Result};
use cardwise_core::time::REFERENCE_TIMESTAMP_FORMAT;
use cardwise_core::{Clock, SystemClock};
use cardwise_finance::category::{CategoryQuery, DateArg};
use cardwise_finance::report::{render_table, write_report};
use cardwise_finance::search::{records_from_dataset, search_transactions};
use cardwise_finance::{
    DailySummary, MarketClient, calculate_card_info, filter_transactions_by_date, generate_greeting,
    get_top_5_transactions,
};
use cardwise_ingest::{load_transactions, load_user_settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "cardwise",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CARDWISE_BUILD_SHA"), ")"),
    about = "Bank-card transaction reports"
)]
struct Cli {
    /// Log filter for stderr output (e.g. "debug"); overrides RUST_LOG and the config
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Daily summary as JSON: greeting, cards, top transactions, rates, quotes
    Summary {
        /// Transaction export (.xlsx or .csv)
        #[arg(long)]
        file: PathBuf,

        /// Reference moment, "YYYY-MM-DD HH:MM:SS" (default: now)
        #[arg(long)]
        at: Option<String>,

        /// Currencies and stocks to quote (default: ./user_settings.json, then ~/.cardwise/)
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Transactions whose description or category contains the query, as JSON
    Search {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        query: String,
    },

    /// Spending in one category over the 90 days before a date
    Category {
        #[arg(long)]
        file: PathBuf,

        #[arg(long)]
        category: String,

        /// Reference date (default: now)
        #[arg(long)]
        date: Option<String>,

        /// Print the matching rows instead of the total
        #[arg(long)]
        rows: bool,

        /// Also write the output to a file (timestamped name when no path is given)
        #[arg(long, num_args = 0..=1)]
        report: Option<Option<PathBuf>>,
    },

    /// Write the default ~/.cardwise/config.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    setup_logging(cli.log_level.as_deref(), &cfg.report.log_level);

    let clock = match cfg.report.timezone.as_deref() {
        Some(zone) => SystemClock::in_zone(zone)?,
        None => SystemClock::local(),
    };

    match cli.command {
        Command::Summary { file, at, settings } => {
            let json = daily_summary(&cfg, &clock, file, at, settings).await?;
            println!("{json}");
        }

        Command::Search { file, query } => {
            let dataset = load_transactions(&file)?;
            let records = records_from_dataset(&dataset);
            println!("{}", search_transactions(&records, &query)?);
        }

        Command::Category {
            file,
            category,
            date,
            rows,
            report,
        } => {
            let dataset = load_transactions(&file)?;
            let query = CategoryQuery::new(category, date.as_deref().map(DateArg::from));

            let text = if rows {
                render_table(&query.rows(&dataset, &clock)?)
            } else {
                let total = query.sum(&dataset, &clock)?;
                format!("{}: {total:.2}", query.category)
            };
            println!("{text}");

            if let Some(target) = report {
                let path = write_report(&text, target.as_deref(), &clock)?;
                eprintln!("Report written to {}", path.display());
            }
        }

        Command::Init => {
            config::init_config()?;
        }
    }

    Ok(())
}

async fn daily_summary(
    cfg: &Config,
    clock: &dyn Clock,
    file: PathBuf,
    at: Option<String>,
    settings: Option<PathBuf>,
) -> Result<String> {
    // Fail on missing keys before touching the network
    let market = cfg.market.with_env_keys()?;

    let at = at.unwrap_or_else(|| clock.now().format(REFERENCE_TIMESTAMP_FORMAT).to_string());
    info!(at = %at, file = %file.display(), "building daily summary");

    let all = load_transactions(&file)?;
    let snapshot = filter_transactions_by_date(&all, &at)?;
    let settings = load_user_settings(&state::settings_path(settings)?)?;

    let cards = calculate_card_info(&snapshot)?;
    let top_transactions = get_top_5_transactions(&snapshot)?;

    let client = MarketClient::new(market);
    let currency_rates = client
        .fetch_currency_rates(&cfg.report.base_currency, &settings.user_currencies)
        .await;
    let stock_prices = client.fetch_stock_prices(&settings.user_stocks).await;

    let summary = DailySummary {
        greeting: generate_greeting(&at).to_string(),
        cards,
        top_transactions,
        currency_rates,
        stock_prices,
    };
    summary.to_json_pretty().context("serialize summary")
}

fn setup_logging(flag: Option<&str>, configured: &str) {
    // stdout carries the report; logs go to stderr
    let filter = match flag {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(configured)),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
