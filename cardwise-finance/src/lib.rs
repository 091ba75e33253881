//! cardwise-finance: card summaries, rankings, category spending, search,
//! market quotes, and report output

pub mod cards;
pub mod category;
pub mod market;
pub mod report;
pub mod search;
pub mod top;
pub mod views;
pub mod window;

pub use cards::{CardSummary, calculate_card_info};
pub use category::{CategoryQuery, DateArg, category_expenses, spending_by_category};
pub use market::{CurrencyRate, MarketClient, MarketConfig, StockPrice};
pub use report::{render_table, write_report};
pub use search::{SearchEntry, SearchRecord, records_from_dataset, search_transactions};
pub use top::{TopTransaction, get_top_5_transactions};
pub use views::{DailySummary, generate_greeting};
pub use window::filter_transactions_by_date;
