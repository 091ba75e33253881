//! cardwise-core: transaction records, dataset, error taxonomy and date handling

pub mod error;
pub mod time;
pub mod transaction;

pub use error::ReportError;
pub use time::{Clock, FixedClock, SystemClock, TimestampStyle};
pub use transaction::{Column, Dataset, OperationTime, TransactionRecord};
