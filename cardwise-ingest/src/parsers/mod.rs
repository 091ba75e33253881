//! Export readers, one per file family.

pub mod csv_export;
pub mod spreadsheet;
