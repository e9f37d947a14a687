//! Output module for writing scraped records
//!
//! Records are written one per row, in the order they were collected.

mod table;

pub use table::{write_csv, write_rows};
