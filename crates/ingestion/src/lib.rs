//! Observation feed ingestion for the pricewatch system.
//!
//! This crate handles:
//! - CSV header resolution (columns matched by name)
//! - Row parsing and normalization (dates, prices, optional fields)
//! - Malformed-row policy (fail the load or skip with a warning)
//! - Stable date ordering of the loaded records

pub mod columns;
pub mod loader;

pub use columns::ColumnMap;
pub use loader::{LoadStats, LoadedFeed, RecordLoader, RowIssue};
