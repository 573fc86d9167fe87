//! Consolidation of observation feeds for the pricewatch system.
//!
//! This crate handles:
//! - Folding date-ordered observations into one summary per item
//! - Daily minimum price series
//! - Cheapest-store tracking with first-seen tie-breaking
//! - Catalog queries over the loaded feed (lookup, search, history)
//! - Source-keyed caching of the consolidated catalog

pub mod accumulator;
pub mod cache;
pub mod catalog;
pub mod consolidator;

pub use accumulator::ItemAccumulator;
pub use cache::{CatalogCache, SourceFingerprint};
pub use catalog::PriceCatalog;
pub use consolidator::consolidate;
