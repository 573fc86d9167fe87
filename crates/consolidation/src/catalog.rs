//! Query surface over a loaded and consolidated feed.
//!
//! A [`PriceCatalog`] holds both the full ordered observation sequence and
//! the consolidated map, so callers can show an item's summary, search by
//! name or description, or redraw its full price history.

use pricewatch_core::{
    Config, ConsolidatedItem, ConsolidatedMap, ItemSummary, ObservationRecord, PricePoint, Result,
};
use pricewatch_ingestion::{LoadStats, LoadedFeed, RecordLoader};
use std::path::Path;

use crate::consolidator::consolidate;

/// Loaded observations together with their consolidated view.
#[derive(Debug, Clone)]
pub struct PriceCatalog {
    records: Vec<ObservationRecord>,
    items: ConsolidatedMap,
    stats: LoadStats,
}

impl PriceCatalog {
    /// Build from date-ordered records.
    pub fn from_records(records: Vec<ObservationRecord>) -> Self {
        let stats = LoadStats {
            rows_read: records.len(),
            rows_loaded: records.len(),
            skipped: Vec::new(),
        };
        Self::from_feed(LoadedFeed { records, stats })
    }

    /// Build from a loader result.
    pub fn from_feed(feed: LoadedFeed) -> Self {
        let items = consolidate(&feed.records);
        Self {
            records: feed.records,
            items,
            stats: feed.stats,
        }
    }

    /// Load the configured source and consolidate it.
    pub fn load(config: &Config) -> Result<Self> {
        let feed = RecordLoader::new(config).load()?;
        Ok(Self::from_feed(feed))
    }

    /// Load an explicit path and consolidate it.
    pub fn load_path(config: &Config, path: impl AsRef<Path>) -> Result<Self> {
        let feed = RecordLoader::new(config).load_path(path)?;
        Ok(Self::from_feed(feed))
    }

    /// All observations, date-ordered.
    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    /// Consolidated map keyed by item name.
    pub fn items(&self) -> &ConsolidatedMap {
        &self.items
    }

    pub fn stats(&self) -> &LoadStats {
        &self.stats
    }

    pub fn get(&self, item_name: &str) -> Option<&ConsolidatedItem> {
        self.items.get(item_name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item names in sorted order.
    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// Card summaries for every item, in name order.
    pub fn summaries(&self) -> Vec<ItemSummary> {
        self.items.iter().map(|(name, item)| summary_of(name, item)).collect()
    }

    /// Items whose name or description contains `query`, ignoring case.
    ///
    /// A blank query matches nothing.
    pub fn search(&self, query: &str) -> Vec<ItemSummary> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .map(|(name, item)| summary_of(name, item))
            .filter(|summary| summary.matches_lowercase(&needle))
            .collect()
    }

    /// Every raw observation for an item, in load order.
    pub fn observations_for<'a>(&'a self, item_name: &'a str) -> impl Iterator<Item = &'a ObservationRecord> + 'a {
        self.records.iter().filter(move |r| r.item_name == item_name)
    }

    /// Daily-minimum price series for an item, sorted by date.
    ///
    /// Empty when the item is unknown.
    pub fn price_history(&self, item_name: &str) -> Vec<PricePoint> {
        self.get(item_name)
            .map(ConsolidatedItem::price_points)
            .unwrap_or_default()
    }
}

fn summary_of(name: &str, item: &ConsolidatedItem) -> ItemSummary {
    ItemSummary {
        name: name.to_string(),
        description: item.item_description.clone(),
        image_url: item.image_url.clone(),
    }
}
