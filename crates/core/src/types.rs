//! Core data types for the pricewatch system.

use chrono::NaiveDate;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Price type with ordering support.
pub type Price = OrderedFloat<f64>;

/// Consolidated view of the whole feed, keyed by item name.
pub type ConsolidatedMap = BTreeMap<String, ConsolidatedItem>;

/// Normalize an optional text field: absent or null becomes the empty string.
#[inline]
pub fn normalize_optional(value: Option<&str>) -> String {
    value.map(str::to_string).unwrap_or_default()
}

/// A single (item, store, date, price) reading from the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    /// Item name (join key for consolidation).
    pub item_name: String,
    /// Static item description.
    pub item_description: String,
    /// Image URL (may be empty).
    pub image_url: String,
    /// Observation date.
    pub price_date: NaiveDate,
    /// Observed price at this store on this date.
    pub current_price: Price,
    /// Store name.
    pub store: String,
    /// Purchase link, empty when the source had none.
    pub link_to_buy: String,
    /// Category tags from the optional tags column.
    #[serde(default)]
    pub category_tags: Vec<String>,
    /// 1-based source line.
    #[serde(default)]
    pub line: usize,
}

impl ObservationRecord {
    /// Price as a plain float.
    #[inline]
    pub fn price(&self) -> f64 {
        self.current_price.into_inner()
    }

    /// Whether the record carries a purchase link.
    #[inline]
    pub fn has_link(&self) -> bool {
        !self.link_to_buy.is_empty()
    }
}

/// Per-item summary produced by consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedItem {
    /// Description from the last record processed for the item.
    pub item_description: String,
    /// Image URL from the last record processed for the item.
    pub image_url: String,
    /// Minimum observed price per date.
    pub daily_prices: BTreeMap<NaiveDate, Price>,
    /// Store of the first observation that reached the global minimum.
    pub cheapest_store: String,
    /// Purchase link recorded with the cheapest store.
    pub link_to_buy: String,
    /// Global minimum price across all dates.
    pub lowest_price: Price,
    /// Number of observations folded into this item.
    pub observation_count: usize,
}

impl ConsolidatedItem {
    /// First and last observation dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = *self.daily_prices.keys().next()?;
        let last = *self.daily_prices.keys().next_back()?;
        Some((first, last))
    }

    /// Daily minimum for the most recent observation date.
    pub fn latest_price(&self) -> Option<PricePoint> {
        self.daily_prices
            .iter()
            .next_back()
            .map(|(date, price)| PricePoint::new(*date, *price))
    }

    /// Daily minimum series sorted by date.
    pub fn price_points(&self) -> Vec<PricePoint> {
        self.daily_prices
            .iter()
            .map(|(date, price)| PricePoint::new(*date, *price))
            .collect()
    }
}

/// One point of a price time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: Price,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: Price) -> Self {
        Self { date, price }
    }
}

/// Card-level view of an item: name plus static metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub name: String,
    pub description: String,
    pub image_url: String,
}

impl ItemSummary {
    /// Case-insensitive substring match on name or description.
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}
