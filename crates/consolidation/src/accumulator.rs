//! Per-item running state for consolidation.

use chrono::NaiveDate;
use pricewatch_core::{ConsolidatedItem, ObservationRecord, Price};
use std::collections::BTreeMap;

/// An item summary that's currently being built.
///
/// Records must be fed in date order; the last-write-wins metadata and the
/// first-seen tie-breaks depend on it.
#[derive(Debug, Clone)]
pub struct ItemAccumulator {
    item_description: String,
    image_url: String,
    daily_prices: BTreeMap<NaiveDate, Price>,
    running_min_price: Price,
    cheapest_store: String,
    link_to_buy: String,
    observation_count: usize,
}

impl ItemAccumulator {
    /// Start an accumulator from the first record seen for an item.
    pub fn new(first: &ObservationRecord) -> Self {
        let mut daily_prices = BTreeMap::new();
        daily_prices.insert(first.price_date, first.current_price);

        Self {
            item_description: first.item_description.clone(),
            image_url: first.image_url.clone(),
            daily_prices,
            running_min_price: first.current_price,
            cheapest_store: first.store.clone(),
            link_to_buy: first.link_to_buy.clone(),
            observation_count: 1,
        }
    }

    /// Fold one more record into the accumulator.
    pub fn observe(&mut self, record: &ObservationRecord) {
        self.observation_count += 1;

        // Metadata: last write wins.
        self.item_description.clone_from(&record.item_description);
        self.image_url.clone_from(&record.image_url);

        // Daily minimum: strictly lower replaces, ties keep the first price.
        self.daily_prices
            .entry(record.price_date)
            .and_modify(|price| {
                if record.current_price < *price {
                    *price = record.current_price;
                }
            })
            .or_insert(record.current_price);

        // Global minimum: strictly lower replaces, ties keep the first store.
        if record.current_price < self.running_min_price {
            self.running_min_price = record.current_price;
            self.cheapest_store.clone_from(&record.store);
            self.link_to_buy.clone_from(&record.link_to_buy);
        }
    }

    /// Current global minimum price.
    pub fn running_min_price(&self) -> Price {
        self.running_min_price
    }

    /// Store associated with the current global minimum.
    pub fn cheapest_store(&self) -> &str {
        &self.cheapest_store
    }

    /// Number of records folded so far.
    pub fn observation_count(&self) -> usize {
        self.observation_count
    }

    /// Freeze into the immutable summary.
    pub fn finish(self) -> ConsolidatedItem {
        ConsolidatedItem {
            item_description: self.item_description,
            image_url: self.image_url,
            daily_prices: self.daily_prices,
            cheapest_store: self.cheapest_store,
            link_to_buy: self.link_to_buy,
            lowest_price: self.running_min_price,
            observation_count: self.observation_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;

    fn make_record(date: (u32, u32), price: f64, store: &str, link: &str) -> ObservationRecord {
        ObservationRecord {
            item_name: "X".to_string(),
            item_description: format!("desc@{store}"),
            image_url: String::new(),
            price_date: NaiveDate::from_ymd_opt(2024, date.0, date.1).unwrap(),
            current_price: OrderedFloat(price),
            store: store.to_string(),
            link_to_buy: link.to_string(),
            category_tags: Vec::new(),
            line: 0,
        }
    }

    #[test]
    fn test_first_record_initializes_everything() {
        let acc = ItemAccumulator::new(&make_record((3, 1), 10.0, "S1", "https://s1"));
        assert_eq!(acc.cheapest_store(), "S1");
        assert_eq!(acc.running_min_price(), OrderedFloat(10.0));
        assert_eq!(acc.observation_count(), 1);

        let item = acc.finish();
        assert_eq!(item.daily_prices.len(), 1);
        assert_eq!(item.link_to_buy, "https://s1");
        assert_eq!(item.item_description, "desc@S1");
    }

    #[test]
    fn test_strictly_lower_price_takes_over() {
        let mut acc = ItemAccumulator::new(&make_record((3, 1), 10.0, "S1", "https://s1"));
        acc.observe(&make_record((3, 2), 7.5, "S2", ""));

        assert_eq!(acc.cheapest_store(), "S2");
        let item = acc.finish();
        assert_eq!(item.lowest_price, OrderedFloat(7.5));
        // The winning row had no link, so the old one must not survive.
        assert_eq!(item.link_to_buy, "");
    }

    #[test]
    fn test_equal_price_keeps_first_store() {
        let mut acc = ItemAccumulator::new(&make_record((3, 1), 10.0, "S1", "https://s1"));
        acc.observe(&make_record((3, 4), 10.0, "S2", "https://s2"));

        let item = acc.finish();
        assert_eq!(item.cheapest_store, "S1");
        assert_eq!(item.link_to_buy, "https://s1");
        assert_eq!(item.observation_count, 2);
    }

    #[test]
    fn test_higher_price_only_refreshes_metadata() {
        let mut acc = ItemAccumulator::new(&make_record((3, 1), 10.0, "S1", ""));
        acc.observe(&make_record((3, 1), 12.0, "S2", ""));

        let item = acc.finish();
        assert_eq!(item.cheapest_store, "S1");
        assert_eq!(item.daily_prices.len(), 1);
        assert_eq!(item.daily_prices.values().next(), Some(&OrderedFloat(10.0)));
        assert_eq!(item.item_description, "desc@S2");
    }
}
