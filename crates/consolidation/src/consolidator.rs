//! The consolidation fold.
//!
//! One pass over date-ordered observations, one [`ItemAccumulator`] per item,
//! frozen into an immutable [`ConsolidatedMap`] only after the pass completes.

use pricewatch_core::{ConsolidatedMap, ObservationRecord};
use std::collections::BTreeMap;
use tracing::debug;

use crate::accumulator::ItemAccumulator;

/// Consolidate date-ordered observations into one summary per item.
///
/// Records are processed strictly in the order given. Pass the output of the
/// record loader, which is already stably sorted by date.
pub fn consolidate(records: &[ObservationRecord]) -> ConsolidatedMap {
    let accumulators = records.iter().fold(
        BTreeMap::<String, ItemAccumulator>::new(),
        |mut acc, record| {
            match acc.get_mut(&record.item_name) {
                Some(item) => item.observe(record),
                None => {
                    acc.insert(record.item_name.clone(), ItemAccumulator::new(record));
                }
            }
            acc
        },
    );

    debug!(
        records = records.len(),
        items = accumulators.len(),
        "consolidated observations"
    );

    accumulators
        .into_iter()
        .map(|(name, acc)| (name, acc.finish()))
        .collect()
}
