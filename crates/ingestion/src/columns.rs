//! Header resolution for the observation CSV.
//!
//! Columns are located by name (trimmed, case-insensitive), so the source may
//! order them freely or carry extra columns.

use csv::StringRecord;
use pricewatch_core::{Error, Result};
use std::collections::HashMap;

pub const ITEM_NAME: &str = "item_name";
pub const ITEM_DESCRIPTION: &str = "item_description";
pub const IMAGE_URL: &str = "image_url";
pub const PRICE_DATE: &str = "price_date";
pub const CURRENT_PRICE: &str = "current_price";
pub const STORE: &str = "store";
pub const CATEGORY_TAGS: &str = "category_tags";
pub const LINK_TO_BUY: &str = "link_to_buy";

/// Columns that must be present in the header.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ITEM_NAME,
    ITEM_DESCRIPTION,
    IMAGE_URL,
    PRICE_DATE,
    CURRENT_PRICE,
    STORE,
];

/// Resolved column positions for one source.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    index: HashMap<String, usize>,
}

impl ColumnMap {
    /// Build from a header record, failing on the first missing required column.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut index = HashMap::with_capacity(headers.len());
        for (i, name) in headers.iter().enumerate() {
            // First occurrence wins for duplicated headers.
            index.entry(name.trim().to_ascii_lowercase()).or_insert(i);
        }

        if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !index.contains_key(**c)) {
            return Err(Error::MissingColumn((*missing).to_string()));
        }

        Ok(Self { index })
    }

    /// Whether the header carries the named column.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Trimmed cell value; empty cells and absent columns give `None`.
    pub fn get<'a>(&self, record: &'a StringRecord, name: &str) -> Option<&'a str> {
        let idx = self.index.get(name)?;
        record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    /// Like [`ColumnMap::get`], but a missing value is a row-level error.
    pub fn require<'a>(&self, record: &'a StringRecord, name: &str, line: usize) -> Result<&'a str> {
        self.get(record, name)
            .ok_or_else(|| Error::missing_field(line, name))
    }
}
