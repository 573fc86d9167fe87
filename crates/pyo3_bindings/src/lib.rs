//! PyO3 bindings for pricewatch Rust components.
//!
//! Exposes the load-and-consolidate pipeline to Python so a dashboard can:
//! - Load an observation CSV into a consolidated catalog
//! - Look up items, search cards, and fetch price histories
//! - Distinguish unreadable sources from malformed dates by exception type

use std::path::PathBuf;

use pyo3::exceptions::{PyOSError, PyValueError};
use pyo3::prelude::*;

use pricewatch_consolidation::PriceCatalog as RustPriceCatalog;
use ::pricewatch_core::{
    Config as RustConfig, ConsolidatedItem as RustConsolidatedItem, Error as RustError,
    ItemSummary as RustItemSummary, ObservationRecord as RustObservationRecord,
};
use pricewatch_ingestion::RecordLoader;

pyo3::create_exception!(
    pricewatch_core,
    SourceUnavailableError,
    PyOSError,
    "The observation source could not be opened or read."
);
pyo3::create_exception!(
    pricewatch_core,
    MalformedDateError,
    PyValueError,
    "A row's price_date does not match the expected format."
);

fn to_py_err(err: RustError) -> PyErr {
    match &err {
        RustError::SourceUnavailable(_) | RustError::Io(_) => {
            SourceUnavailableError::new_err(err.to_string())
        }
        RustError::MalformedDate { .. } => MalformedDateError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn config_from(config_json: Option<&str>) -> PyResult<RustConfig> {
    match config_json {
        Some(json) => RustConfig::from_json_str(json).map_err(to_py_err),
        None => Ok(RustConfig::default()),
    }
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// A single (item, store, date, price) observation.
#[pyclass]
#[derive(Clone)]
pub struct ObservationRecord {
    #[pyo3(get)]
    pub item_name: String,
    #[pyo3(get)]
    pub item_description: String,
    #[pyo3(get)]
    pub image_url: String,
    /// ISO-8601 date (`YYYY-MM-DD`).
    #[pyo3(get)]
    pub price_date: String,
    #[pyo3(get)]
    pub current_price: f64,
    #[pyo3(get)]
    pub store: String,
    #[pyo3(get)]
    pub link_to_buy: String,
    #[pyo3(get)]
    pub category_tags: Vec<String>,
}

#[pymethods]
impl ObservationRecord {
    fn __repr__(&self) -> String {
        format!(
            "ObservationRecord(item_name={:?}, price_date={}, current_price={:.2}, store={:?})",
            self.item_name, self.price_date, self.current_price, self.store
        )
    }
}

impl From<&RustObservationRecord> for ObservationRecord {
    fn from(r: &RustObservationRecord) -> Self {
        ObservationRecord {
            item_name: r.item_name.clone(),
            item_description: r.item_description.clone(),
            image_url: r.image_url.clone(),
            price_date: r.price_date.to_string(),
            current_price: r.price(),
            store: r.store.clone(),
            link_to_buy: r.link_to_buy.clone(),
            category_tags: r.category_tags.clone(),
        }
    }
}

/// Consolidated per-item view.
#[pyclass]
#[derive(Clone)]
pub struct ConsolidatedItem {
    #[pyo3(get)]
    pub item_name: String,
    #[pyo3(get)]
    pub item_description: String,
    #[pyo3(get)]
    pub image_url: String,
    /// ISO date -> daily minimum price.
    #[pyo3(get)]
    pub daily_prices: std::collections::BTreeMap<String, f64>,
    #[pyo3(get)]
    pub cheapest_store: String,
    #[pyo3(get)]
    pub link_to_buy: String,
    #[pyo3(get)]
    pub lowest_price: f64,
    #[pyo3(get)]
    pub observation_count: usize,
}

#[pymethods]
impl ConsolidatedItem {
    fn __repr__(&self) -> String {
        format!(
            "ConsolidatedItem(item_name={:?}, cheapest_store={:?}, lowest_price={:.2}, days={})",
            self.item_name,
            self.cheapest_store,
            self.lowest_price,
            self.daily_prices.len()
        )
    }
}

impl ConsolidatedItem {
    fn from_rust(name: &str, item: &RustConsolidatedItem) -> Self {
        ConsolidatedItem {
            item_name: name.to_string(),
            item_description: item.item_description.clone(),
            image_url: item.image_url.clone(),
            daily_prices: item
                .daily_prices
                .iter()
                .map(|(date, price)| (date.to_string(), price.into_inner()))
                .collect(),
            cheapest_store: item.cheapest_store.clone(),
            link_to_buy: item.link_to_buy.clone(),
            lowest_price: item.lowest_price.into_inner(),
            observation_count: item.observation_count,
        }
    }
}

/// Card-level summary: name, description, image.
#[pyclass]
#[derive(Clone)]
pub struct ItemSummary {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub description: String,
    #[pyo3(get)]
    pub image_url: String,
}

#[pymethods]
impl ItemSummary {
    fn __repr__(&self) -> String {
        format!("ItemSummary(name={:?})", self.name)
    }
}

impl From<RustItemSummary> for ItemSummary {
    fn from(s: RustItemSummary) -> Self {
        ItemSummary {
            name: s.name,
            description: s.description,
            image_url: s.image_url,
        }
    }
}

// ============================================================================
// Python-exposed Catalog
// ============================================================================

/// Loaded observations together with their consolidated view.
#[pyclass(name = "PriceCatalog")]
pub struct PyPriceCatalog {
    inner: RustPriceCatalog,
}

#[pymethods]
impl PyPriceCatalog {
    /// Load and consolidate a CSV file.
    ///
    /// `config_json` overrides loader settings, e.g.
    /// `{"validation": {"malformed_row_policy": "skip"}}`.
    #[staticmethod]
    #[pyo3(signature = (path, config_json=None))]
    fn load(path: PathBuf, config_json: Option<&str>) -> PyResult<Self> {
        let config = config_from(config_json)?;
        let inner = RustPriceCatalog::load_path(&config, path).map_err(to_py_err)?;
        Ok(PyPriceCatalog { inner })
    }

    /// Load and consolidate CSV text already in memory.
    #[staticmethod]
    #[pyo3(signature = (csv_text, config_json=None))]
    fn from_csv_text(csv_text: &str, config_json: Option<&str>) -> PyResult<Self> {
        let config = config_from(config_json)?;
        let feed = RecordLoader::new(&config)
            .load_str(csv_text)
            .map_err(to_py_err)?;
        Ok(PyPriceCatalog {
            inner: RustPriceCatalog::from_feed(feed),
        })
    }

    /// Consolidated view of one item, or None.
    fn get(&self, item_name: &str) -> Option<ConsolidatedItem> {
        self.inner
            .get(item_name)
            .map(|item| ConsolidatedItem::from_rust(item_name, item))
    }

    /// Item names in sorted order.
    fn item_names(&self) -> Vec<String> {
        self.inner.item_names().map(str::to_string).collect()
    }

    /// Summaries for every item.
    fn summaries(&self) -> Vec<ItemSummary> {
        self.inner.summaries().into_iter().map(Into::into).collect()
    }

    /// Case-insensitive search over names and descriptions.
    fn search(&self, query: &str) -> Vec<ItemSummary> {
        self.inner.search(query).into_iter().map(Into::into).collect()
    }

    /// Daily-minimum history as `(iso_date, price)` pairs.
    fn price_history(&self, item_name: &str) -> Vec<(String, f64)> {
        self.inner
            .price_history(item_name)
            .into_iter()
            .map(|p| (p.date.to_string(), p.price.into_inner()))
            .collect()
    }

    /// Every raw observation for an item, in load order.
    fn observations_for(&self, item_name: &str) -> Vec<ObservationRecord> {
        self.inner
            .observations_for(item_name)
            .map(ObservationRecord::from)
            .collect()
    }

    /// Rows dropped under the skip policy, as `(line, reason)`.
    fn skipped_rows(&self) -> Vec<(usize, String)> {
        self.inner
            .stats()
            .skipped
            .iter()
            .map(|issue| (issue.line, issue.message.clone()))
            .collect()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __contains__(&self, item_name: &str) -> bool {
        self.inner.get(item_name).is_some()
    }
}

// ============================================================================
// Module Definition
// ============================================================================

/// pricewatch core: observation loading and consolidation for Python.
#[pymodule]
fn pricewatch_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<ObservationRecord>()?;
    m.add_class::<ConsolidatedItem>()?;
    m.add_class::<ItemSummary>()?;

    // Catalog
    m.add_class::<PyPriceCatalog>()?;

    // Errors
    m.add("SourceUnavailableError", m.py().get_type_bound::<SourceUnavailableError>())?;
    m.add("MalformedDateError", m.py().get_type_bound::<MalformedDateError>())?;

    Ok(())
}
