//! Observation record loading.
//!
//! Reads the raw CSV feed, normalizes each row into an [`ObservationRecord`],
//! and returns the records stably sorted by `price_date`. Rows that share a
//! date keep their source order; consolidation depends on it.

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;
use ordered_float::OrderedFloat;
use pricewatch_core::config::{RowPolicy, SourceConfig, ValidationConfig};
use pricewatch_core::{normalize_optional, Config, Error, ObservationRecord, Price, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::columns::{self, ColumnMap};

/// A row dropped under [`RowPolicy::Skip`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// 1-based source line.
    pub line: usize,
    /// Why the row was dropped.
    pub message: String,
}

/// Statistics about one load.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadStats {
    /// Data rows read from the source (header excluded).
    pub rows_read: usize,
    /// Rows turned into records.
    pub rows_loaded: usize,
    /// Rows dropped, with reasons.
    pub skipped: Vec<RowIssue>,
}

impl LoadStats {
    /// Number of rows dropped.
    pub fn rows_skipped(&self) -> usize {
        self.skipped.len()
    }
}

/// Loader output: date-ordered records plus load statistics.
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    pub records: Vec<ObservationRecord>,
    pub stats: LoadStats,
}

/// Loads observation records from a CSV source.
#[derive(Debug, Clone)]
pub struct RecordLoader {
    source: SourceConfig,
    validation: ValidationConfig,
}

impl RecordLoader {
    /// Create a loader from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            source: config.source.clone(),
            validation: config.validation.clone(),
        }
    }

    /// Load from the configured source path.
    pub fn load(&self) -> Result<LoadedFeed> {
        self.load_path(&self.source.path)
    }

    /// Load from an explicit path.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedFeed> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::source_unavailable(format!("Failed to open '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), "reading observation feed");
        self.load_reader(file)
    }

    /// Load from an in-memory CSV string.
    pub fn load_str(&self, csv_text: &str) -> Result<LoadedFeed> {
        self.load_reader(csv_text.as_bytes())
    }

    /// Load from any reader producing CSV text.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<LoadedFeed> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.source.delimiter_byte()?)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::source_unavailable(format!("Failed to read CSV header: {e}")))?
            .clone();
        let columns = ColumnMap::from_headers(&headers)?;

        let mut records = Vec::new();
        let mut stats = LoadStats::default();

        for (idx, result) in reader.records().enumerate() {
            // records() starts on the line after the header.
            let line = idx + 2;
            stats.rows_read += 1;

            let parsed = match result {
                Ok(row) => self.parse_row(&row, &columns, line),
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(Error::source_unavailable(format!(
                        "Read failed at line {line}: {e}"
                    )));
                }
                Err(e) => Err(Error::MalformedRow {
                    line,
                    message: e.to_string(),
                }),
            };

            match parsed {
                Ok(record) => records.push(record),
                Err(e) if e.is_row_level() && self.validation.malformed_row_policy == RowPolicy::Skip => {
                    warn!(line, error = %e, "skipping malformed row");
                    stats.skipped.push(RowIssue {
                        line,
                        message: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        // Vec::sort_by_key is stable: equal dates keep source order.
        records.sort_by_key(|r| r.price_date);
        stats.rows_loaded = records.len();

        info!(
            rows_read = stats.rows_read,
            rows_loaded = stats.rows_loaded,
            rows_skipped = stats.rows_skipped(),
            "loaded observation feed"
        );

        Ok(LoadedFeed { records, stats })
    }

    fn parse_row(&self, row: &StringRecord, columns: &ColumnMap, line: usize) -> Result<ObservationRecord> {
        let item_name = columns.require(row, columns::ITEM_NAME, line)?;
        let store = columns.require(row, columns::STORE, line)?;
        let raw_date = columns.require(row, columns::PRICE_DATE, line)?;
        let raw_price = columns.require(row, columns::CURRENT_PRICE, line)?;

        let price_date = parse_date(raw_date, &self.source.date_format, line)?;
        let current_price = parse_price(raw_price, self.validation.allow_zero_price, line)?;

        Ok(ObservationRecord {
            item_name: item_name.to_string(),
            item_description: normalize_optional(columns.get(row, columns::ITEM_DESCRIPTION)),
            image_url: normalize_optional(columns.get(row, columns::IMAGE_URL)),
            price_date,
            current_price,
            store: store.to_string(),
            link_to_buy: normalize_optional(columns.get(row, columns::LINK_TO_BUY)),
            category_tags: parse_tags(columns.get(row, columns::CATEGORY_TAGS)),
            line,
        })
    }
}

impl Default for RecordLoader {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

/// Parse a date under the configured format.
///
/// chrono accepts short, signed, or unpadded numeric fields; the value must
/// also format back to itself, and `%Y` must be a four-digit year.
pub fn parse_date(value: &str, format: &str, line: usize) -> Result<NaiveDate> {
    let malformed = || Error::MalformedDate {
        line,
        value: value.to_string(),
        format: format.to_string(),
    };

    let date = NaiveDate::parse_from_str(value, format).map_err(|_| malformed())?;
    if format.contains("%Y") && !(1000..=9999).contains(&date.year()) {
        return Err(malformed());
    }
    if date.format(format).to_string() != value {
        return Err(malformed());
    }
    Ok(date)
}

/// Parse a price. Non-numeric, non-finite and negative values are rejected;
/// zero only when `allow_zero` is set.
pub fn parse_price(value: &str, allow_zero: bool, line: usize) -> Result<Price> {
    let malformed = || Error::MalformedPrice {
        line,
        value: value.to_string(),
    };

    let price: f64 = value.parse().map_err(|_| malformed())?;
    if !price.is_finite() || price < 0.0 || (price == 0.0 && !allow_zero) {
        return Err(malformed());
    }
    Ok(OrderedFloat(price))
}

fn parse_tags(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split([',', ';', '|'])
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const HEADER: &str = "item_name,item_description,image_url,price_date,current_price,store,category_tags,link_to_buy";

    fn csv_with(rows: &[&str]) -> String {
        let mut text = String::from(HEADER);
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        text
    }

    fn skipping_loader() -> RecordLoader {
        let mut config = Config::default();
        config.validation.malformed_row_policy = RowPolicy::Skip;
        RecordLoader::new(&config)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sorts_by_date_stably() {
        let text = csv_with(&[
            "A,d1,,03/01/2024,10,S1,,",
            "A,d1,,03/01/2024,8,S2,,",
            "A,d1,,02/01/2024,9,S3,,",
        ]);
        let feed = RecordLoader::default().load_str(&text).unwrap();

        let stores: Vec<&str> = feed.records.iter().map(|r| r.store.as_str()).collect();
        assert_eq!(stores, vec!["S3", "S1", "S2"]);
        assert_eq!(feed.records[0].price_date, date(2024, 2, 1));
        assert_eq!(feed.records[0].line, 4);
        assert_eq!(feed.stats.rows_read, 3);
        assert_eq!(feed.stats.rows_loaded, 3);
    }

    #[test]
    fn test_normalizes_optional_fields() {
        let text = csv_with(&[
            "A,d1,,03/01/2024,10,S1,,",
            "B,d2,http://img/b.png,03/02/2024,5.25,S2,\"tv, 4k; sale\",https://shop/b",
        ]);
        let feed = RecordLoader::default().load_str(&text).unwrap();

        let a = &feed.records[0];
        assert_eq!(a.image_url, "");
        assert_eq!(a.link_to_buy, "");
        assert!(a.category_tags.is_empty());
        assert!(!a.has_link());

        let b = &feed.records[1];
        assert_eq!(b.image_url, "http://img/b.png");
        assert_eq!(b.link_to_buy, "https://shop/b");
        assert_eq!(b.category_tags, vec!["tv", "4k", "sale"]);
        assert_relative_eq!(b.price(), 5.25);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let text = "item_name,item_description,image_url,price_date,current_price,store\n\
                    A,d1,,03/14/2024,10,S1";
        let feed = RecordLoader::default().load_str(text).unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].link_to_buy, "");
        assert_eq!(feed.records[0].price_date, date(2024, 3, 14));
    }

    #[test]
    fn test_malformed_date_fails_load_by_default() {
        let text = csv_with(&["A,d1,,03/01/2024,10,S1,,", "A,d1,,2024-03-02,9,S2,,"]);
        let err = RecordLoader::default().load_str(&text).unwrap_err();
        match err {
            Error::MalformedDate { line, value, format } => {
                assert_eq!(line, 3);
                assert_eq!(value, "2024-03-02");
                assert_eq!(format, "%m/%d/%Y");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_impossible_date_is_malformed() {
        let text = csv_with(&["A,d1,,02/30/2024,10,S1,,"]);
        let err = RecordLoader::default().load_str(&text).unwrap_err();
        assert!(matches!(err, Error::MalformedDate { .. }));
    }

    #[test]
    fn test_short_year_is_malformed() {
        let text = csv_with(&["A,d,,03/14/2024,10,S1,,", "A,d,,03/15/24,1,S2,,"]);
        let err = RecordLoader::default().load_str(&text).unwrap_err();
        assert!(matches!(err, Error::MalformedDate { line: 3, ref value, .. } if value == "03/15/24"));

        for bad in ["03/14/999", "03/14/0999", "03/14/+2024", "3/14/2024", "03/4/2024"] {
            assert!(parse_date(bad, "%m/%d/%Y", 2).is_err(), "accepted {bad}");
        }
        assert_eq!(parse_date("03/14/2024", "%m/%d/%Y", 2).unwrap(), date(2024, 3, 14));
    }

    #[test]
    fn test_short_year_row_is_skipped_not_reordered() {
        let text = csv_with(&["A,d,,03/14/2024,10,S1,,", "A,d,,03/15/24,1,S2,,"]);
        let feed = skipping_loader().load_str(&text).unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].store, "S1");
        assert_eq!(feed.stats.skipped[0].line, 3);
    }

    #[test]
    fn test_non_ascii_delimiter_is_rejected() {
        let mut config = Config::default();
        config.source.delimiter = '§';
        let err = RecordLoader::new(&config).load_str(HEADER).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_skip_policy_records_issues() {
        let text = csv_with(&[
            "A,d1,,03/01/2024,10,S1,,",
            "A,d1,,14/03/2024,9,S2,,",
            "A,d1,,03/02/2024,abc,S3,,",
            "A,d1,,03/03/2024,-1,S4,,",
            ",d1,,03/04/2024,7,S5,,",
            "A,d1,,03/05/2024,6,S6,,",
        ]);
        let feed = skipping_loader().load_str(&text).unwrap();

        assert_eq!(feed.records.len(), 2);
        assert_eq!(feed.stats.rows_read, 6);
        assert_eq!(feed.stats.rows_loaded, 2);
        assert_eq!(feed.stats.rows_skipped(), 4);
        let lines: Vec<usize> = feed.stats.skipped.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_skip_policy_does_not_hide_schema_errors() {
        let text = "item_name,price_date,current_price,store\nA,03/01/2024,10,S1";
        let err = skipping_loader().load_str(text).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(_)));
    }

    #[test]
    fn test_empty_source_is_missing_columns() {
        let err = RecordLoader::default().load_str("").unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "item_name"));
    }

    #[test]
    fn test_header_only_source_loads_nothing() {
        let feed = RecordLoader::default().load_str(HEADER).unwrap();
        assert!(feed.records.is_empty());
        assert_eq!(feed.stats.rows_read, 0);
    }

    #[test]
    fn test_price_rules() {
        assert_relative_eq!(parse_price("12.5", true, 2).unwrap().into_inner(), 12.5);
        assert_relative_eq!(parse_price("0", true, 2).unwrap().into_inner(), 0.0);
        assert!(parse_price("0", false, 2).is_err());
        assert!(parse_price("-3", true, 2).is_err());
        assert!(parse_price("NaN", true, 2).is_err());
        assert!(parse_price("inf", true, 2).is_err());
        assert!(parse_price("$5", true, 2).is_err());
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = RecordLoader::default()
            .load_path("/no/such/dir/modified.csv")
            .unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[test]
    fn test_load_from_configured_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", csv_with(&["A;d1;;03/01/2024;10;S1;;"]).replace(',', ";")).unwrap();

        let mut config = Config::default();
        config.source.path = file.path().to_path_buf();
        config.source.delimiter = ';';

        let feed = RecordLoader::new(&config).load().unwrap();
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].store, "S1");
    }

    #[test]
    fn test_repeated_loads_are_identical() {
        let text = csv_with(&[
            "B,d,,01/05/2024,3,S1,,",
            "A,d,,01/05/2024,4,S2,,",
            "A,d,,01/04/2024,5,S3,,",
        ]);
        let loader = RecordLoader::default();
        let first = loader.load_str(&text).unwrap();
        let second = loader.load_str(&text).unwrap();
        assert_eq!(first.records, second.records);
    }
}
