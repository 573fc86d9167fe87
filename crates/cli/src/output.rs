//! Rendering of catalog query results.
//!
//! Everything writes to a caller-supplied writer so the rendering can be
//! tested without capturing stdout.

use std::io::Write;

use anyhow::{Context, Result};
use pricewatch_consolidation::PriceCatalog;
use pricewatch_core::{ConsolidatedItem, ConsolidatedMap, ItemSummary, ObservationRecord, PricePoint};
use pricewatch_ingestion::LoadStats;
use serde::Serialize;

use crate::args::OutputFormat;

#[derive(Debug, Serialize)]
struct ItemRow<'a> {
    name: &'a str,
    description: &'a str,
    cheapest_store: &'a str,
    lowest_price: f64,
    link_to_buy: &'a str,
    days: usize,
}

impl<'a> ItemRow<'a> {
    fn new(name: &'a str, item: &'a ConsolidatedItem) -> Self {
        Self {
            name,
            description: &item.item_description,
            cheapest_store: &item.cheapest_store,
            lowest_price: item.lowest_price.into_inner(),
            link_to_buy: &item.link_to_buy,
            days: item.daily_prices.len(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemDetail<'a> {
    name: &'a str,
    #[serde(flatten)]
    item: &'a ConsolidatedItem,
}

#[derive(Debug, Serialize)]
struct Export<'a> {
    items: &'a ConsolidatedMap,
    stats: &'a LoadStats,
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).context("serializing output")?;
    writeln!(out)?;
    Ok(())
}

pub fn items<W: Write>(out: &mut W, catalog: &PriceCatalog, format: OutputFormat) -> Result<()> {
    let rows: Vec<ItemRow> = catalog
        .items()
        .iter()
        .map(|(name, item)| ItemRow::new(name, item))
        .collect();

    match format {
        OutputFormat::Json => write_json(out, &rows),
        OutputFormat::Text => {
            for row in rows {
                writeln!(
                    out,
                    "{}\t{:.2}\t{}\t{} day(s)",
                    row.name, row.lowest_price, row.cheapest_store, row.days
                )?;
            }
            Ok(())
        }
    }
}

pub fn show<W: Write>(out: &mut W, name: &str, item: &ConsolidatedItem, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, &ItemDetail { name, item }),
        OutputFormat::Text => {
            writeln!(out, "{name}")?;
            writeln!(out, "  description:    {}", item.item_description)?;
            writeln!(out, "  image:          {}", or_dash(&item.image_url))?;
            writeln!(
                out,
                "  cheapest:       {:.2} at {}",
                item.lowest_price.into_inner(),
                item.cheapest_store
            )?;
            writeln!(out, "  buy:            {}", or_dash(&item.link_to_buy))?;
            writeln!(out, "  observations:   {}", item.observation_count)?;
            if let Some((first, last)) = item.date_range() {
                writeln!(out, "  dates:          {first} .. {last}")?;
            }
            Ok(())
        }
    }
}

pub fn summaries<W: Write>(out: &mut W, summaries: &[ItemSummary], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, summaries),
        OutputFormat::Text => {
            if summaries.is_empty() {
                writeln!(out, "no matching items")?;
            }
            for s in summaries {
                writeln!(out, "{}\t{}", s.name, s.description)?;
            }
            Ok(())
        }
    }
}

pub fn history<W: Write>(out: &mut W, points: &[PricePoint], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, points),
        OutputFormat::Text => {
            for p in points {
                writeln!(out, "{}\t{:.2}", p.date, p.price.into_inner())?;
            }
            Ok(())
        }
    }
}

pub fn observations<W: Write>(out: &mut W, records: &[&ObservationRecord], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, records),
        OutputFormat::Text => {
            for r in records {
                writeln!(out, "{}\t{:.2}\t{}\t{}", r.price_date, r.price(), r.store, or_dash(&r.link_to_buy))?;
            }
            Ok(())
        }
    }
}

pub fn export<W: Write>(out: &mut W, catalog: &PriceCatalog) -> Result<()> {
    write_json(
        out,
        &Export {
            items: catalog.items(),
            stats: catalog.stats(),
        },
    )
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricewatch_ingestion::RecordLoader;

    const FEED: &str = "\
item_name,item_description,image_url,price_date,current_price,store,link_to_buy
A,first item,,03/01/2024,10,S1,
A,first item,,03/01/2024,8,S2,https://s2/a
A,first item,,02/01/2024,9,S3,
B,second item,http://img/b.png,02/15/2024,4.5,S1,
";

    fn catalog() -> PriceCatalog {
        PriceCatalog::from_feed(RecordLoader::default().load_str(FEED).unwrap())
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_items_text() {
        let catalog = catalog();
        let text = render(|out| items(out, &catalog, OutputFormat::Text));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["A\t8.00\tS2\t2 day(s)", "B\t4.50\tS1\t1 day(s)"]);
    }

    #[test]
    fn test_show_json_flattens_item() {
        let catalog = catalog();
        let item = catalog.get("A").unwrap();
        let json = render(|out| show(out, "A", item, OutputFormat::Json));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["name"], "A");
        assert_eq!(value["cheapest_store"], "S2");
        assert_eq!(value["link_to_buy"], "https://s2/a");
        assert_eq!(value["daily_prices"]["2024-02-01"], 9.0);
        assert_eq!(value["daily_prices"]["2024-03-01"], 8.0);
    }

    #[test]
    fn test_show_text_marks_missing_image() {
        let catalog = catalog();
        let text = render(|out| show(out, "A", catalog.get("A").unwrap(), OutputFormat::Text));
        assert!(text.contains("image:          -"));
        assert!(text.contains("cheapest:       8.00 at S2"));
        assert!(text.contains("dates:          2024-02-01 .. 2024-03-01"));
    }

    #[test]
    fn test_empty_search_text() {
        let text = render(|out| summaries(out, &[], OutputFormat::Text));
        assert_eq!(text, "no matching items\n");
    }

    #[test]
    fn test_history_and_raw_observations() {
        let catalog = catalog();
        let text = render(|out| history(out, &catalog.price_history("A"), OutputFormat::Text));
        assert_eq!(text, "2024-02-01\t9.00\n2024-03-01\t8.00\n");

        let raw: Vec<&ObservationRecord> = catalog.observations_for("A").collect();
        let text = render(|out| observations(out, &raw, OutputFormat::Text));
        assert_eq!(text.lines().count(), 3);
        assert!(text.starts_with("2024-02-01\t9.00\tS3\t-"));
    }

    #[test]
    fn test_export_contains_items_and_stats() {
        let catalog = catalog();
        let json = render(|out| export(out, &catalog));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["stats"]["rows_loaded"], 4);
        assert_eq!(value["items"]["B"]["image_url"], "http://img/b.png");
    }
}
