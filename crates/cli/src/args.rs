//! Command-line parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pricewatch", version, about = "Consolidate store price observations per item")]
pub struct Cli {
    /// Observation CSV (overrides `source.path` from the config).
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    /// Skip rows with malformed dates or prices instead of failing the load.
    #[arg(long, global = true)]
    pub skip_malformed: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List every item with its cheapest store.
    Items,
    /// Show the consolidated view of one item.
    Show {
        /// Exact item name.
        item: String,
    },
    /// Search item names and descriptions (case-insensitive).
    Search {
        query: String,
    },
    /// Print an item's price history.
    History {
        /// Exact item name.
        item: String,
        /// Print every raw observation instead of the daily minimum.
        #[arg(long)]
        raw: bool,
    },
    /// Dump the consolidated map and load statistics as JSON.
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
