//! `pricewatch` binary: load a price-observation CSV, consolidate it, and
//! answer queries about the result.

mod args;
mod output;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use pricewatch_consolidation::PriceCatalog;
use pricewatch_core::config::RowPolicy;
use pricewatch_core::{Config, Error as CoreError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use args::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// 2 for bad input (unreadable source, malformed rows, bad config), 1 otherwise.
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<CoreError>() {
        Some(CoreError::Io(_)) | None => 1,
        Some(_) => 2,
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(source) = &cli.source {
        config.source.path = source.clone();
    }
    if cli.skip_malformed {
        config.validation.malformed_row_policy = RowPolicy::Skip;
    }
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    debug!(?config, "resolved configuration");

    let catalog = PriceCatalog::load(&config)
        .with_context(|| format!("loading '{}'", config.source.path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let format = cli.format;

    match cli.command {
        Command::Items => output::items(&mut out, &catalog, format)?,
        Command::Show { item } => {
            let consolidated = catalog
                .get(&item)
                .ok_or_else(|| anyhow!("no item named '{item}'"))?;
            output::show(&mut out, &item, consolidated, format)?;
        }
        Command::Search { query } => output::summaries(&mut out, &catalog.search(&query), format)?,
        Command::History { item, raw } => {
            if catalog.get(&item).is_none() {
                return Err(anyhow!("no item named '{item}'"));
            }
            if raw {
                let records: Vec<_> = catalog.observations_for(&item).collect();
                output::observations(&mut out, &records, format)?;
            } else {
                output::history(&mut out, &catalog.price_history(&item), format)?;
            }
        }
        Command::Export => output::export(&mut out, &catalog)?,
    }

    out.flush()?;
    Ok(())
}
