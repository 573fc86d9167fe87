//! Source-keyed memoization of the consolidated catalog.
//!
//! Consolidation itself is a pure function of its input; this cache only
//! avoids re-reading and re-folding a source file that has not changed.

use pricewatch_core::{Config, Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use crate::catalog::PriceCatalog;

/// Identity and version of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl SourceFingerprint {
    /// Fingerprint the file at `path`.
    pub fn of(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| {
            Error::source_unavailable(format!("Failed to stat '{}': {e}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Holds the catalog for the configured source until the source changes.
#[derive(Debug)]
pub struct CatalogCache {
    config: Config,
    entry: Option<(SourceFingerprint, Arc<PriceCatalog>)>,
    loads: u64,
}

impl CatalogCache {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            entry: None,
            loads: 0,
        }
    }

    /// Catalog for the current state of the source, reloading if it changed.
    pub fn get(&mut self) -> Result<Arc<PriceCatalog>> {
        let fingerprint = SourceFingerprint::of(&self.config.source.path)?;

        if let Some((cached, catalog)) = &self.entry {
            if *cached == fingerprint {
                debug!(path = %fingerprint.path.display(), "catalog cache hit");
                return Ok(Arc::clone(catalog));
            }
        }

        debug!(path = %fingerprint.path.display(), "catalog cache miss");
        let catalog = Arc::new(PriceCatalog::load_path(&self.config, &fingerprint.path)?);
        self.loads += 1;
        self.entry = Some((fingerprint, Arc::clone(&catalog)));
        Ok(catalog)
    }

    /// Drop the cached catalog; the next `get` reloads.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Number of times the source has actually been loaded.
    pub fn load_count(&self) -> u64 {
        self.loads
    }
}
