pub mod json_loader;

use coinquote_core::{Currency, RegistryError};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where the registry reads its id map from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrySource {
    /// The id map compiled into the binary.
    Bundled,
    /// A JSON id map on disk.
    File(PathBuf),
}

/// Ordered, in-memory table of known currencies.
///
/// Loaded once from its source; read-only afterwards apart from the stats
/// written into matched entries by a price fetch. Lookups are a linear scan
/// and the first entry in file order wins when symbols repeat.
#[derive(Debug)]
pub struct Registry {
    source: Option<RegistrySource>,
    currencies: Vec<Currency>,
    loads: usize,
}

impl Registry {
    /// An empty registry backed by `source`. Nothing is read until
    /// [`Registry::load`] or the first lookup.
    pub fn new(source: RegistrySource) -> Self {
        Self {
            source: Some(source),
            currencies: Vec::new(),
            loads: 0,
        }
    }

    /// Build a registry from `source` and load it immediately.
    ///
    /// The registry is returned even when loading fails, so the caller can
    /// choose between carrying on empty and aborting.
    pub fn open(source: RegistrySource) -> (Self, Result<usize, RegistryError>) {
        let mut registry = Self::new(source);
        let result = registry.load();
        (registry, result)
    }

    /// A registry over an in-memory list with no backing source.
    pub fn from_currencies(currencies: Vec<Currency>) -> Self {
        Self {
            source: None,
            currencies,
            loads: 0,
        }
    }

    /// (Re)read the id map from the source.
    ///
    /// On failure the registry is left empty and the error is returned.
    pub fn load(&mut self) -> Result<usize, RegistryError> {
        let Some(source) = &self.source else {
            return Ok(self.currencies.len());
        };

        self.loads += 1;
        let loaded = match source {
            RegistrySource::Bundled => json_loader::parse_currencies(json_loader::BUNDLED_ID_MAP),
            RegistrySource::File(path) => json_loader::load_currencies_from_file(path),
        };

        match loaded {
            Ok(currencies) => {
                info!(count = currencies.len(), source = ?source, "Loaded currency registry");
                self.currencies = currencies;
                Ok(self.currencies.len())
            }
            Err(e) => {
                warn!(source = ?source, error = %e, "Failed to load currency registry");
                self.currencies.clear();
                Err(e)
            }
        }
    }

    /// Find the first currency whose symbol matches `symbol`, ignoring case.
    ///
    /// An empty registry is reloaded first, which covers a failed initial
    /// load.
    pub fn find_by_symbol(&mut self, symbol: &str) -> Result<&mut Currency, RegistryError> {
        if self.currencies.is_empty() && self.source.is_some() {
            debug!("Registry empty, reloading before lookup");
            if let Err(e) = self.load() {
                warn!(symbol = %symbol, error = %e, "Reload failed, lookup will miss");
            }
        }

        self.currencies
            .iter_mut()
            .find(|c| c.matches_symbol(symbol))
            .ok_or_else(|| RegistryError::NotFound(symbol.to_string()))
    }

    /// Number of times the source has been read.
    pub fn load_count(&self) -> usize {
        self.loads
    }

    pub fn source(&self) -> Option<&RegistrySource> {
        self.source.as_ref()
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter()
    }
}
