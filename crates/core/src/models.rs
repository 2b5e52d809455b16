use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

/// A currency known to the registry (e.g. BTC, ETH).
///
/// Identity is `id`, assigned by the quote provider. `stats` starts out at
/// its default and is filled in place by a price fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub id: u32,
    pub name: String,
    /// Ticker symbol, stored upper-case as published by the provider.
    pub symbol: String,
    /// Provider slug (e.g. "bitcoin"), when the id map carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub stats: Stats,
}

impl Currency {
    pub fn new(id: u32, name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            symbol: symbol.into(),
            slug: None,
            stats: Stats::default(),
        }
    }

    /// Whether this currency answers to `symbol`. The caller's symbol is
    /// upper-cased; the stored symbol is compared as-is.
    pub fn matches_symbol(&self, symbol: &str) -> bool {
        self.symbol == symbol.trim().to_uppercase()
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// USD market statistics for one currency at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub price: f64,
    pub volume_24h: i64,
    pub market_cap: f64,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    /// When the provider last refreshed this quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Stats {
    /// True once a fetch has written a quote into these stats.
    pub fn is_populated(&self) -> bool {
        *self != Stats::default()
    }
}
