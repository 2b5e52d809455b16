//! CoinMarketCap latest-quote client.
//!
//! Resolves a ticker through the symbol registry, requests
//! `v1/cryptocurrency/quotes/latest?id=<id>` and writes the USD stats back
//! into the registry entry.

pub mod client;
pub mod fetcher;
pub mod response;

pub use client::{ConfigError, HttpQuoteTransport, QuoteConfig};
pub use fetcher::PriceFetcher;
