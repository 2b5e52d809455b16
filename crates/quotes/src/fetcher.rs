use coinquote_core::{Currency, FetchError, QuoteTransport};
use coinquote_registry::Registry;
use tracing::{info, warn};

use crate::client::{HttpQuoteTransport, QuoteConfig};
use crate::response;

/// Resolves symbols through a [`Registry`] and fills in their latest USD
/// stats from the quote service.
///
/// Every call is a fresh round-trip; nothing is cached between calls.
pub struct PriceFetcher<T: QuoteTransport = HttpQuoteTransport> {
    registry: Registry,
    transport: T,
    api_key_env: String,
}

impl PriceFetcher<HttpQuoteTransport> {
    /// Fetcher talking to the endpoint selected by `config`.
    pub fn from_config(registry: Registry, config: &QuoteConfig) -> Self {
        Self::new(
            registry,
            HttpQuoteTransport::from_config(config),
            config.api_key_env.clone(),
        )
    }
}

impl<T: QuoteTransport> PriceFetcher<T> {
    pub fn new(registry: Registry, transport: T, api_key_env: impl Into<String>) -> Self {
        Self {
            registry,
            transport,
            api_key_env: api_key_env.into(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Fetch the latest quote for `symbol` and store it on the registry
    /// entry.
    ///
    /// Fails with `NotFound` for unknown symbols and `MissingCredential`
    /// when the API key variable is unset; neither touches the network.
    pub async fn fetch_price(&mut self, symbol: &str) -> Result<&Currency, FetchError> {
        let currency = self.registry.find_by_symbol(symbol)?;
        let api_key = read_api_key(&self.api_key_env)?;

        info!(symbol = %currency.symbol, id = currency.id, "Fetching latest quote");
        let body = self.transport.get_latest(currency.id, &api_key).await?;

        let decoded = response::parse_body(&body)?;
        currency.stats = response::extract_usd_stats(&decoded, currency.id)?;

        Ok(currency)
    }

    /// Fetch each symbol in turn, one result per input.
    pub async fn fetch_prices(
        &mut self,
        symbols: &[String],
    ) -> Vec<(String, Result<Currency, FetchError>)> {
        let mut results = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let result = self.fetch_price(symbol).await.map(Currency::clone);
            if let Err(e) = &result {
                warn!(symbol = %symbol, error = %e, "Quote fetch failed");
            }
            results.push((symbol.clone(), result));
        }
        results
    }
}

fn read_api_key(var: &str) -> Result<String, FetchError> {
    std::env::var(var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| FetchError::MissingCredential(var.to_string()))
}
