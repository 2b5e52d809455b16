use async_trait::async_trait;
use coinquote_core::{FetchError, QuoteTransport};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::response::api_error_message;

/// Header carrying the CoinMarketCap API key (`X-CMC_PRO_API_KEY`).
/// `HeaderMap` keys must be lower-case.
pub const API_KEY_HEADER: &str = "x-cmc_pro_api_key";
const ACCEPTS_HEADER: &str = "accepts";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the latest-quotes client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Production latest-quotes endpoint.
    pub endpoint: String,
    /// Sandbox endpoint, used when `sandbox` is set.
    pub sandbox_endpoint: String,
    pub sandbox: bool,
    /// Environment variable holding the API key.
    pub api_key_env: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://pro-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest"
                .to_string(),
            sandbox_endpoint:
                "https://sandbox-api.coinmarketcap.com/v1/cryptocurrency/quotes/latest"
                    .to_string(),
            sandbox: false,
            api_key_env: "CRYPTO_API_KEY".to_string(),
        }
    }
}

/// Errors reading a [`QuoteConfig`] file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(String),
}

impl QuoteConfig {
    /// The endpoint requests go to, honouring `sandbox`.
    pub fn active_endpoint(&self) -> &str {
        if self.sandbox {
            &self.sandbox_endpoint
        } else {
            &self.endpoint
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// `reqwest`-backed transport for the latest-quotes endpoint.
pub struct HttpQuoteTransport {
    http_client: HttpClient,
    endpoint: String,
}

impl HttpQuoteTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &QuoteConfig) -> Self {
        Self::new(config.active_endpoint())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn create_headers(api_key: &str) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPTS_HEADER, HeaderValue::from_static("application/json"));

        let key_value = HeaderValue::from_str(api_key)
            .map_err(|e| FetchError::Transport(format!("Failed to create API key header: {}", e)))?;
        headers.insert(API_KEY_HEADER, key_value);

        Ok(headers)
    }
}

#[async_trait]
impl QuoteTransport for HttpQuoteTransport {
    async fn get_latest(&self, id: u32, api_key: &str) -> Result<String, FetchError> {
        let headers = Self::create_headers(api_key)?;
        debug!(endpoint = %self.endpoint, id, "Requesting latest quote");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("id", id.to_string())])
            .headers(headers)
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = api_error_message(&body);
            warn!(status = status.as_u16(), message = %message, "Quote request rejected");
            return Err(FetchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }
}
