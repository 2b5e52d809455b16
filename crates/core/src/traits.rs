use async_trait::async_trait;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Registry Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading or querying the symbol registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Crypto not found: {0}")]
    NotFound(String),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Fetch Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while fetching a quote.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Crypto not found: {0}")]
    NotFound(String),
    #[error("Missing API key: set the {0} environment variable")]
    MissingCredential(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Registry unavailable: {0}")]
    Registry(String),
}

impl From<RegistryError> for FetchError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NotFound(symbol) => FetchError::NotFound(symbol),
            other => FetchError::Registry(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Quote Transport Trait
// ---------------------------------------------------------------------------

/// Performs the raw round-trip to the latest-quotes endpoint.
///
/// Implementations return the response body untouched; decoding and field
/// extraction happen in the fetcher.
#[async_trait]
pub trait QuoteTransport: Send + Sync {
    /// Request the latest quote for the currency with the given provider id.
    async fn get_latest(&self, id: u32, api_key: &str) -> Result<String, FetchError>;
}
