use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coinquote_core::Currency;
use coinquote_quotes::{PriceFetcher, QuoteConfig};
use coinquote_registry::{Registry, RegistrySource};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "coinquote")]
#[command(about = "Look up crypto tickers and fetch their latest USD quote from CoinMarketCap")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// TOML config file (endpoint, sandbox, api_key_env)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON id map to use instead of the bundled one
    #[arg(short, long)]
    registry: Option<PathBuf>,

    /// Override the latest-quotes endpoint
    #[arg(long, env = "COINQUOTE_ENDPOINT")]
    endpoint: Option<String>,

    /// Use the sandbox endpoint
    #[arg(long)]
    sandbox: bool,

    /// Abort if the registry fails to load instead of continuing empty
    #[arg(long)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the latest quote for one or more symbols
    Price {
        /// Ticker symbols (e.g. "BTC", "eth")
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a symbol to its provider id without calling the API
    Lookup {
        /// Ticker symbol
        symbol: String,
    },

    /// List every currency in the registry
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let config = load_config(&cli)?;
    let mut registry = open_registry(cli.registry.clone(), cli.strict)?;

    match cli.command {
        Commands::Price { symbols, json } => {
            run_price(registry, &config, &symbols, json).await?;
        }
        Commands::Lookup { symbol } => {
            let currency = registry.find_by_symbol(&symbol)?;
            println!("{} ({}) id={}", currency.symbol, currency.name, currency.id);
        }
        Commands::List => {
            println!("{:>6}  {:<8}  {}", "ID", "SYMBOL", "NAME");
            for currency in registry.iter() {
                println!("{:>6}  {:<8}  {}", currency.id, currency.symbol, currency.name);
            }
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<QuoteConfig> {
    let mut config = match &cli.config {
        Some(path) => QuoteConfig::from_toml_file(path)
            .with_context(|| format!("Loading config {}", path.display()))?,
        None => QuoteConfig::default(),
    };
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
        config.sandbox = false;
    }
    if cli.sandbox {
        config.sandbox = true;
    }
    tracing::debug!(endpoint = %config.active_endpoint(), "Quote config resolved");
    Ok(config)
}

fn open_registry(path: Option<PathBuf>, strict: bool) -> Result<Registry> {
    let source = path.map_or(RegistrySource::Bundled, RegistrySource::File);
    let (registry, loaded) = Registry::open(source);
    match loaded {
        Ok(count) => tracing::debug!(count, "Registry ready"),
        Err(e) if strict => return Err(e).context("Registry failed to load"),
        Err(e) => tracing::warn!(error = %e, "Continuing with an empty registry"),
    }
    Ok(registry)
}

async fn run_price(
    registry: Registry,
    config: &QuoteConfig,
    symbols: &[String],
    json: bool,
) -> Result<()> {
    let mut fetcher = PriceFetcher::from_config(registry, config);
    let results = fetcher.fetch_prices(symbols).await;

    let mut failures = 0;
    let mut fetched: Vec<Currency> = Vec::new();
    for (symbol, result) in results {
        match result {
            Ok(currency) => fetched.push(currency),
            Err(e) => {
                failures += 1;
                eprintln!("{}: {}", symbol, e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&fetched)?);
    } else {
        for currency in &fetched {
            print_currency(currency);
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} quotes failed", failures, symbols.len());
    }
    Ok(())
}

fn print_currency(currency: &Currency) {
    let stats = &currency.stats;
    let sep = "=".repeat(48);
    println!("{sep}");
    println!("  {} ({})  id={}", currency.name, currency.symbol, currency.id);
    println!("{sep}");
    println!("  Price:        ${:.4}", stats.price);
    println!("  Market Cap:   ${:.0}", stats.market_cap);
    println!("  Volume 24h:   ${}", stats.volume_24h);
    println!("  Change 1h:    {:+.2}%", stats.percent_change_1h);
    println!("  Change 24h:   {:+.2}%", stats.percent_change_24h);
    println!("  Change 7d:    {:+.2}%", stats.percent_change_7d);
    if let Some(updated) = stats.last_updated {
        println!("  Updated:      {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_requires_symbols() {
        assert!(Cli::try_parse_from(["coinquote", "price"]).is_err());
        assert!(Cli::try_parse_from(["coinquote", "price", "btc", "eth", "--json"]).is_ok());
    }

    #[test]
    fn test_endpoint_flag_overrides_default() {
        let cli = Cli::try_parse_from([
            "coinquote",
            "--endpoint",
            "http://localhost:9999/quotes",
            "list",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.active_endpoint(), "http://localhost:9999/quotes");
    }

    #[test]
    fn test_missing_registry_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let registry = open_registry(Some(path.clone()), false).unwrap();
        assert!(registry.is_empty());
        assert!(open_registry(Some(path), true).is_err());
    }

    #[test]
    fn test_config_file_and_sandbox_flag() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coinquote.toml");
        std::fs::write(&path, "api_key_env = \"CMC_KEY\"\n").unwrap();

        let cli = Cli::try_parse_from([
            "coinquote",
            "--config",
            path.to_str().unwrap(),
            "--sandbox",
            "list",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.api_key_env, "CMC_KEY");
        assert!(config.active_endpoint().starts_with("https://sandbox-api."));
    }
}
