//! market-fetch command line.
//!
//! ```text
//! market-fetch [--config FILE] market AAPL
//! market-fetch forex usd
//! market-fetch news tech
//! market-fetch watch --symbols AAPL,MSFT --interval-secs 10
//! market-fetch check-config
//! ```
//!
//! Without `--config`, settings come from defaults plus `MARKET_API_BASE_URL`,
//! `MARKET_API_KEY` and `ENCRYPTION_KEY_V1`.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use market_fetch::config::{load_config, load_from_env, ClientConfig};
use market_fetch::lifecycle::{signals, Shutdown};
use market_fetch::observability::{logging, metrics};
use market_fetch::{FetchClient, FetchError};

#[derive(Debug, Parser)]
#[command(name = "market-fetch")]
#[command(about = "Resilient client for market, forex and news data", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch market data for a symbol
    Market { symbol: String },
    /// Fetch exchange rates for a 3-letter base currency
    Forex { base_currency: String },
    /// Fetch financial news for a category
    News { category: String },
    /// Poll market data until interrupted
    Watch {
        #[arg(long, value_delimiter = ',', required = true)]
        symbols: Vec<String>,

        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
    },
    /// Validate configuration and print it with secrets redacted
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path),
        None => load_from_env(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::from(2);
        }
    };

    logging::init_logging(&config.observability);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "market-fetch starting");

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::CheckConfig = command {
        println!("{}", toml::to_string_pretty(&config.redacted())?);
        return Ok(());
    }

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let client = FetchClient::new(config)?;

    let outcome = match command {
        Commands::Market { symbol } => print_result(client.fetch_market_data(&symbol).await),
        Commands::Forex { base_currency } => {
            print_result(client.fetch_exchange_rates(&base_currency).await)
        }
        Commands::News { category } => print_result(client.fetch_financial_news(&category).await),
        Commands::Watch {
            symbols,
            interval_secs,
        } => {
            watch(&client, &symbols, Duration::from_secs(interval_secs)).await;
            Ok(())
        }
        Commands::CheckConfig => Ok(()),
    };

    client.destroy();
    outcome
}

fn print_result<T: Serialize>(result: Result<T, FetchError>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Ok(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
            Ok(())
        }
        Err(e) => {
            let body = serde_json::json!({
                "code": e.code(),
                "message": e.to_string(),
                "details": e.details(),
            });
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            Err(e.into())
        }
    }
}

async fn watch(client: &FetchClient, symbols: &[String], interval: Duration) {
    let shutdown = Shutdown::new();
    let mut stop = shutdown.subscribe();
    let mut ticker = tokio::time::interval(interval);

    tracing::info!(symbols = ?symbols, interval_secs = interval.as_secs(), "Watching market data");

    let poll = async {
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for symbol in symbols {
                        match client.fetch_market_data(symbol).await {
                            Ok(data) => tracing::info!(
                                symbol = %data.symbol,
                                price = data.price,
                                volume = data.volume,
                                "Quote"
                            ),
                            Err(e) => tracing::warn!(
                                symbol = %symbol,
                                code = %e.code(),
                                error = %e,
                                "Quote unavailable"
                            ),
                        }
                    }
                }
                _ = stop.recv() => break,
            }
        }
    };

    tokio::join!(signals::shutdown_on_ctrl_c(&shutdown), poll);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_interval_must_be_positive() {
        let err = Cli::try_parse_from(["market-fetch", "watch", "--symbols", "AAPL", "--interval-secs", "0"]);
        assert!(err.is_err());

        let cli = Cli::try_parse_from(["market-fetch", "watch", "--symbols", "AAPL,MSFT"]).unwrap();
        match cli.command {
            Commands::Watch {
                symbols,
                interval_secs,
            } => {
                assert_eq!(symbols, vec!["AAPL", "MSFT"]);
                assert_eq!(interval_secs, 10);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["market-fetch", "market", "AAPL", "--config", "client.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("client.toml")));
        assert!(matches!(cli.command, Commands::Market { symbol } if symbol == "AAPL"));
    }
}
