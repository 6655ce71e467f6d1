//! Command-line interface parsing for rateconv
//!
//! Parses CLI arguments with clap and validates them into a `StartupConfig`.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::data::{canonical_code, DEFAULT_RATES_URL};
use crate::refresh::RefreshConfig;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The amount is negative or not a number
    #[error("Invalid amount: '{0}'. Amount must be a non-negative number")]
    InvalidAmount(f64),

    /// The refresh interval is zero
    #[error("Invalid interval: refresh interval must be at least 1 second")]
    InvalidInterval,

    /// A currency code is empty
    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),
}

/// rateconv - convert between crypto and fiat currencies with live rates
#[derive(Parser, Debug)]
#[command(name = "rateconv")]
#[command(about = "Currency converter with periodically refreshed exchange rates")]
#[command(version)]
pub struct Cli {
    /// Amount to convert
    #[arg(short, long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub amount: f64,

    /// Currency to convert from (case-insensitive code, e.g. btc)
    #[arg(short, long, default_value = "btc")]
    pub from: String,

    /// Currency to convert to (case-insensitive code, e.g. usd)
    #[arg(short, long, default_value = "usd")]
    pub to: String,

    /// Rate provider endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_RATES_URL)]
    pub endpoint: String,

    /// Refresh interval and cache freshness threshold, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 10)]
    pub interval: u64,

    /// Directory for cached rates and the log file
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Print a single conversion and exit instead of opening the UI
    #[arg(long, conflicts_with = "list")]
    pub once: bool,

    /// Print all available rates and exit
    #[arg(long)]
    pub list: bool,
}

/// How the binary runs after startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Interactive terminal UI
    #[default]
    Interactive,
    /// Print one conversion and exit
    Once,
    /// Print the rate table and exit
    List,
}

/// Validated configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub amount: f64,
    /// Canonical (lowercase) source currency
    pub from: String,
    /// Canonical (lowercase) target currency
    pub to: String,
    pub endpoint: String,
    pub cache_dir: Option<PathBuf>,
    pub refresh: RefreshConfig,
    pub mode: RunMode,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            amount: 1.0,
            from: "btc".to_string(),
            to: "usd".to_string(),
            endpoint: DEFAULT_RATES_URL.to_string(),
            cache_dir: None,
            refresh: RefreshConfig::default(),
            mode: RunMode::Interactive,
        }
    }
}

/// Parses a currency code argument into its canonical form
pub fn parse_currency_arg(s: &str) -> Result<String, CliError> {
    let code = canonical_code(s);
    if code.is_empty() {
        return Err(CliError::InvalidCurrency(s.to_string()));
    }
    Ok(code)
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the amount, interval or a currency is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if !cli.amount.is_finite() || cli.amount < 0.0 {
            return Err(CliError::InvalidAmount(cli.amount));
        }
        if cli.interval == 0 {
            return Err(CliError::InvalidInterval);
        }

        let mode = if cli.once {
            RunMode::Once
        } else if cli.list {
            RunMode::List
        } else {
            RunMode::Interactive
        };

        Ok(StartupConfig {
            amount: cli.amount,
            from: parse_currency_arg(&cli.from)?,
            to: parse_currency_arg(&cli.to)?,
            endpoint: cli.endpoint.clone(),
            cache_dir: cli.cache_dir.clone(),
            refresh: RefreshConfig {
                interval: Duration::from_secs(cli.interval),
                // One-shot modes never wait for the timer
                enabled: mode == RunMode::Interactive,
            },
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args_uses_defaults() {
        let cli = Cli::parse_from(["rateconv"]);
        assert_eq!(cli.amount, 1.0);
        assert_eq!(cli.from, "btc");
        assert_eq!(cli.to, "usd");
        assert_eq!(cli.endpoint, DEFAULT_RATES_URL);
        assert_eq!(cli.interval, 10);
        assert!(!cli.once);
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_parse_conversion_args() {
        let cli = Cli::parse_from(["rateconv", "--amount", "2.5", "--from", "ETH", "-t", "eur"]);
        assert_eq!(cli.amount, 2.5);
        assert_eq!(cli.from, "ETH");
        assert_eq!(cli.to, "eur");
    }

    #[test]
    fn test_cli_once_and_list_conflict() {
        let result = Cli::try_parse_from(["rateconv", "--once", "--list"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_currency_arg_lowercases() {
        assert_eq!(parse_currency_arg(" BTC ").unwrap(), "btc");
        assert!(parse_currency_arg("   ").is_err());
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert_eq!(config.mode, RunMode::Interactive);
        assert_eq!(config.from, "btc");
        assert_eq!(config.refresh.interval, Duration::from_secs(10));
    }

    #[test]
    fn test_startup_config_from_cli_interactive() {
        let cli = Cli::parse_from(["rateconv", "--from", "ETH", "--interval", "30"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, RunMode::Interactive);
        assert_eq!(config.from, "eth");
        assert_eq!(config.refresh.interval, Duration::from_secs(30));
        assert!(config.refresh.enabled);
    }

    #[test]
    fn test_startup_config_from_cli_once_disables_timer() {
        let cli = Cli::parse_from(["rateconv", "--once"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, RunMode::Once);
        assert!(!config.refresh.enabled);
    }

    #[test]
    fn test_startup_config_from_cli_list() {
        let cli = Cli::parse_from(["rateconv", "--list"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, RunMode::List);
    }

    #[test]
    fn test_startup_config_rejects_negative_amount() {
        let cli = Cli::parse_from(["rateconv", "--amount", "-3"]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid amount"));
    }

    #[test]
    fn test_startup_config_rejects_zero_interval() {
        let cli = Cli::parse_from(["rateconv", "--interval", "0"]);
        assert!(matches!(
            StartupConfig::from_cli(&cli),
            Err(CliError::InvalidInterval)
        ));
    }

    #[test]
    fn test_startup_config_accepts_zero_amount() {
        let cli = Cli::parse_from(["rateconv", "--amount", "0"]);
        assert_eq!(StartupConfig::from_cli(&cli).unwrap().amount, 0.0);
    }
}
