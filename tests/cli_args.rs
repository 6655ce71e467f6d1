//! Integration tests for the command-line modes
//!
//! Runs the binary in `--once` and `--list` mode against a temporary cache
//! directory. The endpoint points at a closed local port, so any test that
//! succeeds did so without a network call.

use std::path::Path;
use std::process::Command;

use chrono::{Duration, Utc};
use rateconv::cache::{CacheManager, RateCache, RATES_KEY};
use rateconv::data::{Rate, RateTable};
use tempfile::TempDir;

/// An endpoint nothing listens on
const UNREACHABLE: &str = "http://127.0.0.1:9/api/v3/exchange_rates";

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_rateconv"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute rateconv")
}

fn run_offline(cache_dir: &Path, args: &[&str]) -> std::process::Output {
    let dir = cache_dir.to_str().expect("utf-8 temp path");
    let mut all = vec!["--endpoint", UNREACHABLE, "--cache-dir", dir];
    all.extend_from_slice(args);
    run_cli(&all)
}

fn sample_table() -> RateTable {
    RateTable::from_rates([
        ("btc", Rate::new(1.0)),
        ("usd", Rate::new(50000.0)),
        (
            "eur",
            Rate {
                value: 46000.0,
                name: Some("Euro".to_string()),
                unit: Some("€".to_string()),
            },
        ),
    ])
    .unwrap()
}

/// Creates a cache directory holding `sample_table`, fetched `age` ago
fn seeded_cache(age: Duration) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let cache = RateCache::new(Some(CacheManager::with_dir(temp_dir.path().to_path_buf())));
    cache
        .store(&sample_table(), Utc::now() - age)
        .expect("seed cache");
    temp_dir
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rateconv"), "Help should mention rateconv");
    assert!(stdout.contains("--once"), "Help should mention --once flag");
    assert!(stdout.contains("--from"), "Help should mention --from flag");
}

#[test]
fn test_negative_amount_prints_error_and_exits() {
    let output = run_cli(&["--once", "--amount", "-5"]);
    assert!(!output.status.success(), "Expected negative amount to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid amount"), "stderr: {}", stderr);
}

#[test]
fn test_once_with_fresh_cache_needs_no_network() {
    let cache_dir = seeded_cache(Duration::seconds(1));

    let output = run_offline(
        cache_dir.path(),
        &["--once", "--amount", "2", "--from", "BTC", "--to", "usd"],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);
    assert_eq!(stdout.trim(), "2 BTC = 100000.0000 USD");
}

#[test]
fn test_once_with_stale_cache_fetches() {
    let cache_dir = seeded_cache(Duration::minutes(5));

    let output = run_offline(cache_dir.path(), &["--once"]);

    assert!(!output.status.success(), "stale cache should force a fetch");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"), "stderr: {}", stderr);
}

#[test]
fn test_once_without_cache_reports_network_error() {
    let cache_dir = TempDir::new().unwrap();

    let output = run_offline(cache_dir.path(), &["--once"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Network error"), "stderr: {}", stderr);
}

#[test]
fn test_once_with_malformed_cache_does_not_panic() {
    let cache_dir = TempDir::new().unwrap();
    CacheManager::with_dir(cache_dir.path().to_path_buf())
        .set(RATES_KEY, "{definitely not json")
        .unwrap();

    let output = run_offline(cache_dir.path(), &["--once"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(!stderr.contains("panicked"), "stderr: {}", stderr);
}

#[test]
fn test_once_unknown_currency_fails() {
    let cache_dir = seeded_cache(Duration::seconds(1));

    let output = run_offline(cache_dir.path(), &["--once", "--from", "doge"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown currency: DOGE"), "stderr: {}", stderr);
}

#[test]
fn test_list_prints_all_currencies() {
    let cache_dir = seeded_cache(Duration::seconds(1));

    let output = run_offline(cache_dir.path(), &["--list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let codes: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(codes, vec!["BTC", "EUR", "USD"]);
    assert!(stdout.contains("Euro"));
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use rateconv::cli::{Cli, RunMode, StartupConfig};

    #[test]
    fn test_cli_no_args_is_interactive() {
        let cli = Cli::parse_from(["rateconv"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, RunMode::Interactive);
        assert_eq!(config.amount, 1.0);
    }

    #[test]
    fn test_cli_currency_codes_are_lowercased() {
        let cli = Cli::parse_from(["rateconv", "--from", "ETH", "--to", "EUR"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.from, "eth");
        assert_eq!(config.to, "eur");
    }

    #[test]
    fn test_cli_rejects_non_numeric_amount() {
        assert!(Cli::try_parse_from(["rateconv", "--amount", "lots"]).is_err());
    }
}
