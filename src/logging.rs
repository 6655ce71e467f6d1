//! Tracing subscriber setup
//!
//! The interactive UI owns the terminal, so its logs go to a file in the cache
//! directory. One-shot modes log to stderr. `RUST_LOG` overrides the default
//! filter in both cases.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// File name of the log written by the interactive UI
pub const LOG_FILE: &str = "rateconv.log";

const DEFAULT_FILTER: &str = "rateconv=info";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Logs to stderr, warnings and above unless `RUST_LOG` says otherwise
pub fn init_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter("rateconv=warn"))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs to `rateconv.log` inside `dir`
///
/// Logging is silently disabled if the file cannot be opened.
pub fn init_file(dir: &Path) {
    let file = std::fs::create_dir_all(dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(LOG_FILE))
    });

    let Ok(file) = file else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(DEFAULT_FILTER))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}
