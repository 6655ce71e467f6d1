//! rateconv - convert between crypto and fiat currencies
//!
//! Opens a terminal UI by default; `--once` and `--list` print a result and
//! exit. Rates are cached on disk and refreshed on a fixed interval.

use std::error::Error;
use std::io::{self, Stdout};
use std::panic;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use rateconv::app::App;
use rateconv::cache::{CacheManager, RateCache};
use rateconv::cli::{Cli, RunMode, StartupConfig};
use rateconv::convert::format_amount;
use rateconv::data::RatesClient;
use rateconv::logging;
use rateconv::refresh::RateScheduler;
use rateconv::ui;

/// How long the event loop waits for scheduler messages between input polls
const INPUT_POLL_INTERVAL: Duration = Duration::from_millis(100);

type AppResult<T> = Result<T, Box<dyn Error>>;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn build_client(endpoint: &str) -> AppResult<RatesClient> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("rateconv/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(RatesClient::with_url(endpoint).with_client(http))
}

/// Prints a single conversion
async fn run_once(mut scheduler: RateScheduler, config: &StartupConfig) -> AppResult<()> {
    scheduler.initial_tick();
    scheduler.wait_for_fetch().await;

    if let Some(error) = scheduler.error() {
        return Err(error.to_string().into());
    }

    for code in [&config.from, &config.to] {
        if !scheduler.rates().contains(code) {
            return Err(format!("Unknown currency: {}", code.to_uppercase()).into());
        }
    }

    let converted = scheduler
        .convert(config.amount, &config.from, &config.to)
        .ok_or("Conversion unavailable")?;

    println!(
        "{} {} = {} {}",
        config.amount,
        config.from.to_uppercase(),
        format_amount(converted),
        config.to.to_uppercase()
    );
    Ok(())
}

/// Prints every currency in the rate table
async fn run_list(mut scheduler: RateScheduler) -> AppResult<()> {
    scheduler.initial_tick();
    scheduler.wait_for_fetch().await;

    if let Some(error) = scheduler.error() {
        return Err(error.to_string().into());
    }

    for (code, rate) in scheduler.rates().iter() {
        println!(
            "{:<8} {:>20} {}",
            code.to_uppercase(),
            rate.value,
            rate.name.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> AppResult<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Yield to the runtime so fetch and timer tasks can make progress
        let message = tokio::select! {
            message = app.scheduler.next_message() => message,
            _ = tokio::time::sleep(INPUT_POLL_INTERVAL) => None,
        };
        if let Some(message) = message {
            app.scheduler.handle_message(message);
        }
    }
}

async fn run_interactive(mut scheduler: RateScheduler, config: &StartupConfig) -> AppResult<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    scheduler.start();
    let mut app = App::new(scheduler, config);
    let result = event_loop(&mut terminal, &mut app).await;
    app.scheduler.shutdown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

async fn run(config: StartupConfig) -> AppResult<()> {
    let cache_manager = config
        .cache_dir
        .clone()
        .map(CacheManager::with_dir)
        .or_else(CacheManager::new);

    match (config.mode, &cache_manager) {
        (RunMode::Interactive, Some(manager)) => logging::init_file(manager.dir()),
        (RunMode::Interactive, None) => {}
        _ => logging::init_stderr(),
    }

    let client = build_client(&config.endpoint)?;
    let scheduler = RateScheduler::new(
        Arc::new(client),
        RateCache::new(cache_manager),
        config.refresh.clone(),
    );

    match config.mode {
        RunMode::Interactive => run_interactive(scheduler, &config).await,
        RunMode::Once => run_once(scheduler, &config).await,
        RunMode::List => run_list(scheduler).await,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
