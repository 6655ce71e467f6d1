//! Converter screen rendering
//!
//! Renders the amount field, the two currency selectors, the converted result
//! and a status line with rate freshness or the current fetch error.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, Field};
use crate::convert::format_amount;

/// Placeholder shown while a conversion is pending
const PENDING: &str = "...";

/// Border style for a field, highlighted when focused
fn field_style(app: &App, field: Field) -> Style {
    if app.focus == field {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Renders the converter screen
///
/// # Arguments
/// * `frame` - The ratatui Frame to render to
/// * `app` - The application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(3), // Amount
            Constraint::Length(3), // From
            Constraint::Length(3), // To
            Constraint::Length(3), // Result
            Constraint::Min(1),    // Status
            Constraint::Length(1), // Help text
        ])
        .split(area);

    let title = Paragraph::new(Line::from(Span::styled(
        "RATECONV  Currency Converter",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(title, chunks[0]);

    render_amount(frame, app, chunks[1]);
    render_currency(frame, app, Field::From, chunks[2]);
    render_currency(frame, app, Field::To, chunks[3]);
    render_result(frame, app, chunks[4]);
    render_status(frame, app, chunks[5]);

    let help = Paragraph::new(Line::from(Span::styled(
        "Tab: next field  ↑/↓: currency  s: swap  r: refresh  ?: help  q: quit",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(help, chunks[6]);
}

fn render_amount(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(app.amount_input.clone())];
    if app.focus == Field::Amount {
        spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .title(" Amount ")
        .borders(Borders::ALL)
        .border_style(field_style(app, Field::Amount));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_currency(frame: &mut Frame, app: &App, field: Field, area: Rect) {
    let (title, code) = match field {
        Field::To => (" To ", &app.to),
        _ => (" From ", &app.from),
    };

    let rates = app.scheduler.rates();
    let mut spans = vec![Span::styled(
        code.to_uppercase(),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    match rates.get(code) {
        Some(rate) => {
            if let Some(name) = &rate.name {
                spans.push(Span::styled(
                    format!("  {}", name),
                    Style::default().fg(Color::Gray),
                ));
            }
        }
        None if !rates.is_empty() => {
            spans.push(Span::styled(
                "  not in rate table",
                Style::default().fg(Color::Red),
            ));
        }
        None => {}
    }

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(field_style(app, field));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_result(frame: &mut Frame, app: &App, area: Rect) {
    let amount_str = app
        .amount()
        .map(|a| a.to_string())
        .unwrap_or_else(|| app.amount_input.clone());
    let result_str = app
        .converted()
        .map(format_amount)
        .unwrap_or_else(|| PENDING.to_string());

    let line = Line::from(vec![
        Span::raw(format!("{} {} = ", amount_str, app.from.to_uppercase())),
        Span::styled(
            result_str,
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}", app.to.to_uppercase())),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(
        Paragraph::new(line).block(block).alignment(Alignment::Center),
        area,
    );
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let scheduler = &app.scheduler;
    let mut lines = Vec::new();

    if let Some(error) = scheduler.error() {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let freshness = match scheduler.last_update() {
        Some(at) => format!(
            "Rates updated {} ({} currencies)",
            at.with_timezone(&Local).format("%H:%M:%S"),
            scheduler.rates().len()
        ),
        None => "No rates yet".to_string(),
    };
    lines.push(Line::from(Span::styled(
        freshness,
        Style::default().fg(Color::DarkGray),
    )));

    if scheduler.is_fetching() {
        lines.push(Line::from(Span::styled(
            "Refreshing rates...",
            Style::default().fg(Color::Cyan),
        )));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheManager, RateCache};
    use crate::cli::StartupConfig;
    use crate::data::{Rate, RatesClient, RateSource, RateTable};
    use crate::refresh::{RateScheduler, RefreshConfig};
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_app(cached: Option<RateTable>) -> (App, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = RateCache::new(Some(CacheManager::with_dir(temp_dir.path().to_path_buf())));
        let source: Arc<dyn RateSource> = Arc::new(RatesClient::with_url("http://127.0.0.1:9/"));
        let mut scheduler = RateScheduler::new(source, cache.clone(), RefreshConfig::default());

        if let Some(table) = cached {
            cache.store(&table, Utc::now()).unwrap();
            scheduler.initial_tick();
        }

        let config = StartupConfig {
            amount: 2.0,
            ..StartupConfig::default()
        };
        (App::new(scheduler, &config), temp_dir)
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render(frame, app);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_converted_amount() {
        let table = RateTable::from_rates([
            ("btc", Rate::new(1.0)),
            ("usd", Rate {
                value: 50000.0,
                name: Some("US Dollar".to_string()),
                unit: Some("$".to_string()),
            }),
        ])
        .unwrap();
        let (app, _temp_dir) = create_test_app(Some(table));

        let content = render_to_string(&app);

        assert!(content.contains("2 BTC = 100000.0000 USD"), "content: {}", content);
        assert!(content.contains("US Dollar"));
        assert!(content.contains("Rates updated"));
    }

    #[test]
    fn test_renders_pending_without_rates() {
        let (app, _temp_dir) = create_test_app(None);

        let content = render_to_string(&app);

        assert!(content.contains("2 BTC = ... USD"));
        assert!(content.contains("No rates yet"));
    }

    #[test]
    fn test_marks_unknown_currency() {
        let table = RateTable::from_rates([("btc", Rate::new(1.0))]).unwrap();
        let (app, _temp_dir) = create_test_app(Some(table));

        let content = render_to_string(&app);

        assert!(content.contains("not in rate table"));
        assert!(content.contains("= ..."));
    }
}
