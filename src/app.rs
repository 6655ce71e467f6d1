//! Application state management for rateconv
//!
//! This module holds the converter's UI state (amount, selected currencies,
//! focus) and routes keyboard input. Rates, errors and refreshes are owned by
//! the `RateScheduler` the app wraps.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cli::StartupConfig;
use crate::refresh::RateScheduler;

/// Input field that currently receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    From,
    To,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Amount => Field::From,
            Field::From => Field::To,
            Field::To => Field::Amount,
        }
    }

    fn prev(self) -> Self {
        match self {
            Field::Amount => Field::To,
            Field::From => Field::Amount,
            Field::To => Field::From,
        }
    }
}

/// Main application struct
pub struct App {
    /// Rate owner and refresh cycle
    pub scheduler: RateScheduler,
    /// Raw text of the amount field
    pub amount_input: String,
    /// Selected source currency (lowercase code)
    pub from: String,
    /// Selected target currency (lowercase code)
    pub to: String,
    /// Field receiving keyboard input
    pub focus: Field,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
}

impl App {
    /// Creates the app around a scheduler, seeding inputs from the startup config
    pub fn new(scheduler: RateScheduler, config: &StartupConfig) -> Self {
        Self {
            scheduler,
            amount_input: format!("{}", config.amount),
            from: config.from.clone(),
            to: config.to.clone(),
            focus: Field::Amount,
            should_quit: false,
            show_help: false,
        }
    }

    /// The amount entered, if it is a valid non-negative number
    pub fn amount(&self) -> Option<f64> {
        let amount: f64 = self.amount_input.trim().parse().ok()?;
        (amount.is_finite() && amount >= 0.0).then_some(amount)
    }

    /// Converted amount, or `None` while pending
    pub fn converted(&self) -> Option<f64> {
        self.scheduler.convert(self.amount()?, &self.from, &self.to)
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`, `Esc` or `Ctrl-C`: Quit
    /// - `Tab` / `Shift-Tab`: Move focus between fields
    /// - `0`-`9`, `.`, `Backspace`: Edit the amount (amount field)
    /// - `Up`/`k`, `Down`/`j`: Cycle currency (currency fields)
    /// - `s`: Swap currencies
    /// - `r`: Refresh rates now
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
            }
            KeyCode::Char(c) if self.focus == Field::Amount && (c.is_ascii_digit() || c == '.') => {
                self.push_amount_char(c);
            }
            KeyCode::Backspace if self.focus == Field::Amount => {
                self.amount_input.pop();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cycle_currency(false);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cycle_currency(true);
            }
            KeyCode::Char('s') => {
                self.swap_currencies();
            }
            KeyCode::Char('r') => {
                self.scheduler.periodic_tick();
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn push_amount_char(&mut self, c: char) {
        if c == '.' && self.amount_input.contains('.') {
            return;
        }
        self.amount_input.push(c);
    }

    /// Moves the focused currency selector through the table's codes
    fn cycle_currency(&mut self, forward: bool) {
        let codes: Vec<String> = self.scheduler.rates().codes().map(str::to_string).collect();
        if codes.is_empty() {
            return;
        }

        let selected = match self.focus {
            Field::From => &mut self.from,
            Field::To => &mut self.to,
            Field::Amount => return,
        };

        let next_index = match codes.iter().position(|code| code == selected) {
            Some(i) if forward => (i + 1) % codes.len(),
            Some(i) => (i + codes.len() - 1) % codes.len(),
            None if forward => 0,
            None => codes.len() - 1,
        };
        *selected = codes[next_index].clone();
    }

    pub fn swap_currencies(&mut self) {
        std::mem::swap(&mut self.from, &mut self.to);
    }
}
