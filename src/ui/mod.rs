//! UI rendering module for rateconv
//!
//! Rendering for the terminal user interface, built on ratatui.

pub mod converter;
pub mod help_overlay;

use ratatui::Frame;

use crate::app::App;

/// Renders the converter and, when requested, the help overlay on top
pub fn render(frame: &mut Frame, app: &App) {
    converter::render(frame, app);
    if app.show_help {
        help_overlay::render(frame);
    }
}
