//! Color palette for the panel client

use mcadmin_panel::ConnectionState;
use ratatui::style::Color;

/// Color palette for panel elements
pub struct PanelColors;

impl PanelColors {
    /// Server running, stream open
    pub const SUCCESS: Color = Color::Green;

    /// Connecting, pending
    pub const WARNING: Color = Color::Yellow;

    /// Server stopped, stream closed
    pub const ERROR: Color = Color::Red;

    /// Labels and hints
    pub const IDLE: Color = Color::Gray;

    /// Highlighted selection
    pub const HIGHLIGHT: Color = Color::Cyan;

    /// Color for a stream connection state
    pub fn connection(state: ConnectionState) -> Color {
        match state {
            ConnectionState::Connecting => Self::WARNING,
            ConnectionState::Open => Self::SUCCESS,
            ConnectionState::ClosedError => Self::ERROR,
        }
    }

    /// Color for a status label (`ON` / `OFF` / pending)
    pub fn power(label: &str) -> Color {
        match label {
            "ON" => Self::SUCCESS,
            "OFF" => Self::ERROR,
            _ => Self::IDLE,
        }
    }
}

/// Short text for a stream connection state
pub fn connection_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Connecting => "connecting",
        ConnectionState::Open => "live",
        ConnectionState::ClosedError => "disconnected",
    }
}
