//! Error types for the MCAdmin panel client
//!
//! Structured error definitions with thiserror; the binary propagates them
//! through anyhow.

use thiserror::Error;

/// Main error type for panel operations
#[derive(Error, Debug)]
pub enum PanelError {
    /// Event stream failed to open or dropped
    #[error("Transport error: {0}")]
    Transport(String),

    /// Panel answered a request with a non-success status
    #[error("Request failed with HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// HTTP request could not be sent
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Form input rejected before sending
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for panel operations
pub type Result<T> = std::result::Result<T, PanelError>;

/// Convert anyhow::Error to PanelError
impl From<anyhow::Error> for PanelError {
    fn from(err: anyhow::Error) -> Self {
        PanelError::Other(err.to_string())
    }
}

impl PanelError {
    /// True when the stream is gone and will not come back on its own
    pub fn is_transport(&self) -> bool {
        matches!(self, PanelError::Transport(_))
    }
}
