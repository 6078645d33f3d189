//! MCAdmin Panel - Terminal client for the MCAdmin server administration panel
//!
//! Consumes the panel's Server-Sent Event streams and posts commands back to it:
//! - Live console output with command submission
//! - Server status (power state, uptime, peak activity, version) with power toggle
//! - Server version picker and form field validation
//!
//! # Architecture
//!
//! The library holds one controller per panel plus the plumbing they share:
//! - **Protocol**: Wire constants, snapshots and request bodies
//! - **Stream**: SSE listener with explicit connection state
//! - **Request**: Result-returning JSON POST seam
//! - **Panels**: Console, status and version form controllers
//!
//! Controllers produce view models; the `mcadmin-panel` binary renders them
//! with ratatui and owns the event loop.
//!
//! # Example
//!
//! ```ignore
//! use mcadmin_panel::{HttpRequester, PanelConfig, StatusPanel, StreamListener};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = PanelConfig::load(None)?;
//!     let requester = std::sync::Arc::new(HttpRequester::new(&config)?);
//!     let mut status = StatusPanel::new(requester).page(config.status_page.clone());
//!
//!     let mut stream = StreamListener::from_config(config.status_stream_url(), &config).open()?;
//!     while let Some(event) = stream.recv().await {
//!         status.handle_stream_event(event);
//!     }
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod config;
pub mod console;
pub mod error;
pub mod forms;
pub mod protocol;
pub mod request;
pub mod status;
pub mod stream;
pub mod versions;

// Re-export commonly used types
pub use clock::{format_uptime, Clock, ClockState};
pub use config::{PanelConfig, ReconnectSettings};
pub use console::{ConsoleLog, ConsolePanel};
pub use error::{PanelError, Result};
pub use forms::{Constraint, FieldConstraints, FieldState, FieldValidity};
pub use protocol::{ConsoleInput, ConsoleMessage, PowerAction, PowerRequest, StatusSnapshot};
pub use request::{HttpRequester, PanelRequester, RequestOutcome};
pub use status::{StatusPanel, StatusView};
pub use stream::{ConnectionState, ReconnectPolicy, StreamEvent, StreamHandle, StreamListener};
pub use versions::{VersionCatalog, VersionEntry, VersionForm, VersionVisibility};
