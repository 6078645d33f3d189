//! Configuration for the MCAdmin panel client
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `MCADMIN_`-prefixed environment variables. CLI flags are applied
//! on top by the binary.
//!
//! # Configuration File Format
//!
//! ```toml
//! base_url = "http://localhost:5000"
//! session_cookie = "session=..."
//! tick_interval_ms = 1000
//! max_input_length = 255
//! jvm_args = "-Xmx2G"
//! versions = ["minecraft_server-1.20.1.jar", "minecraft_server-23w31a.jar"]
//!
//! [reconnect]
//! enabled = false
//! initial_delay_secs = 1
//! max_delay_secs = 60
//! ```
//!
//! Environment overrides use `__` for nesting, e.g. `MCADMIN_RECONNECT__ENABLED=true`.

use crate::error::Result;
use crate::protocol::{CONSOLE_PANEL_PAGE, CONSOLE_PANEL_STREAM, STATUS_PANEL_PAGE, STATUS_PANEL_STREAM};
use crate::stream::ReconnectPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Environment variable prefix
const ENV_PREFIX: &str = "MCADMIN";

/// Longest console line the panel backend accepts
pub const DEFAULT_MAX_INPUT_LENGTH: usize = 255;

/// Complete client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Panel base URL (scheme, host, port)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Console page path (POST target for console input)
    #[serde(default = "default_console_page")]
    pub console_page: String,

    /// Status page path (POST target for power actions)
    #[serde(default = "default_status_page")]
    pub status_page: String,

    /// Console SSE endpoint path
    #[serde(default = "default_console_stream")]
    pub console_stream: String,

    /// Status SSE endpoint path
    #[serde(default = "default_status_stream")]
    pub status_stream: String,

    /// Flask session cookie, sent as `Cookie` header
    #[serde(default)]
    pub session_cookie: Option<String>,

    /// Uptime ticker interval
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Longest console input line accepted client-side
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,

    /// JVM arguments sent with `turn_on`
    #[serde(default)]
    pub jvm_args: Option<String>,

    /// Known server jar names for the version picker
    #[serde(default)]
    pub versions: Vec<String>,

    /// Stream reconnection settings
    #[serde(default)]
    pub reconnect: ReconnectSettings,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            console_page: default_console_page(),
            status_page: default_status_page(),
            console_stream: default_console_stream(),
            status_stream: default_status_stream(),
            session_cookie: None,
            tick_interval_ms: default_tick_interval_ms(),
            max_input_length: default_max_input_length(),
            jvm_args: None,
            versions: Vec::new(),
            reconnect: ReconnectSettings::default(),
        }
    }
}

/// Stream reconnection settings
///
/// Disabled by default: a dropped stream stays closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectSettings {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    #[serde(default = "default_max_delay_secs")]
    pub max_delay_secs: u64,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_delay_secs: default_initial_delay_secs(),
            max_delay_secs: default_max_delay_secs(),
        }
    }
}

impl ReconnectSettings {
    /// Reconnect policy for stream listeners
    pub fn policy(&self) -> ReconnectPolicy {
        if self.enabled {
            ReconnectPolicy::Backoff {
                initial: Duration::from_secs(self.initial_delay_secs.max(1)),
                max: Duration::from_secs(self.max_delay_secs.max(self.initial_delay_secs)),
            }
        } else {
            ReconnectPolicy::Never
        }
    }
}

impl PanelConfig {
    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading panel config from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<PanelConfig>()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<PanelConfig>()?;

        Ok(config)
    }

    /// Absolute URL for a panel path
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn console_stream_url(&self) -> String {
        self.url_for(&self.console_stream)
    }

    pub fn status_stream_url(&self) -> String {
        self.url_for(&self.status_stream)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_console_page() -> String {
    CONSOLE_PANEL_PAGE.to_string()
}

fn default_status_page() -> String {
    STATUS_PANEL_PAGE.to_string()
}

fn default_console_stream() -> String {
    CONSOLE_PANEL_STREAM.to_string()
}

fn default_status_stream() -> String {
    STATUS_PANEL_STREAM.to_string()
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_max_input_length() -> usize {
    DEFAULT_MAX_INPUT_LENGTH
}

fn default_initial_delay_secs() -> u64 {
    1
}

fn default_max_delay_secs() -> u64 {
    60
}
