//! Panel wire protocol
//!
//! Endpoint paths, the console sentinel, status snapshots and the JSON bodies
//! posted back to the panel pages.

use serde::{Deserialize, Deserializer, Serialize};

/// Console page; console input is posted here
pub const CONSOLE_PANEL_PAGE: &str = "/panel/console";

/// Status page; power actions are posted here
pub const STATUS_PANEL_PAGE: &str = "/panel/status";

/// Console SSE endpoint
pub const CONSOLE_PANEL_STREAM: &str = "/panel/console/stream";

/// Status SSE endpoint
pub const STATUS_PANEL_STREAM: &str = "/panel/status/stream";

/// Streamed on the console channel instead of output while the server is down
pub const SERVER_NOT_RUNNING_TOKEN: &str = "mcadmin:err:server_not_running";

/// Console line rendered for [`SERVER_NOT_RUNNING_TOKEN`]
pub const SERVER_NOT_RUNNING_LINE: &str = "Server is not running";

/// Logged when a stream closes on error
pub const EVENTSOURCE_DISCONNECT_MSG: &str = "The EventSource was closed due to an error. \
This could mean that you lost connection to the console or that the server administration \
software was shut down.";

/// Version label when the snapshot carries no version
pub const VERSION_PLACEHOLDER: &str = "N/A";

/// Message on the console stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleMessage {
    /// Ordinary console output
    Line(String),
    /// Server process is not running
    ServerNotRunning,
}

impl ConsoleMessage {
    /// Classify a raw console payload
    pub fn parse(data: &str) -> Self {
        if data == SERVER_NOT_RUNNING_TOKEN {
            ConsoleMessage::ServerNotRunning
        } else {
            ConsoleMessage::Line(data.to_string())
        }
    }

    /// Text appended to the console log
    pub fn display_text(&self) -> &str {
        match self {
            ConsoleMessage::Line(text) => text,
            ConsoleMessage::ServerNotRunning => SERVER_NOT_RUNNING_LINE,
        }
    }
}

/// Status snapshot pushed on the status stream
///
/// Unknown fields are ignored; missing counters default to zero. A stopped
/// server reports its uptime as `null` or `-1`, both of which read as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub is_server_running: bool,

    /// Server uptime in seconds, `None` when unknown
    #[serde(default, deserialize_with = "deserialize_uptime")]
    pub uptime: Option<i64>,

    /// Highest number of simultaneously connected players
    #[serde(default)]
    pub peak_activity: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
}

impl StatusSnapshot {
    /// Parse a status stream payload
    pub fn parse(data: &str) -> serde_json::Result<Self> {
        serde_json::from_str(data)
    }
}

fn deserialize_uptime<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.filter(|seconds| *seconds >= 0))
}

/// Body posted to the console page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleInput {
    pub input_line: String,
}

/// Power action understood by the status page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerAction {
    TurnOn,
    TurnOff,
}

impl PowerAction {
    /// Action that flips the given power state
    pub fn toggle_from(is_running: bool) -> Self {
        if is_running {
            PowerAction::TurnOff
        } else {
            PowerAction::TurnOn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerAction::TurnOn => "turn_on",
            PowerAction::TurnOff => "turn_off",
        }
    }
}

/// Body posted to the status page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRequest {
    pub action: PowerAction,

    /// Only meaningful with `turn_on`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jvm_args: Option<String>,
}

impl PowerRequest {
    pub fn new(action: PowerAction) -> Self {
        Self {
            action,
            jvm_args: None,
        }
    }

    /// Attach JVM arguments; dropped for `turn_off`
    pub fn with_jvm_args(mut self, jvm_args: Option<String>) -> Self {
        self.jvm_args = match self.action {
            PowerAction::TurnOn => jvm_args.filter(|args| !args.trim().is_empty()),
            PowerAction::TurnOff => None,
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sentinel_is_recognized() {
        let msg = ConsoleMessage::parse(SERVER_NOT_RUNNING_TOKEN);
        assert_eq!(msg, ConsoleMessage::ServerNotRunning);
        assert_eq!(msg.display_text(), "Server is not running");
    }

    #[test]
    fn test_sentinel_must_match_exactly() {
        let raw = format!("{} ", SERVER_NOT_RUNNING_TOKEN);
        assert_eq!(ConsoleMessage::parse(&raw), ConsoleMessage::Line(raw.clone()));
    }

    #[test]
    fn test_snapshot_ignores_unknown_fields() {
        let snapshot = StatusSnapshot::parse(
            r#"{"is_server_running": true, "uptime": 90061, "peak_activity": 7,
                "server_version": "1.20.1", "motd": "hello"}"#,
        )
        .unwrap();

        assert!(snapshot.is_server_running);
        assert_eq!(snapshot.uptime, Some(90061));
        assert_eq!(snapshot.peak_activity, 7);
        assert_eq!(snapshot.server_version.as_deref(), Some("1.20.1"));
    }

    #[test]
    fn test_snapshot_without_version() {
        let snapshot =
            StatusSnapshot::parse(r#"{"is_server_running": false, "uptime": 0, "peak_activity": 3}"#)
                .unwrap();
        assert_eq!(snapshot.server_version, None);
        assert_eq!(snapshot.uptime, Some(0));
        assert!(StatusSnapshot::parse("not json").is_err());
    }

    #[test]
    fn test_snapshot_unknown_uptime() {
        for raw in [
            r#"{"is_server_running": false, "uptime": -1, "peak_activity": 3}"#,
            r#"{"is_server_running": false, "uptime": null, "peak_activity": 3}"#,
            r#"{"is_server_running": false, "peak_activity": 3}"#,
        ] {
            let snapshot = StatusSnapshot::parse(raw).unwrap();
            assert!(!snapshot.is_server_running, "{}", raw);
            assert_eq!(snapshot.uptime, None, "{}", raw);
            assert_eq!(snapshot.peak_activity, 3, "{}", raw);
        }
    }

    #[test]
    fn test_power_request_body() {
        let body = serde_json::to_value(PowerRequest::new(PowerAction::TurnOff)).unwrap();
        assert_eq!(body, json!({"action": "turn_off"}));

        let body = serde_json::to_value(
            PowerRequest::new(PowerAction::TurnOn).with_jvm_args(Some("-Xmx2G".to_string())),
        )
        .unwrap();
        assert_eq!(body, json!({"action": "turn_on", "jvm_args": "-Xmx2G"}));
    }

    #[test]
    fn test_jvm_args_dropped_for_turn_off() {
        let request =
            PowerRequest::new(PowerAction::TurnOff).with_jvm_args(Some("-Xmx2G".to_string()));
        assert_eq!(request.jvm_args, None);
    }

    #[test]
    fn test_console_input_body() {
        let body = serde_json::to_string(&ConsoleInput {
            input_line: "say hi".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"input_line":"say hi"}"#);
    }
}
