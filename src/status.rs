//! Status panel controller
//!
//! Renders the latest status snapshot and sends power toggles. The uptime
//! clock is resynchronized from every snapshot and ticks locally in between.

use crate::clock::Clock;
use crate::error::Result;
use crate::protocol::{PowerAction, PowerRequest, StatusSnapshot, STATUS_PANEL_PAGE, VERSION_PLACEHOLDER};
use crate::request::{PanelRequester, RequestOutcome};
use crate::stream::{ConnectionState, StreamEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Status label shown before the first snapshot
pub const STATUS_PENDING: &str = "...";

/// Rendered status panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    /// `Turn OFF` / `Turn ON`
    pub toggle_label: &'static str,
    /// `ON` / `OFF`
    pub status_label: &'static str,
    pub uptime: String,
    pub peak_activity: String,
    pub version: String,
    pub connection: ConnectionState,
}

/// Toggle button label for a power state
pub fn toggle_label(is_running: bool) -> &'static str {
    if is_running {
        "Turn OFF"
    } else {
        "Turn ON"
    }
}

/// Status label for a power state
pub fn status_label(is_running: bool) -> &'static str {
    if is_running {
        "ON"
    } else {
        "OFF"
    }
}

/// Status panel state and actions
pub struct StatusPanel<R: PanelRequester + ?Sized> {
    snapshot: Option<StatusSnapshot>,
    /// Power state as of the last snapshot
    is_server_on: bool,
    clock: Clock,
    connection: ConnectionState,
    requester: Arc<R>,
    page: String,
    jvm_args: Option<String>,
}

impl<R: PanelRequester + ?Sized> StatusPanel<R> {
    pub fn new(requester: Arc<R>) -> Self {
        Self {
            snapshot: None,
            is_server_on: false,
            clock: Clock::new(),
            connection: ConnectionState::Connecting,
            requester,
            page: STATUS_PANEL_PAGE.to_string(),
            jvm_args: None,
        }
    }

    /// Post target for power actions
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    /// JVM arguments sent with `turn_on`
    pub fn jvm_args(mut self, jvm_args: Option<String>) -> Self {
        self.jvm_args = jvm_args;
        self
    }

    /// Apply a snapshot: labels, cached power state, clock resync
    ///
    /// An unknown uptime puts the clock back to its placeholder.
    pub fn apply_snapshot(&mut self, snapshot: StatusSnapshot) {
        self.is_server_on = snapshot.is_server_running;
        self.clock.set_seconds(snapshot.uptime.unwrap_or(-1));
        self.snapshot = Some(snapshot);
    }

    /// Apply a raw status stream payload
    ///
    /// Unparseable payloads are logged and leave the display as it was.
    pub fn handle_message(&mut self, data: &str) {
        match StatusSnapshot::parse(data) {
            Ok(snapshot) => {
                debug!("Status snapshot: {:?}", snapshot);
                self.apply_snapshot(snapshot);
            }
            Err(e) => warn!("Ignoring malformed status payload {:?}: {}", data, e),
        }
    }

    /// Apply a stream event
    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Opened => {
                info!("Status stream open");
                self.connection = ConnectionState::Open;
            }
            StreamEvent::Message(data) => self.handle_message(&data),
            StreamEvent::Disconnected(reason) => {
                warn!("Status stream closed: {}", reason);
                self.connection = ConnectionState::ClosedError;
            }
        }
    }

    /// Advance the local uptime clock by one second
    pub fn tick(&self) {
        self.clock.tick();
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn snapshot(&self) -> Option<&StatusSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_server_on(&self) -> bool {
        self.is_server_on
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    /// Current view model
    pub fn view(&self) -> StatusView {
        let (status, peak_activity, version) = match &self.snapshot {
            Some(snapshot) => (
                status_label(snapshot.is_server_running),
                snapshot.peak_activity.to_string(),
                snapshot
                    .server_version
                    .clone()
                    .unwrap_or_else(|| VERSION_PLACEHOLDER.to_string()),
            ),
            None => (
                STATUS_PENDING,
                STATUS_PENDING.to_string(),
                VERSION_PLACEHOLDER.to_string(),
            ),
        };

        StatusView {
            toggle_label: toggle_label(self.is_server_on),
            status_label: status,
            uptime: self.clock.display(),
            peak_activity,
            version,
            connection: self.connection,
        }
    }

    /// Action the toggle button sends, from the cached power state
    pub fn toggle_action(&self) -> PowerAction {
        PowerAction::toggle_from(self.is_server_on)
    }

    /// Request body for the toggle button
    pub fn toggle_request(&self) -> PowerRequest {
        PowerRequest::new(self.toggle_action()).with_jvm_args(self.jvm_args.clone())
    }

    /// Send the toggle action to the status page
    pub async fn toggle_power(&self) -> Result<RequestOutcome> {
        send_power_request(self.requester.as_ref(), &self.page, self.toggle_request()).await
    }

    /// Shared requester, for sending actions off the UI loop
    pub fn requester(&self) -> Arc<R> {
        Arc::clone(&self.requester)
    }

    pub fn page_path(&self) -> &str {
        &self.page
    }
}

/// Post a power action body
pub async fn send_power_request<R: PanelRequester + ?Sized>(
    requester: &R,
    page: &str,
    request: PowerRequest,
) -> Result<RequestOutcome> {
    info!("Sending power action: {}", request.action.as_str());
    let body = serde_json::to_value(&request)?;
    requester.post_json(page, body).await
}
