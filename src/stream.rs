//! Panel event stream listener
//!
//! Subscribes to a panel SSE endpoint (`/panel/console/stream` or
//! `/panel/status/stream`) and forwards every payload to the owning panel
//! through an unbounded channel.
//!
//! # Architecture
//!
//! ```text
//! Panel backend
//!     ↓ (SSE data lines)
//! StreamListener task (this module)
//!     ↓ (StreamEvent over mpsc)
//! Panel controller (console / status)
//! ```
//!
//! # Disconnects
//!
//! A transport error or end of stream closes the connection, moves it to
//! [`ConnectionState::ClosedError`] and emits exactly one
//! [`StreamEvent::Disconnected`]. With [`ReconnectPolicy::Never`] (the default)
//! that state is terminal. [`ReconnectPolicy::Backoff`] reconnects with
//! exponential backoff:
//! - Base: `initial`
//! - Max: `max`
//! - Resets after a connection that reached the open state

use crate::config::PanelConfig;
use crate::error::{PanelError, Result};
use crate::protocol::EVENTSOURCE_DISCONNECT_MSG;
use eventsource_client as es;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

/// Connection state of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Open,
    ClosedError,
}

/// Event delivered to the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Connection established
    Opened,
    /// Raw `data` payload
    Message(String),
    /// Connection lost; carries the transport error text
    Disconnected(String),
}

/// What to do after a disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPolicy {
    /// Stay closed
    #[default]
    Never,
    /// Reconnect with exponential backoff
    Backoff { initial: Duration, max: Duration },
}

/// Builder for a panel stream subscription
#[derive(Debug, Clone)]
pub struct StreamListener {
    url: String,
    policy: ReconnectPolicy,
    cookie: Option<String>,
}

impl StreamListener {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            policy: ReconnectPolicy::Never,
            cookie: None,
        }
    }

    /// Listener for `url` using the configured cookie and reconnect policy
    pub fn from_config(url: impl Into<String>, config: &PanelConfig) -> Self {
        Self::new(url)
            .policy(config.reconnect.policy())
            .cookie(config.session_cookie.clone())
    }

    pub fn policy(mut self, policy: ReconnectPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session cookie sent with the stream request
    pub fn cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie;
        self
    }

    /// Open the stream and start forwarding events
    ///
    /// Fails immediately when the URL or headers are invalid; later transport
    /// errors arrive as [`StreamEvent::Disconnected`]. Must be called inside a
    /// tokio runtime.
    pub fn open(self) -> Result<StreamHandle> {
        let client = build_client(&self.url, self.cookie.as_deref())?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);

        info!("Opening panel stream: {}", self.url);
        let url = self.url.clone();
        let task = tokio::spawn(run_stream(self, client, event_tx, state_tx));

        Ok(StreamHandle {
            url,
            events: event_rx,
            state: state_rx,
            task,
        })
    }
}

/// Open panel stream
///
/// Dropping the handle stops the stream task.
#[derive(Debug)]
pub struct StreamHandle {
    url: String,
    events: mpsc::UnboundedReceiver<StreamEvent>,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl StreamHandle {
    /// Next event; `None` once the stream task has finished
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Next event if one is queued
    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.events.try_recv().ok()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch connection state changes
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn build_client(url: &str, cookie: Option<&str>) -> Result<Box<dyn es::Client + Send + Sync>> {
    let mut builder = es::ClientBuilder::for_url(url)
        .map_err(|e| PanelError::Transport(format!("invalid stream URL {}: {}", url, e)))?;

    if let Some(cookie) = cookie {
        builder = builder
            .header("Cookie", cookie)
            .map_err(|e| PanelError::Transport(format!("invalid cookie header: {}", e)))?;
    }

    // Reconnection is driven by run_stream, not by the client
    let client = builder
        .reconnect(es::ReconnectOptions::reconnect(false).build())
        .build();

    Ok(Box::new(client))
}

/// Why a single connection ended
enum StreamExit {
    /// Nobody is listening anymore
    ReceiverGone,
    /// Transport failed or the server closed the stream
    Lost { reason: String, was_open: bool },
}

async fn run_stream(
    listener: StreamListener,
    first_client: Box<dyn es::Client + Send + Sync>,
    event_tx: mpsc::UnboundedSender<StreamEvent>,
    state_tx: watch::Sender<ConnectionState>,
) {
    let mut client = Some(first_client);
    let mut delay = match listener.policy {
        ReconnectPolicy::Backoff { initial, .. } => initial,
        ReconnectPolicy::Never => Duration::ZERO,
    };

    loop {
        state_tx.send_replace(ConnectionState::Connecting);

        let exit = match client.take() {
            Some(client) => stream_events(client.as_ref(), &event_tx, &state_tx).await,
            None => match build_client(&listener.url, listener.cookie.as_deref()) {
                Ok(client) => stream_events(client.as_ref(), &event_tx, &state_tx).await,
                Err(e) => StreamExit::Lost {
                    reason: e.to_string(),
                    was_open: false,
                },
            },
        };

        let (reason, was_open) = match exit {
            StreamExit::ReceiverGone => {
                debug!("Panel stream receiver dropped: {}", listener.url);
                return;
            }
            StreamExit::Lost { reason, was_open } => (reason, was_open),
        };

        error!("{} ({}: {})", EVENTSOURCE_DISCONNECT_MSG, listener.url, reason);
        state_tx.send_replace(ConnectionState::ClosedError);
        if event_tx.send(StreamEvent::Disconnected(reason)).is_err() {
            return;
        }

        match listener.policy {
            ReconnectPolicy::Never => return,
            ReconnectPolicy::Backoff { initial, max } => {
                if was_open {
                    delay = initial;
                }
                debug!("Reconnecting to {} in {:?}", listener.url, delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = event_tx.closed() => return,
                }
                delay = next_delay(delay, max);
            }
        }
    }
}

/// Double the delay, capped at `max`
fn next_delay(current: Duration, max: Duration) -> Duration {
    current.saturating_mul(2).min(max)
}

async fn stream_events(
    client: &(dyn es::Client + Send + Sync),
    event_tx: &mpsc::UnboundedSender<StreamEvent>,
    state_tx: &watch::Sender<ConnectionState>,
) -> StreamExit {
    let mut stream = client.stream();
    let mut was_open = false;

    loop {
        let next = tokio::select! {
            next = stream.next() => next,
            _ = event_tx.closed() => return StreamExit::ReceiverGone,
        };

        match next {
            Some(Ok(es::SSE::Connected(_))) => {
                debug!("Panel stream connected");
                if !mark_open(&mut was_open, event_tx, state_tx) {
                    return StreamExit::ReceiverGone;
                }
            }
            Some(Ok(es::SSE::Event(event))) => {
                if !mark_open(&mut was_open, event_tx, state_tx) {
                    return StreamExit::ReceiverGone;
                }
                debug!("EventSource: {}", event.data);
                if event_tx.send(StreamEvent::Message(event.data)).is_err() {
                    return StreamExit::ReceiverGone;
                }
            }
            Some(Ok(es::SSE::Comment(_))) => {
                // keepalive
            }
            Some(Err(e)) => {
                warn!("Panel stream error: {}", e);
                return StreamExit::Lost {
                    reason: e.to_string(),
                    was_open,
                };
            }
            None => {
                return StreamExit::Lost {
                    reason: "stream ended".to_string(),
                    was_open,
                };
            }
        }
    }
}

/// Report the open state once per connection; false when the receiver is gone
fn mark_open(
    was_open: &mut bool,
    event_tx: &mpsc::UnboundedSender<StreamEvent>,
    state_tx: &watch::Sender<ConnectionState>,
) -> bool {
    if *was_open {
        return true;
    }
    *was_open = true;
    state_tx.send_replace(ConnectionState::Open);
    event_tx.send(StreamEvent::Opened).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_delay_doubles_and_caps() {
        let max = Duration::from_secs(60);
        assert_eq!(next_delay(Duration::from_secs(1), max), Duration::from_secs(2));
        assert_eq!(next_delay(Duration::from_secs(40), max), max);
        assert_eq!(next_delay(max, max), max);
    }

    #[test]
    fn test_from_config_uses_policy_and_cookie() {
        let mut config = PanelConfig::default();
        config.session_cookie = Some("session=abc".to_string());
        config.reconnect.enabled = true;

        let listener = StreamListener::from_config(config.console_stream_url(), &config);
        assert_eq!(listener.cookie.as_deref(), Some("session=abc"));
        assert!(matches!(listener.policy, ReconnectPolicy::Backoff { .. }));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_to_open() {
        let result = StreamListener::new("not a url").open();
        assert!(matches!(result, Err(PanelError::Transport(_))));
    }
}
