//! Console panel controller
//!
//! Appends streamed console output to an unbounded scrollback log and sends
//! command lines typed by the user to the console page.

use crate::config::DEFAULT_MAX_INPUT_LENGTH;
use crate::error::{PanelError, Result};
use crate::forms::FieldConstraints;
use crate::protocol::{ConsoleInput, ConsoleMessage, CONSOLE_PANEL_PAGE};
use crate::request::{PanelRequester, RequestOutcome};
use crate::stream::{ConnectionState, StreamEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Append-only console log
///
/// Never truncated; memory grows with the session.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    text: String,
    lines: usize,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` followed by a newline
    ///
    /// Multi-line payloads count once per embedded line.
    pub fn append_line(&mut self, text: &str) {
        self.text.push_str(text);
        self.text.push('\n');
        self.lines += text.matches('\n').count() + 1;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.text.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Console panel state and actions
pub struct ConsolePanel<R: PanelRequester + ?Sized> {
    log: ConsoleLog,
    input: String,
    connection: ConnectionState,
    requester: Arc<R>,
    page: String,
    max_input_length: usize,
}

impl<R: PanelRequester + ?Sized> ConsolePanel<R> {
    pub fn new(requester: Arc<R>) -> Self {
        Self {
            log: ConsoleLog::new(),
            input: String::new(),
            connection: ConnectionState::Connecting,
            requester,
            page: CONSOLE_PANEL_PAGE.to_string(),
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
        }
    }

    /// Post target for console input
    pub fn page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn max_input_length(mut self, max: usize) -> Self {
        self.max_input_length = max;
        self
    }

    /// Append one console line
    pub fn append_line(&mut self, text: &str) {
        self.log.append_line(text);
    }

    /// Apply a raw console stream payload
    pub fn handle_message(&mut self, data: &str) {
        let message = ConsoleMessage::parse(data);
        if message == ConsoleMessage::ServerNotRunning {
            debug!("Console stream reports server not running");
        }
        self.append_line(message.display_text());
    }

    /// Apply a stream event
    pub fn handle_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Opened => {
                info!("Console stream open");
                self.connection = ConnectionState::Open;
            }
            StreamEvent::Message(data) => self.handle_message(&data),
            StreamEvent::Disconnected(reason) => {
                warn!("Console stream closed: {}", reason);
                self.connection = ConnectionState::ClosedError;
            }
        }
    }

    pub fn log(&self) -> &ConsoleLog {
        &self.log
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Validate the input line, then clear it and return the request body
    ///
    /// The input is left untouched when validation fails.
    pub fn take_command(&mut self) -> Result<ConsoleInput> {
        let constraints = FieldConstraints::new().max_length(
            self.max_input_length,
            format!(
                "Input line must not exceed {} characters.",
                self.max_input_length
            ),
        );
        let violations = constraints.check(&self.input);
        if !violations.is_empty() {
            return Err(PanelError::Validation(constraints.messages_for(&violations)));
        }

        Ok(ConsoleInput {
            input_line: std::mem::take(&mut self.input),
        })
    }

    /// Submit the input line to the console page
    ///
    /// The input field is cleared before the request is sent.
    pub async fn submit_command(&mut self) -> Result<RequestOutcome> {
        let command = self.take_command()?;
        send_command(self.requester.as_ref(), &self.page, command).await
    }

    /// Shared requester, for sending commands off the UI loop
    pub fn requester(&self) -> Arc<R> {
        Arc::clone(&self.requester)
    }

    pub fn page_path(&self) -> &str {
        &self.page
    }
}

/// Post a console command body
pub async fn send_command<R: PanelRequester + ?Sized>(
    requester: &R,
    page: &str,
    command: ConsoleInput,
) -> Result<RequestOutcome> {
    debug!("Submitting console line: {}", command.input_line);
    let body = serde_json::to_value(&command)?;
    requester.post_json(page, body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::SERVER_NOT_RUNNING_TOKEN;
    use crate::request::MockPanelRequester;
    use serde_json::json;

    fn panel(requester: MockPanelRequester) -> ConsolePanel<MockPanelRequester> {
        ConsolePanel::new(Arc::new(requester))
    }

    #[test]
    fn test_append_line_adds_newline() {
        let mut console = panel(MockPanelRequester::new());
        console.append_line("[12:00:00] Done (3.2s)!");
        console.append_line("");
        assert_eq!(console.log().text(), "[12:00:00] Done (3.2s)!\n\n");
        assert_eq!(console.log().line_count(), 2);
    }

    #[test]
    fn test_sentinel_renders_single_line() {
        let mut console = panel(MockPanelRequester::new());
        console.handle_message(SERVER_NOT_RUNNING_TOKEN);
        assert_eq!(console.log().text(), "Server is not running\n");
        assert!(!console.log().text().contains(SERVER_NOT_RUNNING_TOKEN));
    }

    #[test]
    fn test_stream_events_update_connection() {
        let mut console = panel(MockPanelRequester::new());
        assert_eq!(console.connection(), ConnectionState::Connecting);

        console.handle_stream_event(StreamEvent::Opened);
        console.handle_stream_event(StreamEvent::Message("hello".to_string()));
        assert_eq!(console.connection(), ConnectionState::Open);

        console.handle_stream_event(StreamEvent::Disconnected("eof".to_string()));
        assert_eq!(console.connection(), ConnectionState::ClosedError);
        assert_eq!(console.log().text(), "hello\n");
    }

    #[test]
    fn test_multiline_payload_counts_each_line() {
        let mut console = panel(MockPanelRequester::new());
        console.handle_message("first\nsecond");
        console.append_line("third");
        console.append_line("trailing\n");

        let log = console.log();
        assert_eq!(log.line_count(), 5);
        assert_eq!(log.line_count(), log.text().lines().count());
        assert_eq!(log.lines().nth(1), Some("second"));
    }

    #[tokio::test]
    async fn test_submit_posts_and_clears_input() {
        let mut requester = MockPanelRequester::new();
        requester
            .expect_post_json()
            .withf(|path, body| {
                path.to_string() == "/panel/console" && *body == json!({"input_line": "say hi"})
            })
            .times(1)
            .returning(|_, _| {
                Ok(RequestOutcome {
                    status: 204,
                    body: String::new(),
                })
            });

        let mut console = panel(requester);
        console.set_input("say hi");
        let outcome = console.submit_command().await.unwrap();

        assert_eq!(outcome.status, 204);
        assert_eq!(console.input(), "");
    }

    #[tokio::test]
    async fn test_failed_submit_still_clears_input() {
        let mut requester = MockPanelRequester::new();
        requester.expect_post_json().times(1).returning(|_, _| {
            Err(PanelError::Request {
                status: 409,
                body: "Server is not running".to_string(),
            })
        });

        let mut console = panel(requester);
        console.set_input("stop");
        let err = console.submit_command().await.unwrap_err();

        assert!(matches!(err, PanelError::Request { status: 409, .. }));
        assert_eq!(console.input(), "");
    }

    #[tokio::test]
    async fn test_overlong_input_is_rejected_locally() {
        let mut requester = MockPanelRequester::new();
        requester.expect_post_json().times(0);

        let mut console = panel(requester).max_input_length(5);
        console.set_input("abcdef");
        let err = console.submit_command().await.unwrap_err();

        assert!(matches!(err, PanelError::Validation(_)));
        assert_eq!(console.input(), "abcdef");
    }

    #[test]
    fn test_input_editing() {
        let mut console = panel(MockPanelRequester::new());
        for c in "list".chars() {
            console.push_char(c);
        }
        console.backspace();
        assert_eq!(console.input(), "lis");
    }
}
