//! Panel client state and key handling
//!
//! Owns one controller per panel. Stream events, clock ticks, keys and
//! request completions are all applied here, one at a time, from the main
//! loop.

use crate::panels::VersionFocus;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mcadmin_panel::{
    console::send_command, status::send_power_request, ConsolePanel, PanelRequester,
    RequestOutcome, StatusPanel, StreamHandle, VersionForm,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Panel pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Console,
    Status,
    Versions,
}

impl Tab {
    pub fn all() -> [Tab; 3] {
        [Tab::Console, Tab::Status, Tab::Versions]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Console => "Console",
            Tab::Status => "Status",
            Tab::Versions => "Versions",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Tab::Console => 0,
            Tab::Status => 1,
            Tab::Versions => 2,
        }
    }

    pub fn next(&self) -> Tab {
        Tab::all()[(self.index() + 1) % 3]
    }

    pub fn previous(&self) -> Tab {
        Tab::all()[(self.index() + 2) % 3]
    }
}

/// Finished request, reported back to the loop
#[derive(Debug)]
pub struct RequestDone {
    pub what: &'static str,
    pub result: mcadmin_panel::Result<RequestOutcome>,
}

/// Application state
pub struct App {
    pub console: ConsolePanel<dyn PanelRequester>,
    pub status: StatusPanel<dyn PanelRequester>,
    pub versions: VersionForm,
    pub version_focus: VersionFocus,
    pub active: Tab,
    /// Lines scrolled up from the bottom of the console
    pub console_scroll: usize,
    /// Last request outcome or validation message
    pub notice: Option<String>,

    console_stream: Option<StreamHandle>,
    status_stream: Option<StreamHandle>,
    done_tx: mpsc::UnboundedSender<RequestDone>,
    done_rx: mpsc::UnboundedReceiver<RequestDone>,
}

impl App {
    pub fn new(
        console: ConsolePanel<dyn PanelRequester>,
        status: StatusPanel<dyn PanelRequester>,
        versions: VersionForm,
    ) -> Self {
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        Self {
            console,
            status,
            versions,
            version_focus: VersionFocus::Picker,
            active: Tab::Console,
            console_scroll: 0,
            notice: None,
            console_stream: None,
            status_stream: None,
            done_tx,
            done_rx,
        }
    }

    pub fn attach_streams(&mut self, console: StreamHandle, status: StreamHandle) {
        self.console_stream = Some(console);
        self.status_stream = Some(status);
    }

    /// Apply every queued stream event, in arrival order per stream
    pub fn process_stream_events(&mut self) {
        if let Some(stream) = self.console_stream.as_mut() {
            while let Some(event) = stream.try_recv() {
                self.console.handle_stream_event(event);
            }
        }
        if let Some(stream) = self.status_stream.as_mut() {
            while let Some(event) = stream.try_recv() {
                self.status.handle_stream_event(event);
            }
        }
    }

    /// Apply finished requests
    pub fn process_request_results(&mut self) {
        while let Ok(done) = self.done_rx.try_recv() {
            self.notice = Some(match done.result {
                Ok(outcome) => {
                    debug!("{} accepted with HTTP {}", done.what, outcome.status);
                    format!("{}: OK ({})", done.what, outcome.status)
                }
                Err(e) => {
                    warn!("{} failed: {}", done.what, e);
                    format!("{} failed: {}", done.what, e)
                }
            });
        }
    }

    /// Advance the uptime clock one second
    pub fn tick(&mut self) {
        self.status.tick();
    }

    /// Handle a key press; true means quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.active = self.active.next();
                return false;
            }
            KeyCode::BackTab => {
                self.active = self.active.previous();
                return false;
            }
            _ => {}
        }

        match self.active {
            Tab::Console => self.handle_console_key(key.code),
            Tab::Status => self.handle_status_key(key.code),
            Tab::Versions => self.handle_versions_key(key.code),
        }
        false
    }

    fn handle_console_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(c) => self.console.push_char(c),
            KeyCode::Backspace => self.console.backspace(),
            KeyCode::Enter => self.submit_console_line(),
            KeyCode::PageUp => self.console_scroll = self.console_scroll.saturating_add(10),
            KeyCode::PageDown => self.console_scroll = self.console_scroll.saturating_sub(10),
            KeyCode::End => self.console_scroll = 0,
            _ => {}
        }
    }

    fn handle_status_key(&mut self, code: KeyCode) {
        if matches!(code, KeyCode::Enter | KeyCode::Char('t')) {
            self.toggle_power();
        }
    }

    fn handle_versions_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::F(2) => self.versions.set_use_snapshot(!self.versions.use_snapshot()),
            KeyCode::F(3) => {
                let use_custom = !self.versions.use_custom();
                self.versions.set_use_custom(use_custom);
                if !use_custom && self.version_focus == VersionFocus::JarInput {
                    self.versions.jar_input_blurred();
                }
                self.version_focus = if use_custom {
                    VersionFocus::JarInput
                } else {
                    VersionFocus::Picker
                };
            }
            KeyCode::Enter => {
                self.notice = Some(match self.versions.jar_name() {
                    Ok(jar) => format!("Selected server jar: {}", jar),
                    Err(e) => e.to_string(),
                });
            }
            _ => match self.version_focus {
                VersionFocus::Picker => self.handle_picker_key(code),
                VersionFocus::JarInput => self.handle_jar_input_key(code),
            },
        }
    }

    fn handle_picker_key(&mut self, code: KeyCode) {
        let selected = self.versions.selected_index();
        match code {
            KeyCode::Up => {
                self.versions.select_version(selected.saturating_sub(1));
            }
            KeyCode::Down => {
                self.versions.select_version(selected + 1);
            }
            _ => {}
        }
    }

    fn handle_jar_input_key(&mut self, code: KeyCode) {
        let mut text = self.versions.jar_input().to_string();
        match code {
            KeyCode::Char(c) => text.push(c),
            KeyCode::Backspace => {
                text.pop();
            }
            _ => return,
        }
        self.versions.edit_jar_input(text);
    }

    /// Clear the input and send it without blocking the loop
    fn submit_console_line(&mut self) {
        let command = match self.console.take_command() {
            Ok(command) => command,
            Err(e) => {
                self.notice = Some(e.to_string());
                return;
            }
        };

        let requester = self.console.requester();
        let page = self.console.page_path().to_string();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = send_command(requester.as_ref(), &page, command).await;
            let _ = done_tx.send(RequestDone {
                what: "Console command",
                result,
            });
        });
    }

    fn toggle_power(&mut self) {
        let request = self.status.toggle_request();
        info!("Power toggle: {}", request.action.as_str());

        let requester = self.status.requester();
        let page = self.status.page_path().to_string();
        let done_tx = self.done_tx.clone();
        tokio::spawn(async move {
            let result = send_power_request(requester.as_ref(), &page, request).await;
            let _ = done_tx.send(RequestDone {
                what: "Power toggle",
                result,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mcadmin_panel::{StatusSnapshot, VersionCatalog};
    use std::sync::Mutex;

    /// Records posted bodies and answers 204
    #[derive(Default)]
    struct RecordingRequester {
        posted: Mutex<Vec<(String, serde_json::Value)>>,
    }

    #[async_trait]
    impl PanelRequester for RecordingRequester {
        async fn post_json(
            &self,
            path: &str,
            body: serde_json::Value,
        ) -> mcadmin_panel::Result<RequestOutcome> {
            self.posted.lock().unwrap().push((path.to_string(), body));
            Ok(RequestOutcome {
                status: 204,
                body: String::new(),
            })
        }
    }

    fn app(requester: Arc<RecordingRequester>) -> App {
        let shared: Arc<dyn PanelRequester> = requester;
        let versions = VersionForm::new(VersionCatalog::from_jar_names([
            "minecraft_server-1.20.1.jar",
            "minecraft_server-1.19.4.jar",
        ]));
        App::new(
            ConsolePanel::new(shared.clone()),
            StatusPanel::new(shared),
            versions,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn wait_for_notice(app: &mut App) {
        for _ in 0..100 {
            app.process_request_results();
            if app.notice.is_some() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_tab_cycle() {
        assert_eq!(Tab::Console.next(), Tab::Status);
        assert_eq!(Tab::Versions.next(), Tab::Console);
        assert_eq!(Tab::Console.previous(), Tab::Versions);
    }

    #[tokio::test]
    async fn test_enter_sends_console_line() {
        let requester = Arc::new(RecordingRequester::default());
        let mut app = app(requester.clone());
        for c in "list".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.console.input(), "");

        wait_for_notice(&mut app).await;
        let posted = requester.posted.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].0, "/panel/console");
        assert_eq!(posted[0].1, serde_json::json!({"input_line": "list"}));
    }

    #[tokio::test]
    async fn test_status_toggle_uses_cached_state() {
        let requester = Arc::new(RecordingRequester::default());
        let mut app = app(requester.clone());
        app.status.apply_snapshot(StatusSnapshot {
            is_server_running: true,
            uptime: Some(5),
            peak_activity: 1,
            server_version: None,
        });

        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Enter));
        wait_for_notice(&mut app).await;

        let posted = requester.posted.lock().unwrap();
        assert_eq!(posted[0].1, serde_json::json!({"action": "turn_off"}));
        assert_eq!(app.notice.as_deref(), Some("Power toggle: OK (204)"));
    }

    #[test]
    fn test_versions_keys() {
        let mut app = app(Arc::new(RecordingRequester::default()));
        app.active = Tab::Versions;

        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.versions.jar_input(), "1.20.1");

        app.handle_key(key(KeyCode::F(3)));
        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.versions.jar_input(), "1.20.1x");
        assert_eq!(app.versions.selected_index(), 0);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app(Arc::new(RecordingRequester::default()));
        assert!(app.handle_key(key(KeyCode::Esc)));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }
}
