//! MCAdmin Panel - Terminal client for the MCAdmin web panel
//!
//! Follows the panel's console and status streams and displays:
//! - Live console output, with command input
//! - Server status, uptime, peak activity and version, with power toggle
//! - Server version picker
//!
//! Usage:
//!   mcadmin-panel [OPTIONS]
//!
//! Examples:
//!   mcadmin-panel                                  # Connect to localhost:5000
//!   mcadmin-panel --url http://mc.example:5000
//!   mcadmin-panel --config panel.toml --reconnect

mod app;
mod colors;
mod panels;

use anyhow::{Context, Result};
use app::{App, Tab};
use clap::Parser;
use colors::PanelColors;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mcadmin_panel::{
    ConsolePanel, HttpRequester, PanelConfig, PanelRequester, StatusPanel, StreamListener,
    VersionCatalog, VersionForm,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Tabs},
    Terminal,
};
use std::{io, path::PathBuf, sync::Arc, time::Duration};
use tokio::time::Instant;
use tracing::{debug, error, Level};
use tracing_subscriber::EnvFilter;

/// Panel client CLI arguments
#[derive(Parser)]
#[command(name = "mcadmin-panel")]
#[command(about = "Terminal client for the MCAdmin server administration panel")]
#[command(version)]
struct Args {
    /// Panel base URL
    #[arg(long, env = "MCADMIN_URL")]
    url: Option<String>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session cookie for the panel login (e.g. "session=...")
    #[arg(long, env = "MCADMIN_COOKIE")]
    cookie: Option<String>,

    /// Reconnect dropped streams with exponential backoff
    #[arg(long)]
    reconnect: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn init_logging(log_level: &str) -> Result<PathBuf> {
    let level = match log_level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::new(format!(
        "mcadmin_panel={level},{level}",
        level = level.as_str().to_lowercase()
    ));

    // Log to a file; the terminal belongs to the UI
    let path = std::env::temp_dir().join("mcadmin-panel.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .init();

    Ok(path)
}

fn load_config(args: &Args) -> Result<PanelConfig> {
    let mut config = PanelConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.url {
        config.base_url = url.clone();
    }
    if args.cookie.is_some() {
        config.session_cookie = args.cookie.clone();
    }
    if args.reconnect {
        config.reconnect.enabled = true;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_path = init_logging(&args.log_level)?;
    let config = load_config(&args)?;

    debug!("Panel client v{} starting...", env!("CARGO_PKG_VERSION"));
    debug!("Panel URL: {} (log: {})", config.base_url, log_path.display());

    let requester: Arc<dyn PanelRequester> = Arc::new(HttpRequester::new(&config)?);
    let console = ConsolePanel::new(requester.clone())
        .page(config.console_page.clone())
        .max_input_length(config.max_input_length);
    let status = StatusPanel::new(requester)
        .page(config.status_page.clone())
        .jvm_args(config.jvm_args.clone());
    let versions = VersionForm::new(VersionCatalog::from_jar_names(&config.versions));

    let mut app = App::new(console, status, versions);
    app.attach_streams(
        StreamListener::from_config(config.console_stream_url(), &config).open()?,
        StreamListener::from_config(config.status_stream_url(), &config).open()?,
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, config.tick_interval()).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("Error: {:?}", err);
        return Err(err);
    }

    debug!("Panel client exiting cleanly");
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_interval: Duration,
) -> Result<()> {
    let mut next_tick = Instant::now() + tick_interval;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(5),
                    Constraint::Length(1),
                ])
                .split(f.area());

            // Header
            let titles: Vec<Line> = Tab::all().iter().map(|t| Line::from(t.name())).collect();
            let tabs = Tabs::new(titles)
                .select(app.active.index())
                .highlight_style(
                    Style::default()
                        .fg(PanelColors::HIGHLIGHT)
                        .add_modifier(Modifier::BOLD),
                )
                .block(Block::default().title("MCAdmin").borders(Borders::ALL));
            f.render_widget(tabs, chunks[0]);

            match app.active {
                Tab::Console => {
                    panels::render_console(f, chunks[1], &app.console, app.console_scroll)
                }
                Tab::Status => panels::render_status(f, chunks[1], &app.status.view()),
                Tab::Versions => {
                    panels::render_versions(f, chunks[1], &app.versions, app.version_focus)
                }
            }

            // Footer: last notice, else key help
            let footer_text = app.notice.clone().unwrap_or_else(|| {
                "Tab to switch panels | Enter to submit | Esc to quit".to_string()
            });
            let footer = Paragraph::new(footer_text).style(Style::default().fg(PanelColors::IDLE));
            f.render_widget(footer, chunks[2]);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    return Ok(());
                }
            }
        }

        app.process_stream_events();
        app.process_request_results();

        while Instant::now() >= next_tick {
            app.tick();
            next_tick += tick_interval;
        }
    }
}
