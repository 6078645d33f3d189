//! Console panel - Scrollback log with command input

use crate::colors::{connection_label, PanelColors};
use mcadmin_panel::{ConsolePanel, PanelRequester};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the console log and the input line
///
/// `scroll_offset` counts lines up from the bottom of the log.
pub fn render_console<R: PanelRequester + ?Sized>(
    frame: &mut Frame,
    area: Rect,
    console: &ConsolePanel<R>,
    scroll_offset: usize,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let available_height = chunks[0].height.saturating_sub(2) as usize;
    let total = console.log().line_count();
    let offset = scroll_offset.min(total.saturating_sub(1));

    let lines: Vec<Line> = if console.log().is_empty() {
        vec![Line::from(Span::styled(
            "No console output yet",
            Style::default()
                .fg(PanelColors::IDLE)
                .add_modifier(Modifier::ITALIC),
        ))]
    } else {
        let mut visible: Vec<Line> = console
            .log()
            .lines()
            .rev()
            .skip(offset)
            .take(available_height)
            .map(|line| Line::from(line.to_string()))
            .collect();
        visible.reverse();
        visible
    };

    let title = if offset > 0 {
        format!(
            "Console [{}] ({} lines, scrolled {})",
            connection_label(console.connection()),
            total,
            offset
        )
    } else {
        format!(
            "Console [{}] ({} lines)",
            connection_label(console.connection()),
            total
        )
    };

    let log = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                title,
                Style::default().fg(PanelColors::connection(console.connection())),
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(log, chunks[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(PanelColors::HIGHLIGHT)),
        Span::raw(console.input()),
    ]))
    .block(Block::default().title("Command").borders(Borders::ALL));
    frame.render_widget(input, chunks[1]);
}
