//! Status panel - Power state, uptime and power toggle

use crate::colors::{connection_label, PanelColors};
use mcadmin_panel::StatusView;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn row<'a>(label: &'a str, value: String, value_style: Style) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<15}", label), Style::default().fg(PanelColors::IDLE)),
        Span::styled(value, value_style),
    ])
}

/// Render a status view
pub fn render_status(frame: &mut Frame, area: Rect, view: &StatusView) {
    let lines = vec![
        row(
            "Status",
            view.status_label.to_string(),
            Style::default()
                .fg(PanelColors::power(view.status_label))
                .add_modifier(Modifier::BOLD),
        ),
        row("Uptime", view.uptime.clone(), Style::default()),
        row("Peak activity", view.peak_activity.clone(), Style::default()),
        row("Version", view.version.clone(), Style::default()),
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {} ]  (Enter)", view.toggle_label),
            Style::default()
                .fg(PanelColors::HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
    ];

    let title = Span::styled(
        format!("Status [{}]", connection_label(view.connection)),
        Style::default().fg(PanelColors::connection(view.connection)),
    );

    let panel = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(panel, area);
}
