//! Versions panel - Server version picker and custom jar input

use crate::colors::PanelColors;
use mcadmin_panel::{FieldState, VersionForm};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

/// Control receiving keys on the versions panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionFocus {
    Picker,
    JarInput,
}

fn checkbox(checked: bool, label: &str) -> Span<'static> {
    let mark = if checked { "[x]" } else { "[ ]" };
    Span::raw(format!("{} {}", mark, label))
}

/// Render the version form
pub fn render_versions(frame: &mut Frame, area: Rect, form: &VersionForm, focus: VersionFocus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    let visibility = form.visibility();

    let mut toggles = Vec::new();
    if visibility.use_snapshot {
        toggles.push(checkbox(form.use_snapshot(), "Use snapshot (F2)  "));
    }
    toggles.push(checkbox(form.use_custom(), "Use custom jar (F3)"));
    let toggles = Paragraph::new(Line::from(toggles))
        .block(Block::default().title("Server version").borders(Borders::ALL));
    frame.render_widget(toggles, chunks[0]);

    if visibility.version_picker {
        let items: Vec<ListItem> = form
            .options()
            .into_iter()
            .enumerate()
            .map(|(index, version)| {
                let style = if index == form.selected_index() {
                    Style::default()
                        .fg(PanelColors::HIGHLIGHT)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(version.to_string(), style)))
            })
            .collect();
        let group = if visibility.snapshot_versions {
            "Snapshot versions"
        } else {
            "Stable versions"
        };
        let picker = List::new(items).block(Block::default().title(group).borders(Borders::ALL));
        frame.render_widget(picker, chunks[1]);
    }

    if visibility.jar_input {
        let field = form.jar_field();
        let (color, hint) = match field.state() {
            FieldState::Invalid => (PanelColors::ERROR, field.messages().to_string()),
            FieldState::Valid => (PanelColors::SUCCESS, String::new()),
            FieldState::Unchecked => (PanelColors::IDLE, String::new()),
        };
        let marker = if focus == VersionFocus::JarInput { "> " } else { "  " };
        let input = Paragraph::new(Line::from(vec![
            Span::styled(marker, Style::default().fg(PanelColors::HIGHLIGHT)),
            Span::raw(form.jar_input().to_string()),
            Span::styled(format!("  {}", hint), Style::default().fg(color)),
        ]))
        .block(
            Block::default()
                .title("Jar name")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(input, chunks[2]);
    } else {
        let current = Paragraph::new(format!("Jar: {}", form.jar_input()))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(current, chunks[2]);
    }
}
