use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, MessageType};
use crate::ui::widgets::{render_control_panel, render_help_view, render_scope_view, render_status_bar};

/// Width of the control deck column
const CONTROL_PANEL_WIDTH: u16 = 36;

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &App) {
    // If help is shown, render help view instead of normal UI
    if app.show_help {
        render_help_view(frame, frame.area());
        return;
    }

    let mut constraints = vec![
        Constraint::Length(1), // Status bar
        Constraint::Length(1), // Line break
    ];
    if app.message.is_some() {
        constraints.push(Constraint::Length(3)); // Message bar
    }
    constraints.push(Constraint::Min(1)); // Control deck + scope

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    render_status_bar(frame, chunks[0], app);

    if let Some(ref msg) = app.message {
        let (color, prefix) = match msg.msg_type {
            MessageType::Warning => (Color::Yellow, "⚠ "),
            MessageType::Error => (Color::Red, "✖ "),
        };

        let text = format!("{}{}", prefix, msg.text);
        let message_widget = Paragraph::new(Line::from(text))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(message_widget, chunks[2]);
    }

    let main_area = chunks[chunks.len() - 1];
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CONTROL_PANEL_WIDTH), Constraint::Min(20)])
        .split(main_area);

    // Control deck gets a fixed height; the rest of the column stays empty
    let panel_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(columns[0]);

    render_control_panel(frame, panel_rows[0], app);
    render_scope_view(frame, columns[1], &app.sampler);
}
