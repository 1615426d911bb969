use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use crate::app::{App, Field};
use crate::radio::DeviceRegistry;

/// Render the control deck (device and signal settings)
pub fn render_control_panel(frame: &mut Frame, area: Rect, app: &App) {
    let rows: Vec<Row> = Field::all()
        .iter()
        .map(|&field| {
            let is_selected = field == app.selected_field;
            let value = field_value(app, field);

            let value_style = if is_selected {
                if app.edit_mode {
                    // Edit mode: cyan background with bold text
                    Style::default()
                        .bg(Color::Cyan)
                        .fg(Color::Black)
                        .add_modifier(Modifier::BOLD)
                } else {
                    // Selected but not editing: dark gray background
                    Style::default()
                        .bg(Color::DarkGray)
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                }
            } else {
                Style::default()
            };

            Row::new(vec![
                Cell::from(field.label()).style(Style::default().fg(Color::Gray)),
                Cell::from(value).style(value_style),
            ])
        })
        .collect();

    let driver = DeviceRegistry::driver_name(&app.device().target);

    let table = Table::new(rows, [Constraint::Length(12), Constraint::Min(14)])
        .column_spacing(1)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Control Deck ")
                .title_bottom(format!(" driver: {} ", driver)),
        );

    frame.render_widget(table, area);
}

fn field_value(app: &App, field: Field) -> String {
    match field {
        Field::Device => app.device().name.clone(),
        Field::Frequency => format_frequency(app.params.frequency()),
        Field::Gain => format!("{:.0} dB", app.params.gain()),
        Field::Amplitude => format!("{:.1}", app.params.amplitude()),
        Field::Waveform => format!("{} Wave", app.params.waveform()),
    }
}

/// Format a frequency with an SI prefix, e.g. "915.000 MHz"
pub fn format_frequency(hz: f64) -> String {
    if hz.abs() >= 1e9 {
        format!("{:.3} GHz", hz / 1e9)
    } else if hz.abs() >= 1e6 {
        format!("{:.3} MHz", hz / 1e6)
    } else if hz.abs() >= 1e3 {
        format!("{:.3} kHz", hz / 1e3)
    } else {
        format!("{:.0} Hz", hz)
    }
}
