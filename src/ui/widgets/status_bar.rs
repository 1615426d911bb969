use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, LinkStatus};

/// Render the status bar
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let color = match app.link_status {
        LinkStatus::Standby => Color::Gray,
        LinkStatus::Starting(_) => Color::White,
        LinkStatus::TxActive => Color::Green,
        LinkStatus::Simulation => Color::Yellow,
    };

    let cycles = app.streamer.cycles();
    let dropped = app.snapshot.dropped();
    let view = if app.sampler.is_paused() { "paused" } else { "live" };

    // Add 2 spaces of left padding
    let line = Line::from(vec![
        Span::raw("  status: "),
        Span::styled(
            app.link_status_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "; loop: {:?}; time: {}; cycles: {}; dropped: {}; view: {}",
            app.stream_state(),
            app.stream_duration_str(),
            cycles,
            dropped,
            view
        )),
    ]);

    let status_widget = Paragraph::new(line).alignment(Alignment::Left);

    frame.render_widget(status_widget, area);
}
