use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::scope::DisplaySampler;

/// Vertical span of the plot
const Y_BOUNDS: [f64; 2] = [-1.5, 1.5];

/// Render the time-domain I/Q plot of the latest snapshot
pub fn render_scope_view(frame: &mut Frame, area: Rect, sampler: &DisplaySampler) {
    let title = if sampler.is_paused() {
        " Time Domain (paused) "
    } else {
        " Time Domain "
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    let Some(trace) = sampler.trace().filter(|t| !t.is_empty()) else {
        let placeholder = Paragraph::new("No samples yet. Press Enter to start.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let x_max = sampler.window().max(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name("In-Phase (I)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&trace.i),
        Dataset::default()
            .name("Quadrature (Q)")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&trace.q),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .title("Samples")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw("0"),
                    Span::raw(format!("{}", x_max as usize / 2)),
                    Span::raw(format!("{}", x_max as usize)),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("Amplitude")
                .style(Style::default().fg(Color::Gray))
                .bounds(Y_BOUNDS)
                .labels(vec![Span::raw("-1.5"), Span::raw("0"), Span::raw("1.5")]),
        );

    frame.render_widget(chart, area);
}
