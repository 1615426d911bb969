use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the help view
pub fn render_help_view(frame: &mut Frame, area: Rect) {
    let help_text = vec![
        Line::from(""),
        Line::from("  txscope - I/Q transmit generator with live scope"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Control Deck", Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from("    ↑↓ or k/j        Select device, frequency, gain, amplitude, waveform"),
        Line::from("    Space            Toggle waveform or enter/leave edit mode"),
        Line::from("    ←→ or h/l        Adjust value in edit mode (↑↓ also adjust)"),
        Line::from("    Esc              Leave edit mode"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Transmit", Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from("    Enter or s       Start / stop streaming to the selected device"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Scope", Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from("    p                Pause / resume the view"),
        Line::from("    + / -            Zoom in / out"),
        Line::from("    0                Reset zoom"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Other", Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from("    ?                Toggle this help"),
        Line::from("    q or Ctrl+c      Quit"),
        Line::from(""),
        Line::from("  Press ? to close"),
    ];

    let paragraph = Paragraph::new(help_text).alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
