use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::app::App;

/// Handle keyboard input
pub fn handle_input(app: &mut App, timeout: Duration) -> anyhow::Result<()> {
    // Poll no longer than one display refresh so the scope keeps updating
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key_event(app, key);
            }
        }
    }

    Ok(())
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            app.quit();
        }

        // Ctrl+C - quit
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
        }

        // Navigation (arrow keys and vim bindings)
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_up();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_down();
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.move_left();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.move_right();
        }

        // Space - activate/edit row
        KeyCode::Char(' ') => {
            app.activate();
        }
        KeyCode::Esc => {
            app.cancel_edit();
        }

        // Start / stop streaming
        KeyCode::Enter | KeyCode::Char('s') => {
            app.toggle_stream();
        }

        // Scope controls
        KeyCode::Char('p') => {
            app.sampler.toggle_pause();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.sampler.zoom_in();
        }
        KeyCode::Char('-') => {
            app.sampler.zoom_out();
        }
        KeyCode::Char('0') => {
            app.sampler.reset_zoom();
        }

        // ? - toggle help
        KeyCode::Char('?') => {
            app.toggle_help();
        }

        _ => {}
    }
}
