use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use ratatui::layout::Position;
use tracing::debug;

use crate::app_state::AppState;
use crate::ui;

/// What the event loop must do after a key or mouse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Dispatch this question to the orchestrator.
    Submit(String),
}

pub fn handle_key_event(app: &mut AppState, key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
            app.should_quit = true;
            Action::Quit
        }
        (KeyCode::Char('k'), KeyModifiers::CONTROL) | (KeyCode::F(2), _) => {
            app.panel.toggle();
            debug!(open = app.panel.is_open(), "Panel toggled");
            Action::None
        }
        (KeyCode::Esc, _) => {
            if app.panel.is_open() {
                app.panel.close();
                Action::None
            } else {
                app.should_quit = true;
                Action::Quit
            }
        }
        _ if !app.panel.is_open() => match key.code {
            KeyCode::Char('q') => {
                app.should_quit = true;
                Action::Quit
            }
            KeyCode::Enter | KeyCode::Char('a') => {
                app.panel.open();
                Action::None
            }
            _ => Action::None,
        },

        // Scrolling
        (KeyCode::PageUp, _) => {
            app.message_view.scroll_up(5);
            Action::None
        }
        (KeyCode::PageDown, _) => {
            app.message_view.scroll_down(5);
            Action::None
        }
        (KeyCode::Up, KeyModifiers::CONTROL) => {
            app.message_view.scroll_up(1);
            Action::None
        }
        (KeyCode::Down, KeyModifiers::CONTROL) => {
            app.message_view.scroll_down(1);
            Action::None
        }
        (KeyCode::Home, KeyModifiers::CONTROL) => {
            app.message_view.scroll_to_top();
            Action::None
        }
        (KeyCode::End, KeyModifiers::CONTROL) => {
            app.message_view.scroll_to_bottom();
            Action::None
        }

        (KeyCode::Enter, KeyModifiers::NONE) => match app.take_submission() {
            Some(question) => Action::Submit(question),
            None => Action::None,
        },

        // Input is read-only while a reply is pending
        _ if app.panel.state.is_loading() => Action::None,
        _ => {
            app.textarea.input(key);
            app.sync_input();
            Action::None
        }
    }
}

/// Scrolls the message list, or closes the panel on a click on the dimmed
/// page behind it.
pub fn handle_mouse_event(app: &mut AppState, kind: MouseEventKind, column: u16, row: u16) {
    if !app.panel.is_open() {
        return;
    }
    match kind {
        MouseEventKind::ScrollUp => app.message_view.scroll_up(3),
        MouseEventKind::ScrollDown => app.message_view.scroll_down(3),
        MouseEventKind::Down(_) if !app.screen_area.is_empty() => {
            if !ui::panel_area(app.screen_area).contains(Position::new(column, row)) {
                debug!(column, row, "Backdrop clicked, closing panel");
                app.panel.close();
            }
        }
        _ => {}
    }
}

/// Inserts pasted text into the input field, unless a reply is pending.
pub fn handle_paste(app: &mut AppState, data: &str) {
    if !app.panel.is_open() || app.panel.state.is_loading() {
        return;
    }
    debug!("Paste event detected with {} characters", data.len());
    app.textarea.insert_str(data.replace(['\r', '\n'], " "));
    app.sync_input();
}
