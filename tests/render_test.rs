use crossterm::event::{MouseButton, MouseEventKind};
use insighthub::app_state::AppState;
use insighthub::{constants, events, ui, KnowledgeBase};
use ratatui::{backend::TestBackend, Terminal};
use std::sync::Arc;

fn screen_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let mut text = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            text.push_str(buffer[(x, y)].symbol());
        }
        text.push('\n');
    }
    text
}

fn draw(app: &mut AppState) -> Terminal<TestBackend> {
    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|f| ui::draw_ui(f, app)).unwrap();
    terminal
}

fn app() -> AppState {
    AppState::new(Arc::new(KnowledgeBase::builtin()), "gemini-test")
}

#[test]
fn test_closed_panel_shows_index_only() {
    let mut app = app();
    let text = screen_text(&draw(&mut app));
    assert!(text.contains("Machine Learning"));
    assert!(!text.contains(constants::PANEL_TITLE));
}

#[test]
fn test_open_panel_shows_greeting_and_chrome() {
    let mut app = app();
    app.panel.open();
    let text = screen_text(&draw(&mut app));
    assert!(text.contains(constants::PANEL_TITLE));
    assert!(text.contains("POWERED BY GEMINI-TEST"));
    assert!(text.contains("Hello! I'm your knowledge base"));
    assert!(text.contains(constants::INPUT_PLACEHOLDER));
}

#[test]
fn test_clicking_dimmed_page_closes_panel() {
    let mut app = app();
    app.panel.open();
    draw(&mut app);

    let panel = ui::panel_area(app.screen_area);
    events::handle_mouse_event(&mut app, MouseEventKind::Down(MouseButton::Left), panel.x + 1, 2);
    assert!(app.panel.is_open());

    events::handle_mouse_event(&mut app, MouseEventKind::Down(MouseButton::Left), 0, 2);
    assert!(!app.panel.is_open());
    let text = screen_text(&draw(&mut app));
    assert!(!text.contains(constants::PANEL_TITLE));
}

#[test]
fn test_loading_shows_typing_indicator() {
    let mut app = app();
    app.panel.open();
    app.textarea.insert_str("What is SQL?");
    app.take_submission().unwrap();

    let text = screen_text(&draw(&mut app));
    assert!(text.contains("What is SQL?"));
    assert!(text.contains("typing"));
    assert!(text.contains("Waiting for reply"));

    app.receive_reply("SQL is a query language".to_string());
    let text = screen_text(&draw(&mut app));
    assert!(!text.contains("typing"));
    assert!(text.contains("SQL is a query language"));
}

#[test]
fn test_long_history_stays_scrolled_to_bottom() {
    let mut app = app();
    app.panel.open();
    for i in 0..20 {
        app.panel.state.append_user(format!("question {i}"));
        app.panel.state.append_assistant(format!("answer {i}"));
    }

    let text = screen_text(&draw(&mut app));
    assert!(text.contains("answer 19"));
    assert!(!text.contains("question 0 "));
    assert!(app.message_view.is_at_bottom());
}
