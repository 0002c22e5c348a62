use ratatui::layout::Rect;
use std::sync::Arc;
use tui_textarea::TextArea;

use crate::chat::ChatPanel;
use crate::constants;
use crate::knowledge_base::KnowledgeBase;
use crate::ui_components::MessageView;

/// Everything the terminal UI draws from and mutates between frames.
pub struct AppState {
    pub panel: ChatPanel,
    pub textarea: TextArea<'static>,
    pub message_view: MessageView,
    pub knowledge_base: Arc<KnowledgeBase>,
    pub model_label: String,
    pub tick: usize,
    pub should_quit: bool,
    /// Size of the last drawn frame, for mouse hit-testing.
    pub screen_area: Rect,
}

fn new_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_placeholder_text(constants::INPUT_PLACEHOLDER);
    textarea.set_cursor_line_style(ratatui::style::Style::default());
    textarea
}

impl AppState {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, model_label: impl Into<String>) -> Self {
        Self {
            panel: ChatPanel::new(),
            textarea: new_textarea(),
            message_view: MessageView::new(),
            knowledge_base,
            model_label: model_label.into(),
            tick: 0,
            should_quit: false,
            screen_area: Rect::default(),
        }
    }

    /// Copies the text field into the chat state.
    pub fn sync_input(&mut self) {
        let text = self.textarea.lines().join("\n");
        self.panel.state.set_input(text);
    }

    /// Starts a submit cycle from the current text field. On success the
    /// field is cleared and the question is returned for dispatch.
    pub fn take_submission(&mut self) -> Option<String> {
        self.sync_input();
        let input = self.panel.state.input().to_string();
        let question = self.panel.state.begin_submit(&input)?;
        self.textarea = new_textarea();
        Some(question)
    }

    pub fn receive_reply(&mut self, reply: String) {
        self.panel.state.finish_submit(reply);
    }

    pub fn input_is_blank(&self) -> bool {
        self.textarea.lines().iter().all(|l| l.trim().is_empty())
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> AppState {
        AppState::new(Arc::new(KnowledgeBase::builtin()), "gemini-test")
    }

    #[test]
    fn test_take_submission_clears_field() {
        let mut app = app();
        app.textarea.insert_str("What is SQL?");
        assert!(!app.input_is_blank());

        let question = app.take_submission();
        assert_eq!(question.as_deref(), Some("What is SQL?"));
        assert!(app.input_is_blank());
        assert!(app.panel.state.is_loading());
        assert_eq!(app.panel.state.history().len(), 2);
    }

    #[test]
    fn test_take_submission_ignores_blank_field() {
        let mut app = app();
        app.textarea.insert_str("   ");
        assert!(app.take_submission().is_none());
        assert_eq!(app.panel.state.history().len(), 1);
        assert_eq!(app.textarea.lines(), ["   "]);
    }

    #[test]
    fn test_receive_reply_ends_cycle() {
        let mut app = app();
        app.textarea.insert_str("q");
        app.take_submission().unwrap();
        app.receive_reply("a".to_string());
        assert!(!app.panel.state.is_loading());
        assert_eq!(app.panel.state.history().len(), 3);
    }
}
