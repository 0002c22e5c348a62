//! Conversation state for the assistant panel.
//!
//! [`ChatState`] is the plain record (history, loading flag, input text) with
//! its transitions; [`ChatPanel`] adds visibility and the full submit cycle.

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::constants;
use crate::orchestrator::PromptOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    /// Hour and minute, e.g. `14:05`.
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[derive(Debug, Clone)]
pub struct ChatState {
    history: Vec<ChatMessage>,
    is_loading: bool,
    input: String,
}

impl ChatState {
    /// A fresh conversation holding only the greeting.
    pub fn new() -> Self {
        Self {
            history: vec![ChatMessage::new(ChatRole::Assistant, constants::GREETING)],
            is_loading: false,
            input: String::new(),
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn append_user(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::new(ChatRole::User, content));
    }

    pub fn append_assistant(&mut self, content: impl Into<String>) {
        self.push(ChatMessage::new(ChatRole::Assistant, content));
    }

    // Wall-clock time can step backwards; keep history order non-decreasing.
    fn push(&mut self, mut message: ChatMessage) {
        if let Some(last) = self.history.last() {
            if message.timestamp < last.timestamp {
                message.timestamp = last.timestamp;
            }
        }
        self.history.push(message);
    }

    pub fn can_submit(&self, text: &str) -> bool {
        !self.is_loading && !text.trim().is_empty()
    }

    /// Starts a submit cycle: appends the user turn, clears the input and
    /// raises the loading flag. Returns the text to send, or `None` (with no
    /// state change) if the text is blank or a request is already in flight.
    pub fn begin_submit(&mut self, text: &str) -> Option<String> {
        if !self.can_submit(text) {
            debug!(loading = self.is_loading, "Submit ignored");
            return None;
        }
        self.append_user(text);
        self.input.clear();
        self.set_loading(true);
        Some(text.to_string())
    }

    /// Completes a submit cycle with the assistant's reply.
    pub fn finish_submit(&mut self, reply: impl Into<String>) {
        self.append_assistant(reply);
        self.set_loading(false);
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

/// The togglable assistant panel. Closing it keeps the conversation.
#[derive(Debug, Clone, Default)]
pub struct ChatPanel {
    pub state: ChatState,
    open: bool,
}

impl ChatPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Runs a whole submit cycle, awaiting the orchestrator in place.
    pub async fn submit(&mut self, orchestrator: &PromptOrchestrator, text: &str) {
        let Some(question) = self.state.begin_submit(text) else {
            return;
        };
        info!(len = question.len(), "Submitting question");
        let reply = orchestrator.get_response(&question).await;
        self.state.finish_submit(reply);
    }
}
