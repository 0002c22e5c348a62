use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};

use crate::chat::{ChatRole, ChatState};

/// Bubbles take at most this share of the message area width.
const BUBBLE_WIDTH_PERCENT: usize = 85;

/// Scrollable message list that sticks to the newest message.
///
/// Any change to the history length or the loading flag snaps the view back
/// to the bottom; manual scrolling detaches it until the next change.
#[derive(Debug, Default)]
pub struct MessageView {
    pub scroll_position: usize,
    pub max_scroll: usize,
    follow_bottom: bool,
    last_seen: Option<(usize, bool)>,
}

impl MessageView {
    pub fn new() -> Self {
        Self {
            follow_bottom: true,
            ..Self::default()
        }
    }

    /// Row offset for the paragraph; histories taller than `u16::MAX` rows
    /// pin at the last representable row.
    pub fn scroll_offset(&self) -> u16 {
        u16::try_from(self.scroll_position).unwrap_or(u16::MAX)
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_position = self.scroll_position.saturating_sub(lines);
        self.follow_bottom = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_position = (self.scroll_position + lines).min(self.max_scroll);
        self.follow_bottom = self.scroll_position >= self.max_scroll;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.scroll_position = self.max_scroll;
    }

    pub fn scroll_to_top(&mut self) {
        self.follow_bottom = false;
        self.scroll_position = 0;
    }

    pub fn is_at_bottom(&self) -> bool {
        self.follow_bottom
    }

    /// Recomputes bounds for `total_lines` of content in a viewport of
    /// `height` rows, re-attaching to the bottom if the state changed.
    pub fn update(&mut self, state: &ChatState, total_lines: usize, height: usize) {
        let seen = (state.history().len(), state.is_loading());
        if self.last_seen != Some(seen) {
            self.last_seen = Some(seen);
            self.follow_bottom = true;
        }

        self.max_scroll = total_lines.saturating_sub(height);
        if self.follow_bottom {
            self.scroll_position = self.max_scroll;
        } else {
            self.scroll_position = self.scroll_position.min(self.max_scroll);
        }
    }

    pub fn render(&mut self, f: &mut ratatui::Frame, area: Rect, state: &ChatState, tick: usize) {
        // Split area to leave space for scrollbar
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let lines = message_lines(state, chunks[0].width, tick);
        self.update(state, lines.len(), chunks[0].height as usize);

        let paragraph = Paragraph::new(Text::from(lines)).scroll((self.scroll_offset(), 0));
        f.render_widget(paragraph, chunks[0]);

        if self.max_scroll > 0 {
            let mut scrollbar_state = ScrollbarState::new(self.max_scroll).position(self.scroll_position);
            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            f.render_stateful_widget(scrollbar, chunks[1], &mut scrollbar_state);
        }
    }
}

fn role_style(role: ChatRole) -> (Alignment, Style, &'static str) {
    match role {
        ChatRole::User => (Alignment::Right, Style::default().fg(Color::Cyan), "You"),
        ChatRole::Assistant => (Alignment::Left, Style::default().fg(Color::Green), "Assistant"),
    }
}

/// Pre-wrapped display lines for the whole conversation, plus the typing
/// indicator while a request is in flight.
pub fn message_lines(state: &ChatState, width: u16, tick: usize) -> Vec<Line<'static>> {
    let bubble_width = (width as usize * BUBBLE_WIDTH_PERCENT / 100).max(1);
    let mut lines = Vec::new();

    for msg in state.history() {
        let (alignment, style, label) = role_style(msg.role);

        for wrapped in textwrap::wrap(&msg.content, bubble_width) {
            lines.push(Line::from(Span::styled(wrapped.into_owned(), style)).alignment(alignment));
        }
        lines.push(
            Line::from(vec![
                Span::styled(label, style.add_modifier(Modifier::BOLD)),
                Span::styled(format!(" · {}", msg.time_label()), Style::default().fg(Color::DarkGray)),
            ])
            .alignment(alignment),
        );
        lines.push(Line::from(""));
    }

    if state.is_loading() {
        lines.push(typing_indicator(tick));
    }

    lines
}

pub fn typing_indicator(tick: usize) -> Line<'static> {
    let dots = "●".repeat(tick % 3 + 1);
    Line::from(vec![
        Span::styled(format!("{:<3}", dots), Style::default().fg(Color::Gray)),
        Span::styled(" typing", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
    ])
    .alignment(Alignment::Left)
}
