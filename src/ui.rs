use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app_state::AppState;
use crate::constants;

/// The panel never grows wider than this many columns.
const PANEL_MAX_WIDTH: u16 = 72;

pub fn draw_ui(f: &mut Frame, app: &mut AppState) {
    app.screen_area = f.area();
    render_index_page(f, app, f.area());

    if app.panel.is_open() {
        let area = panel_area(f.area());
        render_panel(f, app, area);
    }
}

/// Right-hand overlay, full height, as wide as the screen allows up to
/// [`PANEL_MAX_WIDTH`].
pub fn panel_area(area: Rect) -> Rect {
    let width = area.width.min(PANEL_MAX_WIDTH);
    Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height: area.height,
    }
}

fn render_index_page(f: &mut Frame, app: &AppState, area: Rect) {
    // Dim the page behind an open panel
    let (title_style, text_style) = if app.panel.is_open() {
        (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
    } else {
        (
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            Style::default().fg(Color::White),
        )
    };

    let mut lines = Vec::new();
    for category in &app.knowledge_base.categories {
        lines.push(Line::from(Span::styled(category.title.clone(), title_style)));
        if let Some(description) = &category.description {
            lines.push(Line::from(Span::styled(
                description.clone(),
                text_style.add_modifier(Modifier::ITALIC),
            )));
        }
        for sub in &category.sub_categories {
            lines.push(Line::from(Span::styled(
                format!("  • {} ({} links)", sub.title, sub.links.len()),
                text_style,
            )));
        }
        lines.push(Line::from(""));
    }

    let page = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("InsightHub")
                .title_bottom(Line::from(" Ctrl+K / F2: ask the assistant · Esc: quit ").alignment(Alignment::Right)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(page, area);
}

fn render_panel(f: &mut Frame, app: &mut AppState, area: Rect) {
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(
            format!(" ✦ {} ", constants::PANEL_TITLE),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Esc: close ").alignment(Alignment::Right));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Status line
            Constraint::Min(3),    // Messages
            Constraint::Length(3), // Input
            Constraint::Length(1), // Footer
        ])
        .split(inner);

    let status = Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Green)),
        Span::styled(
            format!("POWERED BY {}", app.model_label.to_uppercase()),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(status), chunks[0]);

    app.message_view.render(f, chunks[1], &app.panel.state, app.tick);

    render_input(f, app, chunks[2]);

    let footer = Paragraph::new(Span::styled(constants::PANEL_FOOTER, Style::default().fg(Color::DarkGray)))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[3]);
}

fn render_input(f: &mut Frame, app: &mut AppState, area: Rect) {
    let loading = app.panel.state.is_loading();
    let send_enabled = !loading && !app.input_is_blank();

    let send_style = if send_enabled {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = if loading {
        Line::from(Span::styled(" Waiting for reply... ", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from(" Ask ")
    };

    app.textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if loading {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            })
            .title(title)
            .title_bottom(Line::from(Span::styled(" Enter ➤ send ", send_style)).alignment(Alignment::Right)),
    );
    app.textarea.set_style(if loading {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    });
    f.render_widget(&app.textarea, area);
}
