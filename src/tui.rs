//! Terminal front end: raw-mode setup, the draw/poll loop, and dispatch of
//! submitted questions onto the runtime.

use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{io, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::events::{self, Action};
use crate::knowledge_base::KnowledgeBase;
use crate::orchestrator::PromptOrchestrator;
use crate::ui;

pub async fn run(orchestrator: PromptOrchestrator, knowledge_base: Arc<KnowledgeBase>) -> Result<()> {
    info!("Starting terminal UI");

    enable_raw_mode()?;
    // Everything after raw mode goes through restore, including a failed
    // alternate-screen switch or terminal setup.
    let res = run_in_raw_mode(orchestrator, knowledge_base).await;
    let res = first_error(res, restore_terminal());

    info!("Terminal UI closed");
    res
}

async fn run_in_raw_mode(orchestrator: PromptOrchestrator, knowledge_base: Arc<KnowledgeBase>) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = AppState::new(knowledge_base, orchestrator.model_id());
    run_app(&mut terminal, &mut app, orchestrator).await
}

/// Leaves raw mode and the alternate screen. Both steps are attempted even if
/// the first one fails.
fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        cursor::Show
    );
    raw?;
    screen?;
    Ok(())
}

/// The session's own error takes priority over a failure to restore.
fn first_error(session: Result<()>, restore: Result<()>) -> Result<()> {
    match (session, restore) {
        (Err(e), Err(restore_err)) => {
            warn!(error = %restore_err, "Failed to restore terminal");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), restore) => restore,
    }
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    orchestrator: PromptOrchestrator,
) -> Result<()> {
    let (reply_tx, mut reply_rx) = mpsc::channel::<String>(4);

    loop {
        while let Ok(reply) = reply_rx.try_recv() {
            debug!(len = reply.len(), "Reply received");
            app.receive_reply(reply);
        }

        terminal.draw(|f| ui::draw_ui(f, app))?;
        app.advance_tick();

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        let action = match event::read()? {
            Event::Key(key) => events::handle_key_event(app, key),
            Event::Mouse(mouse) => {
                events::handle_mouse_event(app, mouse.kind, mouse.column, mouse.row);
                Action::None
            }
            Event::Paste(data) => {
                events::handle_paste(app, &data);
                Action::None
            }
            _ => Action::None,
        };

        match action {
            Action::Quit => return Ok(()),
            Action::Submit(question) => {
                let orchestrator = orchestrator.clone();
                let tx = reply_tx.clone();
                tokio::spawn(async move {
                    let reply = orchestrator.get_response(&question).await;
                    if tx.send(reply).await.is_err() {
                        warn!("UI closed before the reply arrived");
                    }
                });
            }
            Action::None => {}
        }
    }
}
