use std::io::{self, Stdout};
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::info;

use crate::manager::ConversationManager;
use crate::ui::conversation::{ChatAction, ChatView};

type ChatTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive chat until the user quits
pub async fn run_chat(manager: Arc<ConversationManager>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    info!("chat session started");
    let result = event_loop(&mut terminal, manager).await;

    // restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("chat session ended");

    result
}

async fn event_loop(terminal: &mut ChatTerminal, manager: Arc<ConversationManager>) -> Result<()> {
    let mut view = ChatView::new(manager.clone());
    let mut events = EventStream::new();
    let mut updates = manager.subscribe();

    loop {
        let snapshot = manager.snapshot();
        terminal.draw(|frame| view.draw(frame, &snapshot))?;

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) => {
                    if view.handle_key(key) == ChatAction::Exit {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                None => break,
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
