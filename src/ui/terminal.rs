use std::error::Error;
use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use super::app::App;
use crate::observer::CatalogEvent;
use crate::repo::BookRepo;

/// How long to wait for a key before checking for catalog changes.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits. A frame is drawn whenever a key was handled, the
/// terminal was resized or the catalog reported a change on `events`.
pub fn run_app<R, E>(app: &mut App<R, E>, events: Receiver<CatalogEvent>) -> Result<()>
where
    R: BookRepo<E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let mut dirty = true;
    let result = loop {
        if events.try_iter().count() > 0 {
            dirty = true;
        }

        if dirty {
            if let Err(err) = terminal.draw(|frame| app.draw(frame)) {
                break Err(err).context("failed to draw frame");
            }
            dirty = false;
        }

        match event::poll(POLL_INTERVAL) {
            Ok(false) => continue,
            Ok(true) => {}
            Err(err) => break Err(err).context("event polling failed"),
        }

        match event::read() {
            Ok(Event::Key(key_event)) if key_event.kind == KeyEventKind::Press => {
                let ctrl_c = key_event.modifiers.contains(KeyModifiers::CONTROL)
                    && key_event.code == KeyCode::Char('c');
                if ctrl_c || app.handle_key(key_event.code) {
                    break Ok(());
                }
                dirty = true;
            }
            Ok(Event::Resize(_, _)) => dirty = true,
            Ok(_) => {}
            Err(err) => break Err(err).context("failed to read event"),
        }
    };

    cleanup_terminal(&mut terminal)?;
    result
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
