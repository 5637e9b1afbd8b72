//! Interactive terminal UI for fetching and downloading videos.

mod app;
mod draw;
mod input;
mod view;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::api::{Backend, HttpBackend};
use crate::config::ClientConfig;
use crate::controller::SessionController;

use self::app::{Action, App};
use self::draw::draw;
use self::input::{handle_input, handle_paste};
pub use self::view::{HistoryLine, Panel, TuiView};

/// Redraw cadence; also bounds how late notices and the paste pulse expire.
const TICK: Duration = Duration::from_millis(100);

/// RAII guard that ensures terminal cleanup on drop.
/// Restores terminal to normal mode even if a panic occurs.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        crossterm::execute!(
            io::stdout(),
            EnterAlternateScreen,
            crossterm::event::EnableBracketedPaste
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(
            io::stdout(),
            crossterm::event::DisableBracketedPaste,
            LeaveAlternateScreen
        );
    }
}

/// Run the interactive TUI against the backend in `config`.
///
/// # Errors
/// Returns an error if terminal setup fails or the HTTP client cannot be built.
pub async fn run(config: ClientConfig) -> crate::Result<()> {
    let backend = Arc::new(HttpBackend::from_config(&config.server)?);
    log::info!("TUI started against {}", backend.base_url());

    let _terminal_guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let (mut controller, mut events) = SessionController::new(backend, TuiView::default(), config);
    let mut app = App::new();

    controller.request_initialize();

    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|f| draw(f, &app, controller.view()))?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if let Some(action) = handle_input(&mut app, controller.view_mut(), key) {
                        dispatch(&mut controller, action);
                    }
                }
                Some(Ok(Event::Paste(text))) => handle_paste(&mut app, &text),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
            Some(event) = events.recv() => {
                controller.handle_event(event);
            }
            _ = tick.tick() => {
                let now = Instant::now();
                app.expire(now);
                controller.view_mut().expire(now);
            }
        }

        if app.should_quit {
            break;
        }
    }

    controller.shutdown();
    terminal.show_cursor()?;
    Ok(())
}

/// Starts one action on the controller. The backend call runs in the
/// background and its outcome comes back through the event channel, so the
/// loop keeps drawing meanwhile. Failures are already on screen.
fn dispatch<B: Backend + ?Sized + 'static>(
    controller: &mut SessionController<B, TuiView>,
    action: Action,
) {
    let result = match action {
        Action::Fetch(url) => controller.request_info(&url),
        Action::DownloadVideo { url, quality } => controller.request_video_download(&url, &quality),
        Action::DownloadPlaylist { url, quality } => {
            controller.request_playlist_download(&url, &quality)
        }
        Action::Clear => {
            controller.request_clear();
            Ok(())
        }
    };
    if let Err(e) = result {
        log::debug!("Action rejected: {e}");
    }
}
