//! Keyboard and paste input handling.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::url::{is_video_url, pasted_url};

use super::app::{Action, App};
use super::view::{Panel, TuiView};

/// Applies a key press. Returns the controller work it triggers, if any.
pub fn handle_input(app: &mut App, view: &mut TuiView, key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => {
            app.should_quit = true;
            None
        }
        KeyCode::Char('d') if ctrl => download_action(app, view),
        KeyCode::Char('l') if ctrl => Some(Action::Clear),
        KeyCode::Enter => Some(Action::Fetch(app.url_input.clone())),
        KeyCode::Right => {
            if let Some(menu) = view.panel.menu_mut() {
                menu.select_next();
            }
            None
        }
        KeyCode::Left => {
            if let Some(menu) = view.panel.menu_mut() {
                menu.select_prev();
            }
            None
        }
        KeyCode::Esc => {
            if app.url_input.is_empty() {
                app.should_quit = true;
            } else {
                app.url_input.clear();
            }
            None
        }
        KeyCode::Char(c) if !ctrl => {
            app.url_input.push(c);
            None
        }
        KeyCode::Backspace => {
            app.url_input.pop();
            None
        }
        _ => None,
    }
}

/// Applies pasted text to the URL input.
///
/// A paste containing a YouTube URL replaces the input with that URL and
/// highlights the fetch hint.
pub fn handle_paste(app: &mut App, text: &str) {
    if is_video_url(text) {
        app.url_input = pasted_url(text);
        app.start_pulse();
    } else {
        app.url_input.push_str(&text.replace(['\n', '\r'], " "));
    }
}

fn download_action(app: &App, view: &TuiView) -> Option<Action> {
    let url = app.url_input.clone();
    match &view.panel {
        Panel::Video(_, menu) => Some(Action::DownloadVideo {
            url,
            quality: menu.selected().value,
        }),
        Panel::Playlist(_, menu) => Some(Action::DownloadPlaylist {
            url,
            quality: menu.selected().value,
        }),
        _ => None,
    }
}
