//! Screen state the controller writes into and `draw` reads from.

use std::time::{Duration, Instant};

use crate::history::DownloadHistory;
use crate::model::{PlaylistInfo, VideoInfo};
use crate::quality::QualityMenu;
use crate::view::{Notice, ProgressDisplay, Toast, View};

/// What the main panel currently shows.
#[derive(Debug, Clone, Default)]
pub enum Panel {
    #[default]
    Empty,
    Loading,
    Error(String),
    Video(Box<VideoInfo>, QualityMenu),
    Playlist(PlaylistInfo, QualityMenu),
}

impl Panel {
    /// The quality selector of the shown panel, if it has one.
    pub const fn menu(&self) -> Option<&QualityMenu> {
        match self {
            Self::Video(_, menu) | Self::Playlist(_, menu) => Some(menu),
            _ => None,
        }
    }

    pub const fn menu_mut(&mut self) -> Option<&mut QualityMenu> {
        match self {
            Self::Video(_, menu) | Self::Playlist(_, menu) => Some(menu),
            _ => None,
        }
    }
}

/// One line of the recent-downloads list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLine {
    pub name: String,
    pub time: String,
    pub link: String,
}

/// A message with an optional expiry.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub until: Option<Instant>,
}

impl<T> Timed<T> {
    fn new(value: T, timeout: Option<Duration>) -> Self {
        Self {
            value,
            until: timeout.map(|t| Instant::now() + t),
        }
    }

    fn expired(&self, now: Instant) -> bool {
        self.until.is_some_and(|until| now >= until)
    }
}

/// [`View`] implementation backing the terminal UI.
#[derive(Debug, Clone, Default)]
pub struct TuiView {
    pub panel: Panel,
    pub progress: Option<ProgressDisplay>,
    pub notice: Option<Timed<Notice>>,
    pub toast: Option<Timed<Toast>>,
    pub history: Vec<HistoryLine>,
}

impl TuiView {
    /// Drops the notice and toast once their time is up.
    pub fn expire(&mut self, now: Instant) {
        if self.notice.as_ref().is_some_and(|n| n.expired(now)) {
            self.notice = None;
        }
        if self.toast.as_ref().is_some_and(|t| t.expired(now)) {
            self.toast = None;
        }
    }
}

impl View for TuiView {
    fn show_loading(&mut self) {
        self.panel = Panel::Loading;
    }

    fn show_error(&mut self, message: &str) {
        self.panel = Panel::Error(message.to_string());
        self.progress = None;
    }

    fn show_video(&mut self, info: &VideoInfo, qualities: &QualityMenu) {
        self.panel = Panel::Video(Box::new(info.clone()), qualities.clone());
    }

    fn show_playlist(&mut self, info: &PlaylistInfo, qualities: &QualityMenu) {
        self.panel = Panel::Playlist(info.clone(), qualities.clone());
    }

    fn show_progress_panel(&mut self, progress: &ProgressDisplay) {
        self.progress = Some(progress.clone());
    }

    fn update_progress(&mut self, progress: &ProgressDisplay) {
        self.progress = Some(progress.clone());
    }

    fn show_success(&mut self, notice: &Notice) {
        self.notice = Some(Timed::new(notice.clone(), notice.timeout()));
    }

    fn show_history(&mut self, history: &DownloadHistory) {
        self.history = history
            .iter()
            .map(|entry| HistoryLine {
                name: entry.display_name(),
                time: entry.time_label(),
                link: entry.download_url.clone(),
            })
            .collect();
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.toast = Some(Timed::new(toast.clone(), Some(toast.timeout())));
    }
}
