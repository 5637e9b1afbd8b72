//! The display seam between the session controller and a front end.

use std::time::Duration;

use crate::format::format_percent;
use crate::history::DownloadHistory;
use crate::model::{PlaylistInfo, VideoInfo};
use crate::quality::QualityMenu;

/// How long a toast stays on screen.
pub const TOAST_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a success notice without a download link stays on screen.
pub const NOTICE_TIMEOUT: Duration = Duration::from_secs(5);

/// Placeholder shown for a missing speed or ETA.
pub const NO_VALUE: &str = "-";

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";
pub const UNKNOWN_UPLOADER: &str = "Unknown Uploader";
pub const NO_DESCRIPTION: &str = "No description available.";

/// Playlist entry titles are cut to this many characters.
pub const ENTRY_TITLE_LIMIT: usize = 60;

/// Visual tone of the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressTone {
    Starting,
    Active,
    Success,
    Failure,
}

/// Display-ready progress values.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressDisplay {
    /// Completion in percent, 0..=100.
    pub percent: f64,
    pub speed: String,
    pub eta: String,
    /// Status caption such as `Downloading...`.
    pub caption: String,
    pub tone: ProgressTone,
}

impl ProgressDisplay {
    /// The freshly reset panel shown when a download starts.
    #[must_use]
    pub fn starting() -> Self {
        Self {
            percent: 0.0,
            speed: NO_VALUE.to_string(),
            eta: NO_VALUE.to_string(),
            caption: "Starting...".to_string(),
            tone: ProgressTone::Starting,
        }
    }

    /// Text drawn on the bar itself, e.g. `40%`.
    #[must_use]
    pub fn bar_label(&self) -> String {
        format_percent(self.percent)
    }

    /// Completion as a ratio in 0.0..=1.0.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.percent.is_finite() {
            (self.percent / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Success message shown when a download completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Where the finished file can be retrieved, if the backend said.
    pub link: Option<String>,
}

impl Notice {
    /// How long the notice stays up; `None` means until replaced.
    ///
    /// Notices carrying a link stay so the user can still follow it.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.link.is_some() {
            None
        } else {
            Some(NOTICE_TIMEOUT)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Short-lived floating message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

impl Toast {
    #[must_use]
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        TOAST_TIMEOUT
    }
}

/// Receives everything the session controller wants displayed.
///
/// All methods have default no-op implementations so a front end only needs
/// to implement what it shows.
pub trait View {
    /// A metadata request is in flight; hides the other panels.
    fn show_loading(&mut self) {}

    /// Replaces the main panel with an error message.
    fn show_error(&mut self, _message: &str) {}

    /// Shows single-video details with the quality selector.
    fn show_video(&mut self, _info: &VideoInfo, _qualities: &QualityMenu) {}

    /// Shows playlist details with the playlist quality selector.
    fn show_playlist(&mut self, _info: &PlaylistInfo, _qualities: &QualityMenu) {}

    /// Shows the progress panel reset to its starting state.
    fn show_progress_panel(&mut self, _progress: &ProgressDisplay) {}

    /// Updates the progress panel.
    fn update_progress(&mut self, _progress: &ProgressDisplay) {}

    /// Shows a completion notice.
    fn show_success(&mut self, _notice: &Notice) {}

    /// Shows the recent-downloads list.
    fn show_history(&mut self, _history: &DownloadHistory) {}

    /// Empties and hides the recent-downloads list.
    fn clear_history(&mut self) {}

    /// Shows a transient message.
    fn show_toast(&mut self, _toast: &Toast) {}
}

/// A view that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoView;

impl View for NoView {}
