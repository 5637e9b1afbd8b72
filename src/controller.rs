//! The download session controller.
//!
//! [`SessionController`] mediates between user input, the backend and a
//! [`View`]. It owns the [`Session`] state and makes sure at most one progress
//! poll loop runs at a time.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::{Backend, CLEAR_FALLBACK, INFO_FALLBACK, PLAYLIST_FALLBACK, VIDEO_FALLBACK};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::event::{Completion, SessionEvent};
use crate::history::HistoryEntry;
use crate::model::{MediaInfo, ProgressReport, ProgressStatus, Quality};
use crate::poll::spawn_poller;
use crate::quality::QualityMenu;
use crate::session::{Session, TrackingId};
use crate::view::{NO_VALUE, Notice, ProgressDisplay, ProgressTone, Toast, ToastKind, View};

pub const EMPTY_INFO_URL: &str = "Please enter a YouTube URL";
pub const EMPTY_DOWNLOAD_URL: &str = "URL is required";
pub const DOWNLOAD_COMPLETE: &str = "Download completed successfully!";
pub const CLEARED: &str = "All temporary downloads cleared!";
pub const CLEAR_FAILED: &str = CLEAR_FALLBACK;
const UNKNOWN_ERROR: &str = "Unknown error";

/// Where the tracked download stands after an event was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No poll loop is running.
    Idle,
    /// A poll loop is running for the tracked download.
    Polling,
}

/// Client-side controller for one download session.
pub struct SessionController<B: Backend + ?Sized + 'static, V: View> {
    backend: Arc<B>,
    view: V,
    config: ClientConfig,
    session: Session,
    video_qualities: QualityMenu,
    playlist_qualities: QualityMenu,
    events: mpsc::UnboundedSender<SessionEvent>,
    requests: CancellationToken,
}

impl<B: Backend + ?Sized + 'static, V: View> SessionController<B, V> {
    /// Creates a controller and the receiver its poll loops report to.
    ///
    /// The owner drains the receiver and passes each event to
    /// [`handle_event`](Self::handle_event), or calls
    /// [`run_until_idle`](Self::run_until_idle).
    pub fn new(
        backend: Arc<B>,
        view: V,
        config: ClientConfig,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let controller = Self {
            backend,
            view,
            session: Session::new(config.session.history_limit),
            config,
            video_qualities: QualityMenu::default(),
            playlist_qualities: QualityMenu::playlist_presets(),
            events,
            requests: CancellationToken::new(),
        };
        (controller, rx)
    }

    #[must_use]
    pub const fn view(&self) -> &V {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Quality choices of the last fetched video.
    #[must_use]
    pub const fn video_qualities(&self) -> &QualityMenu {
        &self.video_qualities
    }

    /// Quality choices offered for playlists.
    #[must_use]
    pub const fn playlist_qualities(&self) -> &QualityMenu {
        &self.playlist_qualities
    }

    /// Current state of the progress poll loop.
    #[must_use]
    pub const fn poll_state(&self) -> PollState {
        if self.session.is_polling() {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    /// Start-of-session step: clears the backend's downloads after the
    /// configured delay, when enabled.
    pub async fn initialize(&mut self) -> Result<()> {
        if !self.config.session.clear_on_start {
            return Ok(());
        }
        tokio::time::sleep(self.config.session.clear_delay()).await;
        self.clear_downloads().await
    }

    /// Fetches and displays metadata for `url`.
    ///
    /// An empty URL is rejected without contacting the backend.
    pub async fn fetch_info(&mut self, url: &str) -> Result<MediaInfo> {
        let url = self.require_url(url, EMPTY_INFO_URL)?;
        self.view.show_loading();
        let result = self.backend.video_info(&url).await;
        self.apply_info(result)
    }

    /// Starts downloading a single video and begins tracking its progress.
    pub async fn start_video_download(&mut self, url: &str, quality: &Quality) -> Result<()> {
        let url = self.require_url(url, EMPTY_DOWNLOAD_URL)?;
        let result = self.backend.download_video(&url, quality).await;
        self.apply_video_started(quality, result)
    }

    /// Starts downloading a playlist and begins tracking its progress.
    pub async fn start_playlist_download(&mut self, url: &str, quality: &Quality) -> Result<()> {
        let url = self.require_url(url, EMPTY_DOWNLOAD_URL)?;
        let result = self.backend.download_playlist(&url, quality).await;
        self.apply_playlist_started(quality, result)
    }

    /// Asks the backend to purge its downloads and empties the history.
    ///
    /// On failure the history is left as it was.
    pub async fn clear_downloads(&mut self) -> Result<()> {
        let result = self.backend.clear_downloads().await;
        self.apply_cleared(result)
    }

    // The `request_*` variants validate and update the view right away, then
    // run the backend call in a spawned task. Its outcome arrives on the event
    // channel as `SessionEvent::Completed` and is applied by `handle_event`.

    /// Background [`initialize`](Self::initialize).
    pub fn request_initialize(&self) {
        if !self.config.session.clear_on_start {
            return;
        }
        let backend = Arc::clone(&self.backend);
        let delay = self.config.session.clear_delay();
        self.spawn_request(async move {
            tokio::time::sleep(delay).await;
            Completion::Cleared(backend.clear_downloads().await)
        });
    }

    /// Background [`fetch_info`](Self::fetch_info).
    pub fn request_info(&mut self, url: &str) -> Result<()> {
        let url = self.require_url(url, EMPTY_INFO_URL)?;
        self.view.show_loading();
        let backend = Arc::clone(&self.backend);
        self.spawn_request(async move { Completion::Info(backend.video_info(&url).await) });
        Ok(())
    }

    /// Background [`start_video_download`](Self::start_video_download).
    pub fn request_video_download(&mut self, url: &str, quality: &Quality) -> Result<()> {
        let url = self.require_url(url, EMPTY_DOWNLOAD_URL)?;
        let backend = Arc::clone(&self.backend);
        let quality = quality.clone();
        self.spawn_request(async move {
            let result = backend.download_video(&url, &quality).await;
            Completion::VideoStarted { quality, result }
        });
        Ok(())
    }

    /// Background [`start_playlist_download`](Self::start_playlist_download).
    pub fn request_playlist_download(&mut self, url: &str, quality: &Quality) -> Result<()> {
        let url = self.require_url(url, EMPTY_DOWNLOAD_URL)?;
        let backend = Arc::clone(&self.backend);
        let quality = quality.clone();
        self.spawn_request(async move {
            let result = backend.download_playlist(&url, &quality).await;
            Completion::PlaylistStarted { quality, result }
        });
        Ok(())
    }

    /// Background [`clear_downloads`](Self::clear_downloads).
    pub fn request_clear(&self) {
        let backend = Arc::clone(&self.backend);
        self.spawn_request(async move { Completion::Cleared(backend.clear_downloads().await) });
    }

    /// Applies an event from a poll loop or a background request.
    ///
    /// Poll events for a download other than the tracked one are dropped.
    pub fn handle_event(&mut self, event: SessionEvent) -> PollState {
        if let Some(stale) = event
            .tracking()
            .filter(|tracking| !self.session.is_tracking(tracking))
        {
            log::debug!("Ignoring stale event for {stale}");
            return self.poll_state();
        }
        match event {
            SessionEvent::Progress { report, .. } => self.apply_progress(&report),
            // A failed poll is shown exactly like a backend-reported failure.
            SessionEvent::PollFailed { .. } => self.apply_progress(&ProgressReport::failed(None)),
            SessionEvent::Completed(completion) => {
                // Failures are already on screen.
                if let Err(e) = self.apply_completion(completion) {
                    log::debug!("Background request failed: {e}");
                }
                self.poll_state()
            }
        }
    }

    /// Drains `events` until no poll loop is running.
    pub async fn run_until_idle(&mut self, events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
        while self.session.is_polling() {
            match events.recv().await {
                Some(event) => {
                    self.handle_event(event);
                }
                None => break,
            }
        }
    }

    /// Cancels any running poll loop and pending background requests.
    pub fn shutdown(&mut self) {
        self.session.stop_polling();
        self.requests.cancel();
    }

    fn apply_completion(&mut self, completion: Completion) -> Result<()> {
        match completion {
            Completion::Info(result) => self.apply_info(result).map(drop),
            Completion::VideoStarted { quality, result } => {
                self.apply_video_started(&quality, result)
            }
            Completion::PlaylistStarted { quality, result } => {
                self.apply_playlist_started(&quality, result)
            }
            Completion::Cleared(result) => self.apply_cleared(result),
        }
    }

    fn apply_info(&mut self, result: Result<MediaInfo>) -> Result<MediaInfo> {
        match result {
            Ok(MediaInfo::Video(info)) => {
                log::info!("Fetched video info: {}", info.title.as_deref().unwrap_or("?"));
                self.video_qualities = QualityMenu::from_formats(&info.formats);
                self.view.show_video(&info, &self.video_qualities);
                Ok(MediaInfo::Video(info))
            }
            Ok(MediaInfo::Playlist(info)) => {
                log::info!(
                    "Fetched playlist info: {} ({} videos)",
                    info.title.as_deref().unwrap_or("?"),
                    info.video_count
                );
                self.view.show_playlist(&info, &self.playlist_qualities);
                Ok(MediaInfo::Playlist(info))
            }
            Err(e) => Err(self.report_failure("Error fetching video info", e, INFO_FALLBACK)),
        }
    }

    fn apply_video_started(&mut self, quality: &Quality, result: Result<String>) -> Result<()> {
        match result {
            Ok(id) => {
                let kind = if quality.is_audio() { "audio" } else { "video" };
                log::info!("Video download started: {id} ({quality}, {kind})");
                self.begin_tracking(TrackingId::Video(id));
                Ok(())
            }
            Err(e) => Err(self.report_failure("Download error", e, VIDEO_FALLBACK)),
        }
    }

    fn apply_playlist_started(&mut self, quality: &Quality, result: Result<String>) -> Result<()> {
        match result {
            Ok(id) => {
                log::info!("Playlist download started: {id} ({quality})");
                self.begin_tracking(TrackingId::Playlist(id));
                Ok(())
            }
            Err(e) => Err(self.report_failure("Playlist download error", e, PLAYLIST_FALLBACK)),
        }
    }

    fn apply_cleared(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                log::info!("Cleared downloads");
                self.session.history_mut().clear();
                self.view.clear_history();
                self.view.show_toast(&Toast::new(CLEARED, ToastKind::Success));
                Ok(())
            }
            Err(e) => {
                log::error!("Clear downloads error: {e}");
                self.view.show_toast(&Toast::new(CLEAR_FAILED, ToastKind::Error));
                Err(e)
            }
        }
    }

    fn spawn_request<F>(&self, request: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let token = self.requests.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => {}
                completion = request => {
                    let _ = events.send(SessionEvent::Completed(completion));
                }
            }
        });
    }

    /// The progress-poll state machine.
    fn apply_progress(&mut self, report: &ProgressReport) -> PollState {
        let mut display = ProgressDisplay {
            percent: report.percent.unwrap_or(0.0),
            speed: report.speed.clone().unwrap_or_else(|| NO_VALUE.to_string()),
            eta: report.eta.clone().unwrap_or_else(|| NO_VALUE.to_string()),
            caption: "Starting...".to_string(),
            tone: ProgressTone::Starting,
        };

        match report.status {
            ProgressStatus::Downloading => {
                display.caption = "Downloading...".to_string();
                display.tone = ProgressTone::Active;
                self.view.update_progress(&display);
            }
            ProgressStatus::Starting | ProgressStatus::Unknown => {
                self.view.update_progress(&display);
            }
            ProgressStatus::Finished => {
                display.percent = 100.0;
                display.caption = "Download Complete!".to_string();
                display.tone = ProgressTone::Success;
                self.session.stop_polling();
                self.view.update_progress(&display);
                self.finish(report);
            }
            ProgressStatus::Error => {
                display.caption = "Download Failed".to_string();
                display.tone = ProgressTone::Failure;
                self.session.stop_polling();
                self.view.update_progress(&display);
                let reason = report.error.as_deref().unwrap_or(UNKNOWN_ERROR);
                log::error!("Download failed: {reason}");
                self.view.show_error(&format!("Download failed: {reason}"));
            }
        }

        self.poll_state()
    }

    fn finish(&mut self, report: &ProgressReport) {
        let link = report.download_url.clone();
        self.view.show_success(&Notice {
            message: DOWNLOAD_COMPLETE.to_string(),
            link: link.clone(),
        });

        if let Some(url) = link {
            let filename = report
                .filename
                .clone()
                .unwrap_or_else(|| filename_from_url(&url));
            log::info!("Download complete: {filename}");
            self.session
                .history_mut()
                .push(HistoryEntry::new(filename, url));
            self.view.show_history(self.session.history());
        }
    }

    fn begin_tracking(&mut self, id: TrackingId) {
        self.session.begin_tracking(id.clone());
        self.view.show_progress_panel(&ProgressDisplay::starting());
        let handle = spawn_poller(
            Arc::clone(&self.backend),
            id,
            self.config.poll.clone(),
            self.events.clone(),
        );
        self.session.attach_poll(handle);
    }

    fn require_url(&mut self, url: &str, message: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            self.view.show_error(message);
            return Err(Error::Validation(message.to_string()));
        }
        Ok(url.to_string())
    }

    fn report_failure(&mut self, context: &str, error: Error, fallback: &str) -> Error {
        log::error!("{context}: {error}");
        self.view.show_error(&error.user_message(fallback));
        error
    }
}

impl<B: Backend + ?Sized + 'static, V: View> Drop for SessionController<B, V> {
    fn drop(&mut self) {
        self.session.stop_polling();
        self.requests.cancel();
    }
}

fn filename_from_url(url: &str) -> String {
    url.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(url)
        .to_string()
}
