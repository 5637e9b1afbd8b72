//! Scripted backend and recording view shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::Backend;
use crate::error::{Error, Result};
use crate::history::DownloadHistory;
use crate::model::{MediaInfo, PlaylistInfo, ProgressReport, ProgressStatus, Quality, VideoInfo};
use crate::quality::QualityMenu;
use crate::view::{Notice, ProgressDisplay, Toast, View};

/// A scripted backend answer.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Non-success response carrying this `error` message.
    Backend(String),
    /// The request fails below HTTP (unparseable body).
    Broken,
    /// Metadata answer with a `type` the client does not know.
    Unrecognized(String),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Backend(message) => Err(Error::Backend {
                status: 400,
                message,
            }),
            Self::Broken => Err(Error::from(
                serde_json::from_str::<serde_json::Value>("<html>").unwrap_err(),
            )),
            Self::Unrecognized(kind) => Err(Error::UnrecognizedResponse(kind)),
        }
    }
}

#[derive(Default)]
struct Script {
    info: Option<Reply<MediaInfo>>,
    video: Option<Reply<String>>,
    playlist: Option<Reply<String>>,
    progress: VecDeque<Reply<ProgressReport>>,
    clear: Option<Reply<()>>,
    calls: Vec<String>,
}

/// Backend returning scripted replies and recording every call.
///
/// Progress replies are consumed in order; once the queue is empty every
/// request answers `starting`.
#[derive(Default)]
pub struct MockBackend {
    script: Mutex<Script>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_info(&self, reply: Reply<MediaInfo>) {
        self.script.lock().unwrap().info = Some(reply);
    }

    pub fn set_video(&self, reply: Reply<String>) {
        self.script.lock().unwrap().video = Some(reply);
    }

    pub fn set_playlist(&self, reply: Reply<String>) {
        self.script.lock().unwrap().playlist = Some(reply);
    }

    pub fn set_clear(&self, reply: Reply<()>) {
        self.script.lock().unwrap().clear = Some(reply);
    }

    pub fn push_progress(&self, reply: Reply<ProgressReport>) {
        self.script.lock().unwrap().progress.push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn progress_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.starts_with("progress "))
            .count()
    }

    fn record(&self, call: String) -> std::sync::MutexGuard<'_, Script> {
        let mut script = self.script.lock().unwrap();
        script.calls.push(call);
        script
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn video_info(&self, url: &str) -> Result<MediaInfo> {
        let script = self.record(format!("info {url}"));
        script
            .info
            .clone()
            .unwrap_or(Reply::Backend("no info scripted".to_string()))
            .into_result()
    }

    async fn download_video(&self, url: &str, quality: &Quality) -> Result<String> {
        let script = self.record(format!("video {url} {quality}"));
        script
            .video
            .clone()
            .unwrap_or(Reply::Ok("video-id".to_string()))
            .into_result()
    }

    async fn download_playlist(&self, url: &str, quality: &Quality) -> Result<String> {
        let script = self.record(format!("playlist {url} {quality}"));
        script
            .playlist
            .clone()
            .unwrap_or(Reply::Ok("playlist_1".to_string()))
            .into_result()
    }

    async fn progress(&self, tracking_id: &str) -> Result<ProgressReport> {
        let mut script = self.record(format!("progress {tracking_id}"));
        script
            .progress
            .pop_front()
            .unwrap_or(Reply::Ok(ProgressReport::with_status(ProgressStatus::Starting)))
            .into_result()
    }

    async fn clear_downloads(&self) -> Result<()> {
        let script = self.record("clear".to_string());
        script.clear.clone().unwrap_or(Reply::Ok(())).into_result()
    }
}

/// Everything a [`RecordingView`] was asked to show.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    Loading,
    Error(String),
    Video(Option<String>, QualityMenu),
    Playlist(Option<String>),
    ProgressPanel(ProgressDisplay),
    Progress(ProgressDisplay),
    Success(Notice),
    History(Vec<String>),
    HistoryCleared,
    Toast(Toast),
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub shown: Vec<Shown>,
}

impl RecordingView {
    pub fn last(&self) -> Option<&Shown> {
        self.shown.last()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn progress(&self) -> Vec<&ProgressDisplay> {
        self.shown
            .iter()
            .filter_map(|s| match s {
                Shown::Progress(p) => Some(p),
                _ => None,
            })
            .collect()
    }
}

impl View for RecordingView {
    fn show_loading(&mut self) {
        self.shown.push(Shown::Loading);
    }

    fn show_error(&mut self, message: &str) {
        self.shown.push(Shown::Error(message.to_string()));
    }

    fn show_video(&mut self, info: &VideoInfo, qualities: &QualityMenu) {
        self.shown
            .push(Shown::Video(info.title.clone(), qualities.clone()));
    }

    fn show_playlist(&mut self, info: &PlaylistInfo, _qualities: &QualityMenu) {
        self.shown.push(Shown::Playlist(info.title.clone()));
    }

    fn show_progress_panel(&mut self, progress: &ProgressDisplay) {
        self.shown.push(Shown::ProgressPanel(progress.clone()));
    }

    fn update_progress(&mut self, progress: &ProgressDisplay) {
        self.shown.push(Shown::Progress(progress.clone()));
    }

    fn show_success(&mut self, notice: &Notice) {
        self.shown.push(Shown::Success(notice.clone()));
    }

    fn show_history(&mut self, history: &DownloadHistory) {
        self.shown.push(Shown::History(
            history.iter().map(|e| e.filename.clone()).collect(),
        ));
    }

    fn clear_history(&mut self) {
        self.shown.push(Shown::HistoryCleared);
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.shown.push(Shown::Toast(toast.clone()));
    }
}

pub fn downloading(percent: f64) -> ProgressReport {
    ProgressReport {
        percent: Some(percent),
        speed: Some("1.5MiB/s".to_string()),
        eta: Some("00:12".to_string()),
        ..ProgressReport::with_status(ProgressStatus::Downloading)
    }
}

pub fn finished(download_url: &str, filename: &str) -> ProgressReport {
    ProgressReport {
        percent: Some(100.0),
        filename: Some(filename.to_string()),
        download_url: Some(download_url.to_string()),
        ..ProgressReport::with_status(ProgressStatus::Finished)
    }
}
