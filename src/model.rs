//! Wire types exchanged with the download backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of stream a format option delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    /// Video with an audio track.
    Video,
    /// Audio only, converted to MP3 by the backend.
    Audio,
}

/// One selectable quality/container combination offered for a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatOption {
    #[serde(default)]
    pub format_id: Option<String>,
    /// Quality label such as `720p` or `128kbps`.
    pub quality: String,
    /// Container extension.
    #[serde(default)]
    pub ext: String,
    #[serde(rename = "type")]
    pub kind: FormatKind,
    /// Size in bytes, when the backend knows it.
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub fps: Option<f64>,
}

/// Metadata for a single video.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    /// Length in seconds. yt-dlp reports fractional seconds for some sites.
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub formats: Vec<FormatOption>,
}

impl VideoInfo {
    /// Whole seconds of the duration, if known.
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        whole_seconds(self.duration)
    }
}

/// Entry of a playlist listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSummary {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub thumbnail: Option<String>,
    pub url: Option<String>,
}

impl VideoSummary {
    /// Whole seconds of the duration, if known.
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        whole_seconds(self.duration)
    }
}

/// Metadata for a playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistInfo {
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub video_count: u64,
    pub videos: Vec<VideoSummary>,
}

/// Result of a metadata fetch, discriminated by the response's `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInfo {
    Video(VideoInfo),
    Playlist(PlaylistInfo),
}

impl MediaInfo {
    /// Decodes a metadata response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedResponse`] when `type` is missing or is
    /// neither `video` nor `playlist`, and [`Error::Decode`] when the body does
    /// not match the announced type.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();
        match kind.as_str() {
            "video" => Ok(Self::Video(serde_json::from_value(value)?)),
            "playlist" => Ok(Self::Playlist(serde_json::from_value(value)?)),
            _ => Err(Error::UnrecognizedResponse(if kind.is_empty() {
                "<missing>".to_string()
            } else {
                kind
            })),
        }
    }
}

/// Status of a tracked download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Starting,
    Downloading,
    Finished,
    Error,
    /// Anything else the backend reports, such as `not_found`.
    #[serde(other)]
    Unknown,
}

impl ProgressStatus {
    /// Returns true once the job can no longer change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

/// Point-in-time snapshot of a download job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: ProgressStatus,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub eta: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProgressReport {
    /// Creates a report carrying only a status.
    #[must_use]
    pub const fn with_status(status: ProgressStatus) -> Self {
        Self {
            status,
            percent: None,
            speed: None,
            eta: None,
            filename: None,
            download_url: None,
            error: None,
        }
    }

    /// Creates an `error` report with an optional message.
    #[must_use]
    pub fn failed(error: Option<String>) -> Self {
        Self {
            error,
            ..Self::with_status(ProgressStatus::Error)
        }
    }
}

/// Quality requested for a download.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Quality {
    /// Let the backend pick the best available format.
    #[default]
    Best,
    /// A format label such as `720p` or `128kbps`.
    Label(String),
}

impl Quality {
    /// Wire value of this quality.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Best => "best",
            Self::Label(label) => label,
        }
    }

    /// Returns true for audio-only selections.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.as_str().ends_with("kbps")
    }
}

impl From<String> for Quality {
    fn from(value: String) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("best") {
            Self::Best
        } else {
            Self::Label(trimmed.to_string())
        }
    }
}

impl From<&str> for Quality {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Quality> for String {
    fn from(value: Quality) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `/download_video` and `/download_playlist`.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadRequest<'a> {
    pub url: &'a str,
    pub quality: &'a Quality,
}

/// Successful response of `/download_video`.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoStarted {
    pub video_id: String,
}

/// Successful response of `/download_playlist`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistStarted {
    pub playlist_id: String,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_seconds(duration: Option<f64>) -> Option<u64> {
    duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| d as u64)
}
