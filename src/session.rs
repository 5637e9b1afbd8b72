//! Client-side state of one download session.

use std::fmt;

use crate::history::DownloadHistory;
use crate::poll::PollHandle;

/// Backend-issued identifier of a running download job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackingId {
    Video(String),
    Playlist(String),
}

impl TrackingId {
    /// The identifier as sent to the progress endpoint.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Video(id) | Self::Playlist(id) => id,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Video(_) => "video",
            Self::Playlist(_) => "playlist",
        }
    }
}

impl fmt::Display for TrackingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.as_str())
    }
}

/// Mutable state owned by a single [`SessionController`](crate::SessionController).
///
/// At most one download is tracked at a time: [`Session::begin_tracking`]
/// cancels whatever poll loop was running before recording the new
/// identifier.
#[derive(Debug, Default)]
pub struct Session {
    current_video_id: Option<String>,
    current_playlist_id: Option<String>,
    tracking: Option<TrackingId>,
    poll: Option<PollHandle>,
    history: DownloadHistory,
}

impl Session {
    /// Creates a session whose history keeps `history_limit` entries.
    #[must_use]
    pub fn new(history_limit: usize) -> Self {
        Self {
            history: DownloadHistory::new(history_limit),
            ..Self::default()
        }
    }

    /// Identifier of the last video download started.
    #[must_use]
    pub fn current_video_id(&self) -> Option<&str> {
        self.current_video_id.as_deref()
    }

    /// Identifier of the last playlist download started.
    #[must_use]
    pub fn current_playlist_id(&self) -> Option<&str> {
        self.current_playlist_id.as_deref()
    }

    /// The download whose progress is being followed.
    #[must_use]
    pub const fn tracking(&self) -> Option<&TrackingId> {
        self.tracking.as_ref()
    }

    /// Returns true if `id` is the download currently tracked.
    #[must_use]
    pub fn is_tracking(&self, id: &TrackingId) -> bool {
        self.tracking.as_ref() == Some(id)
    }

    /// Records a new download as the tracked one, cancelling any poll loop.
    pub fn begin_tracking(&mut self, id: TrackingId) {
        self.stop_polling();
        match &id {
            TrackingId::Video(video) => self.current_video_id = Some(video.clone()),
            TrackingId::Playlist(playlist) => self.current_playlist_id = Some(playlist.clone()),
        }
        self.tracking = Some(id);
    }

    /// Stores the handle of the poll loop for the tracked download.
    pub fn attach_poll(&mut self, handle: PollHandle) {
        self.stop_polling();
        self.poll = Some(handle);
    }

    /// Cancels the poll loop, if any.
    pub fn stop_polling(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.cancel();
        }
    }

    /// Returns true while a poll loop is active.
    #[must_use]
    pub const fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    #[must_use]
    pub const fn history(&self) -> &DownloadHistory {
        &self.history
    }

    pub const fn history_mut(&mut self) -> &mut DownloadHistory {
        &mut self.history
    }
}
