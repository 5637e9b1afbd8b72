//! Messages sent from background tasks to the session controller.

use crate::error::Result;
use crate::model::{MediaInfo, ProgressReport, Quality};
use crate::session::TrackingId;

/// Outcome of a backend request that ran in a spawned task.
#[derive(Debug)]
pub enum Completion {
    Info(Result<MediaInfo>),
    VideoStarted {
        quality: Quality,
        result: Result<String>,
    },
    PlaylistStarted {
        quality: Quality,
        result: Result<String>,
    },
    Cleared(Result<()>),
}

/// Events delivered to [`SessionController::handle_event`](crate::SessionController::handle_event).
#[derive(Debug)]
pub enum SessionEvent {
    /// A progress report arrived for `tracking`.
    Progress {
        tracking: TrackingId,
        report: ProgressReport,
    },
    /// The progress request itself failed and polling gave up.
    PollFailed { tracking: TrackingId, error: String },
    /// A background request finished.
    Completed(Completion),
}

impl SessionEvent {
    /// The download the event belongs to, if it comes from a poll loop.
    #[must_use]
    pub const fn tracking(&self) -> Option<&TrackingId> {
        match self {
            Self::Progress { tracking, .. } | Self::PollFailed { tracking, .. } => Some(tracking),
            Self::Completed(_) => None,
        }
    }
}
