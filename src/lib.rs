//! tubefetch - A client for a YouTube download web service.
//!
//! The library drives the download backend's JSON/HTTP API: it fetches video
//! and playlist metadata, starts downloads, polls their progress and keeps a
//! short history of finished downloads. Everything the user should see goes
//! through the [`View`] trait, so the same [`SessionController`] backs both
//! the CLI and the terminal UI.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tubefetch::{ClientConfig, HttpBackend, NoView, Quality, SessionController};
//!
//! # async fn example() -> tubefetch::Result<()> {
//! let config = ClientConfig::default();
//! let backend = Arc::new(HttpBackend::from_config(&config.server)?);
//! let (mut controller, mut events) = SessionController::new(backend, NoView, config);
//!
//! controller.fetch_info("https://youtu.be/dQw4w9WgXcQ").await?;
//! controller
//!     .start_video_download("https://youtu.be/dQw4w9WgXcQ", &Quality::from("720p"))
//!     .await?;
//!
//! // Apply progress reports until the download finishes or fails
//! controller.run_until_idle(&mut events).await;
//! if let Some(entry) = controller.session().history().latest() {
//!     println!("Downloaded {} to {}", entry.filename, entry.download_url);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod format;
pub mod history;
pub mod model;
pub mod poll;
pub mod quality;
pub mod session;
pub mod url;
pub mod view;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::{Backend, HttpBackend};
pub use config::{ClientConfig, PollConfig, ServerConfig, SessionConfig};
pub use controller::{PollState, SessionController};
pub use error::{Error, Result};
pub use event::{Completion, SessionEvent};
pub use format::{format_count, format_duration, format_file_size, format_percent};
pub use history::{DownloadHistory, HISTORY_LIMIT, HistoryEntry};
pub use model::{MediaInfo, PlaylistInfo, ProgressReport, ProgressStatus, Quality, VideoInfo};
pub use quality::QualityMenu;
pub use session::{Session, TrackingId};
pub use url::{extract_video_urls, is_playlist_url, is_video_url};
pub use view::{NoView, Notice, ProgressDisplay, Toast, ToastKind, View};
