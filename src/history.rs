//! Recent-downloads list shown after each completed job.

use std::collections::VecDeque;

use chrono::{DateTime, Local};

use crate::format::truncate;

/// Default number of entries kept in the history.
pub const HISTORY_LIMIT: usize = 5;

/// Longest filename shown before it is shortened with `...`.
const DISPLAY_NAME_LEN: usize = 40;

/// A completed download that can be retrieved from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub filename: String,
    pub download_url: String,
    pub completed_at: DateTime<Local>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current local time.
    #[must_use]
    pub fn new(filename: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            download_url: download_url.into(),
            completed_at: Local::now(),
        }
    }

    /// Filename shortened for list display.
    #[must_use]
    pub fn display_name(&self) -> String {
        truncate(&self.filename, DISPLAY_NAME_LEN)
    }

    /// Completion time as `HH:MM:SS`.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.completed_at.format("%H:%M:%S").to_string()
    }
}

/// Most-recent-first list of completed downloads, capped at a fixed length.
#[derive(Debug, Clone)]
pub struct DownloadHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl Default for DownloadHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl DownloadHistory {
    /// Creates an empty history holding at most `limit` entries (at least one).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit + 1),
            limit,
        }
    }

    /// Inserts `entry` at the top, evicting the oldest entries past the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Newest entry, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}
