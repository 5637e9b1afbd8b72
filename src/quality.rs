//! Quality selector model built from fetched format options.

use crate::format::format_file_size;
use crate::model::{FormatKind, FormatOption, Quality};

/// Label of the default entry that leaves the choice to the backend.
pub const BEST_LABEL: &str = "Best Available";
pub const VIDEO_GROUP_LABEL: &str = "Video Quality";
pub const AUDIO_GROUP_LABEL: &str = "Audio Only (MP3)";

const PLAYLIST_VIDEO_PRESETS: [&str; 4] = ["1080p", "720p", "480p", "360p"];
const PLAYLIST_AUDIO_PRESETS: [&str; 3] = ["320kbps", "192kbps", "128kbps"];

/// One entry of the selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityChoice {
    pub value: Quality,
    pub label: String,
}

/// Labelled group of choices, such as video or audio-only formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityGroup {
    pub label: &'static str,
    pub choices: Vec<QualityChoice>,
}

/// The quality selector: `Best Available` followed by optional groups.
///
/// The menu also tracks which entry is selected, counting the default entry
/// as index 0 and group entries after it in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityMenu {
    groups: Vec<QualityGroup>,
    selected: usize,
}

impl QualityMenu {
    /// Builds the menu for a single video from its format list.
    ///
    /// Video formats are listed as `720p (MP4) - 1.5 MB` and audio formats as
    /// `128kbps MP3 - 3.2 MB`; the size suffix is omitted when unknown. Empty
    /// groups are left out.
    #[must_use]
    pub fn from_formats(formats: &[FormatOption]) -> Self {
        let video: Vec<_> = formats
            .iter()
            .filter(|f| f.kind == FormatKind::Video)
            .map(|f| QualityChoice {
                value: Quality::from(f.quality.as_str()),
                label: format!(
                    "{} ({}){}",
                    f.quality,
                    f.ext.to_uppercase(),
                    size_suffix(f.filesize)
                ),
            })
            .collect();

        let audio: Vec<_> = formats
            .iter()
            .filter(|f| f.kind == FormatKind::Audio)
            .map(|f| QualityChoice {
                value: Quality::from(f.quality.as_str()),
                label: format!("{} MP3{}", f.quality, size_suffix(f.filesize)),
            })
            .collect();

        Self::with_groups(video, audio)
    }

    /// The fixed menu offered for playlist downloads.
    #[must_use]
    pub fn playlist_presets() -> Self {
        let video = PLAYLIST_VIDEO_PRESETS
            .iter()
            .map(|q| QualityChoice {
                value: Quality::from(*q),
                label: format!("Up to {q}"),
            })
            .collect();
        let audio = PLAYLIST_AUDIO_PRESETS
            .iter()
            .map(|q| QualityChoice {
                value: Quality::from(*q),
                label: format!("{q} MP3"),
            })
            .collect();
        Self::with_groups(video, audio)
    }

    fn with_groups(video: Vec<QualityChoice>, audio: Vec<QualityChoice>) -> Self {
        let groups = [(VIDEO_GROUP_LABEL, video), (AUDIO_GROUP_LABEL, audio)]
            .into_iter()
            .filter(|(_, choices)| !choices.is_empty())
            .map(|(label, choices)| QualityGroup { label, choices })
            .collect();
        Self {
            groups,
            selected: 0,
        }
    }

    #[must_use]
    pub fn groups(&self) -> &[QualityGroup] {
        &self.groups
    }

    /// All entries in display order, starting with `Best Available`.
    pub fn choices(&self) -> impl Iterator<Item = QualityChoice> + '_ {
        std::iter::once(QualityChoice {
            value: Quality::Best,
            label: BEST_LABEL.to_string(),
        })
        .chain(self.groups.iter().flat_map(|g| g.choices.iter().cloned()))
    }

    /// Number of entries including the default one.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.groups.iter().map(|g| g.choices.len()).sum::<usize>()
    }

    /// Always false; the default entry is always present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    #[must_use]
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// The currently selected entry.
    #[must_use]
    pub fn selected(&self) -> QualityChoice {
        self.choices()
            .nth(self.selected)
            .unwrap_or_else(|| QualityChoice {
                value: Quality::Best,
                label: BEST_LABEL.to_string(),
            })
    }

    /// Moves the selection forward, wrapping to `Best Available`.
    pub fn select_next(&mut self) {
        self.selected = (self.selected + 1) % self.len();
    }

    /// Moves the selection backward, wrapping to the last entry.
    pub fn select_prev(&mut self) {
        self.selected = if self.selected == 0 {
            self.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// Selects the entry whose value equals `quality`. Returns false (and keeps
    /// the current selection) when no entry matches.
    pub fn select(&mut self, quality: &Quality) -> bool {
        let found = self.choices().position(|c| &c.value == quality);
        match found {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// Returns true if `quality` is `Best` or one of the menu's entries.
    #[must_use]
    pub fn offers(&self, quality: &Quality) -> bool {
        self.choices().any(|c| &c.value == quality)
    }
}

fn size_suffix(filesize: Option<u64>) -> String {
    filesize.map_or_else(String::new, |size| {
        format!(" - {}", format_file_size(Some(size)))
    })
}
