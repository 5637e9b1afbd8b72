//! Line-oriented view with an indicatif progress bar.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::resolve_url;
use crate::format::{format_count, format_duration, truncate};
use crate::history::DownloadHistory;
use crate::model::{PlaylistInfo, VideoInfo};
use crate::quality::QualityMenu;
use crate::view::{
    ENTRY_TITLE_LIMIT, NO_DESCRIPTION, Notice, ProgressDisplay, ProgressTone, Toast, ToastKind,
    UNKNOWN_PLAYLIST, UNKNOWN_TITLE, UNKNOWN_UPLOADER, View,
};

const SEPARATOR: &str = "────────────────────────────────────────────────────────────";
const DESCRIPTION_LIMIT: usize = 300;

/// Creates the percent-based bar for a tracked download.
pub fn make_progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos:>3}% - {msg}")
            .expect("progress template is valid")
            .progress_chars("━━╌"),
    );
    bar
}

/// [`View`] that prints to the terminal.
#[derive(Debug)]
pub struct TerminalView {
    base_url: String,
    bar: Option<ProgressBar>,
    failed: bool,
}

impl TerminalView {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            bar: None,
            failed: false,
        }
    }

    /// Returns true once an error has been shown.
    pub const fn failed(&self) -> bool {
        self.failed
    }

    fn link(&self, link: &str) -> String {
        resolve_url(&self.base_url, link)
    }

    fn println(&self, line: impl AsRef<str>) {
        match &self.bar {
            Some(bar) if !bar.is_finished() => bar.println(line),
            _ => println!("{}", line.as_ref()),
        }
    }
}

fn print_menu(menu: &QualityMenu) {
    println!("  Qualities (--quality):");
    for choice in menu.choices() {
        println!("    {:<10} {}", choice.value.as_str(), style(choice.label).dim());
    }
}

impl View for TerminalView {
    fn show_loading(&mut self) {
        println!("{}", style("Fetching video info...").dim());
    }

    fn show_error(&mut self, message: &str) {
        self.failed = true;
        if let Some(bar) = &self.bar {
            bar.abandon();
        }
        eprintln!("{} {message}", style("error:").red().bold());
    }

    fn show_video(&mut self, info: &VideoInfo, qualities: &QualityMenu) {
        println!("\n{SEPARATOR}");
        println!("{}", style(info.title.as_deref().unwrap_or(UNKNOWN_TITLE)).bold());
        println!("{SEPARATOR}");
        println!("  Uploader:  {}", info.uploader.as_deref().unwrap_or(UNKNOWN_UPLOADER));
        println!("  Duration:  {}", format_duration(info.duration_secs()));
        println!("  Views:     {}", format_count(info.view_count));
        let description = info
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(NO_DESCRIPTION);
        println!("  {}", truncate(description, DESCRIPTION_LIMIT));
        print_menu(qualities);
        println!("{SEPARATOR}\n");
    }

    fn show_playlist(&mut self, info: &PlaylistInfo, qualities: &QualityMenu) {
        println!("\n{SEPARATOR}");
        println!("{}", style(info.title.as_deref().unwrap_or(UNKNOWN_PLAYLIST)).bold());
        println!("{SEPARATOR}");
        println!("  Uploader:  {}", info.uploader.as_deref().unwrap_or(UNKNOWN_UPLOADER));
        println!("  Videos:    {}", info.video_count);
        for (index, video) in info.videos.iter().enumerate() {
            println!(
                "  {:>3}. {} ({}, {} views)",
                index + 1,
                truncate(video.title.as_deref().unwrap_or(UNKNOWN_TITLE), ENTRY_TITLE_LIMIT),
                format_duration(video.duration_secs()),
                format_count(video.view_count)
            );
        }
        print_menu(qualities);
        println!("{SEPARATOR}\n");
    }

    fn show_progress_panel(&mut self, progress: &ProgressDisplay) {
        let bar = make_progress_bar();
        bar.set_message(progress.caption.clone());
        bar.enable_steady_tick(std::time::Duration::from_millis(250));
        self.bar = Some(bar);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn update_progress(&mut self, progress: &ProgressDisplay) {
        let Some(bar) = &self.bar else {
            return;
        };
        bar.set_position(progress.percent.clamp(0.0, 100.0) as u64);
        bar.set_message(format!(
            "{} {} ETA {}",
            progress.caption, progress.speed, progress.eta
        ));
        match progress.tone {
            ProgressTone::Success => bar.finish_with_message(progress.caption.clone()),
            ProgressTone::Failure => bar.abandon_with_message(progress.caption.clone()),
            ProgressTone::Starting | ProgressTone::Active => {}
        }
    }

    fn show_success(&mut self, notice: &Notice) {
        self.println(format!("{}", style(&notice.message).green().bold()));
        if let Some(link) = &notice.link {
            self.println(format!("  {}", style(self.link(link)).underlined()));
        }
    }

    fn show_history(&mut self, history: &DownloadHistory) {
        if let Some(entry) = history.latest() {
            self.println(format!(
                "  {} {}",
                style(entry.time_label()).dim(),
                entry.display_name()
            ));
        }
    }

    fn show_toast(&mut self, toast: &Toast) {
        let line = match toast.kind {
            ToastKind::Success => style(&toast.message).green(),
            ToastKind::Error => style(&toast.message).red(),
        };
        self.println(format!("{line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_links_resolve_against_server() {
        let view = TerminalView::new("http://127.0.0.1:5000/");
        assert_eq!(
            view.link("/download_file/a.mp4"),
            "http://127.0.0.1:5000/download_file/a.mp4"
        );
        assert_eq!(view.link("https://cdn/x"), "https://cdn/x");
    }

    #[test]
    fn errors_mark_failure() {
        let mut view = TerminalView::new("http://localhost");
        assert!(!view.failed());
        view.show_error("Download failed: boom");
        assert!(view.failed());
    }

    #[test]
    fn finished_progress_completes_bar() {
        let mut view = TerminalView::new("http://localhost");
        view.show_progress_panel(&ProgressDisplay::starting());
        view.update_progress(&ProgressDisplay {
            percent: 100.0,
            tone: ProgressTone::Success,
            ..ProgressDisplay::starting()
        });
        let bar = view.bar.as_ref().unwrap();
        assert_eq!(bar.position(), 100);
        assert!(bar.is_finished());
    }
}
