//! Recognising video-sharing URLs in typed or pasted text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static VIDEO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)https?://(?:www\.|m\.|music\.)?(?:youtube\.com|youtu\.be)/[^\s"'<>\[\](){}]*"#,
    )
    .expect("valid regex")
});

/// Returns `true` if `text` mentions a YouTube host anywhere.
///
/// This is the loose check used to decide whether a paste deserves the fetch
/// hint; it does not validate the URL.
#[must_use]
pub fn is_video_url(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    !lower.is_empty() && (lower.contains("youtube.com") || lower.contains("youtu.be"))
}

/// Extracts YouTube URLs from raw input text, in order of appearance.
///
/// Duplicates are dropped. Text without a scheme is not matched.
#[must_use]
pub fn extract_video_urls(input: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VIDEO_URL_RE
        .find_iter(input)
        .map(|m| m.as_str().to_string())
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Picks the URL to put in the input box after a paste.
///
/// The first YouTube URL found wins; otherwise the trimmed text is returned
/// unchanged so the user can still submit it.
#[must_use]
pub fn pasted_url(text: &str) -> String {
    extract_video_urls(text)
        .into_iter()
        .next()
        .unwrap_or_else(|| text.trim().to_string())
}

/// Returns `true` if the URL points at a playlist (`list=` query parameter).
#[must_use]
pub fn is_playlist_url(url: &str) -> bool {
    url.split_once('?')
        .is_some_and(|(_, query)| query.split('&').any(|pair| pair.starts_with("list=")))
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- is_video_url ---

    #[test]
    fn recognises_youtube_hosts() {
        assert!(is_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"));
        assert!(is_video_url("https://youtu.be/dQw4w9WgXcQ"));
        assert!(is_video_url("  YOUTUBE.COM/watch?v=x  "));
    }

    #[test]
    fn rejects_other_text() {
        assert!(!is_video_url(""));
        assert!(!is_video_url("   "));
        assert!(!is_video_url("https://vimeo.com/123"));
    }

    // --- extract_video_urls ---

    #[test]
    fn extract_single_url() {
        let urls = extract_video_urls("https://youtu.be/abc");
        assert_eq!(urls, vec!["https://youtu.be/abc"]);
    }

    #[test]
    fn extract_url_embedded_in_text() {
        let input = "watch this: https://www.youtube.com/watch?v=abc&t=10 it's great";
        let urls = extract_video_urls(input);
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=abc&t=10"]);
    }

    #[test]
    fn extract_deduplicates_urls() {
        let input = "https://youtu.be/a https://youtu.be/a https://m.youtube.com/watch?v=b";
        let urls = extract_video_urls(input);
        assert_eq!(urls, vec!["https://youtu.be/a", "https://m.youtube.com/watch?v=b"]);
    }

    #[test]
    fn extract_ignores_other_hosts() {
        assert!(extract_video_urls("https://example.com/watch?v=a").is_empty());
        assert!(extract_video_urls("").is_empty());
    }

    // --- pasted_url ---

    #[test]
    fn pasted_url_prefers_first_match() {
        assert_eq!(
            pasted_url("see https://youtu.be/first and https://youtu.be/second"),
            "https://youtu.be/first"
        );
    }

    #[test]
    fn pasted_url_falls_back_to_trimmed_text() {
        assert_eq!(pasted_url("  something else \n"), "something else");
    }

    // --- is_playlist_url ---

    #[test]
    fn detects_playlist_parameter() {
        assert!(is_playlist_url("https://www.youtube.com/playlist?list=PL123"));
        assert!(is_playlist_url("https://www.youtube.com/watch?v=a&list=PL123"));
        assert!(!is_playlist_url("https://www.youtube.com/watch?v=a"));
        assert!(!is_playlist_url("https://youtu.be/a"));
    }
}
