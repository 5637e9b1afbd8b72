//! Formatting helpers for durations, view counts, file sizes and progress.

/// Formats a duration in seconds as `H:MM:SS` (one hour or more) or `M:SS`.
///
/// Missing or zero durations render as `N/A`.
#[must_use]
pub fn format_duration(seconds: Option<u64>) -> String {
    let secs = match seconds {
        None | Some(0) => return "N/A".to_string(),
        Some(s) => s,
    };
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let rest = secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{rest:02}")
    } else {
        format!("{minutes}:{rest:02}")
    }
}

/// Formats a count (views, likes) as `1.5K` / `2.5M` style text.
///
/// Missing or zero counts render as `0`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_count(count: Option<u64>) -> String {
    match count {
        None | Some(0) => "0".to_string(),
        Some(n) if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        Some(n) if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        Some(n) => n.to_string(),
    }
}

/// Formats a byte count with the largest fitting unit among B, KB, MB and GB.
///
/// The scaled value keeps at most two fraction digits with trailing zeros
/// dropped, so `1024` is `1 KB` and `1_572_864` is `1.5 MB`. Missing or zero
/// sizes render as `Unknown`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_file_size(bytes: Option<u64>) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let bytes = match bytes {
        None | Some(0) => return "Unknown".to_string(),
        Some(b) => b,
    };

    let mut unit = 0;
    let mut divisor: u64 = 1;
    while unit < UNITS.len() - 1 && bytes >= divisor * 1024 {
        divisor *= 1024;
        unit += 1;
    }

    let scaled = (bytes as f64 / divisor as f64 * 100.0).round() / 100.0;
    format!("{} {}", trim_fraction(&format!("{scaled:.2}")), UNITS[unit])
}

/// Formats a completion percentage as a rounded `NN%` label clamped to 0..=100.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn format_percent(percent: f64) -> String {
    let clamped = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    format!("{}%", clamped.round() as u8)
}

/// Shortens `text` to `max` characters, appending `...` when anything was cut.
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max).collect();
    format!("{head}...")
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
