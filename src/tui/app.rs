//! Application state model.

use std::time::{Duration, Instant};

use crate::model::Quality;

/// How long the fetch hint is highlighted after a URL is pasted.
pub const PULSE_DURATION: Duration = Duration::from_secs(1);

/// Work the event loop hands to the session controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Fetch(String),
    DownloadVideo { url: String, quality: Quality },
    DownloadPlaylist { url: String, quality: Quality },
    Clear,
}

#[derive(Debug, Default)]
pub struct App {
    pub url_input: String,
    pub should_quit: bool,
    pub pulse_until: Option<Instant>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_pulse(&mut self) {
        self.pulse_until = Some(Instant::now() + PULSE_DURATION);
    }

    pub fn is_pulsing(&self, now: Instant) -> bool {
        self.pulse_until.is_some_and(|until| now < until)
    }

    pub fn expire(&mut self, now: Instant) {
        if !self.is_pulsing(now) {
            self.pulse_until = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulse_lasts_one_second() {
        let mut app = App::new();
        assert!(!app.is_pulsing(Instant::now()));

        app.start_pulse();
        let now = Instant::now();
        assert!(app.is_pulsing(now));

        app.expire(now + Duration::from_millis(1001));
        assert!(app.pulse_until.is_none());
    }
}
