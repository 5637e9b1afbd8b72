//! Background progress polling for the tracked download.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::Backend;
use crate::config::PollConfig;
use crate::event::SessionEvent;
use crate::session::TrackingId;

/// Handle to a running poll loop.
///
/// Dropping the handle cancels the loop, so a superseded download can never
/// keep polling in the background.
pub struct PollHandle {
    tracking: TrackingId,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stops the loop. No further progress requests are issued.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl fmt::Debug for PollHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollHandle")
            .field("tracking", &self.tracking)
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Spawns the poll loop for `tracking` and returns its handle.
///
/// Must be called from within a tokio runtime.
pub fn spawn_poller<B>(
    backend: Arc<B>,
    tracking: TrackingId,
    config: PollConfig,
    tx: mpsc::UnboundedSender<SessionEvent>,
) -> PollHandle
where
    B: Backend + ?Sized + 'static,
{
    let token = CancellationToken::new();
    let task = tokio::spawn(poll_progress(
        backend,
        tracking.clone(),
        config,
        tx,
        token.clone(),
    ));
    PollHandle {
        tracking,
        token,
        task,
    }
}

/// Polls the progress endpoint until the download reaches a terminal status.
///
/// The first request goes out one interval after the call. Each report is
/// forwarded as [`SessionEvent::Progress`]; the loop ends after forwarding a
/// `finished` or `error` report. A failed request ends the loop with
/// [`SessionEvent::PollFailed`]; network and decode failures are first
/// retried up to `config.max_transport_retries` times. Cancelling `token`
/// ends the loop without sending anything.
pub async fn poll_progress<B>(
    backend: Arc<B>,
    tracking: TrackingId,
    config: PollConfig,
    tx: mpsc::UnboundedSender<SessionEvent>,
    token: CancellationToken,
) where
    B: Backend + ?Sized,
{
    let period = config.interval();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures: u32 = 0;

    log::debug!("Polling progress for {tracking} every {period:?}");

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            biased;
            () = token.cancelled() => break,
            result = backend.progress(tracking.as_str()) => result,
        };

        match result {
            Ok(report) => {
                failures = 0;
                let terminal = report.status.is_terminal();
                let event = SessionEvent::Progress {
                    tracking: tracking.clone(),
                    report,
                };
                if tx.send(event).is_err() || terminal {
                    break;
                }
            }
            Err(e) if e.is_transport() && failures < config.max_transport_retries => {
                failures += 1;
                let backoff = config.backoff(failures);
                log::warn!(
                    "Progress request for {tracking} failed ({failures}/{}), retrying in {backoff:?}: {e}",
                    config.max_transport_retries
                );
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    () = tokio::time::sleep(backoff) => {}
                }
            }
            Err(e) => {
                log::error!("Progress tracking error for {tracking}: {e}");
                let _ = tx.send(SessionEvent::PollFailed {
                    tracking: tracking.clone(),
                    error: e.to_string(),
                });
                break;
            }
        }
    }

    log::debug!("Stopped polling {tracking}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProgressStatus;
    use crate::testing::{MockBackend, Reply, downloading, finished};
    use std::time::Duration;

    fn video(id: &str) -> TrackingId {
        TrackingId::Video(id.to_string())
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_waits_one_interval() {
        let backend = Arc::new(MockBackend::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let _handle = spawn_poller(backend.clone(), video("a"), PollConfig::default(), tx);

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(backend.progress_calls(), 0);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(backend.progress_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_terminal_report() {
        let backend = Arc::new(MockBackend::new());
        backend.push_progress(Reply::Ok(downloading(40.0)));
        backend.push_progress(Reply::Ok(finished("/download_file/y.mp4", "y.mp4")));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_poller(backend.clone(), video("a"), PollConfig::default(), tx);

        let SessionEvent::Progress { report, .. } = rx.recv().await.unwrap() else {
            panic!("expected progress");
        };
        assert_eq!(report.status, ProgressStatus::Downloading);
        let SessionEvent::Progress { report, .. } = rx.recv().await.unwrap() else {
            panic!("expected progress");
        };
        assert_eq!(report.status, ProgressStatus::Finished);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.progress_calls(), 2);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn transport_failure_stops_without_retry() {
        let backend = Arc::new(MockBackend::new());
        backend.push_progress(Reply::Broken);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = spawn_poller(backend.clone(), video("a"), PollConfig::default(), tx);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::PollFailed { .. }));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.progress_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_retries_recover() {
        let backend = Arc::new(MockBackend::new());
        backend.push_progress(Reply::Broken);
        backend.push_progress(Reply::Broken);
        backend.push_progress(Reply::Ok(finished("/download_file/z.mp3", "z.mp3")));
        let config = PollConfig {
            max_transport_retries: 2,
            ..PollConfig::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = spawn_poller(backend.clone(), video("a"), config, tx);

        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            SessionEvent::Progress { ref report, .. } if report.status == ProgressStatus::Finished
        ));
        assert_eq!(backend.progress_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_are_bounded() {
        let backend = Arc::new(MockBackend::new());
        for _ in 0..5 {
            backend.push_progress(Reply::Broken);
        }
        let config = PollConfig {
            max_transport_retries: 2,
            ..PollConfig::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = spawn_poller(backend.clone(), video("a"), config, tx);

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::PollFailed { .. }));
        assert_eq!(backend.progress_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_requests() {
        let backend = Arc::new(MockBackend::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = spawn_poller(backend.clone(), video("a"), PollConfig::default(), tx);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(backend.progress_calls(), 3);

        handle.cancel();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.progress_calls(), 3);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_cancels() {
        let backend = Arc::new(MockBackend::new());
        let (tx, _rx) = mpsc::unbounded_channel();
        let handle = spawn_poller(backend.clone(), video("a"), PollConfig::default(), tx);
        drop(handle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.progress_calls(), 0);
    }
}
