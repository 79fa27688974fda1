//! Background task that periodically purges expired tokens.

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// First-tick deadline used when `now + interval` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Handle to a running sweeper task.
///
/// The task calls its sweep closure once per interval until it is stopped,
/// the handle is dropped, or the closure reports that the store is gone.
pub(crate) struct Sweeper {
    cancel: CancellationToken,
    interval: Duration,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn a sweeper on `runtime`.
    ///
    /// `sweep` returns `false` once there is nothing left to sweep for,
    /// which ends the task.
    pub(crate) fn spawn<F>(runtime: &Handle, interval: Duration, mut sweep: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = runtime.spawn(async move {
            // First pass one full interval after start, not immediately.
            let start = Instant::now();
            let first = start
                .checked_add(interval)
                .unwrap_or_else(|| start + FAR_FUTURE);
            let mut ticker = tokio::time::interval_at(first, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(interval_ms = interval.as_millis(), "Sweeper started");

            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        debug!("Sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if !sweep() {
                            debug!("Store dropped, stopping sweeper");
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel,
            interval,
            task,
        }
    }

    /// Signal the task to stop. Safe to call repeatedly.
    pub(crate) fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether the task is still running and has not been told to stop.
    pub(crate) fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let sweeper = Sweeper::spawn(&Handle::current(), Duration::from_millis(20), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });
        assert!(sweeper.is_running());
        assert_eq!(sweeper.interval(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(110)).await;
        sweeper.stop();
        assert!(!sweeper.is_running());

        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 2, "expected several ticks, saw {seen}");

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[tokio::test]
    async fn test_no_tick_before_first_interval() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let _sweeper = Sweeper::spawn(&Handle::current(), Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exits_when_sweep_reports_gone() {
        let sweeper = Sweeper::spawn(&Handle::current(), Duration::from_millis(10), || false);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sweeper.is_running());
    }

    #[tokio::test]
    async fn test_huge_interval_does_not_overflow() {
        let sweeper = Sweeper::spawn(&Handle::current(), Duration::MAX, || true);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(sweeper.is_running());
        assert_eq!(sweeper.interval(), Duration::MAX);
        sweeper.stop();
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let sweeper = Sweeper::spawn(&Handle::current(), Duration::from_millis(10), || true);
        sweeper.stop();
        sweeper.stop();
        assert!(!sweeper.is_running());
    }
}
