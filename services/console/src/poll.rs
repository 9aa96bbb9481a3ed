//! services/console/src/poll.rs
//!
//! An explicit start/stop wrapper around a periodic background task. The
//! caller owns the lifecycle: nothing starts on module load, and `stop`
//! waits for the in-progress tick before returning.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A periodic background task with an explicit stop.
pub struct Poller {
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawns `tick` on a fixed cadence. The first tick fires immediately.
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let cancellation_token = CancellationToken::new();
        let task_token = cancellation_token.clone();
        let handle = tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = timer.tick() => tick().await,
                }
            }
            debug!("poller stopped");
        });
        Self {
            cancellation_token,
            handle,
        }
    }

    /// Stops the task, waiting for any tick that is already running.
    pub async fn stop(self) {
        self.cancellation_token.cancel();
        let _ = self.handle.await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn ticks_repeat_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = count.clone();
        let poller = Poller::spawn(Duration::from_millis(10), move || {
            let tick_count = tick_count.clone();
            async move {
                tick_count.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(45)).await;
        poller.stop().await;
        let observed = count.load(Ordering::SeqCst);
        assert!(observed >= 2, "expected at least 2 ticks, saw {observed}");

        // No more ticks arrive after stop.
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(count.load(Ordering::SeqCst), observed);
    }

    #[tokio::test]
    async fn first_tick_fires_immediately() {
        let count = Arc::new(AtomicUsize::new(0));
        let tick_count = count.clone();
        let poller = Poller::spawn(Duration::from_secs(3600), move || {
            let tick_count = tick_count.clone();
            async move {
                tick_count.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        poller.stop().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
