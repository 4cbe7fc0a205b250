use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Cancellation handle for a periodic countdown task.
///
/// The task calls `on_tick` once per period and stops when it returns
/// `false`, when `cancel` is called, or when the handle is dropped.
/// Cancelling from inside `on_tick` is allowed and takes effect once the
/// callback returns.
#[derive(Debug)]
pub struct CountdownHandle {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Spawn the countdown on the current tokio runtime. The first tick fires
    /// one full `period` after spawning.
    pub fn spawn<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        let (cancel, mut cancelled) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.changed() => break,
                    _ = interval.tick() => {
                        if *cancelled.borrow() || !on_tick().await {
                            break;
                        }
                    }
                }
            }
        });
        Self { cancel, task }
    }

    pub fn cancel(&self) {
        let _ = self.cancel.send(true);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn ticks_until_callback_stops() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let handle = CountdownHandle::spawn(Duration::from_secs(1), move || {
            let seen = Arc::clone(&seen);
            async move { seen.fetch_add(1, Ordering::SeqCst) + 1 < 3 }
        });

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking() {
        let count = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&count);
        let handle = CountdownHandle::spawn(Duration::from_secs(1), move || {
            let seen = Arc::clone(&seen);
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                true
            }
        });

        time::sleep(Duration::from_millis(2500)).await;
        handle.cancel();
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }
}
