//! Cancellable debounce timer.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Coalesces rapid triggers into one deferred task.
///
/// [`schedule`](Self::schedule) aborts any pending window and starts a new
/// one; only the last trigger inside a burst runs. Aborting stops a task only
/// while its window is still open: once the window elapses the work is
/// detached onto its own task and runs to completion, so a reload can never
/// be killed halfway through and leave its store stuck busy.
///
/// Clones share the same timer slot, which is what lets a store clone hand
/// the deferred work to itself.
#[derive(Clone, Default)]
pub struct Debouncer {
    pending: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Debouncer {
    /// Creates a debouncer with no pending work.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `task` to run after `window`, superseding any pending one.
    ///
    /// `store` labels the supersede metric and log line.
    pub fn schedule<F>(&self, window: Duration, store: &'static str, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            if !previous.is_finished() {
                tracing::debug!(store, "Superseding pending debounced task");
                metrics::counter!("sync.debounce.superseded", "store" => store).increment(1);
            }
            previous.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // Past this point the work must not be aborted mid-flight.
            tokio::spawn(task);
        }));
    }

    /// Cancels the pending window, if one is still open.
    pub fn cancel(&self) {
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn only_the_last_scheduled_task_runs() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(Duration::from_millis(400), "test", async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            sleep(Duration::from_millis(100)).await;
        }

        sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_a_pending_window() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(Duration::from_millis(400), "test", async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        sleep(Duration::from_millis(200)).await;
        debouncer.cancel();

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_window_runs_even_if_superseded_later() {
        let debouncer = Debouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(Duration::from_millis(100), "test", async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1, "first window elapsed untouched");

        // The first window already fired, so this supersedes nothing.
        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(Duration::from_millis(100), "test", async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }
}
