//! Termination detection for the crawl.
//!
//! A momentarily empty queue does not mean the crawl is over: a worker that
//! is mid-fetch may still enqueue links. The tracker counts outstanding work
//! (queued + in-flight) and reports completion exactly once, when and only
//! when that count reaches zero.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts queued and in-flight frontier entries and signals completion.
#[derive(Debug, Default)]
pub struct TerminationTracker {
    queued: AtomicUsize,
    inflight: AtomicUsize,
    /// Single source of truth for the termination decision: always equals
    /// queued + inflight. Kept as its own counter so the zero check is one
    /// atomic operation instead of a racy sum of two.
    pending: AtomicUsize,
    done: AtomicBool,
    done_notify: Notify,
}

impl TerminationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// An entry was admitted to the frontier.
    pub fn on_enqueue(&self) {
        self.queued.fetch_add(1, Ordering::SeqCst);
        self.pending.fetch_add(1, Ordering::SeqCst);
    }

    /// An entry moved from the queue to a worker. Pending is unchanged:
    /// the entry is still outstanding until the worker reports done.
    pub fn on_dequeue(&self) {
        self.queued.fetch_sub(1, Ordering::SeqCst);
        self.inflight.fetch_add(1, Ordering::SeqCst);
    }

    /// A worker finished processing an entry (including any enqueues it
    /// performed). Returns `true` for exactly the one call that drives
    /// pending to zero; that caller is responsible for shutting the
    /// frontier down.
    pub fn on_task_done(&self, links_enqueued: usize) -> bool {
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        let prev = self.pending.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0, "on_task_done without matching on_enqueue");
        tracing::trace!(links_enqueued, pending = prev - 1, "task done");

        if prev == 1 && !self.done.swap(true, Ordering::SeqCst) {
            self.done_notify.notify_waiters();
            return true;
        }
        false
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Entries queued plus in-flight.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    pub fn inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Suspends until true completion. Returns immediately if the crawl
    /// already finished.
    pub async fn wait_done(&self) {
        loop {
            let notified = self.done_notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_done() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_pending_counts_queued_and_inflight() {
        let tracker = TerminationTracker::new();

        tracker.on_enqueue();
        tracker.on_enqueue();
        assert_eq!(tracker.queued(), 2);
        assert_eq!(tracker.pending(), 2);

        tracker.on_dequeue();
        assert_eq!(tracker.queued(), 1);
        assert_eq!(tracker.inflight(), 1);
        assert_eq!(tracker.pending(), 2);

        assert!(!tracker.on_task_done(0));
        assert_eq!(tracker.pending(), 1);
        assert!(!tracker.is_done());
    }

    #[test]
    fn test_done_signaled_exactly_once() {
        let tracker = TerminationTracker::new();

        tracker.on_enqueue();
        tracker.on_dequeue();
        // The task enqueued one new link before finishing, so the crawl
        // is still outstanding when it reports done.
        tracker.on_enqueue();
        assert!(!tracker.on_task_done(1));

        tracker.on_dequeue();
        assert!(tracker.on_task_done(0));
        assert!(tracker.is_done());
    }

    #[tokio::test]
    async fn test_wait_done_returns_after_completion() {
        let tracker = Arc::new(TerminationTracker::new());
        tracker.on_enqueue();

        let waiter = {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.wait_done().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        tracker.on_dequeue();
        tracker.on_task_done(0);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_done should resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_done_when_already_done() {
        let tracker = TerminationTracker::new();
        tracker.on_enqueue();
        tracker.on_dequeue();
        tracker.on_task_done(0);

        tokio::time::timeout(Duration::from_millis(100), tracker.wait_done())
            .await
            .expect("already-done tracker must not block");
    }
}
