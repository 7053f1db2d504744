//! The crawl frontier: a bounded, depth-aware, dedup-owning work queue.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::canonical::CanonicalUrl;
use crate::tracker::TerminationTracker;
use crate::visited::VisitedSet;

/// A unit of crawl work. Created at admission, consumed exactly once by a
/// worker, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: CanonicalUrl,
    pub depth: u32,
}

/// Result of offering a candidate URL to the frontier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Newly admitted and placed on the queue.
    Enqueued,
    /// Newly admitted and counted as outstanding, but the queue is at
    /// capacity. The caller holds the entry and re-offers it with
    /// [`Frontier::try_push`]; handing it back instead of blocking keeps
    /// a worker from waiting on space only it can free.
    Deferred(FrontierEntry),
    /// Seen before; nothing enqueued.
    Duplicate,
    /// The frontier is closed; the discovery is discarded.
    Dropped,
}

/// Bounded FIFO queue of frontier entries shared by all workers.
///
/// `push` applies backpressure instead of dropping when the queue is at
/// capacity. `pop` suspends on a transient empty queue and returns `None`
/// only on true completion (tracker reports zero pending) or shutdown.
pub struct Frontier {
    queue: Mutex<VecDeque<FrontierEntry>>,
    capacity: usize,
    visited: Arc<VisitedSet>,
    tracker: Arc<TerminationTracker>,
    closed: AtomicBool,
    /// Wakes poppers when an entry arrives or the frontier closes.
    added: Notify,
    /// Wakes blocked pushers when space frees or the frontier closes.
    removed: Notify,
}

impl Frontier {
    pub fn new(capacity: usize, visited: Arc<VisitedSet>, tracker: Arc<TerminationTracker>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity,
            visited,
            tracker,
            closed: AtomicBool::new(false),
            added: Notify::new(),
            removed: Notify::new(),
        }
    }

    /// Dedup admission and enqueue as one admission step per candidate:
    /// the visited set is updated before the entry becomes visible, so two
    /// workers discovering the same URL concurrently enqueue it once. A
    /// full queue defers the entry back to the caller rather than blocking;
    /// deferred entries are already counted as outstanding.
    pub fn admit(&self, url: CanonicalUrl, depth: u32) -> Admission {
        if !self.visited.admit_if_new(&url) {
            return Admission::Duplicate;
        }
        let entry = FrontierEntry { url, depth };

        let mut queue = self.queue.lock();
        if self.closed.load(Ordering::Acquire) {
            return Admission::Dropped;
        }
        self.tracker.on_enqueue();
        if queue.len() < self.capacity {
            queue.push_back(entry);
            drop(queue);
            self.added.notify_one();
            Admission::Enqueued
        } else {
            drop(queue);
            Admission::Deferred(entry)
        }
    }

    /// Re-offer an entry handed back by a deferred admission. Hands the
    /// entry back again while the queue is still at capacity; a closed
    /// frontier swallows it.
    pub fn try_push(&self, entry: FrontierEntry) -> Result<(), FrontierEntry> {
        let mut queue = self.queue.lock();
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        if queue.len() < self.capacity {
            queue.push_back(entry);
            drop(queue);
            self.added.notify_one();
            Ok(())
        } else {
            Err(entry)
        }
    }

    /// Enqueue an entry, blocking while the frontier is at capacity. If
    /// the frontier has been closed the entry is discarded and `false` is
    /// returned.
    pub async fn push(&self, entry: FrontierEntry) -> bool {
        loop {
            let notified = self.removed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut queue = self.queue.lock();
                // `close` flips the flag under this lock, so an entry can
                // never be enqueued concurrently with shutdown.
                if self.closed.load(Ordering::Acquire) {
                    return false;
                }
                if queue.len() < self.capacity {
                    queue.push_back(entry);
                    self.tracker.on_enqueue();
                    drop(queue);
                    self.added.notify_one();
                    return true;
                }
            }

            notified.await;
        }
    }

    /// Dequeue the next entry, suspending while the queue is empty but
    /// work may still arrive. Returns `None` only when the tracker has
    /// confirmed completion or the frontier was closed.
    pub async fn pop(&self) -> Option<FrontierEntry> {
        loop {
            let notified = self.added.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            // Cancellation wins over queued work: a closed frontier never
            // hands out entries, so workers stop at the next task boundary
            // instead of draining the backlog. On the completion path the
            // queue is already empty when the frontier closes.
            if self.closed.load(Ordering::Acquire) {
                return None;
            }

            if let Some(entry) = self.try_pop() {
                return Some(entry);
            }

            if self.tracker.is_done() {
                return None;
            }

            notified.await;
        }
    }

    /// Non-blocking dequeue. Returns `None` on an empty or closed frontier.
    pub fn try_pop(&self) -> Option<FrontierEntry> {
        let entry = {
            let mut queue = self.queue.lock();
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            queue.pop_front()
        };
        if entry.is_some() {
            self.tracker.on_dequeue();
            self.removed.notify_one();
        }
        entry
    }

    /// Close the frontier and wake every blocked push/pop caller. Called
    /// on completion and on cancellation; idempotent.
    pub fn close(&self) {
        {
            let _queue = self.queue.lock();
            self.closed.store(true, Ordering::Release);
        }
        self.added.notify_waiters();
        self.removed.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Entries currently queued (excludes in-flight work).
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::canonicalize;
    use std::time::Duration;
    use tokio::time::timeout;

    fn frontier(capacity: usize) -> Arc<Frontier> {
        Arc::new(Frontier::new(
            capacity,
            Arc::new(VisitedSet::new()),
            Arc::new(TerminationTracker::new()),
        ))
    }

    fn entry(path: &str, depth: u32) -> FrontierEntry {
        FrontierEntry {
            url: canonicalize(&format!("https://test.local/{path}"), None).unwrap(),
            depth,
        }
    }

    #[tokio::test]
    async fn test_push_pop_fifo() {
        let frontier = frontier(8);
        assert!(frontier.push(entry("a", 0)).await);
        assert!(frontier.push(entry("b", 1)).await);

        assert_eq!(frontier.pop().await, Some(entry("a", 0)));
        assert_eq!(frontier.pop().await, Some(entry("b", 1)));
    }

    #[test]
    fn test_admit_rejects_duplicates() {
        let frontier = frontier(8);
        let url = canonicalize("https://test.local/page", None).unwrap();

        assert_eq!(frontier.admit(url.clone(), 0), Admission::Enqueued);
        assert_eq!(frontier.admit(url, 1), Admission::Duplicate);
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn test_admit_defers_when_full() {
        let tracker = Arc::new(TerminationTracker::new());
        let frontier = Frontier::new(1, Arc::new(VisitedSet::new()), Arc::clone(&tracker));

        let a = canonicalize("https://test.local/a", None).unwrap();
        let b = canonicalize("https://test.local/b", None).unwrap();
        assert_eq!(frontier.admit(a, 0), Admission::Enqueued);
        let deferred = match frontier.admit(b, 1) {
            Admission::Deferred(entry) => entry,
            other => panic!("expected a deferred admission, got {:?}", other),
        };

        // A deferred entry is already counted as outstanding.
        assert_eq!(frontier.len(), 1);
        assert_eq!(tracker.queued(), 2);

        // Re-offering fails until a slot frees up, then lands once.
        let deferred = frontier.try_push(deferred).unwrap_err();
        assert!(frontier.try_pop().is_some());
        assert!(frontier.try_push(deferred).is_ok());
        assert_eq!(frontier.len(), 1);
    }

    #[tokio::test]
    async fn test_close_discards_queued_entries() {
        let frontier = frontier(8);
        assert!(frontier.push(entry("a", 0)).await);
        assert!(frontier.push(entry("b", 0)).await);

        frontier.close();

        assert_eq!(frontier.pop().await, None, "closed frontier must not hand out work");
        assert!(frontier.try_pop().is_none());
        // The entries stay queued; they are simply never delivered.
        assert_eq!(frontier.len(), 2);
    }

    #[tokio::test]
    async fn test_full_frontier_blocks_push_until_pop() {
        let frontier = frontier(1);
        assert!(frontier.push(entry("first", 0)).await);

        let pusher = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.push(entry("second", 0)).await })
        };

        // The second push must stay blocked while the queue is full.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!pusher.is_finished());
        assert_eq!(frontier.len(), 1);

        assert_eq!(frontier.pop().await, Some(entry("first", 0)));
        assert!(timeout(Duration::from_secs(1), pusher).await.unwrap().unwrap());

        // Nothing was dropped.
        assert_eq!(frontier.pop().await, Some(entry("second", 0)));
    }

    #[tokio::test]
    async fn test_pop_waits_for_late_push() {
        let frontier = frontier(4);

        let popper = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!popper.is_finished(), "pop must not treat a transient empty queue as done");

        assert!(frontier.push(entry("late", 2)).await);
        let popped = timeout(Duration::from_secs(1), popper).await.unwrap().unwrap();
        assert_eq!(popped, Some(entry("late", 2)));
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_pop() {
        let frontier = frontier(4);

        let popper = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        frontier.close();

        let popped = timeout(Duration::from_secs(1), popper).await.unwrap().unwrap();
        assert_eq!(popped, None);
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_push_without_effect() {
        let frontier = frontier(1);
        assert!(frontier.push(entry("only", 0)).await);

        let pusher = {
            let frontier = Arc::clone(&frontier);
            tokio::spawn(async move { frontier.push(entry("blocked", 0)).await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        frontier.close();

        let pushed = timeout(Duration::from_secs(1), pusher).await.unwrap().unwrap();
        assert!(!pushed, "push into a closed frontier must return without effect");
        assert_eq!(frontier.len(), 1);
    }

    #[tokio::test]
    async fn test_push_after_close_is_discarded() {
        let frontier = frontier(4);
        frontier.close();
        assert!(!frontier.push(entry("late", 0)).await);
        assert!(frontier.is_empty());
    }
}
