use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// One admitted unit of outstanding work. The counter is decremented when the
/// unit is dropped, so every path that lets go of an item completes it exactly once.
#[derive(Debug)]
struct WorkUnit {
    outstanding: Arc<watch::Sender<usize>>,
}

impl WorkUnit {
    fn admit(outstanding: &Arc<watch::Sender<usize>>) -> Self {
        outstanding.send_modify(|n| *n += 1);
        Self {
            outstanding: outstanding.clone(),
        }
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.outstanding.send_modify(|n| *n -= 1);
    }
}

/// A raw URL waiting in the queue, carrying the unit of work it was admitted with.
#[derive(Debug)]
pub struct QueueItem {
    url: String,
    _unit: WorkUnit,
}

impl QueueItem {
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Outcome of a non-blocking enqueue.
#[derive(Debug, PartialEq, Eq)]
pub enum Offer {
    Admitted,
    /// The queue was at capacity. The URL is handed back and not retried.
    Full(String),
    /// The queue has been closed.
    Closed(String),
}

/// Bounded FIFO of pending URLs plus the count of work admitted but not yet completed.
pub struct WorkQueue {
    sender: mpsc::Sender<QueueItem>,
    receiver: Mutex<mpsc::Receiver<QueueItem>>,
    outstanding: Arc<watch::Sender<usize>>,
    closed: CancellationToken,
}

impl WorkQueue {
    /// `capacity` is clamped to at least one slot.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let (outstanding, _) = watch::channel(0usize);

        Self {
            sender,
            receiver: Mutex::new(receiver),
            outstanding: Arc::new(outstanding),
            closed: CancellationToken::new(),
        }
    }

    /// Try to enqueue `url` without waiting. The outstanding counter is raised
    /// before the item becomes visible to other workers and lowered again if
    /// the item is refused.
    pub fn offer(&self, url: String) -> Offer {
        if self.closed.is_cancelled() {
            return Offer::Closed(url);
        }

        let item = QueueItem {
            url,
            _unit: WorkUnit::admit(&self.outstanding),
        };

        match self.sender.try_send(item) {
            Ok(()) => Offer::Admitted,
            Err(TrySendError::Full(item)) => Offer::Full(item.url),
            Err(TrySendError::Closed(item)) => Offer::Closed(item.url),
        }
    }

    /// Wait for the next item. Returns `None` once the queue is closed.
    pub async fn next(&self) -> Option<QueueItem> {
        let mut receiver = tokio::select! {
            _ = self.closed.cancelled() => return None,
            receiver = self.receiver.lock() => receiver,
        };

        tokio::select! {
            _ = self.closed.cancelled() => None,
            item = receiver.recv() => item,
        }
    }

    /// Units admitted and not yet completed, including items still queued.
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Resolves once every admitted unit has completed.
    pub async fn wait_idle(&self) {
        let mut watcher = self.outstanding.subscribe();
        // The sender lives in `self`, so the watch cannot close under us.
        let _ = watcher.wait_for(|n| *n == 0).await;
    }

    /// Stop handing out items and refuse further offers. Workers blocked in
    /// `next` return `None`.
    pub fn close(&self) {
        self.closed.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new(4);
        assert_eq!(queue.offer("a".to_string()), Offer::Admitted);
        assert_eq!(queue.offer("b".to_string()), Offer::Admitted);
        assert_eq!(queue.offer("c".to_string()), Offer::Admitted);

        assert_eq!(queue.next().await.unwrap().url(), "a");
        assert_eq!(queue.next().await.unwrap().url(), "b");
        assert_eq!(queue.next().await.unwrap().url(), "c");
    }

    #[tokio::test]
    async fn test_full_queue_hands_url_back() {
        let queue = WorkQueue::new(2);
        assert_eq!(queue.offer("a".to_string()), Offer::Admitted);
        assert_eq!(queue.offer("b".to_string()), Offer::Admitted);
        assert_eq!(queue.offer("c".to_string()), Offer::Full("c".to_string()));
        assert_eq!(queue.outstanding(), 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_is_clamped() {
        let queue = WorkQueue::new(0);
        assert_eq!(queue.offer("a".to_string()), Offer::Admitted);
        assert_eq!(queue.offer("b".to_string()), Offer::Full("b".to_string()));
    }

    #[tokio::test]
    async fn test_outstanding_counts_until_item_is_dropped() {
        let queue = WorkQueue::new(4);
        queue.offer("a".to_string());
        queue.offer("b".to_string());
        assert_eq!(queue.outstanding(), 2);

        let item = queue.next().await.unwrap();
        assert_eq!(queue.outstanding(), 2);
        drop(item);
        assert_eq!(queue.outstanding(), 1);

        drop(queue.next().await.unwrap());
        assert_eq!(queue.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_wait_idle_resolves_after_last_completion() {
        let queue = Arc::new(WorkQueue::new(4));
        queue.offer("a".to_string());
        let item = queue.next().await.unwrap();

        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_idle().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // Work discovered while the item is held keeps the queue busy.
        queue.offer("b".to_string());
        drop(item);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(queue.next().await.unwrap());
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait_idle did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_idle_on_empty_queue_is_immediate() {
        let queue = WorkQueue::new(1);
        tokio::time::timeout(Duration::from_millis(100), queue.wait_idle())
            .await
            .expect("empty queue should be idle");
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_reader() {
        let queue = Arc::new(WorkQueue::new(1));
        let reader = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.next().await.is_none() })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        let saw_none = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .expect("reader stayed blocked after close")
            .unwrap();
        assert!(saw_none);
    }

    #[tokio::test]
    async fn test_offer_after_close_is_refused() {
        let queue = WorkQueue::new(4);
        queue.close();
        assert_eq!(queue.offer("a".to_string()), Offer::Closed("a".to_string()));
        assert_eq!(queue.outstanding(), 0);
    }
}
