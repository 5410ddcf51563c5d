//! Per-kind rate-limited work queue (spec §4.6 "Per-kind instance").
//!
//! No teacher file covers this; the shape (one item in flight, re-enqueue
//! on failure with exponential backoff, "forget" on success) is authored
//! directly from spec §4.6's numbered worker-loop steps.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// add/update/delete tag on a queued change (spec §3 "watcher-event").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTag {
    Add,
    Update,
    Delete,
}

#[derive(Debug, Clone)]
pub struct QueueItem<T> {
    pub tag: ChangeTag,
    pub payload: T,
    retries: u32,
    not_before: Option<Instant>,
}

impl<T> QueueItem<T> {
    pub fn new(tag: ChangeTag, payload: T) -> Self {
        Self { tag, payload, retries: 0, not_before: None }
    }
}

/// Default exponential backoff: `base * 2^retries`, capped at `max`.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub base: Duration,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self { base: Duration::from_millis(100), max: Duration::from_secs(30) }
    }
}

impl Backoff {
    pub fn delay_for(&self, retries: u32) -> Duration {
        let scaled = self.base.saturating_mul(1u32.checked_shl(retries).unwrap_or(u32::MAX));
        scaled.min(self.max)
    }
}

/// A single watcher's queue: at most one item in flight (spec §4.6
/// "Ordering & concurrency").
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<QueueItem<T>>>,
    backoff: Backoff,
}

impl<T> WorkQueue<T> {
    pub fn new(backoff: Backoff) -> Self {
        Self { items: Mutex::new(VecDeque::new()), backoff }
    }

    pub async fn push(&self, tag: ChangeTag, payload: T) {
        self.items.lock().await.push_back(QueueItem::new(tag, payload));
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    /// Pops the next item whose backoff has elapsed, if any.
    pub async fn pop_ready(&self) -> Option<QueueItem<T>> {
        let mut items = self.items.lock().await;
        let now = Instant::now();
        let position = items.iter().position(|item| item.not_before.is_none_or(|t| t <= now))?;
        items.remove(position)
    }

    /// "Forget" an item on success: nothing to do, it is already removed.
    pub fn forget(&self, _item: &QueueItem<T>) {}

    /// Re-enqueues a failed item with rate-limited exponential backoff.
    pub async fn requeue(&self, mut item: QueueItem<T>) {
        item.retries += 1;
        item.not_before = Some(Instant::now() + self.backoff.delay_for(item.retries));
        self.items.lock().await.push_back(item);
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_caps() {
        let backoff = Backoff { base: Duration::from_millis(100), max: Duration::from_secs(1) };
        assert_eq!(backoff.delay_for(0), Duration::from_millis(100));
        assert_eq!(backoff.delay_for(1), Duration::from_millis(200));
        assert_eq!(backoff.delay_for(10), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn push_then_pop_ready_returns_item_immediately() {
        let queue: WorkQueue<&'static str> = WorkQueue::new(Backoff::default());
        queue.push(ChangeTag::Add, "obj").await;
        let item = queue.pop_ready().await.unwrap();
        assert_eq!(item.tag, ChangeTag::Add);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn requeued_item_is_not_ready_before_backoff_elapses() {
        let queue: WorkQueue<&'static str> = WorkQueue::new(Backoff {
            base: Duration::from_millis(50),
            max: Duration::from_secs(1),
        });
        let item = QueueItem::new(ChangeTag::Update, "obj");
        queue.requeue(item).await;
        assert!(queue.pop_ready().await.is_none());
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(queue.pop_ready().await.is_some());
    }
}
