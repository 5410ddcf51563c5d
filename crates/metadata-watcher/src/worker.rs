//! The per-kind worker loop (spec §4.6).

use std::future::Future;
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::change_feed::{ChangeFeed, GroupVersionKind, ObjectOrTombstone, WatchEvent};
use crate::error::WatcherError;
use crate::queue::{Backoff, ChangeTag, WorkQueue};

const TICK: Duration = Duration::from_millis(50);

/// A handler injected into a [`KindWorker`] (component G implements this;
/// spec §4.6 "Per-kind instance": "Holds:... an injected handler").
pub trait KindHandler: Send + Sync {
    fn on_add(&self, object: ObjectOrTombstone) -> impl Future<Output = Result<(), WatcherError>> + Send;
    fn on_update(
        &self,
        old: ObjectOrTombstone,
        new: ObjectOrTombstone,
    ) -> impl Future<Output = Result<(), WatcherError>> + Send;
    fn on_delete(&self, object: ObjectOrTombstone) -> impl Future<Output = Result<(), WatcherError>> + Send;
}

fn tag_for(event: &WatchEvent) -> ChangeTag {
    match event {
        WatchEvent::Add(_) => ChangeTag::Add,
        WatchEvent::Update { .. } => ChangeTag::Update,
        WatchEvent::Delete(_) => ChangeTag::Delete,
    }
}

/// One watcher instance for one kind: a work queue fed by a change feed and
/// drained by a handler, run as a single Tokio task (spec §4.6 "one Tokio
/// task per watcher").
pub struct KindWorker<H> {
    kind: GroupVersionKind,
    handler: H,
    queue: WorkQueue<WatchEvent>,
}

impl<H: KindHandler> KindWorker<H> {
    pub fn new(kind: GroupVersionKind, handler: H) -> Self {
        Self { kind, handler, queue: WorkQueue::new(Backoff::default()) }
    }

    /// Runs until `shutdown` reports `true`. Ingests from `feed` and drains
    /// the queue into `handler` concurrently, per the numbered steps in
    /// spec §4.6.
    pub async fn run<F: ChangeFeed>(&self, feed: &F, mut shutdown: watch::Receiver<bool>) {
        let mut synced = feed.cache_synced(&self.kind);
        while !*synced.borrow() {
            if synced.changed().await.is_err() {
                error!(kind = ?self.kind, "change feed closed before cache-synced");
                return;
            }
        }
        info!(kind = ?self.kind, "cache synced, starting worker");

        let mut events = Box::pin(feed.watch(&self.kind));
        let mut ticker = tokio::time::interval(TICK);

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.drain().await;
                        return;
                    }
                }

                event = events.next() => {
                    match event {
                        Some(event) => {
                            self.queue.push(tag_for(&event), event).await;
                        }
                        None => {
                            debug!(kind = ?self.kind, "change feed stream ended");
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.tick_once().await;
                }
            }
        }
    }

    async fn tick_once(&self) {
        let Some(item) = self.queue.pop_ready().await else {
            return;
        };
        let result = match item.payload.clone() {
            WatchEvent::Add(object) => self.handler.on_add(object).await,
            WatchEvent::Update { old, new } => self.handler.on_update(old, new).await,
            WatchEvent::Delete(object) => self.handler.on_delete(object).await,
        };
        match result {
            Ok(()) => self.queue.forget(&item),
            Err(err) if err.is_retryable() => {
                warn!(kind = ?self.kind, %err, "handler failed, re-enqueueing with backoff");
                self.queue.requeue(item).await;
            }
            Err(err) => {
                warn!(kind = ?self.kind, %err, "caller error, dropping event");
            }
        }
    }

    async fn drain(&self) {
        info!(kind = ?self.kind, "shutting down, draining queue");
        while !self.queue.is_empty().await {
            self.tick_once().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::change_feed::{ClusterObject, ObjectMeta, ScriptedChangeFeed};

    struct CountingHandler {
        adds: Arc<AtomicUsize>,
    }

    impl KindHandler for CountingHandler {
        async fn on_add(&self, _object: ObjectOrTombstone) -> Result<(), WatcherError> {
            self.adds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn on_update(&self, _old: ObjectOrTombstone, _new: ObjectOrTombstone) -> Result<(), WatcherError> {
            Ok(())
        }

        async fn on_delete(&self, _object: ObjectOrTombstone) -> Result<(), WatcherError> {
            Ok(())
        }
    }

    fn object(name: &str) -> ObjectOrTombstone {
        ObjectOrTombstone::Live(ClusterObject {
            meta: ObjectMeta {
                name: name.into(),
                uid: format!("uid-{name}"),
                gvk: GroupVersionKind::new("kubeflow.org", "v1", "Model"),
                annotations: Default::default(),
            },
            body: serde_json::json!({"name": name}),
        })
    }

    #[tokio::test]
    async fn processes_scripted_events_after_cache_sync() {
        let kind = GroupVersionKind::new("kubeflow.org", "v1", "Model");
        let feed = ScriptedChangeFeed::new();
        feed.script(kind.clone(), vec![WatchEvent::Add(object("a")), WatchEvent::Add(object("b"))]).await;
        feed.mark_synced();

        let adds = Arc::new(AtomicUsize::new(0));
        let worker = KindWorker::new(kind, CountingHandler { adds: adds.clone() });
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let run = tokio::spawn(async move { worker.run(&feed, shutdown_rx).await });
        tokio::time::sleep(Duration::from_millis(150)).await;
        shutdown_tx.send(true).unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(1), run).await;

        assert_eq!(adds.load(Ordering::SeqCst), 2);
    }
}
