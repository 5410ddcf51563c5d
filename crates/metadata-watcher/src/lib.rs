//! The resource watcher (component F) and its MetaLogger handler
//! (component G), spec §4.6/§4.7.

pub mod change_feed;
pub mod error;
pub mod metalogger;
pub mod queue;
pub mod worker;

pub use change_feed::{ChangeFeed, ClusterObject, GroupVersionKind, ObjectMeta, ObjectOrTombstone, ScriptedChangeFeed, WatchEvent};
pub use error::WatcherError;
pub use metalogger::{MetaLogger, MetaLoggerMode};
pub use worker::{KindHandler, KindWorker};

use tokio::sync::watch;

/// Runs one [`KindWorker`] per requested kind until `shutdown` reports
/// `true` (spec §6 "Resource-list input (watcher)": a JSON array of
/// `{Group, Version, Kind}` records drives which kinds are watched).
pub async fn run_watchers<F: ChangeFeed>(
    feed: &F,
    api: metadata_service::MetadataApi,
    kinds: Vec<GroupVersionKind>,
    mode: MetaLoggerMode,
    shutdown: watch::Receiver<bool>,
) -> Result<(), WatcherError> {
    let mut handles = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let handler = MetaLogger::new(api.clone(), kind.clone(), mode).await?;
        let worker = KindWorker::new(kind, handler);
        let shutdown = shutdown.clone();
        handles.push((worker, shutdown));
    }

    futures::future::join_all(handles.into_iter().map(|(worker, shutdown)| async move {
        worker.run(feed, shutdown).await;
    }))
    .await;

    Ok(())
}
