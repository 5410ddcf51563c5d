//! The change-feed interface the watcher consumes (spec §6 "Change-feed
//! interface (consumed)"), plus an in-process fake for tests.
//!
//! No teacher file models a cluster watch; this is authored directly from
//! spec §6's wording, shaped the way `metadata-core`'s store trait and
//! `metadata-service`'s `DynMetadataStore` wrap async operations behind a
//! plain trait object instead of leaning on an external client crate.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{watch, Mutex};

/// Identifies a watched Kubernetes-style resource kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupVersionKind {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl GroupVersionKind {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { group: group.into(), version: version.into(), kind: kind.into() }
    }
}

/// The metadata the MetaLogger handler (G) needs off of every object,
/// independent of its JSON body (spec §4.7 step 1 "extract the object's
/// metadata").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub name: String,
    pub uid: String,
    pub gvk: GroupVersionKind,
    pub annotations: BTreeMap<String, String>,
}

/// A cluster object as delivered by the change feed: the metadata plus its
/// full JSON body (spec §4.7 step 3, "serialize the full object as JSON").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterObject {
    pub meta: ObjectMeta,
    pub body: Value,
}

/// Either a live object or a "final-state-unknown" tombstone wrapping the
/// last known live object (spec §6, §4.6 "Tombstones").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectOrTombstone {
    Live(ClusterObject),
    Tombstone(ClusterObject),
}

impl ObjectOrTombstone {
    /// Unwraps to the inner object regardless of liveness. Spec §4.6 says
    /// handlers "unwrap the inner object before proceeding"; in this model
    /// unwrapping a tombstone never fails because it always wraps a
    /// complete last-known object, so this returns `&ClusterObject`
    /// directly rather than a fallible variant.
    pub fn object(&self) -> &ClusterObject {
        match self {
            Self::Live(object) | Self::Tombstone(object) => object,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Self::Tombstone(_))
    }
}

/// One change-feed callback, tagged the way §4.6's "inbound callbacks...
/// translate directly to enqueue operations tagged add/update/delete" is
/// worded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WatchEvent {
    Add(ObjectOrTombstone),
    Update { old: ObjectOrTombstone, new: ObjectOrTombstone },
    Delete(ObjectOrTombstone),
}

/// A source of watch events for one or more kinds (spec §6: "Modeled as a
/// Rust trait (`ChangeFeed`) so the watcher can be driven by a real cluster
/// client or (for testing) an in-process fake").
pub trait ChangeFeed: Send + Sync {
    /// A stream of events for `kind`, live for as long as the feed runs.
    fn watch(&self, kind: &GroupVersionKind) -> impl Stream<Item = WatchEvent> + Send + 'static;

    /// The cache-synced signal for `kind`: becomes `true` once the feed's
    /// initial list has completed and subsequent events are incremental.
    fn cache_synced(&self, kind: &GroupVersionKind) -> watch::Receiver<bool>;
}

/// An in-process fake that replays a scripted sequence of events, per spec
/// §6's own description of the test double.
pub struct ScriptedChangeFeed {
    scripts: Mutex<BTreeMap<GroupVersionKind, VecDeque<WatchEvent>>>,
    synced: Arc<watch::Sender<bool>>,
    synced_rx: watch::Receiver<bool>,
}

impl ScriptedChangeFeed {
    /// Builds a feed that is not yet cache-synced; call [`mark_synced`] once
    /// the script has been fully installed.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self { scripts: Mutex::new(BTreeMap::new()), synced: Arc::new(tx), synced_rx: rx }
    }

    pub async fn script(&self, kind: GroupVersionKind, events: Vec<WatchEvent>) {
        self.scripts.lock().await.insert(kind, events.into_iter().collect());
    }

    pub fn mark_synced(&self) {
        let _ = self.synced.send(true);
    }
}

impl Default for ScriptedChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeFeed for ScriptedChangeFeed {
    fn watch(&self, kind: &GroupVersionKind) -> impl Stream<Item = WatchEvent> + Send + 'static {
        let kind = kind.clone();
        let scripts = {
            // Snapshot the script under the lock; the fake replays a fixed
            // sequence rather than accepting live pushes after `watch` is
            // called, matching "replays a scripted sequence of events".
            let guard = self.scripts.try_lock().expect("scripted feed accessed from a single task");
            guard.get(&kind).cloned().unwrap_or_default()
        };
        stream::iter(scripts.into_iter())
    }

    fn cache_synced(&self, _kind: &GroupVersionKind) -> watch::Receiver<bool> {
        self.synced_rx.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(name: &str, uid: &str) -> ClusterObject {
        ClusterObject {
            meta: ObjectMeta {
                name: name.into(),
                uid: uid.into(),
                gvk: GroupVersionKind::new("kubeflow.org", "v1", "Model"),
                annotations: BTreeMap::new(),
            },
            body: serde_json::json!({"name": name}),
        }
    }

    #[test]
    fn tombstone_and_live_both_unwrap_to_the_inner_object() {
        let obj = object("a", "uid-1");
        let live = ObjectOrTombstone::Live(obj.clone());
        let tombstone = ObjectOrTombstone::Tombstone(obj.clone());
        assert_eq!(live.object(), &obj);
        assert_eq!(tombstone.object(), &obj);
        assert!(tombstone.is_tombstone());
        assert!(!live.is_tombstone());
    }

    #[tokio::test]
    async fn scripted_feed_replays_events_in_order() {
        let feed = ScriptedChangeFeed::new();
        let kind = GroupVersionKind::new("kubeflow.org", "v1", "Model");
        let first = ObjectOrTombstone::Live(object("a", "uid-1"));
        let second = ObjectOrTombstone::Tombstone(object("a", "uid-1"));
        feed.script(kind.clone(), vec![WatchEvent::Add(first.clone()), WatchEvent::Delete(second.clone())]).await;
        feed.mark_synced();

        assert!(*feed.cache_synced(&kind).borrow());
        let events: Vec<_> = feed.watch(&kind).collect().await;
        assert_eq!(events, vec![WatchEvent::Add(first), WatchEvent::Delete(second)]);
    }

    #[tokio::test]
    async fn unscripted_kind_yields_an_empty_stream() {
        let feed = ScriptedChangeFeed::new();
        let kind = GroupVersionKind::new("kubeflow.org", "v1", "Unused");
        let events: Vec<_> = feed.watch(&kind).collect().await;
        assert!(events.is_empty());
    }
}
