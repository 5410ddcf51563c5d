//! Shared state for the API service (spec §4.4 "State: the service holds
//! only the backing-store handle and the injected clock").
//!
//! Grounded on `schema-forge-acton::state`'s `Dyn*` object-safe wrapper
//! pattern: RPITIT traits cannot be used as `dyn Trait`, so a boxed-future
//! wrapper trait is generated with a blanket impl over any concrete
//! `MetadataStore`, letting `ApiState` hold `Arc<dyn DynMetadataStore>`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::RwLock;

use metadata_backend::{BackendError, MetadataStore};
use metadata_core::{Category, Clock, Event, Instance, TypeDef};

/// Object-safe wrapper for [`MetadataStore`].
pub trait DynMetadataStore: Send + Sync {
    fn put_type<'a>(
        &'a self,
        type_def: &'a TypeDef,
        all_fields_must_match: bool,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + 'a>>;

    fn get_type<'a>(
        &'a self,
        category: Category,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + 'a>>;

    fn get_type_by_id(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + '_>>;

    fn list_types(
        &self,
        category: Category,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TypeDef>, BackendError>> + Send + '_>>;

    fn put_instance<'a>(
        &'a self,
        instance: &'a Instance,
    ) -> Pin<Box<dyn Future<Output = Result<Instance, BackendError>> + Send + 'a>>;

    fn get_instance(
        &self,
        category: Category,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Instance, BackendError>> + Send + '_>>;

    fn list_instances(
        &self,
        category: Category,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + '_>>;

    fn get_instances_by_type<'a>(
        &'a self,
        category: Category,
        type_name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + 'a>>;

    fn get_artifacts_by_uri<'a>(
        &'a self,
        uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + 'a>>;

    fn put_events<'a>(
        &'a self,
        events: &'a [Event],
    ) -> Pin<Box<dyn Future<Output = Result<(), BackendError>> + Send + 'a>>;

    fn get_events_by_artifact_ids<'a>(
        &'a self,
        ids: &'a [i64],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, BackendError>> + Send + 'a>>;

    fn get_events_by_execution_ids<'a>(
        &'a self,
        ids: &'a [i64],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, BackendError>> + Send + 'a>>;

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = Result<(), BackendError>> + Send + '_>>;
}

impl<T: MetadataStore + 'static> DynMetadataStore for T {
    fn put_type<'a>(
        &'a self,
        type_def: &'a TypeDef,
        all_fields_must_match: bool,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::put_type(self, type_def, all_fields_must_match))
    }

    fn get_type<'a>(
        &'a self,
        category: Category,
        name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::get_type(self, category, name))
    }

    fn get_type_by_id(
        &self,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<TypeDef, BackendError>> + Send + '_>> {
        Box::pin(MetadataStore::get_type_by_id(self, id))
    }

    fn list_types(
        &self,
        category: Category,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<TypeDef>, BackendError>> + Send + '_>> {
        Box::pin(MetadataStore::list_types(self, category))
    }

    fn put_instance<'a>(
        &'a self,
        instance: &'a Instance,
    ) -> Pin<Box<dyn Future<Output = Result<Instance, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::put_instance(self, instance))
    }

    fn get_instance(
        &self,
        category: Category,
        id: i64,
    ) -> Pin<Box<dyn Future<Output = Result<Instance, BackendError>> + Send + '_>> {
        Box::pin(MetadataStore::get_instance(self, category, id))
    }

    fn list_instances(
        &self,
        category: Category,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + '_>> {
        Box::pin(MetadataStore::list_instances(self, category))
    }

    fn get_instances_by_type<'a>(
        &'a self,
        category: Category,
        type_name: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::get_instances_by_type(self, category, type_name))
    }

    fn get_artifacts_by_uri<'a>(
        &'a self,
        uri: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Instance>, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::get_artifacts_by_uri(self, uri))
    }

    fn put_events<'a>(
        &'a self,
        events: &'a [Event],
    ) -> Pin<Box<dyn Future<Output = Result<(), BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::put_events(self, events))
    }

    fn get_events_by_artifact_ids<'a>(
        &'a self,
        ids: &'a [i64],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::get_events_by_artifact_ids(self, ids))
    }

    fn get_events_by_execution_ids<'a>(
        &'a self,
        ids: &'a [i64],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Event>, BackendError>> + Send + 'a>> {
        Box::pin(MetadataStore::get_events_by_execution_ids(self, ids))
    }

    fn shutdown(&self) -> Pin<Box<dyn Future<Output = Result<(), BackendError>> + Send + '_>> {
        Box::pin(MetadataStore::shutdown(self))
    }
}

/// The API service's in-memory `type-name -> backing-store-id` table
/// (spec §3 "Ownership"). An optimization over re-querying the store by
/// name; the store remains the source of truth.
#[derive(Clone, Default)]
pub struct TypeNameCache {
    inner: Arc<RwLock<HashMap<(Category, String), i64>>>,
}

impl TypeNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, category: Category, name: &str) -> Option<i64> {
        self.inner.read().await.get(&(category, name.to_string())).copied()
    }

    pub async fn insert(&self, category: Category, name: String, id: i64) {
        self.inner.write().await.insert((category, name), id);
    }
}

/// Shared state for the API service's handlers, both HTTP and RPC (spec
/// §4.4 "State").
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn DynMetadataStore>,
    pub clock: Arc<dyn Clock>,
    pub type_cache: TypeNameCache,
}

impl ApiState {
    pub fn new(store: Arc<dyn DynMetadataStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            type_cache: TypeNameCache::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_state_is_clone_send_sync() {
        fn assert_clone_send_sync<T: Clone + Send + Sync>() {}
        assert_clone_send_sync::<ApiState>();
    }

    #[tokio::test]
    async fn type_name_cache_round_trip() {
        let cache = TypeNameCache::new();
        assert_eq!(cache.get(Category::Artifact, "kubeflow.org/Model").await, None);
        cache
            .insert(Category::Artifact, "kubeflow.org/Model".to_string(), 7)
            .await;
        assert_eq!(
            cache.get(Category::Artifact, "kubeflow.org/Model").await,
            Some(7)
        );
    }
}
