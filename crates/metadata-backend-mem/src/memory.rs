//! In-memory implementation of [`MetadataStore`] (spec §6 "in-memory
//! (fully implemented, the default)").
//!
//! Grounded on `schema-forge-surrealdb::backend::SurrealBackend`'s shape
//! (a struct wrapping connection state with a `connect_memory` constructor
//! implementing the storage trait) but backed by plain collections instead
//! of a SurrealQL engine, guarded by a `tokio::sync::RwLock` per table as
//! described in spec §5 "Shared-resource policy".

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::RwLock;
use tracing::{debug, warn};

use metadata_backend::{BackendError, MetadataStore};
use metadata_core::{Category, Event, Instance, TypeDef};

#[derive(Default)]
struct Tables {
    types: HashMap<i64, TypeDef>,
    type_ids_by_name: HashMap<(Category, String), i64>,
    instances: HashMap<i64, Instance>,
    events: Vec<Event>,
}

/// An in-process backing store. The default engine (spec §6); never
/// persists across process restarts.
pub struct MemoryStore {
    next_type_id: AtomicI64,
    next_instance_id: AtomicI64,
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_type_id: AtomicI64::new(1),
            next_instance_id: AtomicI64::new(1),
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn same_shape(a: &TypeDef, b: &TypeDef) -> bool {
    a.category == b.category && a.properties == b.properties
}

impl MetadataStore for MemoryStore {
    async fn put_type(
        &self,
        type_def: &TypeDef,
        all_fields_must_match: bool,
    ) -> Result<TypeDef, BackendError> {
        let mut tables = self.tables.write().await;
        let key = (type_def.category, type_def.name.clone());
        if let Some(&existing_id) = tables.type_ids_by_name.get(&key) {
            let existing = tables.types.get(&existing_id).expect("indexed type exists").clone();
            if all_fields_must_match && !same_shape(&existing, type_def) {
                warn!(name = %type_def.name, "type create rejected: shape conflicts with existing type");
                return Err(BackendError::TypeConflict {
                    name: type_def.name.clone(),
                });
            }
            return Ok(existing);
        }

        let id = self.next_type_id.fetch_add(1, Ordering::SeqCst);
        let stored = type_def.clone().with_id(id);
        tables.types.insert(id, stored.clone());
        tables.type_ids_by_name.insert(key, id);
        debug!(id, name = %stored.name, "type created");
        Ok(stored)
    }

    async fn get_type(&self, category: Category, name: &str) -> Result<TypeDef, BackendError> {
        let tables = self.tables.read().await;
        let id = tables
            .type_ids_by_name
            .get(&(category, name.to_string()))
            .copied()
            .ok_or_else(|| BackendError::TypeNotFound { name: name.to_string() })?;
        Ok(tables.types.get(&id).expect("indexed type exists").clone())
    }

    async fn get_type_by_id(&self, id: i64) -> Result<TypeDef, BackendError> {
        let tables = self.tables.read().await;
        tables
            .types
            .get(&id)
            .cloned()
            .ok_or_else(|| BackendError::TypeNotFound { name: id.to_string() })
    }

    async fn list_types(&self, category: Category) -> Result<Vec<TypeDef>, BackendError> {
        let tables = self.tables.read().await;
        let mut types: Vec<TypeDef> = tables
            .types
            .values()
            .filter(|t| t.category == category)
            .cloned()
            .collect();
        types.sort_by_key(|t| t.id);
        Ok(types)
    }

    async fn put_instance(&self, instance: &Instance) -> Result<Instance, BackendError> {
        if !self
            .tables
            .read()
            .await
            .types
            .contains_key(&instance.type_id)
        {
            warn!(type_id = instance.type_id, "instance create rejected: unknown type");
            return Err(BackendError::TypeNotFound {
                name: instance.type_id.to_string(),
            });
        }
        let id = self.next_instance_id.fetch_add(1, Ordering::SeqCst);
        let stored = instance.clone().with_id(id);
        self.tables.write().await.instances.insert(id, stored.clone());
        debug!(id, type_id = instance.type_id, "instance created");
        Ok(stored)
    }

    async fn get_instance(&self, category: Category, id: i64) -> Result<Instance, BackendError> {
        let tables = self.tables.read().await;
        let instance = tables
            .instances
            .get(&id)
            .filter(|i| i.category == category)
            .cloned()
            .ok_or(BackendError::InstanceNotFound {
                category: category.to_string(),
                id,
            })?;
        Ok(instance)
    }

    async fn list_instances(&self, category: Category) -> Result<Vec<Instance>, BackendError> {
        let tables = self.tables.read().await;
        let mut instances: Vec<Instance> = tables
            .instances
            .values()
            .filter(|i| i.category == category)
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.id);
        Ok(instances)
    }

    async fn get_instances_by_type(
        &self,
        category: Category,
        type_name: &str,
    ) -> Result<Vec<Instance>, BackendError> {
        let tables = self.tables.read().await;
        let type_id = tables
            .type_ids_by_name
            .get(&(category, type_name.to_string()))
            .copied()
            .ok_or_else(|| BackendError::TypeNotFound { name: type_name.to_string() })?;
        let mut instances: Vec<Instance> = tables
            .instances
            .values()
            .filter(|i| i.category == category && i.type_id == type_id)
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.id);
        Ok(instances)
    }

    async fn get_artifacts_by_uri(&self, uri: &str) -> Result<Vec<Instance>, BackendError> {
        let tables = self.tables.read().await;
        let mut instances: Vec<Instance> = tables
            .instances
            .values()
            .filter(|i| i.category == Category::Artifact && i.uri.as_deref() == Some(uri))
            .cloned()
            .collect();
        instances.sort_by_key(|i| i.id);
        Ok(instances)
    }

    async fn put_events(&self, events: &[Event]) -> Result<(), BackendError> {
        self.tables.write().await.events.extend_from_slice(events);
        Ok(())
    }

    async fn get_events_by_artifact_ids(&self, ids: &[i64]) -> Result<Vec<Event>, BackendError> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| ids.contains(&e.artifact_id))
            .copied()
            .collect())
    }

    async fn get_events_by_execution_ids(&self, ids: &[i64]) -> Result<Vec<Event>, BackendError> {
        let tables = self.tables.read().await;
        Ok(tables
            .events
            .iter()
            .filter(|e| ids.contains(&e.execution_id))
            .copied()
            .collect())
    }

    async fn shutdown(&self) -> Result<(), BackendError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn model_type() -> TypeDef {
        TypeDef::new("kubeflow.org/Model".into(), BTreeMap::new(), Category::Artifact)
    }

    #[tokio::test]
    async fn put_type_assigns_id_and_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.put_type(&model_type(), true).await.unwrap();
        assert!(first.id.is_some());
        let second = store.put_type(&model_type(), true).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn put_type_conflict_on_shape_mismatch() {
        let store = MemoryStore::new();
        store.put_type(&model_type(), true).await.unwrap();
        let mut other_props = BTreeMap::new();
        other_props.insert("extra".to_string(), metadata_core::PropertyKind::String);
        let conflicting = TypeDef::new("kubeflow.org/Model".into(), other_props, Category::Artifact);
        let result = store.put_type(&conflicting, true).await;
        assert!(matches!(result, Err(BackendError::TypeConflict { .. })));
    }

    #[tokio::test]
    async fn instance_round_trip() {
        let store = MemoryStore::new();
        let type_def = store.put_type(&model_type(), true).await.unwrap();
        let instance = Instance::new(type_def.id.unwrap(), Category::Artifact).with_uri("s3://x");
        let created = store.put_instance(&instance).await.unwrap();
        let fetched = store
            .get_instance(Category::Artifact, created.id.unwrap())
            .await
            .unwrap();
        assert_eq!(fetched.uri.as_deref(), Some("s3://x"));
    }

    #[tokio::test]
    async fn instance_requires_known_type() {
        let store = MemoryStore::new();
        let instance = Instance::new(999, Category::Artifact);
        assert!(store.put_instance(&instance).await.is_err());
    }

    #[tokio::test]
    async fn events_filter_by_axis() {
        let store = MemoryStore::new();
        let event = Event {
            execution_id: 1,
            artifact_id: 2,
            direction: metadata_core::EventDirection::Output,
        };
        store.put_events(&[event]).await.unwrap();
        let by_artifact = store.get_events_by_artifact_ids(&[2]).await.unwrap();
        assert_eq!(by_artifact.len(), 1);
        let by_execution = store.get_events_by_execution_ids(&[1]).await.unwrap();
        assert_eq!(by_execution.len(), 1);
        let none = store.get_events_by_artifact_ids(&[999]).await.unwrap();
        assert!(none.is_empty());
    }
}
