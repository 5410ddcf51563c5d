//! The API service (component D, spec §4.4): one method per operation,
//! shared identically by the RPC and HTTP gateways (component E).
//!
//! Grounded on `schema-forge-acton::routes::schemas`'s handler shape
//! (validate -> marshal -> backend call -> re-read -> response), adapted
//! from axum extractors to plain async methods on [`MetadataApi`] so both
//! gateways can call the same code.

use std::collections::BTreeMap;

use metadata_backend::empty_on_no_records;
use metadata_core::{
    marshal_ingress, reject_reserved_keys, reserved, CanonicalName, Category, Event,
    EventDirection, Instance, PropertyValue, ReservedInput, TypeDef,
};

use crate::error::ServiceError;
use crate::state::ApiState;

/// The `name` field on a create-type request, plus caller-supplied
/// properties (spec §4.4 "CreateArtifactType / CreateExecutionType").
#[derive(Debug, Clone)]
pub struct NewType {
    pub name: String,
    pub properties: BTreeMap<String, metadata_core::PropertyKind>,
}

/// Caller input for creating an Artifact or Execution (spec §4.4
/// "CreateArtifact / CreateExecution").
///
/// `id` only exists to be rejected: a Create with a caller-supplied `id`
/// always fails (spec §3/§4.4/§8), so every gateway forwards whatever it
/// received here instead of silently dropping it.
#[derive(Debug, Clone, Default)]
pub struct NewInstance {
    pub id: Option<serde_json::Value>,
    pub uri: Option<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

#[derive(Clone)]
pub struct MetadataApi {
    state: ApiState,
}

impl MetadataApi {
    pub fn new(state: ApiState) -> Self {
        Self { state }
    }

    async fn now(&self) -> i64 {
        self.state.clock.now_seconds()
    }

    fn reserved_descriptors(category: Category) -> BTreeMap<String, metadata_core::PropertyKind> {
        reserved::reserved_descriptors(category)
    }

    // -----------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------

    pub async fn create_type(
        &self,
        category: Category,
        request: NewType,
    ) -> Result<TypeDef, ServiceError> {
        let canonical = CanonicalName::parse(&request.name)?;

        let mut properties = request.properties;
        for key in properties.keys() {
            if reserved::is_reserved(key) {
                return Err(ServiceError::InvalidArgument {
                    message: format!("property key '{key}' uses the reserved '__kf_' prefix"),
                });
            }
        }
        properties.extend(Self::reserved_descriptors(category));

        let type_def = TypeDef::new(canonical.to_string(), properties, category);
        let stored = self.state.store.put_type(&type_def, true).await?;
        self.state
            .type_cache
            .insert(category, stored.name.clone(), stored.id.expect("store assigns id"))
            .await;

        // Re-read so the returned type is exactly what the store holds.
        let name = stored.name.clone();
        Ok(self.state.store.get_type(category, &name).await?)
    }

    pub async fn get_type(&self, category: Category, name: &str) -> Result<TypeDef, ServiceError> {
        let name = strip_type_prefix(name, category);
        let canonical = CanonicalName::parse(name)?;
        Ok(self.state.store.get_type(category, &canonical.to_string()).await?)
    }

    pub async fn list_types(&self, category: Category) -> Result<Vec<TypeDef>, ServiceError> {
        Ok(self.state.store.list_types(category).await?)
    }

    // -----------------------------------------------------------------
    // Instances
    // -----------------------------------------------------------------

    pub async fn create_instance(
        &self,
        category: Category,
        parent: &str,
        request: NewInstance,
    ) -> Result<Instance, ServiceError> {
        if request.id.is_some() {
            return Err(ServiceError::InvalidArgument {
                message: "id must not be supplied on create; it is assigned by the store".to_string(),
            });
        }

        let parent = strip_type_prefix(parent, category);
        let canonical = CanonicalName::parse(parent)?;
        let type_def = self
            .state
            .store
            .get_type(category, &canonical.to_string())
            .await?;

        reject_reserved_keys(&request.custom_properties)?;

        let now = self.now().await;
        let reserved_input = ReservedInput::default();
        let marshalled_properties = marshal_ingress(request.properties, reserved_input, now)?;

        let mut instance = Instance::new(type_def.id.expect("stored type has id"), category);
        instance.uri = request.uri;
        instance.properties = marshalled_properties;
        instance.custom_properties = request.custom_properties;

        let created = self.state.store.put_instance(&instance).await?;
        Ok(self
            .state
            .store
            .get_instance(category, created.id.expect("store assigns id"))
            .await?)
    }

    pub async fn get_instance(&self, category: Category, name: &str) -> Result<Instance, ServiceError> {
        let id = parse_instance_id(name, category)?;
        Ok(self.state.store.get_instance(category, id).await?)
    }

    pub async fn list_instances(
        &self,
        category: Category,
        type_filter: Option<&str>,
    ) -> Result<Vec<Instance>, ServiceError> {
        let result = match type_filter {
            Some(raw) => {
                let name = strip_type_prefix(raw, category);
                let canonical = CanonicalName::parse(name)?;
                self.state
                    .store
                    .get_instances_by_type(category, &canonical.to_string())
                    .await
            }
            None => self.state.store.list_instances(category).await,
        };
        Ok(empty_on_no_records(result)?)
    }

    // -----------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------

    pub async fn create_event(
        &self,
        execution_id: i64,
        artifact_id: i64,
        direction: EventDirection,
    ) -> Result<(), ServiceError> {
        let event = Event {
            execution_id,
            artifact_id,
            direction,
        };
        Ok(self.state.store.put_events(&[event]).await?)
    }

    pub async fn search_events(&self, name: &str) -> Result<Vec<Event>, ServiceError> {
        if let Some(rest) = name.strip_prefix("artifacts/") {
            let id = parse_id(rest)?;
            return Ok(empty_on_no_records(
                self.state.store.get_events_by_artifact_ids(&[id]).await,
            )?);
        }
        if let Some(rest) = name.strip_prefix("executions/") {
            let id = parse_id(rest)?;
            return Ok(empty_on_no_records(
                self.state.store.get_events_by_execution_ids(&[id]).await,
            )?);
        }
        Err(ServiceError::InvalidArgument {
            message: format!("'{name}' is not of the form artifacts/{{id}} or executions/{{id}}"),
        })
    }

    // -----------------------------------------------------------------
    // Reserved (spec §4.4 "DeleteArtifactType / ... : return unimplemented")
    // -----------------------------------------------------------------

    pub fn delete_unimplemented(operation: &str) -> ServiceError {
        ServiceError::Unimplemented {
            operation: operation.to_string(),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        Ok(self.state.store.shutdown().await?)
    }
}

fn strip_type_prefix(name: &str, category: Category) -> &str {
    let prefix = match category {
        Category::Artifact => "artifact_types/",
        Category::Execution => "execution_types/",
    };
    name.strip_prefix(prefix).unwrap_or(name)
}

fn parse_id(raw: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>().map_err(|_| ServiceError::InvalidArgument {
        message: format!("'{raw}' is not a valid unsigned decimal integer id"),
    })
}

/// Parses a resource name of the form
/// `artifact_types/{type}/artifacts/{id}` or
/// `execution_types/{type}/executions/{id}`, returning the trailing id.
fn parse_instance_id(name: &str, category: Category) -> Result<i64, ServiceError> {
    let segment = match category {
        Category::Artifact => "/artifacts/",
        Category::Execution => "/executions/",
    };
    let id_str = name.rsplit_once(segment).map(|(_, id)| id).ok_or_else(|| {
        ServiceError::InvalidArgument {
            message: format!("'{name}' is not a valid instance resource name"),
        }
    })?;
    parse_id(id_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use metadata_backend_mem::MemoryStore;
    use metadata_core::SystemClock;
    use std::sync::Arc;

    fn new_api() -> MetadataApi {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(SystemClock);
        MetadataApi::new(ApiState::new(store, clock))
    }

    #[tokio::test]
    async fn create_and_get_type_round_trips() {
        let api = new_api();
        let created = api
            .create_type(
                Category::Artifact,
                NewType {
                    name: "kubeflow.org/v1/Model".to_string(),
                    properties: BTreeMap::new(),
                },
            )
            .await
            .unwrap();
        assert!(created.id.is_some());
        let fetched = api
            .get_type(Category::Artifact, "kubeflow.org/v1/Model")
            .await
            .unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn create_type_is_idempotent() {
        let api = new_api();
        let request = NewType {
            name: "kubeflow.org/v1/Model".to_string(),
            properties: BTreeMap::new(),
        };
        let first = api.create_type(Category::Artifact, request.clone()).await.unwrap();
        let second = api.create_type(Category::Artifact, request).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn create_type_rejects_reserved_property() {
        let api = new_api();
        let mut properties = BTreeMap::new();
        properties.insert(reserved::NAME.to_string(), metadata_core::PropertyKind::String);
        let result = api
            .create_type(
                Category::Artifact,
                NewType {
                    name: "kubeflow.org/v1/Model".to_string(),
                    properties,
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn create_instance_round_trips_properties() {
        let api = new_api();
        api.create_type(
            Category::Artifact,
            NewType {
                name: "kubeflow.org/v1/Model".to_string(),
                properties: BTreeMap::new(),
            },
        )
        .await
        .unwrap();

        let created = api
            .create_instance(
                Category::Artifact,
                "kubeflow.org/v1/Model",
                NewInstance {
                    uri: Some("s3://bucket/key".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(created.properties.contains_key(reserved::CREATE_TIME));

        let name = format!("artifact_types/kubeflow.org/v1/Model/artifacts/{}", created.id.unwrap());
        let fetched = api.get_instance(Category::Artifact, &name).await.unwrap();
        assert_eq!(fetched.uri.as_deref(), Some("s3://bucket/key"));
    }

    #[tokio::test]
    async fn create_instance_rejects_caller_supplied_id() {
        let api = new_api();
        api.create_type(
            Category::Artifact,
            NewType {
                name: "kubeflow.org/v1/Model".to_string(),
                properties: BTreeMap::new(),
            },
        )
        .await
        .unwrap();

        let result = api
            .create_instance(
                Category::Artifact,
                "kubeflow.org/v1/Model",
                NewInstance {
                    id: Some(serde_json::json!(5)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument { .. })));
    }

    #[tokio::test]
    async fn list_instances_empty_is_ok_not_error() {
        let api = new_api();
        api.create_type(
            Category::Artifact,
            NewType {
                name: "kubeflow.org/v1/Model".to_string(),
                properties: BTreeMap::new(),
            },
        )
        .await
        .unwrap();
        let instances = api
            .list_instances(Category::Artifact, Some("kubeflow.org/v1/Model"))
            .await
            .unwrap();
        assert!(instances.is_empty());
    }

    #[tokio::test]
    async fn create_and_search_events() {
        let api = new_api();
        api.create_event(1, 2, EventDirection::Output).await.unwrap();
        let events = api.search_events("artifacts/2").await.unwrap();
        assert_eq!(events.len(), 1);
        let events = api.search_events("executions/1").await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn search_events_rejects_malformed_name() {
        let api = new_api();
        let result = api.search_events("bogus/1").await;
        assert!(matches!(result, Err(ServiceError::InvalidArgument { .. })));
    }
}
