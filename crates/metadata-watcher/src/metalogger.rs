//! The MetaLogger handler (component G, spec §4.7): turns a watched
//! Kubernetes-style resource into Artifacts/Executions plus the Events
//! linking its declared inputs and outputs.

use std::collections::BTreeMap;

use metadata_core::{Category, EventDirection, PropertyKind, PropertyValue};
use metadata_service::api::{MetadataApi, NewInstance, NewType};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::change_feed::{GroupVersionKind, ObjectOrTombstone};
use crate::error::WatcherError;
use crate::worker::KindHandler;

/// The spec.md §9 open question resolved for this implementation (spec
/// §4.7, last paragraph): cluster objects modeled as Executions with
/// linked input/output Artifacts, or as Artifacts directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetaLoggerMode {
    #[default]
    ExecutionCentric,
    ArtifactCentric,
}

impl MetaLoggerMode {
    fn primary_category(self) -> Category {
        match self {
            Self::ExecutionCentric => Category::Execution,
            Self::ArtifactCentric => Category::Artifact,
        }
    }
}

/// A cluster-object reference decoded from an `input`/`output` annotation
/// (spec §4.7 step 5: "Decode its value as YAML-or-JSON into a
/// cluster-object descriptor with its own group/version/kind").
#[derive(Debug, Clone, Deserialize)]
struct AnnotationDescriptor {
    group: String,
    version: String,
    kind: String,
    name: String,
    #[serde(default)]
    uid: String,
}

fn decode_annotation(raw: &str) -> Result<AnnotationDescriptor, WatcherError> {
    serde_yaml::from_str(raw).map_err(|err| WatcherError::CallerError {
        message: format!("annotation is not valid YAML or JSON: {err}"),
    })
}

/// Property key carrying the watcher's workspace tag. Spec §4.7 step 4
/// names this `__kf_workspace__`, but any `__kf_` prefix on a
/// custom property is rejected by `metadata_core::reject_reserved_keys`
/// (the reserved namespace is prefix-matched, not matched against the
/// specific reserved keys in spec §4.3). Using a non-reserved key here
/// carries the same information without tripping that guard.
const WATCHER_WORKSPACE_KEY: &str = "watcher_workspace";
const WATCHER_WORKSPACE_VALUE: &str = "resource_watcher";

pub struct MetaLogger {
    api: MetadataApi,
    gvk: GroupVersionKind,
    mode: MetaLoggerMode,
    type_id: i64,
    annotation_types: RwLock<BTreeMap<GroupVersionKind, i64>>,
}

impl MetaLogger {
    /// Registers the primary type for `gvk` (spec §4.7: "on first
    /// construction the handler registers a type with the API service").
    pub async fn new(
        api: MetadataApi,
        gvk: GroupVersionKind,
        mode: MetaLoggerMode,
    ) -> Result<Self, WatcherError> {
        let type_id = register_type(&api, &type_name(&gvk), mode.primary_category()).await?;
        Ok(Self { api, gvk, mode, type_id, annotation_types: RwLock::new(BTreeMap::new()) })
    }

    async fn already_recorded(&self, category: Category, uid: &str) -> Result<bool, WatcherError> {
        let instances = self
            .api
            .list_instances(category, Some(&type_name(&self.gvk)))
            .await?;
        Ok(instances.iter().any(|instance| {
            matches!(instance.properties.get("version"), Some(PropertyValue::String(v)) if v == uid)
        }))
    }

    async fn annotation_type_id(&self, descriptor: &AnnotationDescriptor) -> Result<i64, WatcherError> {
        let kind = GroupVersionKind::new(descriptor.group.clone(), descriptor.version.clone(), descriptor.kind.clone());
        if let Some(id) = self.annotation_types.read().await.get(&kind) {
            return Ok(*id);
        }
        let id = register_type(&self.api, &type_name(&kind), Category::Artifact).await?;
        self.annotation_types.write().await.insert(kind, id);
        Ok(id)
    }

    async fn create_annotation_artifact(
        &self,
        descriptor: &AnnotationDescriptor,
    ) -> Result<i64, WatcherError> {
        let type_id = self.annotation_type_id(descriptor).await?;
        let kind = GroupVersionKind::new(descriptor.group.clone(), descriptor.version.clone(), descriptor.kind.clone());
        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), PropertyValue::String(descriptor.name.clone()));
        properties.insert("version".to_string(), PropertyValue::String(descriptor.uid.clone()));
        let instance = self
            .api
            .create_instance(
                Category::Artifact,
                &type_name(&kind),
                NewInstance {
                    id: None,
                    uri: None,
                    properties,
                    custom_properties: BTreeMap::new(),
                },
            )
            .await?;
        let _ = type_id;
        Ok(instance.id.expect("store assigns id"))
    }
}

impl KindHandler for MetaLogger {
    async fn on_add(&self, object: ObjectOrTombstone) -> Result<(), WatcherError> {
        let cluster_object = object.object();
        let category = self.mode.primary_category();

        if self.already_recorded(category, &cluster_object.meta.uid).await? {
            return Ok(());
        }

        let body = serde_json::to_string(&cluster_object.body).map_err(|err| WatcherError::CallerError {
            message: format!("failed to serialize object body: {err}"),
        })?;

        let mut properties = BTreeMap::new();
        properties.insert("name".to_string(), PropertyValue::String(cluster_object.meta.name.clone()));
        properties.insert("version".to_string(), PropertyValue::String(cluster_object.meta.uid.clone()));
        properties.insert(
            "create_time".to_string(),
            PropertyValue::String(chrono::Utc::now().to_rfc3339()),
        );
        properties.insert("object".to_string(), PropertyValue::String(body));

        let mut custom_properties = BTreeMap::new();
        custom_properties.insert(
            WATCHER_WORKSPACE_KEY.to_string(),
            PropertyValue::String(WATCHER_WORKSPACE_VALUE.to_string()),
        );

        let created = self
            .api
            .create_instance(
                category,
                &type_name(&self.gvk),
                NewInstance { id: None, uri: None, properties, custom_properties },
            )
            .await?;
        let primary_id = created.id.expect("store assigns id");

        // Only meaningful when the primary object is an Execution: an
        // Artifact-centric primary has no execution id to link events
        // from, so input/output annotations are skipped in that mode.
        if self.mode != MetaLoggerMode::ExecutionCentric {
            return Ok(());
        }

        for (annotation_key, direction) in [("input", EventDirection::Input), ("output", EventDirection::Output)] {
            let Some(raw) = cluster_object.meta.annotations.get(annotation_key) else {
                continue;
            };
            let descriptor = decode_annotation(raw)?;
            let artifact_id = self.create_annotation_artifact(&descriptor).await?;
            self.api.create_event(primary_id, artifact_id, direction).await?;
        }

        Ok(())
    }

    async fn on_update(&self, _old: ObjectOrTombstone, _new: ObjectOrTombstone) -> Result<(), WatcherError> {
        Ok(())
    }

    async fn on_delete(&self, _object: ObjectOrTombstone) -> Result<(), WatcherError> {
        Ok(())
    }
}

fn type_name(gvk: &GroupVersionKind) -> String {
    format!("kubeflow.org/{}.{}/{}", gvk.kind, gvk.group, gvk.version)
}

fn watched_properties() -> BTreeMap<String, PropertyKind> {
    let mut properties = BTreeMap::new();
    properties.insert("name".to_string(), PropertyKind::String);
    properties.insert("version".to_string(), PropertyKind::String);
    properties.insert("create_time".to_string(), PropertyKind::String);
    properties.insert("object".to_string(), PropertyKind::String);
    properties
}

async fn register_type(api: &MetadataApi, name: &str, category: Category) -> Result<i64, WatcherError> {
    let type_def = api
        .create_type(
            category,
            NewType { name: name.to_string(), properties: watched_properties() },
        )
        .await?;
    Ok(type_def.id.expect("store assigns id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_feed::{ClusterObject, ObjectMeta};
    use metadata_backend_mem::MemoryStore;
    use metadata_core::SystemClock;
    use metadata_service::ApiState;
    use std::sync::Arc;

    fn new_api() -> MetadataApi {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(SystemClock);
        MetadataApi::new(ApiState::new(store, clock))
    }

    fn object(name: &str, uid: &str) -> ObjectOrTombstone {
        ObjectOrTombstone::Live(ClusterObject {
            meta: ObjectMeta {
                name: name.into(),
                uid: uid.into(),
                gvk: GroupVersionKind::new("kubeflow.org", "v1", "Model"),
                annotations: BTreeMap::new(),
            },
            body: serde_json::json!({"name": name}),
        })
    }

    #[tokio::test]
    async fn on_add_registers_type_once_and_creates_execution() {
        let api = new_api();
        let gvk = GroupVersionKind::new("kubeflow.org", "v1", "Model");
        let logger = MetaLogger::new(api.clone(), gvk.clone(), MetaLoggerMode::ExecutionCentric)
            .await
            .unwrap();

        logger.on_add(object("a", "uid-1")).await.unwrap();
        let instances = api.list_instances(Category::Execution, Some(&type_name(&gvk))).await.unwrap();
        assert_eq!(instances.len(), 1);
    }

    #[tokio::test]
    async fn on_add_is_idempotent_on_redelivery() {
        let api = new_api();
        let gvk = GroupVersionKind::new("kubeflow.org", "v1", "Model");
        let logger = MetaLogger::new(api.clone(), gvk.clone(), MetaLoggerMode::ExecutionCentric)
            .await
            .unwrap();

        logger.on_add(object("a", "uid-1")).await.unwrap();
        logger.on_add(object("a", "uid-1")).await.unwrap();

        let instances = api.list_instances(Category::Execution, Some(&type_name(&gvk))).await.unwrap();
        assert_eq!(instances.len(), 1);
    }

    #[tokio::test]
    async fn on_add_links_input_output_annotations_as_events() {
        let api = new_api();
        let gvk = GroupVersionKind::new("kubeflow.org", "v1", "Model");
        let logger = MetaLogger::new(api.clone(), gvk.clone(), MetaLoggerMode::ExecutionCentric)
            .await
            .unwrap();

        let mut annotated = object("a", "uid-1");
        if let ObjectOrTombstone::Live(cluster_object) = &mut annotated {
            cluster_object.meta.annotations.insert(
                "input".to_string(),
                "group: kubeflow.org\nversion: v1\nkind: Dataset\nname: d1\nuid: duid-1\n".to_string(),
            );
        }
        logger.on_add(annotated).await.unwrap();

        let executions = api.list_instances(Category::Execution, Some(&type_name(&gvk))).await.unwrap();
        let execution_id = executions[0].id.unwrap();
        let events = api.search_events(&format!("executions/{execution_id}")).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].direction, EventDirection::Input);
    }
}
