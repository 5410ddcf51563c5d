//! The binary RPC gateway (component E, spec §4.5): one `tonic` service
//! method per [`MetadataApi`] operation, converting between the generated
//! proto messages and the domain model, delegating all business logic to
//! the same [`MetadataApi`] the HTTP gateway calls.

use std::collections::BTreeMap;

use metadata_core::{Category, EventDirection, PropertyKind, PropertyValue};
use tonic::{Request, Response, Status};

use crate::api::{MetadataApi, NewInstance, NewType};
use crate::state::ApiState;

pub mod proto {
    tonic::include_proto!("kubeflow.metadata.v1alpha1");
}

use proto::metadata_service_server::MetadataService;
use proto::property_value::Value as ProtoValueInner;
use proto::{
    CreateEventRequest, CreateEventResponse, CreateInstanceRequest, CreateTypeRequest,
    EventResponse, GetInstanceRequest, GetTypeRequest, InstanceResponse, ListInstancesRequest,
    ListInstancesResponse, ListTypesRequest, ListTypesResponse, PropertyValue as ProtoValue,
    SearchEventsRequest, SearchEventsResponse, TypeResponse,
};

fn kind_to_wire(kind: PropertyKind) -> String {
    match kind {
        PropertyKind::Integer => "integer".to_string(),
        PropertyKind::Float => "floating_point".to_string(),
        PropertyKind::String => "string".to_string(),
    }
}

fn kind_from_wire(raw: &str) -> Result<PropertyKind, Status> {
    match raw {
        "integer" => Ok(PropertyKind::Integer),
        "floating_point" => Ok(PropertyKind::Float),
        "string" => Ok(PropertyKind::String),
        other => Err(Status::invalid_argument(format!("unknown property kind '{other}'"))),
    }
}

fn value_to_proto(value: &PropertyValue) -> ProtoValue {
    let inner = match value {
        PropertyValue::Integer(v) => ProtoValueInner::IntValue(*v),
        PropertyValue::Float(v) => ProtoValueInner::DoubleValue(*v),
        PropertyValue::String(v) => ProtoValueInner::StringValue(v.clone()),
    };
    ProtoValue { value: Some(inner) }
}

fn value_from_proto(value: ProtoValue) -> Result<PropertyValue, Status> {
    match value.value {
        Some(ProtoValueInner::IntValue(v)) => Ok(PropertyValue::Integer(v)),
        Some(ProtoValueInner::DoubleValue(v)) => Ok(PropertyValue::Float(v)),
        Some(ProtoValueInner::StringValue(v)) => Ok(PropertyValue::String(v)),
        None => Err(Status::invalid_argument("property value has no variant set")),
    }
}

fn properties_from_wire(raw: BTreeMap<String, String>) -> Result<BTreeMap<String, PropertyKind>, Status> {
    raw.into_iter()
        .map(|(k, v)| kind_from_wire(&v).map(|kind| (k, kind)))
        .collect()
}

fn properties_to_wire(props: BTreeMap<String, PropertyKind>) -> BTreeMap<String, String> {
    props.into_iter().map(|(k, v)| (k, kind_to_wire(v))).collect()
}

fn properties_from_proto(raw: BTreeMap<String, ProtoValue>) -> Result<BTreeMap<String, PropertyValue>, Status> {
    raw.into_iter()
        .map(|(k, v)| value_from_proto(v).map(|value| (k, value)))
        .collect()
}

fn properties_to_proto(props: BTreeMap<String, PropertyValue>) -> BTreeMap<String, ProtoValue> {
    props.iter().map(|(k, v)| (k.clone(), value_to_proto(v))).collect()
}

fn type_to_proto(type_def: metadata_core::TypeDef) -> TypeResponse {
    TypeResponse {
        id: type_def.id.unwrap_or_default(),
        name: type_def.name,
        properties: properties_to_wire(type_def.properties),
    }
}

fn instance_to_proto(instance: metadata_core::Instance) -> InstanceResponse {
    let (properties, reserved) = metadata_core::marshal_egress(instance.properties);
    InstanceResponse {
        id: instance.id.unwrap_or_default(),
        type_id: instance.type_id,
        uri: instance.uri.unwrap_or_default(),
        properties: properties_to_proto(properties),
        custom_properties: properties_to_proto(instance.custom_properties),
        create_time: reserved.create_time,
        update_time: reserved.update_time,
    }
}

fn direction_from_wire(raw: &str) -> Result<EventDirection, Status> {
    match raw {
        "INPUT" => Ok(EventDirection::Input),
        "OUTPUT" => Ok(EventDirection::Output),
        other => Err(Status::invalid_argument(format!("unknown event direction '{other}'"))),
    }
}

pub struct MetadataRpc {
    state: ApiState,
}

impl MetadataRpc {
    pub fn new(state: ApiState) -> Self {
        Self { state }
    }

    fn api(&self) -> MetadataApi {
        MetadataApi::new(self.state.clone())
    }

    async fn do_create_type(&self, category: Category, request: CreateTypeRequest) -> Result<Response<TypeResponse>, Status> {
        let properties = properties_from_wire(request.properties)?;
        let created = self
            .api()
            .create_type(category, NewType { name: request.name, properties })
            .await
            .map_err(Into::into)?;
        Ok(Response::new(type_to_proto(created)))
    }

    async fn do_get_type(&self, category: Category, request: GetTypeRequest) -> Result<Response<TypeResponse>, Status> {
        let type_def = self
            .api()
            .get_type(category, &request.name)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(type_to_proto(type_def)))
    }

    async fn do_list_types(&self, category: Category) -> Result<Response<ListTypesResponse>, Status> {
        let types = self.api().list_types(category).await.map_err(Into::into)?;
        Ok(Response::new(ListTypesResponse {
            types: types.into_iter().map(type_to_proto).collect(),
        }))
    }

    async fn do_create_instance(
        &self,
        category: Category,
        request: CreateInstanceRequest,
    ) -> Result<Response<InstanceResponse>, Status> {
        let properties = properties_from_proto(request.properties)?;
        let custom_properties = properties_from_proto(request.custom_properties)?;
        let uri = (!request.uri.is_empty()).then_some(request.uri);
        let created = self
            .api()
            .create_instance(
                category,
                &request.parent,
                NewInstance { id: None, uri, properties, custom_properties },
            )
            .await
            .map_err(Into::into)?;
        Ok(Response::new(instance_to_proto(created)))
    }

    async fn do_get_instance(&self, category: Category, id: i64) -> Result<Response<InstanceResponse>, Status> {
        let name = match category {
            Category::Artifact => format!("artifact_types/artifacts/{id}"),
            Category::Execution => format!("execution_types/executions/{id}"),
        };
        let instance = self.api().get_instance(category, &name).await.map_err(Into::into)?;
        Ok(Response::new(instance_to_proto(instance)))
    }

    async fn do_list_instances(
        &self,
        category: Category,
        type_name: String,
    ) -> Result<Response<ListInstancesResponse>, Status> {
        let filter = (!type_name.is_empty()).then_some(type_name);
        let instances = self
            .api()
            .list_instances(category, filter.as_deref())
            .await
            .map_err(Into::into)?;
        Ok(Response::new(ListInstancesResponse {
            instances: instances.into_iter().map(instance_to_proto).collect(),
        }))
    }
}

#[tonic::async_trait]
impl MetadataService for MetadataRpc {
    async fn create_artifact_type(&self, request: Request<CreateTypeRequest>) -> Result<Response<TypeResponse>, Status> {
        self.do_create_type(Category::Artifact, request.into_inner()).await
    }

    async fn create_execution_type(&self, request: Request<CreateTypeRequest>) -> Result<Response<TypeResponse>, Status> {
        self.do_create_type(Category::Execution, request.into_inner()).await
    }

    async fn get_artifact_type(&self, request: Request<GetTypeRequest>) -> Result<Response<TypeResponse>, Status> {
        self.do_get_type(Category::Artifact, request.into_inner()).await
    }

    async fn get_execution_type(&self, request: Request<GetTypeRequest>) -> Result<Response<TypeResponse>, Status> {
        self.do_get_type(Category::Execution, request.into_inner()).await
    }

    async fn list_artifact_types(&self, _request: Request<ListTypesRequest>) -> Result<Response<ListTypesResponse>, Status> {
        self.do_list_types(Category::Artifact).await
    }

    async fn list_execution_types(&self, _request: Request<ListTypesRequest>) -> Result<Response<ListTypesResponse>, Status> {
        self.do_list_types(Category::Execution).await
    }

    async fn create_artifact(&self, request: Request<CreateInstanceRequest>) -> Result<Response<InstanceResponse>, Status> {
        self.do_create_instance(Category::Artifact, request.into_inner()).await
    }

    async fn create_execution(&self, request: Request<CreateInstanceRequest>) -> Result<Response<InstanceResponse>, Status> {
        self.do_create_instance(Category::Execution, request.into_inner()).await
    }

    async fn get_artifact(&self, request: Request<GetInstanceRequest>) -> Result<Response<InstanceResponse>, Status> {
        self.do_get_instance(Category::Artifact, request.into_inner().id).await
    }

    async fn get_execution(&self, request: Request<GetInstanceRequest>) -> Result<Response<InstanceResponse>, Status> {
        self.do_get_instance(Category::Execution, request.into_inner().id).await
    }

    async fn list_artifacts(&self, request: Request<ListInstancesRequest>) -> Result<Response<ListInstancesResponse>, Status> {
        self.do_list_instances(Category::Artifact, request.into_inner().type_name).await
    }

    async fn list_executions(&self, request: Request<ListInstancesRequest>) -> Result<Response<ListInstancesResponse>, Status> {
        self.do_list_instances(Category::Execution, request.into_inner().type_name).await
    }

    async fn create_event(&self, request: Request<CreateEventRequest>) -> Result<Response<CreateEventResponse>, Status> {
        let request = request.into_inner();
        let direction = direction_from_wire(&request.direction)?;
        self.api()
            .create_event(request.execution_id, request.artifact_id, direction)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(CreateEventResponse {}))
    }

    async fn search_events(&self, request: Request<SearchEventsRequest>) -> Result<Response<SearchEventsResponse>, Status> {
        let events = self
            .api()
            .search_events(&request.into_inner().name)
            .await
            .map_err(Into::into)?;
        Ok(Response::new(SearchEventsResponse {
            events: events
                .into_iter()
                .map(|event| EventResponse {
                    execution_id: event.execution_id,
                    artifact_id: event.artifact_id,
                    direction: event.direction.to_string(),
                })
                .collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_round_trips() {
        for kind in [PropertyKind::Integer, PropertyKind::Float, PropertyKind::String] {
            assert_eq!(kind_from_wire(&kind_to_wire(kind)).unwrap(), kind);
        }
    }

    #[test]
    fn value_proto_round_trips() {
        let value = PropertyValue::Float(1.5);
        let proto = value_to_proto(&value);
        assert_eq!(value_from_proto(proto).unwrap(), value);
    }

    #[test]
    fn kind_from_wire_rejects_unknown() {
        assert!(kind_from_wire("bogus").is_err());
    }
}
