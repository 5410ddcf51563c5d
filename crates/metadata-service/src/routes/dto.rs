//! Request/response bodies shared by the HTTP handlers, and the pure
//! conversion helpers between them and the domain model (spec §3, §4.3
//! egress).
//!
//! Grounded on `schema-forge-acton::routes::schemas`'s
//! request-DTO / response-DTO / pure-conversion-function split.

use std::collections::BTreeMap;

use metadata_core::{marshal_egress, Instance, PropertyKind, PropertyValue, TypeDef};
use serde::{Deserialize, Serialize};

/// Request body for `CreateArtifactType` / `CreateExecutionType`.
#[derive(Debug, Deserialize)]
pub struct CreateTypeRequest {
    pub name: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyKind>,
}

/// Response body for a Type, reserved descriptors included (they are part
/// of the type's declared shape, unlike reserved values on an instance).
#[derive(Debug, Serialize)]
pub struct TypeResponseBody {
    pub id: i64,
    pub name: String,
    pub properties: BTreeMap<String, PropertyKind>,
}

pub fn type_to_response(type_def: TypeDef) -> TypeResponseBody {
    TypeResponseBody {
        id: type_def.id.unwrap_or_default(),
        name: type_def.name,
        properties: type_def.properties,
    }
}

#[derive(Debug, Serialize)]
pub struct ListTypesResponse {
    pub types: Vec<TypeResponseBody>,
}

/// Request body for `CreateArtifact` / `CreateExecution`.
///
/// `id` is accepted (rather than silently ignored via `deny_unknown_fields`)
/// only so [`MetadataApi::create_instance`] can reject it explicitly: a
/// Create with a caller-supplied `id` always fails (spec §3/§4.4/§8).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct CreateInstanceRequest {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default)]
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

/// Response body for an Instance: reserved properties are stripped from
/// `properties` and promoted to named fields by [`marshal_egress`] (spec
/// §4.3 egress).
#[derive(Debug, Serialize)]
pub struct InstanceResponseBody {
    pub id: i64,
    pub type_id: i64,
    pub uri: Option<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub custom_properties: BTreeMap<String, PropertyValue>,
    pub workspace: String,
    pub create_time: i64,
    pub update_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,
}

pub fn instance_to_response(instance: Instance) -> InstanceResponseBody {
    let (properties, reserved) = marshal_egress(instance.properties);
    InstanceResponseBody {
        id: instance.id.unwrap_or_default(),
        type_id: instance.type_id,
        uri: instance.uri,
        properties,
        custom_properties: instance.custom_properties,
        workspace: reserved.workspace,
        create_time: reserved.create_time,
        update_time: reserved.update_time,
        start_time: reserved.start_time,
        end_time: reserved.end_time,
    }
}

#[derive(Debug, Serialize)]
pub struct ListInstancesResponse {
    pub instances: Vec<InstanceResponseBody>,
}

/// Request body for `CreateEvent`.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub execution_id: i64,
    pub artifact_id: i64,
    pub direction: String,
}

#[derive(Debug, Serialize)]
pub struct EventResponseBody {
    pub execution_id: i64,
    pub artifact_id: i64,
    pub direction: String,
}

#[derive(Debug, Serialize)]
pub struct SearchEventsResponse {
    pub events: Vec<EventResponseBody>,
}
