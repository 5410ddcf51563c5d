//! Handlers for the `artifacts` / `executions` trees (spec §4.5), shared
//! across categories the same way [`super::types`] is.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metadata_core::Category;

use crate::api::{MetadataApi, NewInstance};
use crate::error::ServiceError;
use crate::state::ApiState;

use super::dto::{instance_to_response, CreateInstanceRequest, InstanceResponseBody, ListInstancesResponse};

pub async fn create_instance(
    state: ApiState,
    category: Category,
    parent: &str,
    body: CreateInstanceRequest,
) -> Result<impl IntoResponse, ServiceError> {
    let api = MetadataApi::new(state);
    let created = api
        .create_instance(
            category,
            parent,
            NewInstance {
                id: body.id,
                uri: body.uri,
                properties: body.properties,
                custom_properties: body.custom_properties,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(instance_to_response(created))))
}

pub async fn get_instance(
    state: ApiState,
    category: Category,
    name: &str,
) -> Result<Json<InstanceResponseBody>, ServiceError> {
    let api = MetadataApi::new(state);
    let instance = api.get_instance(category, name).await?;
    Ok(Json(instance_to_response(instance)))
}

pub async fn list_instances(
    state: ApiState,
    category: Category,
    type_filter: Option<&str>,
) -> Result<Json<ListInstancesResponse>, ServiceError> {
    let api = MetadataApi::new(state);
    let instances = api.list_instances(category, type_filter).await?;
    Ok(Json(ListInstancesResponse {
        instances: instances.into_iter().map(instance_to_response).collect(),
    }))
}

pub fn delete_instance(category: Category) -> ServiceError {
    let operation = match category {
        Category::Artifact => "DeleteArtifact",
        Category::Execution => "DeleteExecution",
    };
    MetadataApi::delete_unimplemented(operation)
}
