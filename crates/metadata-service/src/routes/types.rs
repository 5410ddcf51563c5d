//! Handlers for the `artifact_types` / `execution_types` trees (spec §4.5).
//! Both categories share one set of functions parameterized by [`Category`];
//! the catch-all router in [`super`] extracts the request and supplies it.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metadata_core::Category;

use crate::api::{MetadataApi, NewType};
use crate::error::ServiceError;
use crate::state::ApiState;

use super::dto::{type_to_response, CreateTypeRequest, ListTypesResponse, TypeResponseBody};

pub async fn create_type(
    state: ApiState,
    category: Category,
    body: CreateTypeRequest,
) -> Result<impl IntoResponse, ServiceError> {
    let api = MetadataApi::new(state);
    let created = api
        .create_type(
            category,
            NewType {
                name: body.name,
                properties: body.properties,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(type_to_response(created))))
}

pub async fn get_type(
    state: ApiState,
    category: Category,
    name: &str,
) -> Result<Json<TypeResponseBody>, ServiceError> {
    let api = MetadataApi::new(state);
    let type_def = api.get_type(category, name).await?;
    Ok(Json(type_to_response(type_def)))
}

pub async fn list_types(
    state: ApiState,
    category: Category,
) -> Result<Json<ListTypesResponse>, ServiceError> {
    let api = MetadataApi::new(state);
    let types = api.list_types(category).await?;
    Ok(Json(ListTypesResponse {
        types: types.into_iter().map(type_to_response).collect(),
    }))
}

pub fn delete_type(category: Category) -> ServiceError {
    let operation = match category {
        Category::Artifact => "DeleteArtifactType",
        Category::Execution => "DeleteExecutionType",
    };
    MetadataApi::delete_unimplemented(operation)
}
