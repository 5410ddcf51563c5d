//! HTTP gateway router (component E, spec §4.5): JSON over HTTP, transcoded
//! onto the same operations the RPC gateway serves, sharing one
//! [`crate::api::MetadataApi`] — no duplicated business logic.
//!
//! `axum`'s path matching cannot express a wildcard in the middle of a
//! route (`{name=**}/artifacts`), unlike the gRPC-transcoding annotations
//! spec §4.5 is phrased in. Each type/instance subtree is therefore served
//! by one trailing-wildcard route per HTTP method, and the handler itself
//! splits the captured tail against the known suffixes (`/artifacts`,
//! `artifacts/...`) to pick the operation -- the dispatch table the
//! wildcard can't express moves from the router into `dispatch_get` /
//! `dispatch_post` below.

pub mod dto;
pub mod events;
pub mod instances;
pub mod types;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use metadata_core::Category;

use crate::error::ServiceError;
use crate::state::ApiState;
use dto::{CreateEventRequest, CreateInstanceRequest, CreateTypeRequest};

pub fn router() -> Router<ApiState> {
    Router::new()
        .route(
            "/api/v1alpha1/artifact_types",
            post(create_artifact_type).get(list_artifact_types),
        )
        .route(
            "/api/v1alpha1/artifact_types/{*rest}",
            get(get_artifact_type_tree)
                .post(post_artifact_type_tree)
                .delete(delete_artifact_type_tree),
        )
        .route(
            "/api/v1alpha1/execution_types",
            post(create_execution_type).get(list_execution_types),
        )
        .route(
            "/api/v1alpha1/execution_types/{*rest}",
            get(get_execution_type_tree)
                .post(post_execution_type_tree)
                .delete(delete_execution_type_tree),
        )
        .route("/api/v1alpha1/events", post(create_event))
        .route("/api/v1alpha1/artifacts/{id}/events", get(search_artifact_events))
        .route("/api/v1alpha1/executions/{id}/events", get(search_execution_events))
}

/// The two literal path segments distinguishing the artifact and execution
/// trees; the operations themselves are identical once parameterized by
/// [`Category`].
struct Tree {
    category: Category,
    instance_collection: &'static str,
}

const ARTIFACTS: Tree = Tree {
    category: Category::Artifact,
    instance_collection: "artifacts",
};
const EXECUTIONS: Tree = Tree {
    category: Category::Execution,
    instance_collection: "executions",
};

async fn dispatch_get(state: ApiState, tree: &Tree, rest: &str) -> Result<Response, ServiceError> {
    if let Some(inner) = rest.strip_prefix(&format!("{}/", tree.instance_collection)) {
        let name = format!("{}_types/{inner}", tree.category);
        return instances::get_instance(state, tree.category, &name)
            .await
            .map(IntoResponse::into_response);
    }
    if let Some(parent) = rest.strip_suffix(&format!("/{}", tree.instance_collection)) {
        return instances::list_instances(state, tree.category, Some(parent))
            .await
            .map(IntoResponse::into_response);
    }
    types::get_type(state, tree.category, rest)
        .await
        .map(IntoResponse::into_response)
}

async fn dispatch_post(
    state: ApiState,
    tree: &Tree,
    rest: &str,
    body: CreateInstanceRequest,
) -> Result<Response, ServiceError> {
    match rest.strip_suffix(&format!("/{}", tree.instance_collection)) {
        Some(parent) => instances::create_instance(state, tree.category, parent, body)
            .await
            .map(IntoResponse::into_response),
        None => Err(ServiceError::InvalidArgument {
            message: format!("no POST operation matches '{rest}'"),
        }),
    }
}

async fn get_artifact_type_tree(State(state): State<ApiState>, Path(rest): Path<String>) -> Result<Response, ServiceError> {
    dispatch_get(state, &ARTIFACTS, &rest).await
}

async fn post_artifact_type_tree(
    State(state): State<ApiState>,
    Path(rest): Path<String>,
    Json(body): Json<CreateInstanceRequest>,
) -> Result<Response, ServiceError> {
    dispatch_post(state, &ARTIFACTS, &rest, body).await
}

async fn delete_artifact_type_tree() -> ServiceError {
    types::delete_type(Category::Artifact)
}

async fn get_execution_type_tree(State(state): State<ApiState>, Path(rest): Path<String>) -> Result<Response, ServiceError> {
    dispatch_get(state, &EXECUTIONS, &rest).await
}

async fn post_execution_type_tree(
    State(state): State<ApiState>,
    Path(rest): Path<String>,
    Json(body): Json<CreateInstanceRequest>,
) -> Result<Response, ServiceError> {
    dispatch_post(state, &EXECUTIONS, &rest, body).await
}

async fn delete_execution_type_tree() -> ServiceError {
    types::delete_type(Category::Execution)
}

async fn create_artifact_type(
    State(state): State<ApiState>,
    Json(body): Json<CreateTypeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    types::create_type(state, Category::Artifact, body).await
}

async fn list_artifact_types(State(state): State<ApiState>) -> Result<impl IntoResponse, ServiceError> {
    types::list_types(state, Category::Artifact).await
}

async fn create_execution_type(
    State(state): State<ApiState>,
    Json(body): Json<CreateTypeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    types::create_type(state, Category::Execution, body).await
}

async fn list_execution_types(State(state): State<ApiState>) -> Result<impl IntoResponse, ServiceError> {
    types::list_types(state, Category::Execution).await
}

async fn create_event(
    State(state): State<ApiState>,
    Json(body): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    events::create_event(state, body).await
}

async fn search_artifact_events(State(state): State<ApiState>, Path(id): Path<String>) -> Result<impl IntoResponse, ServiceError> {
    events::search_events(state, &format!("artifacts/{id}")).await
}

async fn search_execution_events(State(state): State<ApiState>, Path(id): Path<String>) -> Result<impl IntoResponse, ServiceError> {
    events::search_events(state, &format!("executions/{id}")).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_get_routing_split_points() {
        assert_eq!(
            "kubeflow.org/Model/artifacts".strip_suffix("/artifacts"),
            Some("kubeflow.org/Model")
        );
        assert_eq!(
            "artifacts/kubeflow.org/Model/artifacts/42".strip_prefix("artifacts/"),
            Some("kubeflow.org/Model/artifacts/42")
        );
    }
}
