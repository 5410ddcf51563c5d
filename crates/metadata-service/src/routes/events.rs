//! Handlers for `CreateEvent` / `SearchEvents` (spec §4.4, §4.5).

use axum::response::IntoResponse;
use axum::Json;
use metadata_core::EventDirection;

use crate::api::MetadataApi;
use crate::error::ServiceError;
use crate::state::ApiState;

use super::dto::{CreateEventRequest, EventResponseBody, SearchEventsResponse};

fn parse_direction(raw: &str) -> Result<EventDirection, ServiceError> {
    match raw {
        "INPUT" => Ok(EventDirection::Input),
        "OUTPUT" => Ok(EventDirection::Output),
        other => Err(ServiceError::InvalidArgument {
            message: format!("direction must be INPUT or OUTPUT, got '{other}'"),
        }),
    }
}

pub async fn create_event(state: ApiState, body: CreateEventRequest) -> Result<impl IntoResponse, ServiceError> {
    let api = MetadataApi::new(state);
    let direction = parse_direction(&body.direction)?;
    api.create_event(body.execution_id, body.artifact_id, direction).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

pub async fn search_events(state: ApiState, name: &str) -> Result<Json<SearchEventsResponse>, ServiceError> {
    let api = MetadataApi::new(state);
    let events = api.search_events(name).await?;
    Ok(Json(SearchEventsResponse {
        events: events
            .into_iter()
            .map(|event| EventResponseBody {
                execution_id: event.execution_id,
                artifact_id: event.artifact_id,
                direction: event.direction.to_string(),
            })
            .collect(),
    }))
}
