use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metadata_backend::BackendError;
use metadata_core::MetaError;
use metadata_schema::SchemaError;

/// Errors returned by the metadata API service's RPC and HTTP surfaces
/// (spec §7 "Error Handling Design").
///
/// Each variant maps to both an HTTP status code and a `tonic::Status`
/// code. All variants carry enough context for an actionable message.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceError {
    /// Malformed name, reserved prefix used, `id` supplied on create,
    /// missing required field, unknown property kind, unresolvable `$ref`.
    InvalidArgument { message: String },
    /// Requested type or instance does not exist.
    NotFound { message: String },
    /// Type with the same name already exists with a different shape.
    Conflict { message: String },
    /// Timestamp arithmetic overflow, property translation unreachable
    /// branch, or any other unexpected internal condition.
    Internal { message: String },
    /// Store or change feed temporarily unreachable.
    Unavailable { message: String },
    /// Delete operations; reserved.
    Unimplemented { operation: String },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { message } => write!(f, "invalid argument: {message}"),
            Self::NotFound { message } => write!(f, "not found: {message}"),
            Self::Conflict { message } => write!(f, "conflict: {message}"),
            Self::Internal { message } => write!(f, "internal error: {message}"),
            Self::Unavailable { message } => write!(f, "unavailable: {message}"),
            Self::Unimplemented { operation } => write!(f, "unimplemented: {operation}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unimplemented { .. } => StatusCode::NOT_IMPLEMENTED,
        }
    }

    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal",
            Self::Unavailable { .. } => "unavailable",
            Self::Unimplemented { .. } => "unimplemented",
        }
    }

    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            Self::InvalidArgument { .. } => tonic::Code::InvalidArgument,
            Self::NotFound { .. } => tonic::Code::NotFound,
            Self::Conflict { .. } => tonic::Code::AlreadyExists,
            Self::Internal { .. } => tonic::Code::Internal,
            Self::Unavailable { .. } => tonic::Code::Unavailable,
            Self::Unimplemented { .. } => tonic::Code::Unimplemented,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.error_kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

impl From<ServiceError> for tonic::Status {
    fn from(err: ServiceError) -> Self {
        tonic::Status::new(err.grpc_code(), err.to_string())
    }
}

impl From<MetaError> for ServiceError {
    fn from(err: MetaError) -> Self {
        Self::InvalidArgument {
            message: err.to_string(),
        }
    }
}

impl From<SchemaError> for ServiceError {
    fn from(err: SchemaError) -> Self {
        Self::Internal {
            message: err.to_string(),
        }
    }
}

impl From<BackendError> for ServiceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::TypeNotFound { name } => Self::NotFound {
                message: format!("type '{name}' not found"),
            },
            BackendError::InstanceNotFound { category, id } => Self::NotFound {
                message: format!("{category} '{id}' not found"),
            },
            BackendError::TypeConflict { name } => Self::Conflict {
                message: format!("type '{name}' already exists with a different shape"),
            },
            BackendError::ValidationFailed { field, reason } => Self::InvalidArgument {
                message: format!("field '{field}': {reason}"),
            },
            BackendError::RequiredFieldMissing { field } => Self::InvalidArgument {
                message: format!("required field '{field}' is missing"),
            },
            BackendError::NoRecords => Self::NotFound {
                message: "no records".to_string(),
            },
            BackendError::ConnectionError { message } | BackendError::QueryError { message } => {
                Self::Unavailable { message }
            }
            BackendError::Unimplemented { operation } => Self::Unimplemented { operation },
            BackendError::Internal { message } => Self::Internal { message },
        }
    }
}
