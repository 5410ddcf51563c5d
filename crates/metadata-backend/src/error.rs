use std::fmt;

/// Errors raised by a [`crate::store::MetadataStore`] implementation (spec §7).
///
/// Variants carry enough context for an actionable message. `String` is used
/// for external error detail to keep the enum `Clone + Eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BackendError {
    /// A type with this name has not been registered.
    TypeNotFound { name: String },
    /// An artifact or execution with this id does not exist.
    InstanceNotFound { category: String, id: i64 },
    /// A type with this name exists with a different shape than requested.
    TypeConflict { name: String },
    /// Pre-write validation failed for a specific field.
    ValidationFailed { field: String, reason: String },
    /// A required field was not provided.
    RequiredFieldMissing { field: String },
    /// The store's sentinel "no records" condition, caught by callers that
    /// expect List operations to return an empty list rather than an error.
    NoRecords,
    /// Connection or transport-level error.
    ConnectionError { message: String },
    /// Query execution error.
    QueryError { message: String },
    /// The requested operation is not implemented by this store.
    Unimplemented { operation: String },
    /// Internal or unexpected error.
    Internal { message: String },
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeNotFound { name } => write!(f, "type '{name}' not found"),
            Self::InstanceNotFound { category, id } => {
                write!(f, "{category} '{id}' not found")
            }
            Self::TypeConflict { name } => {
                write!(f, "type '{name}' already exists with a different shape")
            }
            Self::ValidationFailed { field, reason } => {
                write!(f, "validation failed for field '{field}': {reason}")
            }
            Self::RequiredFieldMissing { field } => {
                write!(f, "required field '{field}' is missing")
            }
            Self::NoRecords => write!(f, "Cannot find any record"),
            Self::ConnectionError { message } => write!(f, "backend connection error: {message}"),
            Self::QueryError { message } => write!(f, "query execution error: {message}"),
            Self::Unimplemented { operation } => write!(f, "operation '{operation}' is not implemented"),
            Self::Internal { message } => write!(f, "internal backend error: {message}"),
        }
    }
}

impl std::error::Error for BackendError {}

impl BackendError {
    /// Whether this error is the store's sentinel "no records" condition
    /// (spec §6: the string "Cannot find any record"), which List operations
    /// must catch and translate to success-with-empty-list.
    pub fn is_no_records(&self) -> bool {
        matches!(self, Self::NoRecords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_not_found_display() {
        let err = BackendError::TypeNotFound {
            name: "kubeflow.org/Model".into(),
        };
        assert!(err.to_string().contains("kubeflow.org/Model"));
    }

    #[test]
    fn no_records_is_recognized() {
        assert!(BackendError::NoRecords.is_no_records());
        assert!(!BackendError::TypeNotFound { name: "x".into() }.is_no_records());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BackendError>();
    }
}
