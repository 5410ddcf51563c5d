//! Errors returned by a [`crate::worker::KindHandler`] (spec §4.6/§7: the
//! watcher only distinguishes caller-error, which it drops, from anything
//! else, which it re-enqueues with backoff).

use std::fmt;

use metadata_service::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherError {
    /// A tombstone could not be unwrapped, an annotation failed to decode,
    /// or the underlying API call was itself a caller-error. Not retried.
    CallerError { message: String },
    /// Anything else: store unavailable, internal error, deadline exceeded.
    /// Retried with rate-limited backoff.
    Retryable { message: String },
}

impl fmt::Display for WatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CallerError { message } => write!(f, "caller error: {message}"),
            Self::Retryable { message } => write!(f, "retryable error: {message}"),
        }
    }
}

impl std::error::Error for WatcherError {}

impl WatcherError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

impl From<ServiceError> for WatcherError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidArgument { message } => Self::CallerError { message },
            other => Self::Retryable { message: other.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_is_not_retryable() {
        let err: WatcherError = ServiceError::InvalidArgument { message: "x".into() }.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn not_found_is_retryable() {
        let err: WatcherError = ServiceError::NotFound { message: "x".into() }.into();
        assert!(err.is_retryable());
    }
}
