use std::fmt;

/// Errors raised by the core domain layer: name/namespace validation and
/// property-value translation. Both are always caller-errors (invalid
/// argument) — the core layer never talks to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetaError {
    /// A type name or namespace failed §4.2 validation.
    InvalidName { value: String, reason: &'static str },
    /// A property key used the reserved `__kf_` prefix.
    ReservedPropertyKey { key: String },
    /// A property value used an unsupported kind.
    UnsupportedPropertyKind { key: String },
}

impl fmt::Display for MetaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidName { value, reason } => {
                write!(f, "invalid name '{value}': {reason}")
            }
            Self::ReservedPropertyKey { key } => {
                write!(f, "property key '{key}' uses the reserved '__kf_' prefix")
            }
            Self::UnsupportedPropertyKind { key } => {
                write!(f, "property '{key}' has an unsupported value kind")
            }
        }
    }
}

impl std::error::Error for MetaError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_name() {
        let err = MetaError::InvalidName {
            value: "1Model".into(),
            reason: "must start with a letter",
        };
        assert!(err.to_string().contains("1Model"));
    }

    #[test]
    fn display_reserved_key() {
        let err = MetaError::ReservedPropertyKey {
            key: "__kf_name".into(),
        };
        assert!(err.to_string().contains("__kf_name"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MetaError>();
    }
}
