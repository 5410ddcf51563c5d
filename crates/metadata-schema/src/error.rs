use std::fmt;

/// Errors raised while loading and resolving the schema-document registry
/// (component A, spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    Io {
        path: String,
        message: String,
    },
    Parse {
        path: String,
        message: String,
    },
    DuplicateId {
        id: String,
    },
    IdPathMismatch {
        id: String,
        path: String,
    },
    MissingConstantProperty {
        id: String,
        property: String,
    },
    NonConstantProperty {
        id: String,
        property: String,
    },
    UnresolvedRef {
        id: String,
        reference: String,
    },
    CompositionCycle {
        id: String,
    },
    UnknownPropertyKind {
        id: String,
        property: String,
        kind: String,
    },
    ExampleValidationFailed {
        id: String,
        reason: String,
    },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "failed to read schema file {path}: {message}"),
            Self::Parse { path, message } => {
                write!(f, "failed to parse schema document {path}: {message}")
            }
            Self::DuplicateId { id } => write!(f, "duplicate schema $id: {id}"),
            Self::IdPathMismatch { id, path } => {
                write!(f, "schema $id '{id}' does not end with its file path '{path}'")
            }
            Self::MissingConstantProperty { id, property } => {
                write!(f, "schema {id} is missing constant-valued property '{property}'")
            }
            Self::NonConstantProperty { id, property } => {
                write!(f, "property '{property}' in schema {id} is not constant-valued")
            }
            Self::UnresolvedRef { id, reference } => {
                write!(f, "schema {id} references unresolvable $ref '{reference}'")
            }
            Self::CompositionCycle { id } => {
                write!(f, "cycle detected resolving composition of schema {id}")
            }
            Self::UnknownPropertyKind { id, property, kind } => {
                write!(
                    f,
                    "schema {id} declares property '{property}' with unknown kind '{kind}'"
                )
            }
            Self::ExampleValidationFailed { id, reason } => {
                write!(f, "an example in schema {id} failed validation: {reason}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
