//! Schema document loading and type resolution (component A, spec §4.1).

pub mod document;
pub mod error;
pub mod registry;

pub use document::{CompositionEntry, PropertyDescriptor, SchemaDocument, TypeTag};
pub use error::SchemaError;
pub use registry::{is_builtin_property, SchemaRegistry, BUILTIN_PROPERTY_KEYS};
