//! Core domain types for the metadata service: the property-value sum type,
//! the Type/Event model, the name/namespace validator, the reserved `__kf_`
//! property namespace, the property marshaller, and the injected clock.

pub mod clock;
pub mod error;
pub mod marshaller;
pub mod model;
pub mod naming;
pub mod reserved;
pub mod value;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::MetaError;
pub use marshaller::{marshal_egress, marshal_ingress, reject_reserved_keys, ReservedInput, ReservedOutput};
pub use model::{Category, Event, EventDirection, Instance, TypeDef};
pub use naming::{CanonicalName, Namespace, TypeName, DEFAULT_NAMESPACE};
pub use value::{PropertyKind, PropertyValue};
