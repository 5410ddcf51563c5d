//! Shared domain model (spec §3): Type, instance category, and Event.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::{PropertyKind, PropertyValue};

/// Whether a [`TypeDef`] describes Artifacts or Executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Artifact,
    Execution,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact => write!(f, "artifact"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

/// A named schema for a family of instances (spec §3 "Type").
///
/// `id` is `None` until the backing store assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub id: Option<i64>,
    pub name: String,
    pub properties: BTreeMap<String, PropertyKind>,
    pub category: Category,
}

impl TypeDef {
    pub fn new(name: String, properties: BTreeMap<String, PropertyKind>, category: Category) -> Self {
        Self {
            id: None,
            name,
            properties,
            category,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// The direction of an [`Event`] linking an Execution to an Artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventDirection {
    Input,
    Output,
}

impl fmt::Display for EventDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "INPUT"),
            Self::Output => write!(f, "OUTPUT"),
        }
    }
}

/// A directed link between one Execution and one Artifact (spec §3 "Event").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub execution_id: i64,
    pub artifact_id: i64,
    pub direction: EventDirection,
}

/// An Artifact or Execution record (spec §3 "Instance").
///
/// `id` is `None` until the backing store assigns one. `properties` holds
/// values for keys declared on the owning type; `custom_properties` holds
/// anything else the caller supplied, reserved keys excluded from both by
/// the marshaller before this struct is ever populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: Option<i64>,
    pub type_id: i64,
    pub category: Category,
    /// Only meaningful for Artifacts; `None` for Executions.
    pub uri: Option<String>,
    pub properties: BTreeMap<String, PropertyValue>,
    pub custom_properties: BTreeMap<String, PropertyValue>,
}

impl Instance {
    pub fn new(type_id: i64, category: Category) -> Self {
        Self {
            id: None,
            type_id,
            category,
            uri: None,
            properties: BTreeMap::new(),
            custom_properties: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_def_starts_without_id() {
        let t = TypeDef::new("kubeflow.org/Model".into(), BTreeMap::new(), Category::Artifact);
        assert_eq!(t.id, None);
        let t = t.with_id(7);
        assert_eq!(t.id, Some(7));
    }

    #[test]
    fn category_display() {
        assert_eq!(Category::Artifact.to_string(), "artifact");
        assert_eq!(Category::Execution.to_string(), "execution");
    }

    #[test]
    fn instance_starts_without_id() {
        let instance = Instance::new(1, Category::Artifact).with_uri("s3://bucket/key");
        assert_eq!(instance.id, None);
        assert_eq!(instance.uri.as_deref(), Some("s3://bucket/key"));
        let instance = instance.with_id(42);
        assert_eq!(instance.id, Some(42));
    }
}
