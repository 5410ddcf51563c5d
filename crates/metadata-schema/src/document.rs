//! Parsed representation of a schema document (spec §3 "Schema document",
//! §9 "Heterogeneous JSON-Schema shapes").

use std::collections::BTreeMap;

use metadata_core::PropertyKind;
use serde::Deserialize;

/// The restricted dialect's `type` keyword: usually a string (`"string"`,
/// `"integer"`, `"number"`), but the design note calls out that it may also
/// appear as a nested object in source documents. Model it as an enumerated
/// variant rather than a dynamically typed value; absence is object-kind.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeTag {
    Name(String),
    Nested(serde_json::Value),
}

impl TypeTag {
    fn as_name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Nested(_) => "object",
        }
    }
}

/// A single property's descriptor within a schema's `properties` map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type", default)]
    pub type_tag: Option<TypeTag>,
    #[serde(rename = "const", default)]
    pub const_value: Option<serde_json::Value>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
}

impl PropertyDescriptor {
    /// The effective JSON-Schema type name. Absence of a `type` tag means
    /// object-kind (spec §9).
    pub fn type_name(&self) -> &str {
        self.type_tag.as_ref().map(TypeTag::as_name).unwrap_or("object")
    }

    /// Whether this descriptor is one of the three simple kinds.
    pub fn is_simple_type(&self) -> bool {
        matches!(self.type_name(), "string" | "integer" | "number")
    }

    /// The simple property kind, if this descriptor is simple-typed.
    pub fn simple_kind(&self) -> Option<PropertyKind> {
        match self.type_name() {
            "string" => Some(PropertyKind::String),
            "integer" => Some(PropertyKind::Integer),
            "number" => Some(PropertyKind::Float),
            _ => None,
        }
    }

    /// The constant string value declared via `const`, if any.
    pub fn constant_string(&self) -> Option<&str> {
        self.const_value.as_ref().and_then(|v| v.as_str())
    }
}

/// One entry of an `allOf` composition list: either a `$ref` to another
/// schema, an inline set of properties, or both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompositionEntry {
    #[serde(rename = "$ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
}

/// A parsed schema document (spec §3).
#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDescriptor>,
    #[serde(rename = "allOf", default)]
    pub all_of: Vec<CompositionEntry>,
    #[serde(default)]
    pub examples: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_kind_for_string_type() {
        let descriptor = PropertyDescriptor {
            type_tag: Some(TypeTag::Name("string".into())),
            ..Default::default()
        };
        assert!(descriptor.is_simple_type());
        assert_eq!(descriptor.simple_kind(), Some(PropertyKind::String));
    }

    #[test]
    fn missing_type_tag_is_object_kind() {
        let descriptor = PropertyDescriptor::default();
        assert_eq!(descriptor.type_name(), "object");
        assert!(!descriptor.is_simple_type());
    }

    #[test]
    fn array_type_is_not_simple() {
        let descriptor = PropertyDescriptor {
            type_tag: Some(TypeTag::Name("array".into())),
            ..Default::default()
        };
        assert!(!descriptor.is_simple_type());
    }

    #[test]
    fn parses_schema_document_from_json() {
        let json = r#"{
            "$id": "schema/alpha/data_set.json",
            "properties": {
                "namespace": {"type": "string", "const": "kubeflow.org"},
                "kind": {"type": "string", "const": "data_set"},
                "apiversion": {"type": "string", "const": "alpha"},
                "category": {"type": "string", "const": "artifact"},
                "description": {"type": "string"}
            },
            "allOf": [],
            "examples": []
        }"#;
        let doc: SchemaDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.id, "schema/alpha/data_set.json");
        assert_eq!(doc.properties.len(), 5);
        assert_eq!(
            doc.properties["namespace"].constant_string(),
            Some("kubeflow.org")
        );
    }
}
