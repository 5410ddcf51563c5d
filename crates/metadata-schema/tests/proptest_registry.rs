use std::collections::BTreeMap;

use metadata_core::PropertyKind;
use metadata_schema::{is_builtin_property, PropertyDescriptor, SchemaDocument, SchemaRegistry, TypeTag};
use proptest::prelude::*;

fn field_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,12}".prop_filter("not a builtin property", |s| !is_builtin_property(s))
}

fn simple_type_tag() -> impl Strategy<Value = (TypeTag, PropertyKind)> {
    prop_oneof![
        Just((TypeTag::Name("string".to_string()), PropertyKind::String)),
        Just((TypeTag::Name("integer".to_string()), PropertyKind::Integer)),
        Just((TypeTag::Name("number".to_string()), PropertyKind::Float)),
    ]
}

fn document_with_one_property(name: String, type_tag: TypeTag) -> SchemaDocument {
    let mut properties = BTreeMap::new();
    properties.insert(
        name,
        PropertyDescriptor {
            type_tag: Some(type_tag),
            const_value: None,
            properties: BTreeMap::new(),
        },
    );
    SchemaDocument {
        id: "schema/alpha/generated.json".to_string(),
        properties,
        all_of: Vec::new(),
        examples: Vec::new(),
    }
}

proptest! {
    /// A non-builtin simple property always survives into `registrable_properties`
    /// with its declared kind (spec §4.1 "Built-in suppression" only suppresses
    /// the builtin keys, never a caller-declared simple property).
    #[test]
    fn non_builtin_simple_property_is_registrable(
        (name, (type_tag, kind)) in (field_name(), simple_type_tag())
    ) {
        let document = document_with_one_property(name.clone(), type_tag);
        let registry = SchemaRegistry::from_documents(vec![document]).unwrap();
        let properties = registry.registrable_properties("schema/alpha/generated.json").unwrap();
        prop_assert_eq!(properties.get(&name).copied(), Some(kind));
    }

    /// `registrable_properties` never surfaces a builtin key, no matter what
    /// simple-typed properties are declared alongside it.
    #[test]
    fn registrable_properties_never_contains_builtin_keys(
        (name, (type_tag, _kind)) in (field_name(), simple_type_tag())
    ) {
        let mut document = document_with_one_property(name, type_tag);
        document.properties.insert(
            "category".to_string(),
            PropertyDescriptor {
                type_tag: Some(TypeTag::Name("string".to_string())),
                const_value: Some(serde_json::json!("artifact")),
                properties: BTreeMap::new(),
            },
        );
        let registry = SchemaRegistry::from_documents(vec![document]).unwrap();
        let properties = registry.registrable_properties("schema/alpha/generated.json").unwrap();
        prop_assert!(!properties.contains_key("category"));
    }
}
