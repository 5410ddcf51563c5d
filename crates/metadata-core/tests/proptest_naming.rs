use metadata_core::{marshal_egress, marshal_ingress, CanonicalName, Namespace, PropertyValue, ReservedInput, TypeName};
use proptest::prelude::*;

/// Strategy for generating valid type names: a leading letter, then any
/// run of characters containing neither a space nor a `/` (spec §4.2).
fn valid_type_name() -> impl Strategy<Value = String> {
    ("[A-Za-z]", "[^ /]{0,15}").prop_map(|(first, rest)| format!("{first}{rest}"))
}

/// Strategy for generating valid namespaces: a leading letter, at least one
/// more character (namespaces must be 2+ characters), no spaces, and not
/// ending in `/` (spec §4.2).
fn valid_namespace() -> impl Strategy<Value = String> {
    ("[A-Za-z]", "[^ /]{1,15}").prop_map(|(first, rest)| format!("{first}{rest}"))
}

proptest! {
    /// Any string matching the type-name grammar always validates.
    #[test]
    fn valid_type_name_grammar_always_accepts(s in valid_type_name()) {
        prop_assert!(TypeName::new(s).is_ok());
    }

    /// Any string matching the namespace grammar always validates.
    #[test]
    fn valid_namespace_grammar_always_accepts(s in valid_namespace()) {
        prop_assert!(Namespace::new(s).is_ok());
    }

    /// A name with an embedded space is always rejected, regardless of
    /// where the space falls.
    #[test]
    fn type_name_with_embedded_space_always_rejects(
        prefix in "[A-Za-z][^ /]{0,10}",
        suffix in "[^ /]{0,10}",
    ) {
        let name = format!("{prefix} {suffix}");
        prop_assert!(TypeName::new(name).is_err());
    }

    /// A canonical name built from independently-valid namespace and type
    /// name parts round-trips through `Display`/`parse` unchanged.
    #[test]
    fn canonical_name_round_trips_through_display(
        namespace in valid_namespace(),
        name in valid_type_name(),
    ) {
        let raw = format!("{namespace}/{name}");
        let canonical = CanonicalName::parse(&raw).unwrap();
        prop_assert_eq!(canonical.to_string(), raw);
    }

    /// Marshalling ingress then egress always recovers the same workspace
    /// and timestamps that were supplied, regardless of which caller
    /// properties were also present (spec §4.3 round trip).
    #[test]
    fn marshal_round_trip_recovers_reserved_fields(
        workspace in "[a-z][a-z0-9-]{0,10}",
        now in 0i64..2_000_000_000,
        field_name in "[a-z][a-z0-9_]{0,10}",
    ) {
        let mut props = std::collections::BTreeMap::new();
        props.insert(field_name.clone(), PropertyValue::String("value".to_string()));
        let reserved_input = ReservedInput { workspace: Some(workspace.clone()), ..Default::default() };
        let ingressed = marshal_ingress(props, reserved_input, now).unwrap();
        let (surfaced, reserved_output) = marshal_egress(ingressed);
        prop_assert_eq!(reserved_output.workspace, workspace);
        prop_assert_eq!(reserved_output.create_time, now);
        prop_assert_eq!(reserved_output.update_time, now);
        prop_assert!(surfaced.contains_key(&field_name));
    }
}
