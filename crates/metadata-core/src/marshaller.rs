//! Property marshaller (component C, spec §4.3).
//!
//! Translates between the caller-supplied property map and the
//! backing-store property map, rejecting and injecting the reserved
//! `__kf_` namespace along the way.

use std::collections::BTreeMap;

use tracing::warn;

use crate::error::MetaError;
use crate::reserved::{self, is_reserved};
use crate::value::PropertyValue;

/// Rejects a caller-supplied property map that uses the reserved namespace.
pub fn reject_reserved_keys(props: &BTreeMap<String, PropertyValue>) -> Result<(), MetaError> {
    if let Some(key) = props.keys().find(|k| is_reserved(k)) {
        warn!(key = %key, "rejected caller-supplied property using the reserved '__kf_' prefix");
        return Err(MetaError::ReservedPropertyKey { key: key.clone() });
    }
    Ok(())
}

/// Caller-supplied reserved fields gathered at instance-creation time.
#[derive(Debug, Clone, Default)]
pub struct ReservedInput {
    pub name: Option<String>,
    pub workspace: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Ingress (spec §4.3): validates the caller's properties and injects the
/// server-populated reserved properties, producing the map actually
/// persisted by the backing store.
pub fn marshal_ingress(
    mut props: BTreeMap<String, PropertyValue>,
    reserved_input: ReservedInput,
    now: i64,
) -> Result<BTreeMap<String, PropertyValue>, MetaError> {
    reject_reserved_keys(&props)?;

    if let Some(name) = reserved_input.name {
        props.insert(reserved::NAME.to_string(), PropertyValue::String(name));
    }
    let workspace = reserved_input
        .workspace
        .unwrap_or_else(|| reserved::DEFAULT_WORKSPACE.to_string());
    props.insert(reserved::WORKSPACE.to_string(), PropertyValue::String(workspace));
    props.insert(reserved::CREATE_TIME.to_string(), PropertyValue::Integer(now));
    props.insert(reserved::UPDATE_TIME.to_string(), PropertyValue::Integer(now));
    if let Some(start_time) = reserved_input.start_time {
        props.insert(reserved::START_TIME.to_string(), PropertyValue::Integer(start_time));
    }
    if let Some(end_time) = reserved_input.end_time {
        props.insert(reserved::END_TIME.to_string(), PropertyValue::Integer(end_time));
    }
    Ok(props)
}

/// The reserved fields promoted to first-class response fields on egress.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedOutput {
    pub name: Option<String>,
    pub workspace: String,
    pub create_time: i64,
    pub update_time: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
}

/// Egress (spec §4.3): strips reserved `__kf_*` keys from the surfaced
/// `properties` map and promotes their values to first-class response
/// fields.
pub fn marshal_egress(
    mut props: BTreeMap<String, PropertyValue>,
) -> (BTreeMap<String, PropertyValue>, ReservedOutput) {
    let name = props
        .remove(reserved::NAME)
        .and_then(|v| v.as_str().map(str::to_string));
    let workspace = props
        .remove(reserved::WORKSPACE)
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| reserved::DEFAULT_WORKSPACE.to_string());
    let create_time = props
        .remove(reserved::CREATE_TIME)
        .and_then(|v| v.as_integer())
        .unwrap_or_default();
    let update_time = props
        .remove(reserved::UPDATE_TIME)
        .and_then(|v| v.as_integer())
        .unwrap_or_default();
    let start_time = props.remove(reserved::START_TIME).and_then(|v| v.as_integer());
    let end_time = props.remove(reserved::END_TIME).and_then(|v| v.as_integer());

    // Any stray reserved key that isn't one of the known descriptors is
    // dropped rather than surfaced -- it should never occur in practice.
    props.retain(|k, _| !is_reserved(k));

    (
        props,
        ReservedOutput {
            name,
            workspace,
            create_time,
            update_time,
            start_time,
            end_time,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, PropertyValue)]) -> BTreeMap<String, PropertyValue> {
        pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn reject_reserved_keys_catches_prefix() {
        let input = props(&[("__kf_name".into(), PropertyValue::String("x".into()))]);
        assert!(reject_reserved_keys(&input).is_err());
    }

    #[test]
    fn marshal_ingress_injects_defaults() {
        let input = props(&[("string_field".into(), PropertyValue::String("a".into()))]);
        let out = marshal_ingress(input, ReservedInput::default(), 123).unwrap();
        assert_eq!(
            out.get(reserved::WORKSPACE),
            Some(&PropertyValue::String(reserved::DEFAULT_WORKSPACE.into()))
        );
        assert_eq!(out.get(reserved::CREATE_TIME), Some(&PropertyValue::Integer(123)));
        assert_eq!(out.get(reserved::UPDATE_TIME), Some(&PropertyValue::Integer(123)));
        assert!(!out.contains_key(reserved::START_TIME));
    }

    #[test]
    fn marshal_ingress_rejects_reserved_caller_key() {
        let input = props(&[("__kf_create_time".into(), PropertyValue::Integer(1))]);
        assert!(marshal_ingress(input, ReservedInput::default(), 123).is_err());
    }

    #[test]
    fn marshal_ingress_honors_caller_workspace() {
        let input = BTreeMap::new();
        let reserved_input = ReservedInput {
            workspace: Some("my workspace".into()),
            ..Default::default()
        };
        let out = marshal_ingress(input, reserved_input, 123).unwrap();
        assert_eq!(
            out.get(reserved::WORKSPACE),
            Some(&PropertyValue::String("my workspace".into()))
        );
    }

    #[test]
    fn egress_round_trip_strips_and_promotes() {
        let input = props(&[
            ("string_field".into(), PropertyValue::String("a".into())),
            (reserved::NAME.into(), PropertyValue::String("My Model".into())),
            (reserved::WORKSPACE.into(), PropertyValue::String("ws".into())),
            (reserved::CREATE_TIME.into(), PropertyValue::Integer(123)),
            (reserved::UPDATE_TIME.into(), PropertyValue::Integer(123)),
        ]);
        let (surfaced, reserved_output) = marshal_egress(input);
        assert_eq!(surfaced.len(), 1);
        assert!(surfaced.contains_key("string_field"));
        assert_eq!(reserved_output.name, Some("My Model".into()));
        assert_eq!(reserved_output.workspace, "ws");
        assert_eq!(reserved_output.create_time, 123);
        assert_eq!(reserved_output.update_time, 123);
    }

    #[test]
    fn create_time_never_exceeds_update_time() {
        let out = marshal_ingress(BTreeMap::new(), ReservedInput::default(), 999).unwrap();
        let create = out.get(reserved::CREATE_TIME).unwrap().as_integer().unwrap();
        let update = out.get(reserved::UPDATE_TIME).unwrap().as_integer().unwrap();
        assert!(create <= update);
    }
}
