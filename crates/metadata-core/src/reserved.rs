//! Reserved `__kf_` property namespace (spec §3, §4.3, glossary).

use crate::model::Category;
use crate::value::PropertyKind;
use std::collections::BTreeMap;

pub const RESERVED_PREFIX: &str = "__kf_";

pub const NAME: &str = "__kf_name";
pub const WORKSPACE: &str = "__kf_workspace";
pub const CREATE_TIME: &str = "__kf_create_time";
pub const UPDATE_TIME: &str = "__kf_update_time";
pub const START_TIME: &str = "__kf_start_time";
pub const END_TIME: &str = "__kf_end_time";

/// Substituted for `workspace` when the caller doesn't supply one.
pub const DEFAULT_WORKSPACE: &str = "default_workspace";

pub fn is_reserved(key: &str) -> bool {
    key.starts_with(RESERVED_PREFIX)
}

/// The reserved property descriptors every [`Category`] carries, injected
/// into a type's declared properties at registration time (spec §4.4
/// "Inject reserved property descriptors").
pub fn reserved_descriptors(category: Category) -> BTreeMap<String, PropertyKind> {
    let mut descriptors = BTreeMap::new();
    descriptors.insert(NAME.to_string(), PropertyKind::String);
    descriptors.insert(WORKSPACE.to_string(), PropertyKind::String);
    descriptors.insert(CREATE_TIME.to_string(), PropertyKind::Integer);
    descriptors.insert(UPDATE_TIME.to_string(), PropertyKind::Integer);
    if category == Category::Execution {
        descriptors.insert(START_TIME.to_string(), PropertyKind::Integer);
        descriptors.insert(END_TIME.to_string(), PropertyKind::Integer);
    }
    descriptors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_reserved_detects_prefix() {
        assert!(is_reserved("__kf_name"));
        assert!(!is_reserved("name"));
        assert!(!is_reserved("kf_name"));
    }

    #[test]
    fn execution_descriptors_include_start_end() {
        let descriptors = reserved_descriptors(Category::Execution);
        assert!(descriptors.contains_key(START_TIME));
        assert!(descriptors.contains_key(END_TIME));
    }

    #[test]
    fn artifact_descriptors_exclude_start_end() {
        let descriptors = reserved_descriptors(Category::Artifact);
        assert!(!descriptors.contains_key(START_TIME));
        assert!(!descriptors.contains_key(END_TIME));
    }
}
