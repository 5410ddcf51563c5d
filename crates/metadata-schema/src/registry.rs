//! Schema loader & type registry (component A, spec §4.1).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use metadata_core::PropertyKind;
use tracing::{debug, warn};

use crate::document::SchemaDocument;
use crate::error::SchemaError;

/// The reserved property keys consumed by type resolution or system
/// metadata; they never become registered properties on the created type
/// (spec §4.1 "Built-in suppression").
pub const BUILTIN_PROPERTY_KEYS: &[&str] =
    &["category", "namespace", "kind", "apiversion", "id", "name"];

pub fn is_builtin_property(name: &str) -> bool {
    BUILTIN_PROPERTY_KEYS.contains(&name)
}

/// A loaded, validated registry of schema documents keyed by `$id`.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    documents: HashMap<String, SchemaDocument>,
}

impl SchemaRegistry {
    /// Walks `root`, parsing every `.json` file as a schema document.
    ///
    /// Implements the loading algorithm of spec §4.1: duplicate `$id`s fail
    /// loading, each `$id` must be suffix-equal to its file's relative path,
    /// and every embedded example must validate against its own schema.
    pub fn load_from_dir(root: &Path) -> Result<Self, SchemaError> {
        let mut documents = HashMap::new();
        for file in walk_json_files(root)? {
            let relative = file
                .strip_prefix(root)
                .unwrap_or(&file)
                .to_string_lossy()
                .replace('\\', "/");
            let contents = fs::read_to_string(&file).map_err(|e| {
                warn!(path = %file.display(), error = %e, "failed to read schema file");
                SchemaError::Io {
                    path: file.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            let document: SchemaDocument = serde_json::from_str(&contents).map_err(|e| {
                warn!(path = %file.display(), error = %e, "failed to parse schema file");
                SchemaError::Parse {
                    path: file.display().to_string(),
                    message: e.to_string(),
                }
            })?;
            if !document.id.ends_with(relative.as_str()) {
                return Err(SchemaError::IdPathMismatch {
                    id: document.id,
                    path: relative,
                });
            }
            if documents.contains_key(&document.id) {
                return Err(SchemaError::DuplicateId { id: document.id });
            }
            debug!(id = %document.id, path = %relative, "loaded schema document");
            documents.insert(document.id.clone(), document);
        }

        let registry = Self { documents };
        for id in registry.documents.keys() {
            registry.validate_examples(id)?;
        }
        debug!(count = registry.documents.len(), path = %root.display(), "schema registry loaded");
        Ok(registry)
    }

    /// Builds a registry directly from parsed documents (used in tests and
    /// by callers that already have documents in memory).
    pub fn from_documents(documents: Vec<SchemaDocument>) -> Result<Self, SchemaError> {
        let mut map = HashMap::new();
        for document in documents {
            if map.contains_key(&document.id) {
                return Err(SchemaError::DuplicateId { id: document.id });
            }
            map.insert(document.id.clone(), document);
        }
        let registry = Self { documents: map };
        for id in registry.documents.keys() {
            registry.validate_examples(id)?;
        }
        Ok(registry)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&SchemaDocument> {
        self.documents.get(id)
    }

    /// `ConstantStringType(id, name)`: the constant value of a named string
    /// property. Fails if missing or non-constant.
    pub fn constant_string(&self, id: &str, property: &str) -> Result<String, SchemaError> {
        let document = self
            .documents
            .get(id)
            .ok_or_else(|| SchemaError::MissingConstantProperty {
                id: id.to_string(),
                property: property.to_string(),
            })?;
        let descriptor = document
            .properties
            .get(property)
            .ok_or_else(|| SchemaError::MissingConstantProperty {
                id: id.to_string(),
                property: property.to_string(),
            })?;
        descriptor
            .constant_string()
            .map(str::to_string)
            .ok_or_else(|| SchemaError::NonConstantProperty {
                id: id.to_string(),
                property: property.to_string(),
            })
    }

    /// `TypeName(id)`: returns `({namespace}/{apiversion}, {kind})`.
    pub fn type_name(&self, id: &str) -> Result<(String, String), SchemaError> {
        let namespace = self.constant_string(id, "namespace")?;
        let apiversion = self.constant_string(id, "apiversion")?;
        let kind = self.constant_string(id, "kind")?;
        Ok((format!("{namespace}/{apiversion}"), kind))
    }

    /// `ConstantStringType(id, "category")`.
    pub fn category(&self, id: &str) -> Result<String, SchemaError> {
        self.constant_string(id, "category")
    }

    /// `SimpleProperties(id)`: recursively collects property -> kind
    /// mappings, descending `allOf` in order, resolving `$ref`s fully
    /// before merging, then merging the document's own `properties`.
    /// Later assignments overwrite earlier ones.
    pub fn simple_properties(&self, id: &str) -> Result<BTreeMap<String, PropertyKind>, SchemaError> {
        let mut visiting = HashSet::new();
        self.simple_properties_inner(id, &mut visiting)
    }

    fn simple_properties_inner(
        &self,
        id: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<BTreeMap<String, PropertyKind>, SchemaError> {
        if !visiting.insert(id.to_string()) {
            return Err(SchemaError::CompositionCycle { id: id.to_string() });
        }
        let document = self.documents.get(id).ok_or_else(|| SchemaError::UnresolvedRef {
            id: id.to_string(),
            reference: id.to_string(),
        })?;

        let mut result = BTreeMap::new();
        for entry in &document.all_of {
            if let Some(reference) = &entry.reference {
                let resolved = self.simple_properties_inner(reference, visiting)?;
                for (key, kind) in resolved {
                    result.insert(key, kind);
                }
            }
            merge_simple_properties(&entry.properties, id, &mut result)?;
        }
        merge_simple_properties(&document.properties, id, &mut result)?;

        visiting.remove(id);
        Ok(result)
    }

    /// `SimpleProperties(id)` with the built-in/system keys suppressed, the
    /// shape actually installed as a type's declared property map.
    pub fn registrable_properties(
        &self,
        id: &str,
    ) -> Result<BTreeMap<String, PropertyKind>, SchemaError> {
        let mut properties = self.simple_properties(id)?;
        properties.retain(|key, _| !is_builtin_property(key));
        Ok(properties)
    }

    /// Validates every embedded example against its schema's declared
    /// simple properties: present keys must match their declared kind, and
    /// the builtin constant properties (namespace/kind/apiversion/category)
    /// must match their constant value when present in the example.
    fn validate_examples(&self, id: &str) -> Result<(), SchemaError> {
        let document = self.documents.get(id).expect("id from own key set");
        if document.examples.is_empty() {
            return Ok(());
        }
        let simple_properties = self.simple_properties(id)?;
        for example in &document.examples {
            let object = example.as_object().ok_or_else(|| SchemaError::ExampleValidationFailed {
                id: id.to_string(),
                reason: "example is not a JSON object".to_string(),
            })?;
            for (key, value) in object {
                if let Some(kind) = simple_properties.get(key) {
                    if !value_matches_kind(value, *kind) {
                        return Err(SchemaError::ExampleValidationFailed {
                            id: id.to_string(),
                            reason: format!("property '{key}' does not match declared kind {kind}"),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

fn merge_simple_properties(
    properties: &BTreeMap<String, crate::document::PropertyDescriptor>,
    id: &str,
    output: &mut BTreeMap<String, PropertyKind>,
) -> Result<(), SchemaError> {
    for (name, descriptor) in properties {
        if !descriptor.is_simple_type() {
            continue;
        }
        match descriptor.simple_kind() {
            Some(kind) => {
                output.insert(name.clone(), kind);
            }
            None => {
                return Err(SchemaError::UnknownPropertyKind {
                    id: id.to_string(),
                    property: name.clone(),
                    kind: descriptor.type_name().to_string(),
                })
            }
        }
    }
    Ok(())
}

fn value_matches_kind(value: &serde_json::Value, kind: PropertyKind) -> bool {
    match kind {
        PropertyKind::String => value.is_string(),
        PropertyKind::Integer => value.is_i64() || value.is_u64(),
        PropertyKind::Float => value.is_number(),
    }
}

fn walk_json_files(root: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| SchemaError::Io {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        for entry in entries {
            let entry = entry.map_err(|e| SchemaError::Io {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}
