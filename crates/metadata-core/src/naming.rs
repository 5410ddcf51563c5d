//! Name/namespace validator (component B).
//!
//! Validation is done with hand-written character scans rather than a regex
//! engine, mirroring the constraints in spec §4.2 directly:
//! - type name: `^[A-Za-z][^ /]*$`
//! - namespace: `^[A-Za-z][^ ]*[^/]$`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MetaError;

/// The well-known namespace substituted when a submitted name carries none.
pub const DEFAULT_NAMESPACE: &str = "types.kubeflow.org/default";

fn valid_type_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c != ' ' && c != '/')
}

fn valid_namespace(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < 2 {
        return false;
    }
    if !chars[0].is_ascii_alphabetic() {
        return false;
    }
    if chars.iter().any(|c| *c == ' ') {
        return false;
    }
    *chars.last().unwrap() != '/'
}

/// A validated type name: the last `/`-separated segment of a canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeName(String);

impl TypeName {
    pub fn new(value: impl Into<String>) -> Result<Self, MetaError> {
        let value = value.into();
        if !valid_type_name(&value) {
            return Err(MetaError::InvalidName {
                value,
                reason: "type names must start with a letter and contain no spaces or '/'",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TypeName {
    type Error = MetaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TypeName> for String {
    fn from(value: TypeName) -> Self {
        value.0
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated namespace: everything before the final `/` in a canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace(String);

impl Namespace {
    pub fn new(value: impl Into<String>) -> Result<Self, MetaError> {
        let value = value.into();
        if !valid_namespace(&value) {
            return Err(MetaError::InvalidName {
                value,
                reason:
                    "namespaces must start with a letter, contain no spaces, and not end with '/'",
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Namespace {
    type Error = MetaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A canonicalized `{namespace}/{name}` type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalName {
    pub namespace: Namespace,
    pub name: TypeName,
}

impl CanonicalName {
    /// Parses and canonicalizes a submitted name per §4.2.
    ///
    /// Splits on the last `/`; the suffix is the type name, the prefix is the
    /// namespace. An empty prefix is replaced by [`DEFAULT_NAMESPACE`]. Both
    /// parts are then validated independently.
    pub fn parse(raw: &str) -> Result<Self, MetaError> {
        let (namespace_part, name_part) = match raw.rfind('/') {
            Some(idx) => (&raw[..idx], &raw[idx + 1..]),
            None => ("", raw),
        };
        let namespace_part = if namespace_part.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            namespace_part
        };
        let name = TypeName::new(name_part)?;
        let namespace = Namespace::new(namespace_part)?;
        Ok(Self { namespace, name })
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
