//! The public/internal property-value representation (spec §9
//! "Runtime-typed property values"): a sum type over exactly three simple
//! kinds, shared verbatim between the caller-facing and backing-store
//! representations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind tag for a [`PropertyValue`] or a type's declared property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Integer,
    #[serde(rename = "floating_point")]
    Float,
    String,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "floating-point"),
            Self::String => write!(f, "string"),
        }
    }
}

/// A runtime-typed property value: exactly the three kinds §4.3 supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Integer(i64),
    #[serde(rename = "floating_point")]
    Float(f64),
    String(String),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Integer(_) => PropertyKind::Integer,
            Self::Float(_) => PropertyKind::Float,
            Self::String(_) => PropertyKind::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(PropertyValue::Integer(1).kind(), PropertyKind::Integer);
        assert_eq!(PropertyValue::Float(1.0).kind(), PropertyKind::Float);
        assert_eq!(
            PropertyValue::String("x".into()).kind(),
            PropertyKind::String
        );
    }

    #[test]
    fn json_round_trip() {
        let value = PropertyValue::String("hello".into());
        let json = serde_json::to_string(&value).unwrap();
        let back: PropertyValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, back);
    }
}
