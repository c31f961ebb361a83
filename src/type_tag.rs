//! Explicit type tags for attribute kinds and diagnostic messages.
//!
//! Type information is built directly (by the schema registry or by the
//! `FromValue` implementations) and never parsed out of a type description.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar attribute kinds supported by the object graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
    Date,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "Bool",
            ScalarKind::Int => "Int",
            ScalarKind::Float => "Float",
            ScalarKind::String => "String",
            ScalarKind::Date => "Date",
        };
        f.write_str(name)
    }
}

/// Closed set of type descriptions.
///
/// In YAML a tag is written either as a bare scalar kind (`int`, `string`)
/// or as a single-key map: `{ optional: int }`, `{ collection: string }`,
/// `{ entity: User }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Optional(Box<TypeTag>),
    Collection(Box<TypeTag>),
    Entity(String),
    Mapping,
    #[serde(untagged)]
    Scalar(ScalarKind),
}

impl TypeTag {
    pub fn optional(inner: TypeTag) -> Self {
        TypeTag::Optional(Box::new(inner))
    }

    pub fn collection(inner: TypeTag) -> Self {
        TypeTag::Collection(Box::new(inner))
    }

    pub fn entity(name: impl Into<String>) -> Self {
        TypeTag::Entity(name.into())
    }

    /// Whether `Null` is an acceptable value for this tag
    pub fn is_optional(&self) -> bool {
        matches!(self, TypeTag::Optional(_))
    }
}

impl From<ScalarKind> for TypeTag {
    fn from(kind: ScalarKind) -> Self {
        TypeTag::Scalar(kind)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Scalar(kind) => write!(f, "{}", kind),
            TypeTag::Optional(inner) => write!(f, "Optional<{}>", inner),
            TypeTag::Collection(inner) => write!(f, "[{}]", inner),
            TypeTag::Entity(name) => write!(f, "Entity<{}>", name),
            TypeTag::Mapping => write!(f, "Mapping"),
        }
    }
}
