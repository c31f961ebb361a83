//! Error types for mapping and for the schema/object-graph layer.

use std::fmt;

use crate::type_tag::TypeTag;

/// Error type for transform and resolve operations
#[derive(Debug, Clone, PartialEq)]
pub enum MappingError {
    MissingKey {
        key: String,
    },
    TypeMismatch {
        key: String,
        expected: TypeTag,
    },
    UnsupportedSourceType {
        type_name: String,
    },
    SourceDestinationTypeMismatch {
        source: String,
        destination: String,
    },
    BuildFailure {
        type_name: String,
    },
}

impl MappingError {
    pub fn missing_key(key: impl Into<String>) -> Self {
        MappingError::MissingKey { key: key.into() }
    }

    pub fn type_mismatch(key: impl Into<String>, expected: TypeTag) -> Self {
        MappingError::TypeMismatch {
            key: key.into(),
            expected,
        }
    }

    /// Lets callers treat an absent field as optional while still failing
    /// on genuine schema violations.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, MappingError::MissingKey { .. })
    }
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::MissingKey { key } => write!(f, "Unexisting key '{}' in map", key),
            MappingError::TypeMismatch { key, expected } => {
                write!(f, "Cannot cast value from key '{}' to '{}'", key, expected)
            }
            MappingError::UnsupportedSourceType { type_name } => {
                write!(f, "Unknown mapping object type: '{}'", type_name)
            }
            MappingError::SourceDestinationTypeMismatch { source, destination } => {
                write!(f, "Cannot map from '{}' to '{}'", source, destination)
            }
            MappingError::BuildFailure { type_name } => {
                write!(f, "Cannot build map from object with type '{}'", type_name)
            }
        }
    }
}

impl std::error::Error for MappingError {}

/// Error type for schema loading and object-graph edits
#[derive(Debug)]
pub enum GraphError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
    InvalidSchema(String),
    UnknownEntity(String),
    UnknownProperty {
        entity: String,
        property: String,
    },
    NotAnAttribute {
        entity: String,
        property: String,
    },
    NotARelationship {
        entity: String,
        property: String,
    },
    CardinalityMismatch {
        entity: String,
        property: String,
        expected: &'static str,
    },
    AttributeTypeMismatch {
        entity: String,
        property: String,
        expected: TypeTag,
        actual: String,
    },
    RelationshipTargetMismatch {
        property: String,
        expected: String,
        actual: String,
    },
    UnknownObject(String),
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::IoError(err)
    }
}

impl From<serde_yaml::Error> for GraphError {
    fn from(err: serde_yaml::Error) -> Self {
        GraphError::YamlError(err)
    }
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::IoError(e) => write!(f, "IO error: {}", e),
            GraphError::YamlError(e) => write!(f, "YAML error: {}", e),
            GraphError::InvalidSchema(msg) => write!(f, "Invalid schema: {}", msg),
            GraphError::UnknownEntity(name) => write!(f, "Unknown entity '{}'", name),
            GraphError::UnknownProperty { entity, property } => {
                write!(f, "Entity '{}' has no property '{}'", entity, property)
            }
            GraphError::NotAnAttribute { entity, property } => {
                write!(f, "Property '{}.{}' is not an attribute", entity, property)
            }
            GraphError::NotARelationship { entity, property } => {
                write!(f, "Property '{}.{}' is not a relationship", entity, property)
            }
            GraphError::CardinalityMismatch {
                entity,
                property,
                expected,
            } => write!(
                f,
                "Relationship '{}.{}' is not {}",
                entity, property, expected
            ),
            GraphError::AttributeTypeMismatch {
                entity,
                property,
                expected,
                actual,
            } => write!(
                f,
                "Attribute '{}.{}' expects {}, got {}",
                entity, property, expected, actual
            ),
            GraphError::RelationshipTargetMismatch {
                property,
                expected,
                actual,
            } => write!(
                f,
                "Relationship '{}' targets {}, got an object of entity {}",
                property, expected, actual
            ),
            GraphError::UnknownObject(key) => write!(f, "Unknown object '{}'", key),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphError::IoError(e) => Some(e),
            GraphError::YamlError(e) => Some(e),
            _ => None,
        }
    }
}
