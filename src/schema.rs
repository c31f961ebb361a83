//! Entity schema registry.
//!
//! Describes, for every entity of an object graph, its ordered property list
//! and which properties are relationships (with their inverses). Builders walk
//! objects through this registry instead of inspecting them at runtime.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::GraphError;
use crate::type_tag::TypeTag;

/// Kind of an entity property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PropertyKind {
    Attribute {
        #[serde(rename = "type")]
        tag: TypeTag,
    },
    ToOne {
        target: String,
        #[serde(default)]
        inverse: Option<String>,
    },
    ToMany {
        target: String,
        #[serde(default)]
        inverse: Option<String>,
    },
}

/// A named property of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDef {
    pub name: String,
    #[serde(flatten)]
    pub kind: PropertyKind,
}

impl PropertyDef {
    pub fn is_relationship(&self) -> bool {
        !matches!(self.kind, PropertyKind::Attribute { .. })
    }

    /// Target entity of a relationship
    pub fn target(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Attribute { .. } => None,
            PropertyKind::ToOne { target, .. } | PropertyKind::ToMany { target, .. } => {
                Some(target)
            }
        }
    }

    /// Inverse relationship name on the target entity, if declared
    pub fn inverse(&self) -> Option<&str> {
        match &self.kind {
            PropertyKind::Attribute { .. } => None,
            PropertyKind::ToOne { inverse, .. } | PropertyKind::ToMany { inverse, .. } => {
                inverse.as_deref()
            }
        }
    }
}

/// Entity definition: a name plus properties in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDef>,
}

impl EntityDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn attribute(mut self, name: impl Into<String>, tag: impl Into<TypeTag>) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            kind: PropertyKind::Attribute { tag: tag.into() },
        });
        self
    }

    pub fn to_one(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: Option<&str>,
    ) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            kind: PropertyKind::ToOne {
                target: target.into(),
                inverse: inverse.map(str::to_string),
            },
        });
        self
    }

    pub fn to_many(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        inverse: Option<&str>,
    ) -> Self {
        self.properties.push(PropertyDef {
            name: name.into(),
            kind: PropertyKind::ToMany {
                target: target.into(),
                inverse: inverse.map(str::to_string),
            },
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &PropertyDef> {
        self.properties.iter().filter(|p| p.is_relationship())
    }
}

#[derive(Debug, Deserialize)]
struct SchemaDocument {
    entities: Vec<EntityDef>,
}

/// Registry of entity definitions, keyed by entity name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    entities: IndexMap<String, EntityDef>,
}

impl Schema {
    /// Build a registry and check it for consistency.
    ///
    /// # Errors
    /// Returns `InvalidSchema` for duplicate names, relationships to undefined
    /// entities, and inverses that are missing or do not point back.
    pub fn from_entities(entities: Vec<EntityDef>) -> Result<Self, GraphError> {
        let mut registry = IndexMap::new();
        for entity in entities {
            if registry.contains_key(&entity.name) {
                return Err(GraphError::InvalidSchema(format!(
                    "Entity '{}' is defined more than once",
                    entity.name
                )));
            }
            registry.insert(entity.name.clone(), entity);
        }

        let schema = Self { entities: registry };
        schema.validate()?;
        Ok(schema)
    }

    /// Parse a schema from YAML text.
    ///
    /// ```
    /// use transformer::Schema;
    ///
    /// let schema = Schema::from_yaml_str(r#"
    /// entities:
    ///   - name: UserModelObject
    ///     properties:
    ///       - name: name
    ///         kind: attribute
    ///         type: string
    /// "#).unwrap();
    ///
    /// assert!(schema.entity("UserModelObject").is_some());
    /// ```
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GraphError> {
        let document: SchemaDocument = serde_yaml::from_str(yaml)?;
        Self::from_entities(document.entities)
    }

    /// Load a schema from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&contents)
    }

    pub fn entity(&self, name: &str) -> Option<&EntityDef> {
        self.entities.get(name)
    }

    pub fn has_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(|k| k.as_str())
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntityDef> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn validate(&self) -> Result<(), GraphError> {
        for entity in self.entities.values() {
            let mut seen = HashSet::new();
            for property in &entity.properties {
                if !seen.insert(property.name.as_str()) {
                    return Err(GraphError::InvalidSchema(format!(
                        "Property '{}.{}' is defined more than once",
                        entity.name, property.name
                    )));
                }
            }

            for relationship in entity.relationships() {
                self.validate_relationship(entity, relationship)?;
            }
        }
        Ok(())
    }

    fn validate_relationship(
        &self,
        entity: &EntityDef,
        relationship: &PropertyDef,
    ) -> Result<(), GraphError> {
        let target_name = relationship.target().unwrap_or_default();
        let target = self.entity(target_name).ok_or_else(|| {
            GraphError::InvalidSchema(format!(
                "Relationship '{}.{}' targets undefined entity '{}'",
                entity.name, relationship.name, target_name
            ))
        })?;

        let Some(inverse_name) = relationship.inverse() else {
            tracing::warn!(
                "Relationship '{}.{}' has no inverse; flattening cuts cycles through it at the first repeated object",
                entity.name,
                relationship.name
            );
            return Ok(());
        };

        let inverse = target.property(inverse_name).ok_or_else(|| {
            GraphError::InvalidSchema(format!(
                "Inverse '{}.{}' of '{}.{}' does not exist",
                target.name, inverse_name, entity.name, relationship.name
            ))
        })?;

        if inverse.target() != Some(entity.name.as_str()) {
            return Err(GraphError::InvalidSchema(format!(
                "Inverse '{}.{}' does not point back to '{}'",
                target.name, inverse_name, entity.name
            )));
        }

        if let Some(back) = inverse.inverse() {
            if back != relationship.name {
                return Err(GraphError::InvalidSchema(format!(
                    "Inverse of '{}.{}' is '{}', expected '{}'",
                    target.name, inverse_name, back, relationship.name
                )));
            }
        }

        Ok(())
    }
}
