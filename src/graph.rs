//! In-memory managed-object graph.
//!
//! Objects live in an arena owned by [`ObjectGraph`] and refer to each other
//! through [`ObjectId`]s, so bidirectional relationships need no shared
//! ownership. Every write is checked against the graph's [`Schema`].

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::GraphError;
use crate::schema::{EntityDef, PropertyDef, PropertyKind, Schema};
use crate::value::Value;

/// Identity of an object within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Current value of one property of a managed object
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Attribute(Value),
    ToOne(Option<ObjectId>),
    /// Related objects; order is the order in which they were related
    ToMany(Vec<ObjectId>),
}

/// An entity instance: its entity name and the properties that have been set
#[derive(Debug, Clone)]
pub struct ManagedObject {
    id: ObjectId,
    entity: String,
    values: HashMap<String, PropertyValue>,
}

impl ManagedObject {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn value(&self, property: &str) -> Option<&PropertyValue> {
        self.values.get(property)
    }
}

/// Borrowed handle to an object together with the graph it belongs to
#[derive(Debug, Clone, Copy)]
pub struct ObjectRef<'g> {
    graph: &'g ObjectGraph,
    object: &'g ManagedObject,
}

impl<'g> ObjectRef<'g> {
    pub fn id(&self) -> ObjectId {
        self.object.id
    }

    /// Runtime type name of the object, i.e. its entity name
    pub fn entity_name(&self) -> &'g str {
        &self.object.entity
    }

    pub fn entity_def(&self) -> Option<&'g EntityDef> {
        self.graph.schema.entity(&self.object.entity)
    }

    pub fn value(&self, property: &str) -> Option<&'g PropertyValue> {
        self.object.values.get(property)
    }

    /// Handle to another object of the same graph
    pub fn related(&self, id: ObjectId) -> Option<ObjectRef<'g>> {
        self.graph.object(id)
    }
}

/// Arena of managed objects described by a schema
#[derive(Debug, Clone, Default)]
pub struct ObjectGraph {
    schema: Schema,
    objects: Vec<ManagedObject>,
    keys: HashMap<String, ObjectId>,
}

impl ObjectGraph {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            objects: Vec::new(),
            keys: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Create an empty instance of `entity`
    pub fn insert(&mut self, entity: &str) -> Result<ObjectId, GraphError> {
        if !self.schema.has_entity(entity) {
            return Err(GraphError::UnknownEntity(entity.to_string()));
        }

        let id = ObjectId(self.objects.len());
        self.objects.push(ManagedObject {
            id,
            entity: entity.to_string(),
            values: HashMap::new(),
        });
        Ok(id)
    }

    /// Create an instance addressable by `key` (see [`ObjectGraph::lookup`])
    pub fn insert_keyed(
        &mut self,
        key: impl Into<String>,
        entity: &str,
    ) -> Result<ObjectId, GraphError> {
        let key = key.into();
        if self.keys.contains_key(&key) {
            return Err(GraphError::InvalidSchema(format!(
                "Object key '{}' is used more than once",
                key
            )));
        }
        let id = self.insert(entity)?;
        self.keys.insert(key, id);
        Ok(id)
    }

    pub fn lookup(&self, key: &str) -> Option<ObjectId> {
        self.keys.get(key).copied()
    }

    pub fn get(&self, id: ObjectId) -> Option<&ManagedObject> {
        self.objects.get(id.0)
    }

    pub fn object(&self, id: ObjectId) -> Option<ObjectRef<'_>> {
        self.get(id).map(|object| ObjectRef {
            graph: self,
            object,
        })
    }

    /// All objects of `entity`, in insertion order
    pub fn objects_of<'a, 'e>(&'a self, entity: &'e str) -> impl Iterator<Item = ObjectRef<'a>> + 'e
    where
        'a: 'e,
    {
        self.objects
            .iter()
            .filter(move |object| object.entity == entity)
            .map(move |object| ObjectRef {
                graph: self,
                object,
            })
    }

    /// Set an attribute. The value is coerced towards the attribute's type
    /// tag first (RFC 3339 strings to dates, integers to floats).
    pub fn set_attribute(
        &mut self,
        id: ObjectId,
        property: &str,
        value: impl Into<Value>,
    ) -> Result<(), GraphError> {
        let (entity, def) = self.property_def(id, property)?;
        let PropertyKind::Attribute { tag } = &def.kind else {
            return Err(GraphError::NotAnAttribute {
                entity,
                property: property.to_string(),
            });
        };

        let value = value.into().coerce_to(tag);
        if !value.conforms_to(tag) {
            return Err(GraphError::AttributeTypeMismatch {
                entity,
                property: property.to_string(),
                expected: tag.clone(),
                actual: value.kind().to_string(),
            });
        }

        self.object_mut(id)?
            .values
            .insert(property.to_string(), PropertyValue::Attribute(value));
        Ok(())
    }

    /// Relate `from` to `to` through `relationship`.
    ///
    /// A to-one relationship is replaced, a to-many relationship gains `to`
    /// (once). When the relationship declares an inverse, the inverse side
    /// on `to` is updated as well, and a replaced to-one target loses its
    /// back-reference.
    pub fn relate(
        &mut self,
        from: ObjectId,
        relationship: &str,
        to: ObjectId,
    ) -> Result<(), GraphError> {
        let inverse = self.check_relationship(from, relationship, to)?;

        if let Some(previous) = self.link(from, relationship, to)? {
            if let Some(inverse) = &inverse {
                self.unlink(previous, inverse, from)?;
            }
        }

        if let Some(inverse) = inverse {
            if let Some(previous) = self.link(to, &inverse, from)? {
                self.unlink(previous, relationship, to)?;
            }
        }
        Ok(())
    }

    /// Point a to-one relationship at `to`, or clear it with `None`.
    /// Inverses are kept in sync like [`relate`](Self::relate).
    pub fn set_to_one(
        &mut self,
        from: ObjectId,
        relationship: &str,
        to: Option<ObjectId>,
    ) -> Result<(), GraphError> {
        self.expect_cardinality(from, relationship, false)?;
        match to {
            Some(to) => self.relate(from, relationship, to),
            None => {
                let (_, def) = self.property_def(from, relationship)?;
                let previous = match self.object_mut(from)?.values.insert(
                    relationship.to_string(),
                    PropertyValue::ToOne(None),
                ) {
                    Some(PropertyValue::ToOne(previous)) => previous,
                    _ => None,
                };
                if let (Some(previous), Some(inverse)) = (previous, def.inverse()) {
                    self.unlink(previous, inverse, from)?;
                }
                Ok(())
            }
        }
    }

    /// Append `to` to a to-many relationship
    pub fn add_to_many(
        &mut self,
        from: ObjectId,
        relationship: &str,
        to: ObjectId,
    ) -> Result<(), GraphError> {
        self.expect_cardinality(from, relationship, true)?;
        self.relate(from, relationship, to)
    }

    /// Load objects from a YAML (or JSON) document.
    ///
    /// ```yaml
    /// objects:
    ///   - key: alice
    ///     entity: UserModelObject
    ///     attributes:
    ///       name: Alice
    ///     relationships:
    ///       address: home
    ///       orders: [o1, o2]
    /// ```
    pub fn from_yaml_str(schema: Schema, yaml: &str) -> Result<Self, GraphError> {
        let document: GraphDocument = serde_yaml::from_str(yaml)?;
        Self::from_document(schema, document)
    }

    pub fn load_from_file<P: AsRef<Path>>(schema: Schema, path: P) -> Result<Self, GraphError> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(schema, &contents)
    }

    fn from_document(schema: Schema, document: GraphDocument) -> Result<Self, GraphError> {
        let mut graph = ObjectGraph::new(schema);

        for object in &document.objects {
            graph.insert_keyed(object.key.clone(), &object.entity)?;
        }

        for object in document.objects {
            let id = graph.resolve_key(&object.key)?;

            for (name, value) in object.attributes {
                graph.set_attribute(id, &name, Value::from(value))?;
            }

            for (name, reference) in object.relationships {
                let keys = match reference {
                    RelationshipRef::One(key) => vec![key],
                    RelationshipRef::Many(keys) => keys,
                };
                for key in keys {
                    let target = graph.resolve_key(&key)?;
                    graph.relate(id, &name, target)?;
                }
            }
        }

        tracing::debug!("Loaded object graph with {} objects", graph.len());
        Ok(graph)
    }

    fn resolve_key(&self, key: &str) -> Result<ObjectId, GraphError> {
        self.lookup(key)
            .ok_or_else(|| GraphError::UnknownObject(key.to_string()))
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut ManagedObject, GraphError> {
        self.objects
            .get_mut(id.0)
            .ok_or_else(|| GraphError::UnknownObject(id.to_string()))
    }

    fn property_def(&self, id: ObjectId, property: &str) -> Result<(String, PropertyDef), GraphError> {
        let object = self
            .get(id)
            .ok_or_else(|| GraphError::UnknownObject(id.to_string()))?;
        let entity = self
            .schema
            .entity(&object.entity)
            .ok_or_else(|| GraphError::UnknownEntity(object.entity.clone()))?;
        let def = entity
            .property(property)
            .ok_or_else(|| GraphError::UnknownProperty {
                entity: object.entity.clone(),
                property: property.to_string(),
            })?;
        Ok((object.entity.clone(), def.clone()))
    }

    fn expect_cardinality(
        &self,
        id: ObjectId,
        relationship: &str,
        to_many: bool,
    ) -> Result<(), GraphError> {
        let (entity, def) = self.property_def(id, relationship)?;
        match (&def.kind, to_many) {
            (PropertyKind::ToOne { .. }, false) | (PropertyKind::ToMany { .. }, true) => Ok(()),
            (PropertyKind::Attribute { .. }, _) => Err(GraphError::NotARelationship {
                entity,
                property: relationship.to_string(),
            }),
            _ => Err(GraphError::CardinalityMismatch {
                entity,
                property: relationship.to_string(),
                expected: if to_many { "to-many" } else { "to-one" },
            }),
        }
    }

    /// Returns the inverse name of `relationship` after checking that `to`
    /// has the entity the relationship targets
    fn check_relationship(
        &self,
        from: ObjectId,
        relationship: &str,
        to: ObjectId,
    ) -> Result<Option<String>, GraphError> {
        let (entity, def) = self.property_def(from, relationship)?;
        let Some(target) = def.target() else {
            return Err(GraphError::NotARelationship {
                entity,
                property: relationship.to_string(),
            });
        };

        let to_object = self
            .get(to)
            .ok_or_else(|| GraphError::UnknownObject(to.to_string()))?;
        if to_object.entity != target {
            return Err(GraphError::RelationshipTargetMismatch {
                property: format!("{}.{}", entity, relationship),
                expected: target.to_string(),
                actual: to_object.entity.clone(),
            });
        }

        Ok(def.inverse().map(str::to_string))
    }

    /// Point `relationship` of `from` at `to`. Returns the to-one target that
    /// was replaced, if any.
    fn link(
        &mut self,
        from: ObjectId,
        relationship: &str,
        to: ObjectId,
    ) -> Result<Option<ObjectId>, GraphError> {
        let (_, def) = self.property_def(from, relationship)?;
        let object = self.object_mut(from)?;

        match def.kind {
            PropertyKind::ToOne { .. } => {
                let previous = object
                    .values
                    .insert(relationship.to_string(), PropertyValue::ToOne(Some(to)));
                Ok(match previous {
                    Some(PropertyValue::ToOne(Some(previous))) if previous != to => Some(previous),
                    _ => None,
                })
            }
            PropertyKind::ToMany { .. } => {
                let entry = object
                    .values
                    .entry(relationship.to_string())
                    .or_insert_with(|| PropertyValue::ToMany(Vec::new()));
                if let PropertyValue::ToMany(ids) = entry {
                    if !ids.contains(&to) {
                        ids.push(to);
                    }
                }
                Ok(None)
            }
            PropertyKind::Attribute { .. } => Ok(None),
        }
    }

    /// Remove `to` from `relationship` of `from`
    fn unlink(&mut self, from: ObjectId, relationship: &str, to: ObjectId) -> Result<(), GraphError> {
        let object = self.object_mut(from)?;
        match object.values.get_mut(relationship) {
            Some(PropertyValue::ToOne(target)) if *target == Some(to) => *target = None,
            Some(PropertyValue::ToMany(ids)) => ids.retain(|id| *id != to),
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    objects: Vec<ObjectDocument>,
}

#[derive(Debug, Deserialize)]
struct ObjectDocument {
    key: String,
    entity: String,
    #[serde(default)]
    attributes: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    relationships: IndexMap<String, RelationshipRef>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelationshipRef {
    One(String),
    Many(Vec<String>),
}
