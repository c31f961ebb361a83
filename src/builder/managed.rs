//! Builder for managed objects described by a [`Schema`](crate::Schema).

use std::collections::HashSet;

use crate::builder::MappingDataBuilder;
use crate::error::MappingError;
use crate::graph::{ObjectId, ObjectRef, PropertyValue};
use crate::mapping::Mapping;
use crate::source::Source;
use crate::value::Value;

pub const DEFAULT_MODEL_OBJECT_PREFIX: &str = "ModelObject";
pub const DEFAULT_PLAIN_OBJECT_PREFIX: &str = "PlainObject";

/// Flattens managed objects and their relationships into nested mappings.
///
/// Source and destination names are compared with the configured model and
/// plain markers removed, so `UserModelObject` maps to `UserPlainObject`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedObjectBuilder {
    model_object_prefix: String,
    plain_object_prefix: String,
}

/// Per-call traversal state.
///
/// `excluded` holds `(object, property)` pairs that must not be followed:
/// the inverse side of every relationship on the current recursion path.
/// Pairs added by an object are removed once that object is flattened, so
/// sibling branches and ancestors never see them. `path` holds the objects
/// currently being flattened and cuts cycles that have no declared inverse.
#[derive(Debug, Default)]
struct Traversal {
    excluded: HashSet<(ObjectId, String)>,
    path: Vec<ObjectId>,
}

impl ManagedObjectBuilder {
    pub fn new() -> Self {
        Self::with_prefixes(DEFAULT_MODEL_OBJECT_PREFIX, DEFAULT_PLAIN_OBJECT_PREFIX)
    }

    pub fn with_prefixes(
        model_object_prefix: impl Into<String>,
        plain_object_prefix: impl Into<String>,
    ) -> Self {
        Self {
            model_object_prefix: model_object_prefix.into(),
            plain_object_prefix: plain_object_prefix.into(),
        }
    }

    pub fn model_object_prefix(&self) -> &str {
        &self.model_object_prefix
    }

    pub fn plain_object_prefix(&self) -> &str {
        &self.plain_object_prefix
    }

    fn flatten_object(&self, object: ObjectRef<'_>, traversal: &mut Traversal) -> Option<Mapping> {
        let Some(entity) = object.entity_def() else {
            tracing::warn!(
                "Entity {} of {} is missing from the schema",
                object.entity_name(),
                object.id()
            );
            return None;
        };
        traversal.path.push(object.id());

        let mut added = Vec::new();
        for relationship in entity.relationships() {
            let Some(inverse) = relationship.inverse() else {
                continue;
            };
            for related in related_ids(object.value(&relationship.name)) {
                let pair = (related, inverse.to_string());
                if traversal.excluded.insert(pair.clone()) {
                    added.push(pair);
                }
            }
        }

        let mut mapping = Mapping::new();
        for property in &entity.properties {
            if traversal
                .excluded
                .contains(&(object.id(), property.name.clone()))
            {
                tracing::trace!(
                    "Skipping inverse relationship {}.{} of {}",
                    entity.name,
                    property.name,
                    object.id()
                );
                continue;
            }

            let value = match object.value(&property.name) {
                None | Some(PropertyValue::ToOne(None)) => continue,
                Some(PropertyValue::Attribute(Value::Null)) => continue,
                Some(PropertyValue::Attribute(value)) => value.clone(),
                Some(PropertyValue::ToOne(Some(id))) => {
                    match self.flatten_related(object, *id, traversal) {
                        Some(nested) => Value::Map(nested),
                        None => continue,
                    }
                }
                Some(PropertyValue::ToMany(ids)) => Value::List(
                    ids.iter()
                        .filter_map(|id| self.flatten_related(object, *id, traversal))
                        .map(Value::Map)
                        .collect(),
                ),
            };
            mapping.insert(property.name.clone(), value);
        }

        for pair in &added {
            traversal.excluded.remove(pair);
        }
        traversal.path.pop();
        Some(mapping)
    }

    fn flatten_related(
        &self,
        owner: ObjectRef<'_>,
        id: ObjectId,
        traversal: &mut Traversal,
    ) -> Option<Mapping> {
        if traversal.path.contains(&id) {
            tracing::trace!("Cutting relationship cycle at {}", id);
            return None;
        }
        let related = owner.related(id)?;
        self.flatten_object(related, traversal)
    }
}

impl Default for ManagedObjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MappingDataBuilder for ManagedObjectBuilder {
    /// Compare a source entity name with a destination type name.
    ///
    /// Returns the stripped names on mismatch.
    fn names_match(&self, source: &str, destination: &str) -> Result<(), MappingError> {
        let model = source.replace(&self.model_object_prefix, "");
        let plain = destination.replace(&self.plain_object_prefix, "");

        if model == plain {
            Ok(())
        } else {
            Err(MappingError::SourceDestinationTypeMismatch {
                source: model,
                destination: plain,
            })
        }
    }

    /// Collections are validated through their first element; an empty
    /// collection is accepted whatever the destination type.
    fn validate(&self, source: &Source<'_>, destination: &str) -> Result<(), MappingError> {
        match source {
            Source::Collection(items) => match items.first() {
                Some(first) => self.validate(first, destination),
                None => Ok(()),
            },
            other => self.names_match(&other.type_name(), destination),
        }
    }

    fn flatten(&self, source: &Source<'_>) -> Result<Mapping, MappingError> {
        let object = source
            .as_object()
            .ok_or_else(|| MappingError::UnsupportedSourceType {
                type_name: source.type_name(),
            })?;

        let mut traversal = Traversal::default();
        let mapping = self
            .flatten_object(*object, &mut traversal)
            .ok_or_else(|| MappingError::BuildFailure {
                type_name: object.entity_name().to_string(),
            })?;

        tracing::debug!(
            "Flattened {} {} into {} keys",
            object.entity_name(),
            object.id(),
            mapping.len()
        );
        Ok(mapping)
    }
}

fn related_ids(value: Option<&PropertyValue>) -> Vec<ObjectId> {
    match value {
        Some(PropertyValue::ToOne(Some(id))) => vec![*id],
        Some(PropertyValue::ToMany(ids)) => ids.clone(),
        _ => Vec::new(),
    }
}
