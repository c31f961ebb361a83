//! Transformer: builds typed destination values from managed objects.
//!
//! A transform validates the source against the destination type, asks the
//! builder for a flat mapping, wraps it in a [`Resolver`] and hands that to
//! the destination's [`Mappable::from_resolver`]. The first error at any
//! depth is returned unchanged.

use crate::builder::{ManagedObjectBuilder, MappingDataBuilder, MappingType};
use crate::config::TransformerConfig;
use crate::error::MappingError;
use crate::mappable::Mappable;
use crate::resolver::Resolver;
use crate::source::Source;

pub struct Transformer {
    builder: Box<dyn MappingDataBuilder>,
}

impl Transformer {
    /// Create a transformer around an explicit builder strategy
    pub fn new(builder: impl MappingDataBuilder + 'static) -> Self {
        Self {
            builder: Box::new(builder),
        }
    }

    /// Create a transformer with the default builder for `mapping_type`
    pub fn from_type(mapping_type: MappingType) -> Self {
        Self {
            builder: mapping_type.builder(),
        }
    }

    /// Create a transformer from loaded configuration (mapping type and
    /// name markers)
    pub fn from_config(config: &TransformerConfig) -> Self {
        match config.mapping_type {
            MappingType::ManagedObject => Self::new(ManagedObjectBuilder::with_prefixes(
                config.model_object_prefix.clone(),
                config.plain_object_prefix.clone(),
            )),
        }
    }

    pub fn builder(&self) -> &dyn MappingDataBuilder {
        self.builder.as_ref()
    }

    /// Map one source object to `C`
    ///
    /// # Example
    ///
    /// ```ignore
    /// let transformer = Transformer::from_type(MappingType::ManagedObject);
    /// let user: UserPlainObject = transformer.transform(&graph.object(id).unwrap().into())?;
    /// ```
    pub fn transform<C: Mappable>(&self, source: &Source<'_>) -> Result<C, MappingError> {
        self.builder.validate(source, C::NAME)?;
        let mapping = self.builder.flatten(source)?;
        tracing::debug!("Resolving {} from {}", C::NAME, source.type_name());
        C::from_resolver(&Resolver::new(mapping))
    }

    /// Map every source to `C`, in input order. Nothing is returned unless
    /// every element succeeds.
    pub fn transform_all<C: Mappable>(&self, sources: &[Source<'_>]) -> Result<Vec<C>, MappingError> {
        if let Some(first) = sources.first() {
            self.builder.validate(first, C::NAME)?;
        }
        sources.iter().map(|source| self.transform(source)).collect()
    }

    /// Map a source that must be a collection
    ///
    /// # Errors
    /// `UnsupportedSourceType` when `source` is not a collection.
    pub fn transform_collection<C: Mappable>(
        &self,
        source: &Source<'_>,
    ) -> Result<Vec<C>, MappingError> {
        match source {
            Source::Collection(items) => self.transform_all(items),
            other => Err(MappingError::UnsupportedSourceType {
                type_name: other.type_name(),
            }),
        }
    }
}

impl Default for Transformer {
    fn default() -> Self {
        Self::from_type(MappingType::default())
    }
}

impl std::fmt::Debug for Transformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformer").finish_non_exhaustive()
    }
}

/// One-shot [`Transformer::transform`] with the default builder of `mapping_type`
pub fn transform<C: Mappable>(
    mapping_type: MappingType,
    source: &Source<'_>,
) -> Result<C, MappingError> {
    Transformer::from_type(mapping_type).transform(source)
}

/// One-shot [`Transformer::transform_all`]
pub fn transform_all<C: Mappable>(
    mapping_type: MappingType,
    sources: &[Source<'_>],
) -> Result<Vec<C>, MappingError> {
    Transformer::from_type(mapping_type).transform_all(sources)
}

/// One-shot [`Transformer::transform_collection`]
pub fn transform_collection<C: Mappable>(
    mapping_type: MappingType,
    source: &Source<'_>,
) -> Result<Vec<C>, MappingError> {
    Transformer::from_type(mapping_type).transform_collection(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ObjectGraph, ObjectId};
    use crate::schema::{EntityDef, Schema};
    use crate::type_tag::{ScalarKind, TypeTag};
    use crate::value::Value;

    #[derive(Debug, PartialEq)]
    struct TagPlainObject {
        label: String,
    }

    impl Mappable for TagPlainObject {
        const NAME: &'static str = "TagPlainObject";

        fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
            Ok(Self {
                label: resolver.value("label")?,
            })
        }
    }

    fn graph_with_tags(labels: &[Option<&str>]) -> (ObjectGraph, Vec<ObjectId>) {
        let schema = Schema::from_entities(vec![
            EntityDef::new("TagModelObject")
                .attribute("label", TypeTag::optional(ScalarKind::String.into())),
            EntityDef::new("NoteModelObject"),
        ])
        .unwrap();
        let mut graph = ObjectGraph::new(schema);
        let mut ids = Vec::new();
        for label in labels {
            let id = graph.insert("TagModelObject").unwrap();
            if let Some(label) = label {
                graph.set_attribute(id, "label", *label).unwrap();
            }
            ids.push(id);
        }
        (graph, ids)
    }

    #[test]
    fn test_transform_single() {
        let (graph, ids) = graph_with_tags(&[Some("rust")]);
        let transformer = Transformer::default();

        let tag: TagPlainObject = transformer
            .transform(&graph.object(ids[0]).unwrap().into())
            .unwrap();
        assert_eq!(tag.label, "rust");
    }

    #[test]
    fn test_transform_rejects_wrong_destination() {
        let mut graph = graph_with_tags(&[]).0;
        let note = graph.insert("NoteModelObject").unwrap();

        let err = Transformer::default()
            .transform::<TagPlainObject>(&graph.object(note).unwrap().into())
            .unwrap_err();
        assert_eq!(
            err,
            MappingError::SourceDestinationTypeMismatch {
                source: "Note".to_string(),
                destination: "Tag".to_string(),
            }
        );
    }

    #[test]
    fn test_transform_all_empty() {
        let tags: Vec<TagPlainObject> = Transformer::default().transform_all(&[]).unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_transform_all_fails_fast() {
        let (graph, ids) = graph_with_tags(&[Some("a"), Some("b"), None, Some("d")]);
        let sources: Vec<Source> = ids
            .iter()
            .map(|id| graph.object(*id).unwrap().into())
            .collect();

        let err = Transformer::default()
            .transform_all::<TagPlainObject>(&sources)
            .unwrap_err();
        assert_eq!(err, MappingError::missing_key("label"));
    }

    #[test]
    fn test_transform_collection_requires_collection() {
        let err = transform_collection::<TagPlainObject>(
            MappingType::ManagedObject,
            &Source::Value(Value::from("tags")),
        )
        .unwrap_err();

        assert_eq!(
            err,
            MappingError::UnsupportedSourceType {
                type_name: "String".to_string()
            }
        );
    }

    #[test]
    fn test_transform_collection() {
        let (graph, _) = graph_with_tags(&[Some("a"), Some("b")]);
        let source: Source = graph.objects_of("TagModelObject").collect();

        let tags: Vec<TagPlainObject> =
            transform_collection(MappingType::ManagedObject, &source).unwrap();
        let labels: Vec<&str> = tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_from_config_uses_custom_prefixes() {
        let config = TransformerConfig {
            model_object_prefix: "Model".to_string(),
            plain_object_prefix: "PlainObject".to_string(),
            ..TransformerConfig::default()
        };
        let (graph, ids) = graph_with_tags(&[Some("x")]);

        // "TagModelObject" becomes "TagObject", which no longer matches "Tag".
        let err = Transformer::from_config(&config)
            .transform::<TagPlainObject>(&graph.object(ids[0]).unwrap().into())
            .unwrap_err();
        assert!(matches!(err, MappingError::SourceDestinationTypeMismatch { .. }));
    }
}
