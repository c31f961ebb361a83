//! Inputs accepted by a transformer.

use crate::graph::ObjectRef;
use crate::value::Value;

/// A transform input: a managed object, a collection of inputs, or a plain
/// value (which builders reject as unsupported).
#[derive(Debug, Clone)]
pub enum Source<'g> {
    Object(ObjectRef<'g>),
    Collection(Vec<Source<'g>>),
    Value(Value),
}

impl<'g> Source<'g> {
    /// Runtime type name used in validation and diagnostics
    pub fn type_name(&self) -> String {
        match self {
            Source::Object(object) => object.entity_name().to_string(),
            Source::Collection(items) => match items.first() {
                Some(first) => format!("Array<{}>", first.type_name()),
                None => "Array<Any>".to_string(),
            },
            Source::Value(value) => value.kind().to_string(),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef<'g>> {
        match self {
            Source::Object(object) => Some(object),
            _ => None,
        }
    }
}

impl<'g> From<ObjectRef<'g>> for Source<'g> {
    fn from(object: ObjectRef<'g>) -> Self {
        Source::Object(object)
    }
}

impl From<Value> for Source<'_> {
    fn from(value: Value) -> Self {
        Source::Value(value)
    }
}

impl<'g> FromIterator<ObjectRef<'g>> for Source<'g> {
    fn from_iter<I: IntoIterator<Item = ObjectRef<'g>>>(iter: I) -> Self {
        Source::Collection(iter.into_iter().map(Source::Object).collect())
    }
}
