//! Typed, read-only access to the values of a [`Mapping`].

use chrono::{DateTime, Utc};

use crate::error::MappingError;
use crate::mappable::{Mappable, RawRepresentable};
use crate::mapping::Mapping;
use crate::type_tag::{ScalarKind, TypeTag};
use crate::value::Value;

/// Conversion out of a stored [`Value`].
///
/// `from_value` returns `None` when the stored value cannot represent `Self`;
/// the resolver turns that into [`MappingError::TypeMismatch`] with
/// `type_tag()` as the expected type.
pub trait FromValue: Sized {
    fn type_tag() -> TypeTag;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn type_tag() -> TypeTag {
        ScalarKind::Bool.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn type_tag() -> TypeTag {
        ScalarKind::Int.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for i32 {
    fn type_tag() -> TypeTag {
        ScalarKind::Int.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => i32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for u32 {
    fn type_tag() -> TypeTag {
        ScalarKind::Int.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => u32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn type_tag() -> TypeTag {
        ScalarKind::Float.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn type_tag() -> TypeTag {
        ScalarKind::String.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for DateTime<Utc> {
    fn type_tag() -> TypeTag {
        ScalarKind::Date.into()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl FromValue for Mapping {
    fn type_tag() -> TypeTag {
        TypeTag::Mapping
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_map().cloned()
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn type_tag() -> TypeTag {
        TypeTag::collection(T::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::optional(T::type_tag())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Read-only view over one mapping.
///
/// A resolver lives for exactly one construction call; nested mappable
/// values get their own resolver over the nested mapping.
#[derive(Debug, Clone)]
pub struct Resolver {
    mapping: Mapping,
}

impl Resolver {
    pub fn new(mapping: Mapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    pub fn contains(&self, key: &str) -> bool {
        self.mapping.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.mapping.keys()
    }

    /// The stored value for `key`, without conversion
    pub fn get(&self, key: &str) -> Result<&Value, MappingError> {
        self.mapping
            .get(key)
            .ok_or_else(|| MappingError::missing_key(key))
    }

    /// Returns the value for `key` converted to `T`
    ///
    /// # Errors
    ///
    /// * `MissingKey` - `key` is absent
    /// * `TypeMismatch` - the stored value is not a `T`
    pub fn value<T: FromValue>(&self, key: &str) -> Result<T, MappingError> {
        let value = self.get(key)?;
        T::from_value(value).ok_or_else(|| MappingError::type_mismatch(key, T::type_tag()))
    }

    /// Like [`Resolver::value`], but an absent key or a `Null` yields `None`.
    /// Values of the wrong type still fail.
    pub fn optional<T: FromValue>(&self, key: &str) -> Result<Option<T>, MappingError> {
        match self.mapping.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.value(key).map(Some),
        }
    }

    /// Resolves the raw value for `key`, then the matching case of `T`
    pub fn raw<T: RawRepresentable>(&self, key: &str) -> Result<T, MappingError> {
        let raw: T::Raw = self.value(key)?;
        T::from_raw(raw).ok_or_else(|| MappingError::type_mismatch(key, T::Raw::type_tag()))
    }

    /// Absent keys, unconvertible raw values and unknown cases all give `None`
    pub fn raw_optional<T: RawRepresentable>(&self, key: &str) -> Option<T> {
        self.value::<T::Raw>(key).ok().and_then(T::from_raw)
    }

    /// Resolves a list of raw values. Raw values with no matching case are
    /// dropped; a value that is not a list of `T::Raw` is a `TypeMismatch`.
    pub fn raw_list<T: RawRepresentable>(&self, key: &str) -> Result<Vec<T>, MappingError> {
        let raws: Vec<T::Raw> = self.value(key)?;
        Ok(raws.into_iter().filter_map(T::from_raw).collect())
    }

    /// Builds a nested mappable value from the mapping stored under `key`
    pub fn nested<T: Mappable>(&self, key: &str) -> Result<T, MappingError> {
        let mapping = self
            .get(key)?
            .as_map()
            .ok_or_else(|| MappingError::type_mismatch(key, TypeTag::Mapping))?;
        T::from_resolver(&Resolver::new(mapping.clone()))
    }

    /// Like [`Resolver::nested`], but an absent key or a `Null` yields `None`
    pub fn nested_optional<T: Mappable>(&self, key: &str) -> Result<Option<T>, MappingError> {
        match self.mapping.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.nested(key).map(Some),
        }
    }

    /// Builds every element of the list of mappings stored under `key`, in
    /// order. The first element that fails aborts the whole call.
    pub fn nested_list<T: Mappable>(&self, key: &str) -> Result<Vec<T>, MappingError> {
        let expected = || MappingError::type_mismatch(key, TypeTag::collection(TypeTag::Mapping));
        let items = self.get(key)?.as_list().ok_or_else(expected)?;
        let mappings = items
            .iter()
            .map(|item| item.as_map().ok_or_else(expected))
            .collect::<Result<Vec<_>, _>>()?;

        mappings
            .into_iter()
            .map(|mapping| T::from_resolver(&Resolver::new(mapping.clone())))
            .collect()
    }
}

impl From<Mapping> for Resolver {
    fn from(mapping: Mapping) -> Self {
        Resolver::new(mapping)
    }
}
