//! Untyped values stored in a [`Mapping`] and in managed-object attributes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mapping::Mapping;
use crate::type_tag::{ScalarKind, TypeTag};

/// Represents different kinds of values a mapping can hold
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Date(DateTime<Utc>),
    List(Vec<Value>),
    Map(Mapping),
}

/// Kind tag of a [`Value`], used in diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Date,
    List,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "Null",
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Float => "Float",
            ValueKind::String => "String",
            ValueKind::Date => "Date",
            ValueKind::List => "List",
            ValueKind::Map => "Mapping",
        };
        f.write_str(name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Date(_) => ValueKind::Date,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Check whether this value may be stored under an attribute of type `tag`.
    ///
    /// Integers are accepted for `Float` attributes. Entity tags never match
    /// plain values; relationships are not attributes.
    pub fn conforms_to(&self, tag: &TypeTag) -> bool {
        match (tag, self) {
            (TypeTag::Optional(_), Value::Null) => true,
            (TypeTag::Optional(inner), value) => value.conforms_to(inner),
            (TypeTag::Collection(inner), Value::List(items)) => {
                items.iter().all(|item| item.conforms_to(inner))
            }
            (TypeTag::Mapping, Value::Map(_)) => true,
            (TypeTag::Scalar(kind), value) => matches!(
                (kind, value),
                (ScalarKind::Bool, Value::Bool(_))
                    | (ScalarKind::Int, Value::Int(_))
                    | (ScalarKind::Float, Value::Float(_) | Value::Int(_))
                    | (ScalarKind::String, Value::String(_))
                    | (ScalarKind::Date, Value::Date(_))
            ),
            _ => false,
        }
    }

    /// Coerce a loosely typed value (for example one read from YAML or JSON)
    /// towards `tag`: RFC 3339 strings become dates and integers become floats.
    /// Values that cannot be coerced are returned unchanged.
    pub fn coerce_to(self, tag: &TypeTag) -> Value {
        match (tag, self) {
            (TypeTag::Optional(_), Value::Null) => Value::Null,
            (TypeTag::Optional(inner), value) => value.coerce_to(inner),
            (TypeTag::Collection(inner), Value::List(items)) => {
                Value::List(items.into_iter().map(|item| item.coerce_to(inner)).collect())
            }
            (TypeTag::Scalar(ScalarKind::Date), Value::String(s)) => {
                match DateTime::parse_from_rfc3339(&s) {
                    Ok(date) => Value::Date(date.with_timezone(&Utc)),
                    Err(_) => Value::String(s),
                }
            }
            (TypeTag::Scalar(ScalarKind::Float), Value::Int(i)) => Value::Float(i as f64),
            (_, value) => value,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::List(l) => write!(f, "{:?}", l),
            Value::Map(m) => write!(f, "{:?}", m),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => Value::List(arr.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self {
        Value::Date(d)
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
