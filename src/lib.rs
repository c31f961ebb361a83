//! # Transformer: Schema-Driven Object Mapping
//!
//! Transformer converts managed objects (entity instances of an object graph)
//! into flat, string-keyed mappings and builds typed plain models from them.
//!
//! ## Features
//!
//! - **Explicit schemas**: entities, attributes and relationships (with inverses) are
//!   described in YAML or built in code; no runtime introspection
//! - **Cycle-safe flattening**: bidirectional relationships are flattened once, the
//!   inverse side is left out
//! - **Typed resolution**: `Resolver` converts stored values into scalars, enumerations,
//!   nested models and lists of nested models, with precise errors
//! - **Pluggable builders**: `MappingDataBuilder` strategies decide how sources are
//!   validated and flattened
//!
//! ## Example: Schema
//!
//! ```yaml
//! entities:
//!   - name: UserModelObject
//!     properties:
//!       - name: name
//!         kind: attribute
//!         type: string
//!       - name: address
//!         kind: to_one
//!         target: AddressModelObject
//!         inverse: user
//!   - name: AddressModelObject
//!     properties:
//!       - name: city
//!         kind: attribute
//!         type: string
//!       - name: user
//!         kind: to_one
//!         target: UserModelObject
//!         inverse: address
//! ```
//!
//! ## Example: Destination Model
//!
//! ```ignore
//! struct UserPlainObject {
//!     name: String,
//!     address: AddressPlainObject,
//! }
//!
//! impl Mappable for UserPlainObject {
//!     const NAME: &'static str = "UserPlainObject";
//!
//!     fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
//!         Ok(Self {
//!             name: resolver.value("name")?,
//!             address: resolver.nested("address")?,
//!         })
//!     }
//! }
//!
//! let user: UserPlainObject = Transformer::default().transform(&graph.object(id).unwrap().into())?;
//! ```

// Core modules
pub mod error;
pub mod type_tag;
pub mod value;
pub mod mapping;
pub mod resolver;
pub mod mappable;

// Object graph and its schema
pub mod schema;
pub mod graph;
pub mod source;

// Builders and orchestration
pub mod builder;
pub mod transformer;
pub mod config;
pub mod serialization;

// Re-export key types
pub use error::{GraphError, MappingError};
pub use type_tag::{ScalarKind, TypeTag};
pub use value::{Value, ValueKind};
pub use mapping::Mapping;
pub use resolver::{FromValue, Resolver};
pub use mappable::{Mappable, RawRepresentable};

pub use schema::{EntityDef, PropertyDef, PropertyKind, Schema};
pub use graph::{ManagedObject, ObjectGraph, ObjectId, ObjectRef, PropertyValue};
pub use source::Source;

pub use builder::{ManagedObjectBuilder, MappingDataBuilder, MappingType};
pub use transformer::Transformer;
pub use config::TransformerConfig;
pub use serialization::{MappingWriter, OutputFormat, SerializationError};
