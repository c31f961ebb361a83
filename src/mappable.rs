//! Capabilities destination types implement to be built from a [`Resolver`].

use crate::error::MappingError;
use crate::resolver::{FromValue, Resolver};

/// A destination type that can be constructed from a resolver.
///
/// `NAME` is compared against the source entity name when a transformer
/// validates its input, after both names have their configured prefixes
/// removed (`UserPlainObject` matches `UserModelObject`).
///
/// # Example
///
/// ```
/// use transformer::{Mappable, MappingError, Resolver};
///
/// struct UserPlainObject {
///     name: String,
///     age: i64,
/// }
///
/// impl Mappable for UserPlainObject {
///     const NAME: &'static str = "UserPlainObject";
///
///     fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError> {
///         Ok(Self {
///             name: resolver.value("name")?,
///             age: resolver.value("age")?,
///         })
///     }
/// }
/// ```
pub trait Mappable: Sized {
    /// The name of this destination type
    const NAME: &'static str;

    /// Build an instance, failing with whatever the resolver reports
    fn from_resolver(resolver: &Resolver) -> Result<Self, MappingError>;
}

/// Enumeration-like types backed by a raw scalar.
pub trait RawRepresentable: Sized {
    type Raw: FromValue;

    /// Returns `None` when no case matches `raw`
    fn from_raw(raw: Self::Raw) -> Option<Self>;
}
