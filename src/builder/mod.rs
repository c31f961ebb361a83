//! Mapping data builders: strategies that validate a source against a
//! destination type and flatten it into a [`Mapping`].

pub mod managed;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;
use crate::mapping::Mapping;
use crate::source::Source;

pub use managed::ManagedObjectBuilder;

/// Strategy used by a transformer.
///
/// Builders hold no per-call state, so one instance can serve any number of
/// transforms, including from several threads.
pub trait MappingDataBuilder: Send + Sync {
    /// Check that `source` can be mapped to the destination type named
    /// `destination`.
    ///
    /// # Errors
    /// `SourceDestinationTypeMismatch` when the names do not correspond.
    fn validate(&self, source: &Source<'_>, destination: &str) -> Result<(), MappingError>;

    /// Compare a source type name with a destination type name, the check
    /// `validate` applies to a single source
    fn names_match(&self, source: &str, destination: &str) -> Result<(), MappingError>;

    /// Flatten `source` into a mapping of its properties
    fn flatten(&self, source: &Source<'_>) -> Result<Mapping, MappingError>;

    /// Flatten every source in order, stopping at the first failure
    fn flatten_all(&self, sources: &[Source<'_>]) -> Result<Vec<Mapping>, MappingError> {
        sources.iter().map(|source| self.flatten(source)).collect()
    }
}

/// Named selector for a default builder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    #[default]
    #[serde(alias = "coredata")]
    ManagedObject,
}

impl MappingType {
    pub fn builder(&self) -> Box<dyn MappingDataBuilder> {
        match self {
            MappingType::ManagedObject => Box::new(ManagedObjectBuilder::new()),
        }
    }
}
