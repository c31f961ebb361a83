//! Transformer configuration loaded from YAML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::managed::{DEFAULT_MODEL_OBJECT_PREFIX, DEFAULT_PLAIN_OBJECT_PREFIX};
use crate::builder::MappingType;
use crate::error::GraphError;
use crate::schema::Schema;

/// Transformer settings.
///
/// ```yaml
/// mapping_type: managed_object
/// model_object_prefix: ModelObject
/// plain_object_prefix: PlainObject
/// schema: schema.yaml
/// ```
///
/// Every field is optional; defaults match [`ManagedObjectBuilder::new`](crate::ManagedObjectBuilder::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    pub mapping_type: MappingType,
    pub model_object_prefix: String,
    pub plain_object_prefix: String,
    /// Schema file, relative paths are resolved against the config file
    pub schema: Option<PathBuf>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            mapping_type: MappingType::default(),
            model_object_prefix: DEFAULT_MODEL_OBJECT_PREFIX.to_string(),
            plain_object_prefix: DEFAULT_PLAIN_OBJECT_PREFIX.to_string(),
            schema: None,
        }
    }
}

impl TransformerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is not valid YAML
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let mut config: TransformerConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML: {}", e))?;

        if let Some(dir) = path.parent() {
            config.schema = config.schema.take().map(|schema| {
                if schema.is_relative() {
                    dir.join(schema)
                } else {
                    schema
                }
            });
        }

        Ok(config)
    }

    /// Load the schema the configuration points at
    pub fn load_schema(&self) -> Result<Schema, GraphError> {
        let path = self
            .schema
            .as_ref()
            .ok_or_else(|| GraphError::InvalidSchema("No schema path configured".to_string()))?;
        Schema::load_from_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config: TransformerConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, TransformerConfig::default());
        assert_eq!(config.model_object_prefix, "ModelObject");
        assert_eq!(config.plain_object_prefix, "PlainObject");
    }

    #[test]
    fn test_load_resolves_schema_relative_to_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("transformer.yaml");
        let mut file = fs::File::create(&config_path).unwrap();
        writeln!(file, "mapping_type: coredata").unwrap();
        writeln!(file, "plain_object_prefix: Dto").unwrap();
        writeln!(file, "schema: schema.yaml").unwrap();

        fs::write(
            dir.path().join("schema.yaml"),
            "entities:\n  - name: UserModelObject\n",
        )
        .unwrap();

        let config = TransformerConfig::load_from_file(&config_path).unwrap();
        assert_eq!(config.plain_object_prefix, "Dto");
        assert_eq!(config.schema, Some(dir.path().join("schema.yaml")));

        let schema = config.load_schema().unwrap();
        assert!(schema.has_entity("UserModelObject"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TransformerConfig::load_from_file("/nonexistent/transformer.yaml").unwrap_err();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_schema_without_path() {
        let err = TransformerConfig::default().load_schema().unwrap_err();
        assert!(matches!(err, GraphError::InvalidSchema(_)));
    }
}
