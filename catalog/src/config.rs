//! Catalog configuration.
//!
//! Defines the YAML-serializable configuration that controls which
//! schemas of a catalog are generated and how payloads are normalized.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! include:
//!   - Group
//!   - Task
//! exclude:
//!   - AuditLog
//! normalize:
//!   id_attribute: id
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use entity_schema_core::{NormalizeOptions, SchemaDescriptor};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Top-level catalog configuration.
///
/// Loaded from a YAML file (typically `entity-schema.yml` next to the
/// descriptor files).
///
/// # Examples
///
/// ```no_run
/// use entity_schema_catalog::CatalogConfig;
///
/// let config = CatalogConfig::load("entity-schema.yml").unwrap();
/// if config.is_included("Task") {
///     println!("Task will be generated");
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Schemas to generate (empty = every loaded schema).
    #[serde(default)]
    pub include: Vec<String>,
    /// Schemas to explicitly skip.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Normalizer settings.
    #[serde(default)]
    pub normalize: NormalizeOptions,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            normalize: NormalizeOptions::default(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::CatalogError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::CatalogError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::CatalogError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `schema` is in the exclusion list.
    pub fn is_excluded(&self, schema: &str) -> bool {
        self.exclude.iter().any(|s| s == schema)
    }

    /// Returns `true` if `schema` should be generated.
    ///
    /// When the include list is empty, all non-excluded schemas are
    /// implicitly included. Exclusions are always honored.
    ///
    /// # Examples
    ///
    /// ```
    /// # let yaml = r#"
    /// # version: "1.0"
    /// # include: [Group, Task]
    /// # exclude: [Task]
    /// # "#;
    /// # let config: entity_schema_catalog::CatalogConfig = serde_yaml::from_str(yaml).unwrap();
    /// assert!(config.is_included("Group"));
    /// assert!(!config.is_included("User"));
    /// assert!(!config.is_included("Task"));
    /// ```
    pub fn is_included(&self, schema: &str) -> bool {
        if self.is_excluded(schema) {
            return false;
        }
        if self.include.is_empty() {
            return true;
        }
        self.include.iter().any(|s| s == schema)
    }

    /// Keeps only the descriptors this configuration includes.
    pub fn filter<'a>(
        &self,
        descriptors: impl IntoIterator<Item = &'a SchemaDescriptor>,
    ) -> Vec<SchemaDescriptor> {
        descriptors
            .into_iter()
            .filter(|d| self.is_included(&d.name))
            .cloned()
            .collect()
    }
}
