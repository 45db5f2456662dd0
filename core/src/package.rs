use serde::{Deserialize, Serialize};

use crate::SchemaDescriptor;

/// Serializable descriptor bundle used for sharing schema sets.
///
/// A bundle groups every [`SchemaDescriptor`] of one generation batch with
/// version metadata, so a whole entity graph can be stored as a single
/// JSON or YAML file.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let mut bundle = SchemaBundle::new("1.0.0", "2024-01-15T10:30:00Z");
/// bundle.name = Some("task-board".into());
/// bundle.schemas.push(define_schema("User", Attributes::new()).unwrap());
/// bundle.schemas.push(define_schema("Task", Attributes::new().with("assignee", "User")).unwrap());
///
/// assert_eq!(bundle.schema_count(), 2);
/// assert!(bundle.generate().unwrap().schema("Task").unwrap().is_related_to("User"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaBundle {
    /// Descriptor contract version (populated from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION)).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
    /// Bundle format version (semver string).
    pub version: String,
    /// Optional bundle name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional bundle description.
    #[serde(default)]
    pub description: Option<String>,
    /// ISO-8601 timestamp for bundle creation.
    pub generated_at: String,
    /// Optional hash of the bundled descriptors.
    #[serde(default)]
    pub bundle_hash: Option<String>,
    /// Descriptors included in this bundle.
    pub schemas: Vec<SchemaDescriptor>,
}

impl SchemaBundle {
    /// Creates a bundle with required fields.
    ///
    /// The `schema_version` is automatically set from
    /// [`SCHEMA_CONTRACT_VERSION`](crate::SCHEMA_CONTRACT_VERSION).
    pub fn new(version: impl Into<String>, generated_at: impl Into<String>) -> Self {
        Self {
            schema_version: Some(crate::SCHEMA_CONTRACT_VERSION.to_string()),
            version: version.into(),
            name: None,
            description: None,
            generated_at: generated_at.into(),
            bundle_hash: None,
            schemas: Vec::new(),
        }
    }

    /// Returns the number of descriptors in this bundle.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Generates the bundled descriptors as one batch.
    pub fn generate(&self) -> crate::Result<crate::SchemaRegistry> {
        crate::generate_schemas(&self.schemas)
    }
}
