//! Error types for schema definition, generation, and relation lookup.
//!
//! Every variant is a configuration-time failure: it is raised at the
//! boundary of the public operation that detected it and never retried.

use thiserror::Error;

/// Errors raised while defining, generating, or querying entity schemas.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema name is empty.
    #[error("schema name cannot be empty")]
    InvalidName,
    /// Attributes are present but not a mapping, or an attribute has an
    /// unrecognized shape.
    #[error("invalid attributes: {0}")]
    InvalidAttributes(String),
    /// `has_many` target is empty or is neither a name nor a named schema.
    #[error("invalid schema reference: {0}")]
    InvalidSchema(String),
    /// Batch generation input is empty or not a sequence.
    #[error("invalid schemas: {0}")]
    InvalidSchemas(String),
    /// An attribute references a schema that is not part of the batch.
    #[error("schema {schema} attribute {attribute} references unknown schema {target}")]
    UnresolvedReference {
        /// Schema declaring the attribute.
        schema: String,
        /// Attribute holding the reference.
        attribute: String,
        /// Name that could not be resolved.
        target: String,
    },
    /// Two descriptors in the same batch share a name.
    #[error("duplicate schema in batch: {0}")]
    DuplicateSchema(String),
    /// Lookup of a schema name that is not in the registry.
    #[error("unknown schema: {0}")]
    UnknownSchema(String),
    /// Relation lookup for an entity the schema never declared a reference to.
    #[error("schema {schema} has no relation to {related}")]
    UnknownRelation {
        /// Schema the lookup was made on.
        schema: String,
        /// Requested related entity name.
        related: String,
    },
    /// Entity object passed to the normalizer has no usable id.
    #[error("{schema} entity is missing id attribute {attribute}")]
    MissingEntityId {
        /// Schema of the entity being flattened.
        schema: String,
        /// Configured id attribute.
        attribute: String,
    },
    /// Payload shape does not match the schema definition.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Convenience alias for results with [`SchemaError`].
pub type Result<T> = std::result::Result<T, SchemaError>;
