//! Error types for catalog operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, descriptor errors, bundle validation, and checksum
//! verification.

use entity_schema_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading or generating a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Descriptor definition or generation failure.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Bundle validation failure (e.g., no descriptors).
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// Bundle hash does not match its descriptors.
    #[error("invalid checksum: {0}")]
    InvalidChecksum(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`CatalogError`].
pub type Result<T> = std::result::Result<T, CatalogError>;
