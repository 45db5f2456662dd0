//! File-backed catalogs of entity schema descriptors.
//!
//! This crate loads [`SchemaDescriptor`](entity_schema_core::SchemaDescriptor)s
//! from disk (directories of JSON/YAML files or single bundle files),
//! filters them through a YAML [`CatalogConfig`], and generates the
//! resulting schema registry.
//!
//! # Quick start
//!
//! ```no_run
//! use entity_schema_catalog::{CatalogConfig, SchemaCatalog};
//!
//! // Load descriptors from a directory
//! let catalog = SchemaCatalog::from_dir("schemas/").unwrap();
//! let registry = catalog.generate().unwrap();
//! if let Some(task) = registry.schema("Task") {
//!     println!("Task has {} relations", task.related_entities().len());
//! }
//!
//! // Restrict generation with a config file
//! let config = CatalogConfig::load("entity-schema.yml").unwrap();
//! let registry = catalog.generate_with(&config).unwrap();
//! ```

mod bundle;
mod config;
mod error;
mod loader;

pub use bundle::{compute_bundle_hash, read_bundle, seal_bundle, verify_bundle, write_bundle};
pub use config::CatalogConfig;
pub use error::{CatalogError, Result};
pub use loader::{CatalogBuilder, CatalogSource, SchemaCatalog};
