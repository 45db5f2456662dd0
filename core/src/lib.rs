//! Entity schema definitions and relation-aware normalization schemas.
//!
//! This crate turns declarations of entities and their relations into a
//! graph of schema nodes:
//!
//! - [`SchemaDescriptor`]: a named entity with ordered [`Attributes`],
//!   built with [`define_schema`].
//! - [`Attribute`]: a computed value, a single reference, or an array
//!   reference created with [`has_many`].
//! - [`SchemaRegistry`]: the generated nodes of one batch, indexed by
//!   name. Built by [`generate_schemas`].
//! - [`Schema`]: a view of one node answering
//!   [`is_related_to`](Schema::is_related_to) and
//!   [`get_relation`](Schema::get_relation).
//!
//! Generated registries feed [`normalize`], which flattens nested payloads
//! into id-indexed entity tables.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//! use serde_json::json;
//!
//! let task = define_schema("Task", Attributes::new().with("group", "Group")).unwrap();
//! let group = define_schema(
//!     "Group",
//!     Attributes::new().with("tasks", has_many(&task).unwrap()),
//! )
//! .unwrap();
//!
//! let registry = generate_schemas(&[task, group]).unwrap();
//! let task = registry.schema("Task").unwrap();
//!
//! assert!(task.is_related_to("Group"));
//! let relation = task.get_relation(&json!({"id": 1, "group": 4}), "Group").unwrap();
//! assert_eq!(relation.related_prop_name.as_deref(), Some("tasks"));
//! assert_eq!(relation.related_id, Some(json!(4)));
//! ```

mod error;
mod generate;
mod normalize;
mod package;
mod registry;
mod relation;
mod types;
mod validate;

pub use error::{Result, SchemaError};
pub use generate::{generate_schema, generate_schemas};
pub use normalize::{DEFAULT_ID_ATTRIBUTE, EntityTables, NormalizeOptions, Normalized, normalize};
pub use package::SchemaBundle;
pub use registry::{RelatedEntity, Schema, SchemaId, SchemaNode, SchemaRegistry, Slot};
pub use relation::Relation;
pub use types::*;
pub use validate::validate_descriptors;
