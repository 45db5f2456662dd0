//! Flattening of nested payloads into id-indexed entity tables.
//!
//! [`normalize`] walks a payload along a generated schema's nested
//! definition. Every nested entity object is moved into the table of its
//! schema and replaced by its id, so a response like
//! `{"id": 1, "owner": {"id": 9, ..}}` becomes
//! `{"id": 1, "owner": 9}` plus a `User` table entry for `9`.
//!
//! # Example
//!
//! ```
//! use entity_schema_core::*;
//! use serde_json::json;
//!
//! let user = define_schema("User", Attributes::new()).unwrap();
//! let group = define_schema(
//!     "Group",
//!     Attributes::new().with("owner", "User").with("members", has_many("User").unwrap()),
//! )
//! .unwrap();
//! let registry = generate_schemas(&[user, group]).unwrap();
//!
//! let payload = json!({
//!     "id": 1,
//!     "owner": {"id": 9, "name": "ada"},
//!     "members": [{"id": 9, "name": "ada"}, {"id": 4, "name": "bob"}],
//! });
//! let normalized = normalize(&registry, "Group", &payload, &NormalizeOptions::default()).unwrap();
//!
//! assert_eq!(normalized.result, json!(1));
//! assert_eq!(normalized.entities["Group"]["1"], json!({"id": 1, "owner": 9, "members": [9, 4]}));
//! assert_eq!(normalized.entities["User"].len(), 2);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::registry::{SchemaId, SchemaRegistry, Slot};
use crate::types::value_kind;

/// Default attribute holding an entity's id.
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

/// Options for [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeOptions {
    /// Attribute holding each entity's id.
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
}

fn default_id_attribute() -> String {
    DEFAULT_ID_ATTRIBUTE.to_string()
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
        }
    }
}

/// Entity tables keyed by schema name, then by stringified id.
pub type EntityTables = BTreeMap<String, BTreeMap<String, Value>>;

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    /// Id of the root entity, or an array of ids for an array payload.
    pub result: Value,
    /// Flattened entities.
    pub entities: EntityTables,
}

/// Flattens `payload` (one entity object or an array of them) using the
/// schema called `schema`.
///
/// Reference slots holding objects are replaced by the nested entity's id;
/// scalars and `null` pass through unchanged, so already-normalized
/// payloads are accepted. An array in a single-reference slot, or a
/// non-array in an array-reference slot, is rejected. Entities seen more
/// than once are merged shallowly, later keys winning.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownSchema`] for an unknown root schema,
/// [`SchemaError::MissingEntityId`] when an entity object lacks its id,
/// and [`SchemaError::InvalidPayload`] when the payload shape does not
/// match the definition.
pub fn normalize(
    registry: &SchemaRegistry,
    schema: &str,
    payload: &Value,
    options: &NormalizeOptions,
) -> Result<Normalized> {
    let root = registry.try_schema(schema)?.id();
    let mut normalizer = Normalizer {
        registry,
        options,
        entities: EntityTables::new(),
    };

    let result = match payload {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| normalizer.visit_entity(root, item))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Object(_) => normalizer.visit_entity(root, payload)?,
        other => {
            return Err(SchemaError::InvalidPayload(format!(
                "expected an object or array for {schema}, got {}",
                value_kind(other)
            )));
        }
    };

    debug!(
        schema = schema,
        tables = normalizer.entities.len(),
        "Normalized payload"
    );

    Ok(Normalized {
        result,
        entities: normalizer.entities,
    })
}

struct Normalizer<'a> {
    registry: &'a SchemaRegistry,
    options: &'a NormalizeOptions,
    entities: EntityTables,
}

impl Normalizer<'_> {
    fn visit_entity(&mut self, schema: SchemaId, entity: &Value) -> Result<Value> {
        let Value::Object(fields) = entity else {
            return Ok(entity.clone());
        };
        let node = self.registry.node(schema);

        let id = fields
            .get(&self.options.id_attribute)
            .filter(|id| !id.is_null())
            .cloned()
            .ok_or_else(|| SchemaError::MissingEntityId {
                schema: node.name().to_string(),
                attribute: self.options.id_attribute.clone(),
            })?;

        let mut flat = fields.clone();
        for (prop, slot) in node.definition() {
            let Some(value) = fields.get(prop) else {
                continue;
            };
            match slot {
                Slot::Computed(_) => {}
                Slot::Entity(_) if value.is_array() => {
                    return Err(SchemaError::InvalidPayload(format!(
                        "{}.{prop} expected a single entity, got array",
                        node.name()
                    )));
                }
                Slot::Entity(target) => {
                    let nested = self.visit_entity(*target, value)?;
                    flat.insert(prop.clone(), nested);
                }
                Slot::ArrayOf(target) => match value {
                    Value::Array(items) => {
                        let ids = items
                            .iter()
                            .map(|item| self.visit_entity(*target, item))
                            .collect::<Result<Vec<_>>>()?;
                        flat.insert(prop.clone(), Value::Array(ids));
                    }
                    Value::Null => {}
                    other => {
                        return Err(SchemaError::InvalidPayload(format!(
                            "{}.{prop} expected an array, got {}",
                            node.name(),
                            value_kind(other)
                        )));
                    }
                },
            }
        }

        self.store(node.name(), table_key(&id), flat);
        Ok(id)
    }

    fn store(&mut self, schema: &str, key: String, flat: Map<String, Value>) {
        let table = self.entities.entry(schema.to_string()).or_default();
        match table.get_mut(&key) {
            Some(Value::Object(existing)) => existing.extend(flat),
            _ => {
                table.insert(key, Value::Object(flat));
            }
        }
    }
}

fn table_key(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
