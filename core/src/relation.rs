//! Relation lookup between generated schemas.
//!
//! Inverse relations are never declared. They are discovered lazily by
//! scanning the related schema's own definition for a slot that nests the
//! current schema, so the result does not depend on generation order.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::registry::{SchemaId, SchemaNode, SchemaRegistry};

/// Relation between an entity instance and one of its related entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Name of the related schema.
    pub related: String,
    /// Attribute on the related schema pointing back, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_prop_name: Option<String>,
    /// Foreign key read off the entity; `None` when the attribute is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_id: Option<Value>,
}

/// First non-internal slot on `related` nesting `current`, either directly
/// or as the element schema of an array.
pub(crate) fn related_through(related: &SchemaNode, current: SchemaId) -> Option<&str> {
    related
        .definition()
        .iter()
        .filter(|(_, slot)| !slot.is_internal())
        .find(|(_, slot)| slot.schema() == Some(current))
        .map(|(prop, _)| prop.as_str())
}

pub(crate) fn get_relation(
    registry: &SchemaRegistry,
    schema: SchemaId,
    entity: &Value,
    related: &str,
) -> Result<Relation> {
    let node = registry.node(schema);
    let declared = node
        .related_entities()
        .iter()
        .find(|e| e.entity == related)
        .ok_or_else(|| SchemaError::UnknownRelation {
            schema: node.name().to_string(),
            related: related.to_string(),
        })?;

    let related_id = entity.get(&declared.prop).cloned();
    let related_node = registry
        .id(related)
        .map(|id| registry.node(id))
        .ok_or_else(|| SchemaError::UnresolvedReference {
            schema: node.name().to_string(),
            attribute: declared.prop.clone(),
            target: related.to_string(),
        })?;
    let related_prop_name = related_through(related_node, schema).map(str::to_string);

    debug!(
        schema = node.name(),
        related = related,
        prop = declared.prop.as_str(),
        back_reference = ?related_prop_name,
        "Resolved relation"
    );

    Ok(Relation {
        related: related.to_string(),
        related_prop_name,
        related_id,
    })
}
