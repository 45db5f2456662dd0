//! Schema generation.
//!
//! [`generate_schemas`] bootstraps a [`SchemaRegistry`] with one empty node
//! per descriptor, then fills every node with [`generate_schema`]. Because
//! every name is allocated before any definition is built, schemas may
//! reference each other (or themselves) in any order.

use tracing::debug;

use crate::error::{Result, SchemaError};
use crate::registry::{RelatedEntity, SchemaId, SchemaRegistry, Slot};
use crate::types::{Attribute, SchemaDescriptor};
use crate::validate::validate_descriptors;

/// Generates one schema node in place.
///
/// Attributes are classified in declaration order: computed attributes
/// become internal slots, single references nest the related node, and
/// array references nest an array of it. Every reference is also recorded
/// in the node's related entities.
///
/// The node keeps its [`SchemaId`], so slots on other nodes that already
/// point at it stay valid.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownSchema`] if the descriptor was not
/// bootstrapped into `registry`, or [`SchemaError::UnresolvedReference`] if
/// an attribute names a schema the registry does not hold.
pub fn generate_schema(
    descriptor: &SchemaDescriptor,
    registry: &mut SchemaRegistry,
) -> Result<SchemaId> {
    let id = registry
        .id(&descriptor.name)
        .ok_or_else(|| SchemaError::UnknownSchema(descriptor.name.clone()))?;

    let mut definition = Vec::with_capacity(descriptor.attributes.len());
    let mut related_entities = Vec::new();

    for (prop, attribute) in descriptor.attributes.iter() {
        let slot = match attribute {
            Attribute::Computed(f) => Slot::Computed(f.clone()),
            Attribute::One(target) => {
                let target_id = resolve(registry, descriptor, prop, target)?;
                related_entities.push(RelatedEntity {
                    prop: prop.to_string(),
                    entity: target.clone(),
                });
                Slot::Entity(target_id)
            }
            Attribute::Many(target) => {
                let target_id = resolve(registry, descriptor, prop, target)?;
                related_entities.push(RelatedEntity {
                    prop: prop.to_string(),
                    entity: target.clone(),
                });
                Slot::ArrayOf(target_id)
            }
        };
        definition.push((prop.to_string(), slot));
    }

    debug!(
        schema = descriptor.name.as_str(),
        attributes = definition.len(),
        relations = related_entities.len(),
        "Generated schema"
    );

    registry.node_mut(id).define(definition, related_entities);
    Ok(id)
}

fn resolve(
    registry: &SchemaRegistry,
    descriptor: &SchemaDescriptor,
    prop: &str,
    target: &str,
) -> Result<SchemaId> {
    registry
        .id(target)
        .ok_or_else(|| SchemaError::UnresolvedReference {
            schema: descriptor.name.clone(),
            attribute: prop.to_string(),
            target: target.to_string(),
        })
}

/// Generates a registry of schema nodes from a batch of descriptors.
///
/// Descriptors are validated eagerly; on any error nothing is returned.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidSchemas`] for an empty batch, or the first
/// error reported by [`validate_descriptors`] (duplicate names, unresolved
/// references, ...).
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let a = define_schema("A", Attributes::new().with("b", "B")).unwrap();
/// let b = define_schema("B", Attributes::new().with("as", has_many(&a).unwrap())).unwrap();
///
/// let registry = generate_schemas(&[a, b]).unwrap();
/// assert!(registry.schema("A").unwrap().is_related_to("B"));
/// assert!(registry.schema("B").unwrap().is_related_to("A"));
///
/// assert!(matches!(generate_schemas(&[]), Err(SchemaError::InvalidSchemas(_))));
/// ```
pub fn generate_schemas(descriptors: &[SchemaDescriptor]) -> Result<SchemaRegistry> {
    if descriptors.is_empty() {
        return Err(SchemaError::InvalidSchemas(
            "schema list is empty".to_string(),
        ));
    }
    if let Some(err) = validate_descriptors(descriptors).into_iter().next() {
        return Err(err);
    }

    let mut registry = SchemaRegistry::bootstrap(descriptors)?;
    for descriptor in descriptors {
        generate_schema(descriptor, &mut registry)?;
    }

    debug!(schemas = registry.len(), "Generated schema registry");
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{Attributes, descriptors_from_value, define_schema, has_many};

    use super::*;

    fn pair() -> (SchemaDescriptor, SchemaDescriptor) {
        let a = define_schema("A", Attributes::new().with("b", "B")).unwrap();
        let b = define_schema("B", Attributes::new().with("as", has_many(&a).unwrap())).unwrap();
        (a, b)
    }

    fn shape(registry: &SchemaRegistry) -> Vec<(String, Vec<(String, String, bool)>)> {
        let mut shape: Vec<_> = registry
            .iter()
            .map(|schema| {
                let slots = schema
                    .definition()
                    .iter()
                    .map(|(prop, slot)| {
                        let nested = schema.nested(prop).map(|s| s.name().to_string());
                        (
                            prop.clone(),
                            nested.unwrap_or_default(),
                            matches!(slot, Slot::ArrayOf(_)),
                        )
                    })
                    .collect();
                (schema.name().to_string(), slots)
            })
            .collect();
        shape.sort();
        shape
    }

    #[test]
    fn test_generate_mutual_references() {
        let (a, b) = pair();
        let registry = generate_schemas(&[a, b]).unwrap();

        let a = registry.schema("A").unwrap();
        let b = registry.schema("B").unwrap();
        assert!(a.is_related_to("B"));
        assert!(b.is_related_to("A"));
        assert!(!a.is_related_to("A"));
        assert!(!b.is_related_to("Nope"));

        let relation = a.get_relation(&json!({"id": 1, "b": 5}), "B").unwrap();
        assert_eq!(relation.related, "B");
        assert_eq!(relation.related_prop_name.as_deref(), Some("as"));
        assert_eq!(relation.related_id, Some(json!(5)));
    }

    #[test]
    fn test_generate_self_reference() {
        let node = define_schema("Node", Attributes::new().with("parent", "Node")).unwrap();
        let registry = generate_schemas(&[node]).unwrap();

        let node = registry.schema("Node").unwrap();
        assert_eq!(node.nested("parent").unwrap().id(), node.id());
        let relation = node.get_relation(&json!({"id": 2, "parent": 1}), "Node").unwrap();
        assert_eq!(relation.related_prop_name.as_deref(), Some("parent"));
    }

    #[test]
    fn test_generate_is_order_independent() {
        let (a, b) = pair();
        let forward = generate_schemas(&[a.clone(), b.clone()]).unwrap();
        let backward = generate_schemas(&[b, a]).unwrap();
        assert_eq!(shape(&forward), shape(&backward));
    }

    #[test]
    fn test_generate_records_related_entities_in_order() {
        let group = define_schema(
            "Group",
            Attributes::new()
                .with_computed("size", |e| json!(e["tasks"].as_array().map_or(0, Vec::len)))
                .with("owner", "User")
                .with("tasks", has_many("Task").unwrap()),
        )
        .unwrap();
        let user = define_schema("User", Attributes::new()).unwrap();
        let task = define_schema("Task", Attributes::new()).unwrap();
        let registry = generate_schemas(&[group, user, task]).unwrap();

        let group = registry.schema("Group").unwrap();
        let related: Vec<(&str, &str)> = group
            .related_entities()
            .iter()
            .map(|e| (e.prop.as_str(), e.entity.as_str()))
            .collect();
        assert_eq!(related, vec![("owner", "User"), ("tasks", "Task")]);
        assert_eq!(group.definition().len(), 3);
        assert!(group.definition()[0].1.is_internal());
        assert_eq!(
            group.computed_values(&json!({"tasks": [1, 2, 3]})).get("size"),
            Some(&json!(3))
        );
    }

    #[test]
    fn test_generate_rejects_empty_batch() {
        assert!(matches!(
            generate_schemas(&[]),
            Err(SchemaError::InvalidSchemas(_))
        ));
        assert!(matches!(
            descriptors_from_value(&json!(null)),
            Err(SchemaError::InvalidSchemas(_))
        ));
    }

    #[test]
    fn test_generate_rejects_unresolved_reference() {
        let a = define_schema("A", Attributes::new().with("b", "B")).unwrap();
        assert_eq!(
            generate_schemas(&[a]).unwrap_err(),
            SchemaError::UnresolvedReference {
                schema: "A".to_string(),
                attribute: "b".to_string(),
                target: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_generate_schema_requires_bootstrap() {
        let (a, b) = pair();
        let mut registry = SchemaRegistry::bootstrap(&[a]).unwrap();
        assert_eq!(
            generate_schema(&b, &mut registry).unwrap_err(),
            SchemaError::UnknownSchema("B".to_string())
        );
    }

    #[test]
    fn test_generate_schema_keeps_node_identity() {
        let (a, b) = pair();
        let mut registry = SchemaRegistry::bootstrap(&[a.clone(), b.clone()]).unwrap();
        let a_id = generate_schema(&a, &mut registry).unwrap();
        let b_id = registry.id("B").unwrap();
        assert_eq!(registry.schema("A").unwrap().nested("b").unwrap().id(), b_id);

        assert_eq!(generate_schema(&b, &mut registry).unwrap(), b_id);
        assert_eq!(registry.schema("A").unwrap().nested("b").unwrap().id(), b_id);
        assert_eq!(registry.schema("B").unwrap().nested("as").unwrap().id(), a_id);
    }
}
