//! Arena of generated schema nodes indexed by name.
//!
//! Nodes refer to each other by [`SchemaId`], which makes forward,
//! mutual, and self references representable without shared ownership.
//! The registry is allocated in one pass (one empty node per name) and
//! filled in a second pass by the generator.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};
use crate::relation::{self, Relation};
use crate::types::{ComputedFn, SchemaDescriptor};

/// Stable index of a node inside a [`SchemaRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

/// One entry of a node's nested definition.
#[derive(Clone)]
pub enum Slot {
    /// Computed value; internal to the node and never a relation.
    Computed(ComputedFn),
    /// Nested entity of another schema.
    Entity(SchemaId),
    /// Array of nested entities of another schema.
    ArrayOf(SchemaId),
}

impl Slot {
    /// Internal slots are skipped by back-reference discovery.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Computed(_))
    }

    /// Schema the slot nests, if any.
    pub fn schema(&self) -> Option<SchemaId> {
        match self {
            Self::Computed(_) => None,
            Self::Entity(id) | Self::ArrayOf(id) => Some(*id),
        }
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
            Self::Entity(id) => f.debug_tuple("Entity").field(id).finish(),
            Self::ArrayOf(id) => f.debug_tuple("ArrayOf").field(id).finish(),
        }
    }
}

/// A declared reference from one attribute to a related schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedEntity {
    /// Attribute holding the reference.
    pub prop: String,
    /// Name of the referenced schema.
    pub entity: String,
}

/// Compiled, relation-aware representation of one entity schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    name: String,
    definition: Vec<(String, Slot)>,
    related_entities: Vec<RelatedEntity>,
}

impl SchemaNode {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Replaces the node's contents in place; its [`SchemaId`] is unchanged.
    pub(crate) fn define(
        &mut self,
        definition: Vec<(String, Slot)>,
        related_entities: Vec<RelatedEntity>,
    ) {
        self.definition = definition;
        self.related_entities = related_entities;
    }

    /// Schema name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity key used to compare nodes during back-reference discovery.
    pub fn key(&self) -> &str {
        &self.name
    }

    /// Nested definition in attribute declaration order.
    pub fn definition(&self) -> &[(String, Slot)] {
        &self.definition
    }

    /// Looks up one slot of the nested definition.
    pub fn slot(&self, prop: &str) -> Option<&Slot> {
        self.definition
            .iter()
            .find(|(name, _)| name == prop)
            .map(|(_, slot)| slot)
    }

    /// One entry per non-computed attribute, in declaration order.
    pub fn related_entities(&self) -> &[RelatedEntity] {
        &self.related_entities
    }

    /// Returns `true` if any attribute references `entity`.
    pub fn is_related_to(&self, entity: &str) -> bool {
        self.related_entities.iter().any(|e| e.entity == entity)
    }
}

/// Per-generation mapping from schema name to [`SchemaNode`].
///
/// Created by [`generate_schemas`](crate::generate_schemas); lookups by
/// name return a [`Schema`] view that can follow references.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let node = define_schema("Node", Attributes::new().with("parent", "Node")).unwrap();
/// let registry = generate_schemas(&[node]).unwrap();
///
/// let schema = registry.schema("Node").unwrap();
/// assert!(schema.is_related_to("Node"));
/// assert_eq!(schema.nested("parent").unwrap().name(), "Node");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    nodes: Vec<SchemaNode>,
    index: HashMap<String, SchemaId>,
}

impl SchemaRegistry {
    /// Allocates one empty node per descriptor so every name resolves
    /// before any definition is generated.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] if two descriptors share a
    /// name.
    pub fn bootstrap(descriptors: &[SchemaDescriptor]) -> Result<Self> {
        let mut registry = Self::default();
        for descriptor in descriptors {
            if registry.index.contains_key(&descriptor.name) {
                return Err(SchemaError::DuplicateSchema(descriptor.name.clone()));
            }
            let id = SchemaId(registry.nodes.len());
            registry.nodes.push(SchemaNode::empty(&descriptor.name));
            registry.index.insert(descriptor.name.clone(), id);
        }
        Ok(registry)
    }

    /// Resolves a name to its node id.
    pub fn id(&self, name: &str) -> Option<SchemaId> {
        self.index.get(name).copied()
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different registry.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Looks up a schema view by name.
    pub fn schema(&self, name: &str) -> Option<Schema<'_>> {
        self.id(name).map(|id| Schema { registry: self, id })
    }

    /// Looks up a schema view by name, failing with
    /// [`SchemaError::UnknownSchema`].
    pub fn try_schema(&self, name: &str) -> Result<Schema<'_>> {
        self.schema(name)
            .ok_or_else(|| SchemaError::UnknownSchema(name.to_string()))
    }

    /// Returns `true` if the registry holds a schema called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the registry holds no schemas.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Schema names in allocation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(SchemaNode::name)
    }

    /// Schema views in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = Schema<'_>> {
        (0..self.nodes.len()).map(|i| Schema {
            registry: self,
            id: SchemaId(i),
        })
    }
}

/// Borrowed view of one node that can follow references through its
/// registry.
#[derive(Clone, Copy)]
pub struct Schema<'a> {
    registry: &'a SchemaRegistry,
    id: SchemaId,
}

impl<'a> Schema<'a> {
    /// Node id within the registry.
    pub fn id(&self) -> SchemaId {
        self.id
    }

    /// Underlying node.
    pub fn node(&self) -> &'a SchemaNode {
        self.registry.node(self.id)
    }

    /// Schema name.
    pub fn name(&self) -> &'a str {
        self.node().name()
    }

    /// Identity key of the schema.
    pub fn key(&self) -> &'a str {
        self.node().key()
    }

    /// Nested definition in declaration order.
    pub fn definition(&self) -> &'a [(String, Slot)] {
        self.node().definition()
    }

    /// Declared references in declaration order.
    pub fn related_entities(&self) -> &'a [RelatedEntity] {
        self.node().related_entities()
    }

    /// Returns `true` iff an attribute of this schema references `entity`.
    pub fn is_related_to(&self, entity: &str) -> bool {
        self.node().is_related_to(entity)
    }

    /// Follows a single or array reference slot to the nested schema.
    pub fn nested(&self, prop: &str) -> Option<Schema<'a>> {
        let id = self.node().slot(prop)?.schema()?;
        Some(Schema {
            registry: self.registry,
            id,
        })
    }

    /// Finds the attribute on `related` that points back to this schema.
    ///
    /// Only non-internal slots are searched; the first match in
    /// declaration order wins.
    pub fn related_through<'b>(&self, related: &Schema<'b>) -> Option<&'b str> {
        relation::related_through(related.node(), self.id)
    }

    /// Computes the relation descriptor between `entity` (an instance of
    /// this schema) and the related schema `related`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::UnknownRelation`] if this schema never
    /// declared a reference to `related`.
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::*;
    /// use serde_json::json;
    ///
    /// let a = define_schema("A", Attributes::new().with("b", "B")).unwrap();
    /// let b = define_schema("B", Attributes::new().with("as", has_many(&a).unwrap())).unwrap();
    /// let registry = generate_schemas(&[a, b]).unwrap();
    ///
    /// let relation = registry
    ///     .schema("A")
    ///     .unwrap()
    ///     .get_relation(&json!({"id": 1, "b": 5}), "B")
    ///     .unwrap();
    /// assert_eq!(relation.related, "B");
    /// assert_eq!(relation.related_prop_name.as_deref(), Some("as"));
    /// assert_eq!(relation.related_id, Some(json!(5)));
    /// ```
    pub fn get_relation(&self, entity: &Value, related: &str) -> Result<Relation> {
        relation::get_relation(self.registry, self.id, entity, related)
    }

    /// Evaluates every computed attribute against `entity`.
    pub fn computed_values(&self, entity: &Value) -> Map<String, Value> {
        self.definition()
            .iter()
            .filter_map(|(prop, slot)| match slot {
                Slot::Computed(f) => Some((prop.clone(), f(entity))),
                _ => None,
            })
            .collect()
    }
}

impl fmt::Debug for Schema<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}
