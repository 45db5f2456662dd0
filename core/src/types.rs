//! Schema descriptor and relation marker types.
//!
//! A [`SchemaDescriptor`] is the caller-authored declaration of one entity:
//! its name plus an ordered list of [`Attribute`]s. Attributes are a closed
//! set of shapes decided at construction time, so an unsupported shape can
//! never reach the generator.

use std::fmt;
use std::sync::Arc;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Result, SchemaError};

/// Version of the descriptor contract (semver).
///
/// Embedded in every [`SchemaBundle`](crate::SchemaBundle) to track
/// compatibility of serialized descriptors.
pub const SCHEMA_CONTRACT_VERSION: &str = "1.0.0";

/// A pure function deriving a value from an entity instance.
pub type ComputedFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// The shape of one attribute on a schema.
///
/// # Examples
///
/// ```
/// use entity_schema_core::{Attribute, has_many};
/// use serde_json::json;
///
/// let owner = Attribute::from("User");
/// assert_eq!(owner.target(), Some("User"));
///
/// let tasks = Attribute::from(has_many("Task").unwrap());
/// assert!(tasks.is_array());
///
/// let label = Attribute::computed(|e| json!(e["title"].as_str().unwrap_or("").to_uppercase()));
/// assert!(!label.is_relation());
/// ```
#[derive(Clone)]
pub enum Attribute {
    /// Derived value, stored as-is and never treated as a relation.
    Computed(ComputedFn),
    /// Reference to exactly one entity of the named schema.
    One(String),
    /// Reference to a list of entities of the named schema.
    Many(String),
}

impl Attribute {
    /// Wraps a closure as a computed attribute.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(f))
    }

    /// Returns the referenced schema name, or `None` for computed attributes.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Computed(_) => None,
            Self::One(target) | Self::Many(target) => Some(target),
        }
    }

    /// Returns `true` for single and array references.
    pub fn is_relation(&self) -> bool {
        !matches!(self, Self::Computed(_))
    }

    /// Returns `true` for array references.
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// Parses an attribute from its serialized shape.
    ///
    /// A string is a single reference; a relation marker object
    /// (`{"relatedSchema": .., "isArray": true}`) is an array reference.
    /// Anything else fails with [`SchemaError::InvalidAttributes`].
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::Attribute;
    /// use serde_json::json;
    ///
    /// let one = Attribute::from_value("owner", &json!("User")).unwrap();
    /// assert_eq!(one.target(), Some("User"));
    ///
    /// let many = Attribute::from_value(
    ///     "tasks",
    ///     &json!({"relatedSchema": "Task", "isArray": true}),
    /// )
    /// .unwrap();
    /// assert!(many.is_array());
    ///
    /// assert!(Attribute::from_value("count", &json!(3)).is_err());
    /// ```
    pub fn from_value(name: &str, value: &Value) -> Result<Self> {
        match value {
            Value::String(target) if !target.is_empty() => Ok(Self::One(target.clone())),
            Value::Object(_) => {
                let marker: RelationMarker =
                    serde_json::from_value(value.clone()).map_err(|_| {
                        SchemaError::InvalidAttributes(format!(
                            "attribute {name} is not a relation marker"
                        ))
                    })?;
                if !marker.is_array || marker.related_schema.is_empty() {
                    return Err(SchemaError::InvalidAttributes(format!(
                        "attribute {name} is not a relation marker"
                    )));
                }
                Ok(marker.into())
            }
            other => Err(SchemaError::InvalidAttributes(format!(
                "attribute {name} has unsupported shape: {}",
                value_kind(other)
            ))),
        }
    }
}

impl From<&str> for Attribute {
    fn from(target: &str) -> Self {
        Self::One(target.to_string())
    }
}

impl From<String> for Attribute {
    fn from(target: String) -> Self {
        Self::One(target)
    }
}

impl From<RelationMarker> for Attribute {
    fn from(marker: RelationMarker) -> Self {
        Self::Many(marker.related_schema)
    }
}

impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Computed(_) => f.write_str("Computed(<fn>)"),
            Self::One(target) => f.debug_tuple("One").field(target).finish(),
            Self::Many(target) => f.debug_tuple("Many").field(target).finish(),
        }
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Computed(a), Self::Computed(b)) => Arc::ptr_eq(a, b),
            (Self::One(a), Self::One(b)) | (Self::Many(a), Self::Many(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Attribute {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Computed(_) => Err(serde::ser::Error::custom(
                "computed attributes cannot be serialized",
            )),
            Self::One(target) => serializer.serialize_str(target),
            Self::Many(target) => RelationMarker {
                related_schema: target.clone(),
                is_array: true,
            }
            .serialize(serializer),
        }
    }
}

/// Tag declaring an attribute as a plural reference, produced by [`has_many`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationMarker {
    /// Name of the schema each element refers to.
    pub related_schema: String,
    /// Always `true` for markers produced by [`has_many`].
    pub is_array: bool,
}

impl RelationMarker {
    /// Builds a marker from a dynamic schema reference.
    ///
    /// Accepts a non-empty string or an object with a string `name` field
    /// (a serialized descriptor). Anything else fails with
    /// [`SchemaError::InvalidSchema`].
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::RelationMarker;
    /// use serde_json::json;
    ///
    /// let a = RelationMarker::from_value(&json!("Task")).unwrap();
    /// let b = RelationMarker::from_value(&json!({"name": "Task", "attributes": {}})).unwrap();
    /// assert_eq!(a, b);
    ///
    /// assert!(RelationMarker::from_value(&json!({})).is_err());
    /// assert!(RelationMarker::from_value(&json!(null)).is_err());
    /// ```
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(name) => has_many(name.as_str()),
            Value::Object(map) => match map.get("name") {
                Some(Value::String(name)) => has_many(name.as_str()),
                _ => Err(SchemaError::InvalidSchema(
                    "schema object has no name".to_string(),
                )),
            },
            other => Err(SchemaError::InvalidSchema(format!(
                "expected a schema name or descriptor, got {}",
                value_kind(other)
            ))),
        }
    }
}

/// Target accepted by [`has_many`]: a schema name or a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTarget(String);

impl From<&str> for SchemaTarget {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SchemaTarget {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&SchemaDescriptor> for SchemaTarget {
    fn from(schema: &SchemaDescriptor) -> Self {
        Self(schema.name.clone())
    }
}

/// Declares an array reference to another schema.
///
/// The related name is taken from the descriptor when one is given, so
/// `has_many(&task)` and `has_many("Task")` are equivalent.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidSchema`] when the target name is empty.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let task = define_schema("Task", Attributes::new()).unwrap();
/// let by_descriptor = has_many(&task).unwrap();
/// let by_name = has_many("Task").unwrap();
///
/// assert_eq!(by_descriptor, by_name);
/// assert_eq!(by_name.related_schema, "Task");
/// assert!(by_name.is_array);
/// assert!(has_many("").is_err());
/// ```
pub fn has_many(schema: impl Into<SchemaTarget>) -> Result<RelationMarker> {
    let SchemaTarget(name) = schema.into();
    if name.is_empty() {
        return Err(SchemaError::InvalidSchema(
            "schema reference cannot be empty".to_string(),
        ));
    }
    Ok(RelationMarker {
        related_schema: name,
        is_array: true,
    })
}

/// Ordered attribute list of a schema.
///
/// Preserves declaration order; inserting an existing name replaces the
/// earlier attribute in place.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let attributes = Attributes::new()
///     .with("owner", "User")
///     .with("tasks", has_many("Task").unwrap());
///
/// let names: Vec<&str> = attributes.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, vec!["owner", "tasks"]);
/// assert_eq!(attributes.get("owner"), Some(&Attribute::from("User")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(Vec<(String, Attribute)>);

impl Attributes {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, builder style.
    pub fn with(mut self, name: impl Into<String>, attribute: impl Into<Attribute>) -> Self {
        self.insert(name, attribute);
        self
    }

    /// Adds a computed attribute, builder style.
    pub fn with_computed<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.with(name, Attribute::computed(f))
    }

    /// Inserts an attribute, replacing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, attribute: impl Into<Attribute>) {
        let name = name.into();
        let attribute = attribute.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = attribute,
            None => self.0.push((name, attribute)),
        }
    }

    /// Looks up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, attribute)| attribute)
    }

    /// Iterates attributes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Attribute)> {
        self.0.iter().map(|(name, attribute)| (name.as_str(), attribute))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no attributes are declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses attributes from a JSON object.
    ///
    /// Iteration order of the map becomes declaration order.
    pub fn from_map(map: &serde_json::Map<String, Value>) -> Result<Self> {
        map.iter()
            .map(|(name, value)| Ok((name.clone(), Attribute::from_value(name, value)?)))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }
}

impl<N: Into<String>, A: Into<Attribute>> FromIterator<(N, A)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, A)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, attribute) in iter {
            attributes.insert(name, attribute);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, attribute) in &self.0 {
            map.serialize_entry(name, attribute)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AttributesVisitor)
    }
}

struct AttributesVisitor;

impl<'de> Visitor<'de> for AttributesVisitor {
    type Value = Attributes;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping of attribute names to references")
    }

    // Entries arrive in document order.
    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> std::result::Result<Self::Value, M::Error> {
        let mut attributes = Attributes::new();
        while let Some((name, value)) = access.next_entry::<String, Value>()? {
            let attribute = Attribute::from_value(&name, &value).map_err(de::Error::custom)?;
            attributes.insert(name, attribute);
        }
        Ok(attributes)
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Attributes::new())
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
        Ok(Attributes::new())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<Self::Value, E> {
        if v {
            Err(E::custom(SchemaError::InvalidAttributes(
                "expected a mapping, got boolean".to_string(),
            )))
        } else {
            Ok(Attributes::new())
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Self::Value, E> {
        if v.is_empty() {
            return Ok(Attributes::new());
        }
        Err(E::custom(SchemaError::InvalidAttributes(
            "expected a mapping, got string".to_string(),
        )))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Self::Value, E> {
        if v == 0.0 {
            return Ok(Attributes::new());
        }
        Err(E::custom(SchemaError::InvalidAttributes(
            "expected a mapping, got number".to_string(),
        )))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _seq: A) -> std::result::Result<Self::Value, A::Error> {
        Err(de::Error::custom(SchemaError::InvalidAttributes(
            "expected a mapping, got array".to_string(),
        )))
    }
}

/// Immutable named definition of an entity's attributes.
///
/// Build one with [`define_schema`], or deserialize it from JSON/YAML where
/// attribute values are schema names (single references) or relation
/// markers (array references).
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let raw = r#"{"name": "Group", "attributes": {"owner": "User", "tasks": {"relatedSchema": "Task", "isArray": true}}}"#;
/// let group: SchemaDescriptor = serde_json::from_str(raw).unwrap();
///
/// assert_eq!(group.name, "Group");
/// assert_eq!(group.attributes.len(), 2);
/// assert!(group.attributes.get("tasks").unwrap().is_array());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor")]
pub struct SchemaDescriptor {
    /// Unique schema name within a generation batch.
    pub name: String,
    /// Attributes in declaration order.
    pub attributes: Attributes,
}

#[derive(Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    attributes: Attributes,
}

impl TryFrom<RawDescriptor> for SchemaDescriptor {
    type Error = SchemaError;

    fn try_from(raw: RawDescriptor) -> Result<Self> {
        define_schema(raw.name, raw.attributes)
    }
}

impl SchemaDescriptor {
    /// Builds a descriptor from a dynamic JSON value.
    ///
    /// `attributes` may be absent or falsy (`null`, `false`, `0`, `""`),
    /// which yields no attributes; any other non-object value fails with
    /// [`SchemaError::InvalidAttributes`].
    ///
    /// # Examples
    ///
    /// ```
    /// use entity_schema_core::{SchemaDescriptor, SchemaError};
    /// use serde_json::json;
    ///
    /// let user = SchemaDescriptor::from_value(&json!({"name": "User"})).unwrap();
    /// assert!(user.attributes.is_empty());
    ///
    /// let err = SchemaDescriptor::from_value(&json!({"name": "User", "attributes": 5}));
    /// assert!(matches!(err, Err(SchemaError::InvalidAttributes(_))));
    ///
    /// let err = SchemaDescriptor::from_value(&json!({"attributes": {}}));
    /// assert_eq!(err, Err(SchemaError::InvalidName));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self> {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let attributes = match value.get("attributes") {
            None => Attributes::new(),
            Some(Value::Object(map)) => Attributes::from_map(map)?,
            Some(other) if is_falsy(other) => Attributes::new(),
            Some(other) => {
                return Err(SchemaError::InvalidAttributes(format!(
                    "expected a mapping, got {}",
                    value_kind(other)
                )));
            }
        };
        define_schema(name, attributes)
    }
}

/// Defines a named entity schema.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidName`] when `name` is empty. Whitespace
/// counts as content and is kept as given.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let task = define_schema("Task", Attributes::new().with("group", "Group")).unwrap();
/// assert_eq!(task.name, "Task");
/// assert_eq!(task.attributes.get("group"), Some(&Attribute::from("Group")));
///
/// assert_eq!(define_schema("", Attributes::new()), Err(SchemaError::InvalidName));
/// ```
pub fn define_schema(name: impl Into<String>, attributes: Attributes) -> Result<SchemaDescriptor> {
    let name = name.into();
    if name.is_empty() {
        return Err(SchemaError::InvalidName);
    }
    Ok(SchemaDescriptor { name, attributes })
}

/// Parses a list of descriptors from a dynamic JSON value.
///
/// # Errors
///
/// Returns [`SchemaError::InvalidSchemas`] for anything other than a
/// non-empty array, or the first error raised by
/// [`SchemaDescriptor::from_value`].
pub fn descriptors_from_value(value: &Value) -> Result<Vec<SchemaDescriptor>> {
    let items = match value {
        Value::Array(items) if !items.is_empty() => items,
        Value::Array(_) => {
            return Err(SchemaError::InvalidSchemas("schema list is empty".to_string()));
        }
        other => {
            return Err(SchemaError::InvalidSchemas(format!(
                "expected an array, got {}",
                value_kind(other)
            )));
        }
    };
    items.iter().map(SchemaDescriptor::from_value).collect()
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_define_schema_preserves_name_and_attributes() {
        let attributes = Attributes::new()
            .with("owner", "User")
            .with("tasks", has_many("Task").unwrap());
        let schema = define_schema("Group", attributes.clone()).unwrap();

        assert_eq!(schema.name, "Group");
        assert_eq!(schema.attributes, attributes);
    }

    #[test]
    fn test_define_schema_rejects_empty_name() {
        assert_eq!(
            define_schema("", Attributes::new()),
            Err(SchemaError::InvalidName)
        );
    }

    #[test]
    fn test_whitespace_names_are_kept() {
        let schema = define_schema(" ", Attributes::new().with("owner", " ")).unwrap();
        assert_eq!(schema.name, " ");
        assert_eq!(schema.attributes.get("owner"), Some(&Attribute::One(" ".to_string())));
        assert_eq!(has_many(" ").unwrap().related_schema, " ");
        assert!(Attribute::from_value("owner", &serde_json::json!(" ")).is_ok());
    }

    #[test]
    fn test_has_many_extracts_descriptor_name() {
        let task = define_schema("Task", Attributes::new()).unwrap();
        assert_eq!(
            has_many(&task).unwrap(),
            RelationMarker {
                related_schema: "Task".to_string(),
                is_array: true,
            }
        );
        assert_eq!(has_many(&task), has_many("Task"));
    }

    #[test]
    fn test_has_many_rejects_empty_target() {
        assert!(matches!(has_many(""), Err(SchemaError::InvalidSchema(_))));
        assert!(matches!(
            RelationMarker::from_value(&json!({"attributes": {}})),
            Err(SchemaError::InvalidSchema(_))
        ));
        assert!(matches!(
            RelationMarker::from_value(&json!(42)),
            Err(SchemaError::InvalidSchema(_))
        ));
    }

    #[test]
    fn test_attributes_insert_replaces_in_place() {
        let mut attributes = Attributes::new().with("a", "A").with("b", "B");
        attributes.insert("a", has_many("C").unwrap());

        let entries: Vec<_> = attributes.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], ("a", &Attribute::Many("C".to_string())));
    }

    #[test]
    fn test_from_value_falsy_attributes_default_to_empty() {
        for attributes in [json!(null), json!(false), json!(0), json!("")] {
            let schema =
                SchemaDescriptor::from_value(&json!({"name": "User", "attributes": attributes}))
                    .unwrap();
            assert!(schema.attributes.is_empty());
        }
    }

    #[test]
    fn test_deserialize_falsy_attributes_match_from_value() {
        for attributes in [json!(null), json!(false), json!(0), json!(0.0), json!("")] {
            let value = json!({"name": "User", "attributes": attributes});
            let parsed: SchemaDescriptor = serde_json::from_str(&value.to_string()).unwrap();
            assert_eq!(parsed, SchemaDescriptor::from_value(&value).unwrap());
            assert!(parsed.attributes.is_empty());
        }

        for attributes in [json!(true), json!(3), json!("User")] {
            let value = json!({"name": "User", "attributes": attributes});
            assert!(serde_json::from_str::<SchemaDescriptor>(&value.to_string()).is_err());
            assert!(SchemaDescriptor::from_value(&value).is_err());
        }
    }

    #[test]
    fn test_from_value_rejects_unsupported_attribute_shape() {
        let err = SchemaDescriptor::from_value(&json!({
            "name": "User",
            "attributes": {"age": 42}
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAttributes(msg) if msg.contains("age")));

        let err = SchemaDescriptor::from_value(&json!({
            "name": "User",
            "attributes": {"tasks": {"relatedSchema": "Task", "isArray": false}}
        }))
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidAttributes(_)));
    }

    #[test]
    fn test_deserialize_keeps_declaration_order() {
        let raw = r#"{"name": "Task", "attributes": {"zeta": "Z", "alpha": "A", "mid": {"relatedSchema": "M", "isArray": true}}}"#;
        let schema: SchemaDescriptor = serde_json::from_str(raw).unwrap();
        let names: Vec<&str> = schema.attributes.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_deserialize_rejects_blank_name() {
        let result: std::result::Result<SchemaDescriptor, _> =
            serde_json::from_str(r#"{"name": "", "attributes": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialize_uses_marker_shape() {
        let schema = define_schema(
            "Group",
            Attributes::new()
                .with("owner", "User")
                .with("tasks", has_many("Task").unwrap()),
        )
        .unwrap();

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "Group",
                "attributes": {
                    "owner": "User",
                    "tasks": {"relatedSchema": "Task", "isArray": true}
                }
            })
        );
    }

    #[test]
    fn test_serialize_rejects_computed() {
        let schema = define_schema(
            "Task",
            Attributes::new().with_computed("label", |_| Value::Null),
        )
        .unwrap();
        assert!(serde_json::to_value(&schema).is_err());
    }

    #[test]
    fn test_descriptors_from_value_rejects_non_sequences() {
        assert!(matches!(
            descriptors_from_value(&json!(null)),
            Err(SchemaError::InvalidSchemas(_))
        ));
        assert!(matches!(
            descriptors_from_value(&json!([])),
            Err(SchemaError::InvalidSchemas(_))
        ));
        assert!(matches!(
            descriptors_from_value(&json!({"name": "A"})),
            Err(SchemaError::InvalidSchemas(_))
        ));
    }
}
