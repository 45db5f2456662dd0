//! Descriptor batch validation.
//!
//! Catches structural errors such as empty names, duplicate schemas, and
//! references to schemas outside the batch before generation starts.
//!
//! # Examples
//!
//! ```
//! use entity_schema_core::*;
//!
//! let task = define_schema("Task", Attributes::new().with("group", "Group")).unwrap();
//! let group = define_schema("Group", Attributes::new().with("tasks", has_many(&task).unwrap())).unwrap();
//! assert!(validate_descriptors(&[task.clone(), group]).is_empty());
//!
//! // Group is missing from the batch
//! assert!(!validate_descriptors(&[task]).is_empty());
//! ```

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::types::SchemaDescriptor;

/// Validates a batch of descriptors.
///
/// Returns every problem found, in descriptor order. An empty result means
/// the batch can be generated.
///
/// # Examples
///
/// ```
/// use entity_schema_core::*;
///
/// let a = define_schema("A", Attributes::new()).unwrap();
/// let errors = validate_descriptors(&[a.clone(), a]);
/// assert_eq!(errors, vec![SchemaError::DuplicateSchema("A".into())]);
/// ```
pub fn validate_descriptors(descriptors: &[SchemaDescriptor]) -> Vec<SchemaError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for descriptor in descriptors {
        if descriptor.name.is_empty() {
            errors.push(SchemaError::InvalidName);
            continue;
        }
        if !seen.insert(descriptor.name.as_str()) {
            errors.push(SchemaError::DuplicateSchema(descriptor.name.clone()));
        }
    }

    for descriptor in descriptors {
        for (prop, attribute) in descriptor.attributes.iter() {
            if prop.is_empty() {
                errors.push(SchemaError::InvalidAttributes(format!(
                    "schema {} has an attribute with an empty name",
                    descriptor.name
                )));
                continue;
            }
            let Some(target) = attribute.target() else {
                continue;
            };
            if !seen.contains(target) {
                errors.push(SchemaError::UnresolvedReference {
                    schema: descriptor.name.clone(),
                    attribute: prop.to_string(),
                    target: target.to_string(),
                });
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::{Attributes, SchemaDescriptor, define_schema, has_many};

    use super::*;

    #[test]
    fn test_validate_accepts_self_reference() {
        let node = define_schema("Node", Attributes::new().with("children", has_many("Node").unwrap()))
            .unwrap();
        assert!(validate_descriptors(&[node]).is_empty());
    }

    #[test]
    fn test_validate_reports_every_unresolved_reference() {
        let task = define_schema(
            "Task",
            Attributes::new()
                .with("group", "Group")
                .with("watchers", has_many("User").unwrap()),
        )
        .unwrap();

        let errors = validate_descriptors(&[task]);
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[1],
            SchemaError::UnresolvedReference { attribute, target, .. }
                if attribute == "watchers" && target == "User"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_names() {
        let blank = SchemaDescriptor {
            name: String::new(),
            attributes: Attributes::new(),
        };
        let unnamed_attr = define_schema("A", Attributes::new().with("", "A")).unwrap();

        let errors = validate_descriptors(&[blank, unnamed_attr]);
        assert_eq!(errors[0], SchemaError::InvalidName);
        assert!(matches!(errors[1], SchemaError::InvalidAttributes(_)));
    }

    #[test]
    fn test_validate_accepts_whitespace_names() {
        let spaced = define_schema(" ", Attributes::new().with("  ", " ")).unwrap();
        assert!(validate_descriptors(&[spaced]).is_empty());
    }

    #[test]
    fn test_validate_ignores_computed_attributes() {
        let task = define_schema(
            "Task",
            Attributes::new().with_computed("label", |e| e["title"].clone()),
        )
        .unwrap();
        assert!(validate_descriptors(&[task]).is_empty());
    }
}
