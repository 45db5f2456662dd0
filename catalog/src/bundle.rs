//! Bundle file reading, writing, and hashing.
//!
//! Bundles are stored as JSON or YAML depending on the file extension
//! (`.yaml`/`.yml` for YAML, anything else for JSON). The bundle hash is the
//! SHA-256 hex digest of the canonical JSON encoding of the descriptors.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use entity_schema_core::{SchemaBundle, SchemaDescriptor};
use sha2::{Digest, Sha256};

use crate::error::{CatalogError, Result};

/// Computes the SHA-256 hex digest of a descriptor list.
///
/// # Errors
///
/// Returns [`JsonError`](CatalogError::JsonError) if a descriptor cannot be
/// serialized (computed attributes exist only in code).
pub fn compute_bundle_hash(schemas: &[SchemaDescriptor]) -> Result<String> {
    let bytes = serde_json::to_vec(schemas)?;
    let hash = Sha256::digest(&bytes);
    Ok(format!("{:x}", hash))
}

/// Sets `bundle.bundle_hash` from its current descriptors.
pub fn seal_bundle(bundle: &mut SchemaBundle) -> Result<()> {
    bundle.bundle_hash = Some(compute_bundle_hash(&bundle.schemas)?);
    Ok(())
}

/// Checks a bundle's contents and, when present, its hash.
///
/// # Errors
///
/// Returns [`InvalidBundle`](CatalogError::InvalidBundle) for a bundle
/// without descriptors, or [`InvalidChecksum`](CatalogError::InvalidChecksum)
/// if the stored hash does not match.
pub fn verify_bundle(bundle: &SchemaBundle) -> Result<()> {
    if bundle.schemas.is_empty() {
        return Err(CatalogError::InvalidBundle(
            "bundle contains no schemas".to_string(),
        ));
    }
    if let Some(expected) = &bundle.bundle_hash {
        let actual = compute_bundle_hash(&bundle.schemas)?;
        if &actual != expected {
            return Err(CatalogError::InvalidChecksum(format!(
                "expected {expected}, computed {actual}"
            )));
        }
    }
    Ok(())
}

/// Reads and verifies a bundle file.
pub fn read_bundle(path: impl AsRef<Path>) -> Result<SchemaBundle> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let bundle: SchemaBundle = if is_yaml(path) {
        serde_yaml::from_reader(reader)?
    } else {
        serde_json::from_reader(reader)?
    };
    verify_bundle(&bundle)?;
    Ok(bundle)
}

/// Writes a bundle file.
pub fn write_bundle(path: impl AsRef<Path>, bundle: &SchemaBundle) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    let writer = BufWriter::new(file);
    if is_yaml(path) {
        serde_yaml::to_writer(writer, bundle)?;
    } else {
        serde_json::to_writer_pretty(writer, bundle)?;
    }
    Ok(())
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

#[cfg(test)]
mod tests {
    use entity_schema_core::{Attributes, define_schema, has_many};

    use super::*;

    fn sample_bundle() -> SchemaBundle {
        let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
        bundle.schemas.push(
            define_schema("Group", Attributes::new().with("tasks", has_many("Task").unwrap()))
                .unwrap(),
        );
        bundle
            .schemas
            .push(define_schema("Task", Attributes::new().with("group", "Group")).unwrap());
        bundle
    }

    #[test]
    fn test_hash_is_deterministic() {
        let bundle = sample_bundle();
        let first = compute_bundle_hash(&bundle.schemas).unwrap();
        let second = compute_bundle_hash(&bundle.schemas).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn test_hash_depends_on_attribute_order() {
        let a = define_schema("A", Attributes::new().with("x", "A").with("y", "A")).unwrap();
        let b = define_schema("A", Attributes::new().with("y", "A").with("x", "A")).unwrap();
        assert_ne!(
            compute_bundle_hash(&[a]).unwrap(),
            compute_bundle_hash(&[b]).unwrap()
        );
    }

    #[test]
    fn test_verify_detects_tampering() {
        let mut bundle = sample_bundle();
        seal_bundle(&mut bundle).unwrap();
        assert!(verify_bundle(&bundle).is_ok());

        bundle.schemas.pop();
        assert!(matches!(
            verify_bundle(&bundle),
            Err(CatalogError::InvalidChecksum(_))
        ));
    }

    #[test]
    fn test_verify_rejects_empty_bundle() {
        let bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
        assert!(matches!(
            verify_bundle(&bundle),
            Err(CatalogError::InvalidBundle(_))
        ));
    }

    #[test]
    fn test_write_read_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut bundle = sample_bundle();
        seal_bundle(&mut bundle).unwrap();

        for name in ["bundle.json", "bundle.yaml"] {
            let path = dir.path().join(name);
            write_bundle(&path, &bundle).unwrap();
            let loaded = read_bundle(&path).unwrap();
            assert_eq!(loaded, bundle);
        }
    }
}
