//! Catalog loading with builder pattern and fallback chains.
//!
//! Provides [`SchemaCatalog`] for holding the descriptors of one entity
//! graph and [`CatalogBuilder`] for loading them from multiple sources with
//! automatic fallback.
//!
//! # Loading patterns
//!
//! ```no_run
//! use entity_schema_catalog::SchemaCatalog;
//!
//! // Load from a directory of descriptor files (one descriptor per file)
//! let catalog = SchemaCatalog::from_dir("schemas/").unwrap();
//! assert!(catalog.contains("Task"));
//!
//! // Load from a single bundle file
//! let catalog = SchemaCatalog::from_bundle("schemas.json").unwrap();
//!
//! // Use the builder for a fallback chain
//! let catalog = SchemaCatalog::builder()
//!     .from_dir("schemas/")
//!     .from_bundle("schemas.json")
//!     .build()
//!     .unwrap();
//! let registry = catalog.generate().unwrap();
//! ```

use std::io::BufReader;
use std::path::{Path, PathBuf};

use entity_schema_core::{SchemaBundle, SchemaDescriptor, SchemaError, SchemaRegistry, generate_schemas};
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::{debug, info};

use crate::bundle::{is_yaml, read_bundle, seal_bundle};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};

/// Describes where a [`SchemaCatalog`] was loaded from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    /// Loaded from a directory of descriptor files.
    Directory(PathBuf),
    /// Loaded from a single [`SchemaBundle`] file.
    Bundle(PathBuf),
    /// Loaded from an explicit list of files and directories.
    Paths(Vec<PathBuf>),
    /// Built in memory.
    Memory,
    /// Loaded via a fallback chain of multiple sources.
    Multiple(Vec<CatalogSource>),
}

/// Ordered collection of schema descriptors forming one generation batch.
///
/// Descriptor order is kept as loaded (directory entries are sorted by file
/// name), and names are unique.
///
/// # Examples
///
/// ```
/// use entity_schema_catalog::SchemaCatalog;
/// use entity_schema_core::{Attributes, define_schema, has_many};
///
/// let catalog = SchemaCatalog::from_descriptors(vec![
///     define_schema("Group", Attributes::new().with("tasks", has_many("Task").unwrap())).unwrap(),
///     define_schema("Task", Attributes::new().with("group", "Group")).unwrap(),
/// ])
/// .unwrap();
///
/// let registry = catalog.generate().unwrap();
/// assert!(registry.schema("Task").unwrap().is_related_to("Group"));
/// ```
#[derive(Debug)]
pub struct SchemaCatalog {
    descriptors: Vec<SchemaDescriptor>,
    source: CatalogSource,
}

#[derive(Deserialize)]
struct FileProbe {
    #[serde(default)]
    schemas: Option<IgnoredAny>,
}

impl SchemaCatalog {
    /// Returns a new [`CatalogBuilder`] for configuring a fallback chain.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Wraps in-memory descriptors.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSchema`] (wrapped) if two descriptors
    /// share a name.
    pub fn from_descriptors(descriptors: Vec<SchemaDescriptor>) -> Result<Self> {
        let mut catalog = Self {
            descriptors: Vec::with_capacity(descriptors.len()),
            source: CatalogSource::Memory,
        };
        for descriptor in descriptors {
            catalog.push(descriptor)?;
        }
        Ok(catalog)
    }

    /// Loads descriptors from a directory of `*.json`, `*.yaml` and `*.yml`
    /// files, one descriptor per file, in file name order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IoError`] if the directory cannot be read,
    /// a parse error for malformed files, or a duplicate-name error.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut catalog = Self {
            descriptors: Vec::new(),
            source: CatalogSource::Directory(path.to_path_buf()),
        };
        for file in descriptor_files(path)? {
            catalog.push(read_descriptor(&file)?)?;
        }
        info!(path = %path.display(), schemas = catalog.len(), "Loaded schema directory");
        Ok(catalog)
    }

    /// Loads descriptors from a single [`SchemaBundle`] file.
    ///
    /// # Errors
    ///
    /// Returns a parse error, [`CatalogError::InvalidBundle`] for an empty
    /// bundle, or [`CatalogError::InvalidChecksum`] if the bundle hash does
    /// not match.
    pub fn from_bundle(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bundle = read_bundle(path)?;
        let mut catalog = Self::from_descriptors(bundle.schemas)?;
        catalog.source = CatalogSource::Bundle(path.to_path_buf());
        info!(path = %path.display(), schemas = catalog.len(), "Loaded schema bundle");
        Ok(catalog)
    }

    /// Loads descriptors from files and directories.
    ///
    /// Directories are expanded like [`from_dir`](Self::from_dir). A file
    /// with a top-level `schemas` key is read as a bundle, any other file
    /// as a single descriptor.
    pub fn from_paths(inputs: &[PathBuf]) -> Result<Self> {
        let mut catalog = Self {
            descriptors: Vec::new(),
            source: CatalogSource::Paths(inputs.to_vec()),
        };
        for input in inputs {
            if input.is_dir() {
                for file in descriptor_files(input)? {
                    catalog.push(read_descriptor(&file)?)?;
                }
            } else if is_bundle_file(input)? {
                for descriptor in read_bundle(input)?.schemas {
                    catalog.push(descriptor)?;
                }
            } else {
                catalog.push(read_descriptor(input)?)?;
            }
        }
        info!(inputs = inputs.len(), schemas = catalog.len(), "Loaded schema paths");
        Ok(catalog)
    }

    fn push(&mut self, descriptor: SchemaDescriptor) -> Result<()> {
        if self.contains(&descriptor.name) {
            return Err(SchemaError::DuplicateSchema(descriptor.name).into());
        }
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a descriptor by name.
    pub fn get(&self, name: &str) -> Option<&SchemaDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    /// Inserts a descriptor, replacing any existing one with the same name.
    pub fn insert(&mut self, descriptor: SchemaDescriptor) {
        match self.descriptors.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => *existing = descriptor,
            None => self.descriptors.push(descriptor),
        }
    }

    /// Returns `true` if the catalog has a descriptor called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if the catalog holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns an iterator over schema names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors.iter().map(|d| d.name.as_str())
    }

    /// Returns all descriptors in load order.
    pub fn descriptors(&self) -> &[SchemaDescriptor] {
        &self.descriptors
    }

    /// Returns a reference to the source metadata.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Generates every descriptor as one batch.
    pub fn generate(&self) -> Result<SchemaRegistry> {
        Ok(generate_schemas(&self.descriptors)?)
    }

    /// Generates the descriptors `config` includes.
    ///
    /// Excluding a schema that an included schema references fails with
    /// [`SchemaError::UnresolvedReference`].
    pub fn generate_with(&self, config: &CatalogConfig) -> Result<SchemaRegistry> {
        let selected = config.filter(&self.descriptors);
        debug!(
            selected = selected.len(),
            total = self.descriptors.len(),
            "Generating configured schemas"
        );
        Ok(generate_schemas(&selected)?)
    }

    /// Packs the descriptors into a hashed [`SchemaBundle`].
    pub fn to_bundle(
        &self,
        version: impl Into<String>,
        generated_at: impl Into<String>,
    ) -> Result<SchemaBundle> {
        seal(self.descriptors.clone(), version, generated_at)
    }

    /// Packs only the descriptors `config` includes, matching what
    /// [`generate_with`](Self::generate_with) builds.
    pub fn to_bundle_with(
        &self,
        config: &CatalogConfig,
        version: impl Into<String>,
        generated_at: impl Into<String>,
    ) -> Result<SchemaBundle> {
        seal(config.filter(&self.descriptors), version, generated_at)
    }
}

fn seal(
    schemas: Vec<SchemaDescriptor>,
    version: impl Into<String>,
    generated_at: impl Into<String>,
) -> Result<SchemaBundle> {
    let mut bundle = SchemaBundle::new(version, generated_at);
    bundle.schemas = schemas;
    seal_bundle(&mut bundle)?;
    Ok(bundle)
}

/// Builder for constructing a [`SchemaCatalog`] with a fallback chain.
///
/// Sources are tried in the order they are added. The first successful load
/// wins; if all fail, [`CatalogError::NoSourcesAvailable`] is returned.
///
/// # Example
///
/// ```no_run
/// use entity_schema_catalog::SchemaCatalog;
///
/// let catalog = SchemaCatalog::builder()
///     .from_dir("/opt/schemas/")
///     .from_bundle("/opt/schemas.json")
///     .build()
///     .unwrap();
/// ```
pub struct CatalogBuilder {
    sources: Vec<CatalogSource>,
}

impl CatalogBuilder {
    /// Creates a new builder with no sources.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Adds a directory of descriptor files as a source.
    pub fn from_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Directory(path.into()));
        self
    }

    /// Adds a [`SchemaBundle`] file as a source.
    pub fn from_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(CatalogSource::Bundle(path.into()));
        self
    }

    /// Attempts to load the catalog from configured sources in order.
    ///
    /// Returns the first successfully loaded, non-empty catalog. If all
    /// sources fail, returns [`CatalogError::NoSourcesAvailable`].
    pub fn build(self) -> Result<SchemaCatalog> {
        if self.sources.is_empty() {
            return Err(CatalogError::NoSourcesAvailable);
        }

        let all_sources = self.sources.clone();

        for source in &self.sources {
            let result = match source {
                CatalogSource::Directory(path) => SchemaCatalog::from_dir(path),
                CatalogSource::Bundle(path) => SchemaCatalog::from_bundle(path),
                CatalogSource::Paths(paths) => SchemaCatalog::from_paths(paths),
                CatalogSource::Memory | CatalogSource::Multiple(_) => continue,
            };

            match result {
                Ok(mut catalog) if !catalog.is_empty() => {
                    catalog.source = CatalogSource::Multiple(all_sources);
                    return Ok(catalog);
                }
                Ok(_) => debug!(?source, "Catalog source is empty"),
                Err(err) => debug!(?source, error = %err, "Catalog source failed"),
            }
        }

        Err(CatalogError::NoSourcesAvailable)
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json" | "yaml" | "yml")
        );
        if supported && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_descriptor(path: &Path) -> Result<SchemaDescriptor> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);
    let descriptor = if is_yaml(path) {
        serde_yaml::from_reader(reader)?
    } else {
        serde_json::from_reader(reader)?
    };
    Ok(descriptor)
}

fn is_bundle_file(path: &Path) -> Result<bool> {
    let raw = std::fs::read_to_string(path)?;
    let probe: FileProbe = if is_yaml(path) {
        serde_yaml::from_str(&raw)?
    } else {
        serde_json::from_str(&raw)?
    };
    Ok(probe.schemas.is_some())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use entity_schema_core::{Attributes, define_schema, has_many};

    use super::*;

    fn write_descriptor(dir: &Path, descriptor: &SchemaDescriptor) {
        let path = dir.join(format!("{}.json", descriptor.name));
        let mut f = std::fs::File::create(path).unwrap();
        serde_json::to_writer_pretty(&mut f, descriptor).unwrap();
        f.flush().unwrap();
    }

    fn board() -> Vec<SchemaDescriptor> {
        vec![
            define_schema("Group", Attributes::new().with("tasks", has_many("Task").unwrap()))
                .unwrap(),
            define_schema("Task", Attributes::new().with("group", "Group")).unwrap(),
        ]
    }

    #[test]
    fn test_from_dir_reads_json_and_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptor(dir.path(), &board()[0]);
        std::fs::write(
            dir.path().join("task.yaml"),
            "name: Task\nattributes:\n  group: Group\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let catalog = SchemaCatalog::from_dir(dir.path()).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["Group", "Task"]);
        assert!(catalog.generate().is_ok());
    }

    #[test]
    fn test_from_dir_rejects_duplicate_names() {
        let dir = tempfile::tempdir().unwrap();
        write_descriptor(dir.path(), &board()[1]);
        std::fs::write(dir.path().join("task-copy.yml"), "name: Task\n").unwrap();

        let err = SchemaCatalog::from_dir(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Schema(SchemaError::DuplicateSchema(name)) if name == "Task"
        ));
    }

    #[test]
    fn test_from_paths_mixes_bundles_and_descriptors() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("bundle.json");
        let mut bundle = SchemaBundle::new("1.0.0", "2024-01-01T00:00:00Z");
        bundle.schemas = board();
        crate::write_bundle(&bundle_path, &bundle).unwrap();

        let user_path = dir.path().join("user.json");
        std::fs::write(&user_path, r#"{"name": "User"}"#).unwrap();

        let catalog = SchemaCatalog::from_paths(&[bundle_path, user_path]).unwrap();
        assert_eq!(catalog.len(), 3);
        assert!(catalog.contains("User"));
        assert!(matches!(catalog.source(), CatalogSource::Paths(paths) if paths.len() == 2));
    }

    #[test]
    fn test_to_bundle_with_drops_excluded_schemas() {
        let mut descriptors = board();
        descriptors.push(define_schema("Draft", Attributes::new().with("x", "Missing")).unwrap());
        let catalog = SchemaCatalog::from_descriptors(descriptors).unwrap();
        let config = CatalogConfig {
            exclude: vec!["Draft".to_string()],
            ..Default::default()
        };

        let bundle = catalog.to_bundle_with(&config, "1.0.0", "now").unwrap();
        let names: Vec<&str> = bundle.schemas.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Group", "Task"]);
        assert!(bundle.generate().is_ok());
        assert!(crate::verify_bundle(&bundle).is_ok());
    }

    #[test]
    fn test_builder_fallback_first_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bundle_path = dir.path().join("bundle.yaml");
        let catalog = SchemaCatalog::from_descriptors(board()).unwrap();
        crate::write_bundle(&bundle_path, &catalog.to_bundle("1.0.0", "now").unwrap()).unwrap();

        let catalog = SchemaCatalog::builder()
            .from_dir("/nonexistent/dir/")
            .from_bundle(&bundle_path)
            .build()
            .unwrap();
        assert!(catalog.contains("Group"));
        assert!(matches!(catalog.source(), CatalogSource::Multiple(_)));
    }

    #[test]
    fn test_builder_skips_empty_directory() {
        let empty = tempfile::tempdir().unwrap();
        let result = SchemaCatalog::builder().from_dir(empty.path()).build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
    }

    #[test]
    fn test_builder_all_fail() {
        let result = SchemaCatalog::builder()
            .from_dir("/nonexistent/dir1/")
            .from_bundle("/nonexistent/bundle1.json")
            .build();
        assert!(matches!(result, Err(CatalogError::NoSourcesAvailable)));
    }

    #[test]
    fn test_insert_replaces_existing() {
        let mut catalog = SchemaCatalog::from_descriptors(board()).unwrap();
        catalog.insert(define_schema("Task", Attributes::new()).unwrap());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("Task").unwrap().attributes.is_empty());

        catalog.insert(define_schema("User", Attributes::new()).unwrap());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_generate_with_excluded_reference_fails() {
        let catalog = SchemaCatalog::from_descriptors(board()).unwrap();
        let config = CatalogConfig {
            exclude: vec!["Group".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            catalog.generate_with(&config),
            Err(CatalogError::Schema(SchemaError::UnresolvedReference { .. }))
        ));
    }
}
