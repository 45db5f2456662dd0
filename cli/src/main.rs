use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use entity_schema_catalog::{CatalogConfig, SchemaCatalog, write_bundle};
use entity_schema_core::{SchemaRegistry, normalize, validate_descriptors};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for `inspect`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum InspectFormat {
    Json,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "entity-schema")]
#[command(about = "Validate, bundle, and inspect entity schema descriptors")]
struct Cli {
    /// Emit debug logs (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Validate descriptor files and generate them as one batch.
    Validate(ValidateArgs),
    /// Bundle descriptor files into a hashed SchemaBundle file.
    Bundle(BundleArgs),
    /// Print each schema's relations and discovered back-references.
    Inspect(InspectArgs),
    /// Compute the relation between an entity and a related schema.
    Relation(RelationArgs),
    /// Flatten a nested JSON payload into id-indexed entity tables.
    Normalize(NormalizeArgs),
}

#[derive(Debug, Args)]
struct CatalogArgs {
    /// Descriptor files, bundle files, and/or directories of descriptor files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Catalog config YAML restricting which schemas are generated.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
}

#[derive(Debug, Args)]
struct BundleArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Output bundle path (`.yaml`/`.yml` for YAML, JSON otherwise).
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: InspectFormat,
}

#[derive(Debug, Args)]
struct RelationArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Schema of the entity.
    #[arg(long)]
    schema: String,
    /// Related schema name.
    #[arg(long)]
    related: String,
    /// Entity instance as inline JSON.
    #[arg(long)]
    entity: String,
}

#[derive(Debug, Args)]
struct NormalizeArgs {
    #[command(flatten)]
    catalog: CatalogArgs,
    /// Root schema of the payload.
    #[arg(long)]
    schema: String,
    /// Payload JSON file, or `-` for stdin.
    #[arg(long, default_value = "-")]
    input: String,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Validate(args) => run_validate(args),
        Command::Bundle(args) => run_bundle(args),
        Command::Inspect(args) => run_inspect(args),
        Command::Relation(args) => run_relation(args),
        Command::Normalize(args) => run_normalize(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_catalog(args: &CatalogArgs) -> Result<(SchemaCatalog, CatalogConfig), String> {
    let catalog = SchemaCatalog::from_paths(&args.inputs).map_err(|e| e.to_string())?;
    let config = match &args.config {
        Some(path) => CatalogConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => CatalogConfig::default(),
    };
    debug!(schemas = catalog.len(), "Loaded catalog");
    Ok((catalog, config))
}

fn generate(catalog: &SchemaCatalog, config: &CatalogConfig) -> Result<SchemaRegistry, String> {
    catalog.generate_with(config).map_err(|e| e.to_string())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let (catalog, config) = load_catalog(&args.catalog)?;
    let selected = config.filter(catalog.descriptors());

    let errors = validate_descriptors(&selected);
    if !errors.is_empty() {
        for err in &errors {
            eprintln!("  {err}");
        }
        return Err(format!("{} validation error(s)", errors.len()));
    }

    let registry = generate(&catalog, &config)?;
    println!("Validated {} schema(s).", registry.len());
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let (catalog, config) = load_catalog(&args.catalog)?;
    generate(&catalog, &config)?;

    let mut bundle = catalog
        .to_bundle_with(&config, PACKAGE_VERSION, chrono::Utc::now().to_rfc3339())
        .map_err(|e| e.to_string())?;
    bundle.name = args.name;
    bundle.description = args.description;

    ensure_parent_dir(&args.output)?;
    write_bundle(&args.output, &bundle)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        bundle.schema_count(),
        args.output.display()
    );
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectedSchema {
    name: String,
    relations: Vec<InspectedRelation>,
    computed: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectedRelation {
    prop: String,
    entity: String,
    is_array: bool,
    back_reference: Option<String>,
}

fn inspect_registry(registry: &SchemaRegistry) -> Vec<InspectedSchema> {
    registry
        .iter()
        .map(|schema| {
            let relations = schema
                .related_entities()
                .iter()
                .map(|related| {
                    let is_array = matches!(
                        schema.node().slot(&related.prop),
                        Some(entity_schema_core::Slot::ArrayOf(_))
                    );
                    let back_reference = registry
                        .schema(&related.entity)
                        .and_then(|target| schema.related_through(&target))
                        .map(str::to_string);
                    InspectedRelation {
                        prop: related.prop.clone(),
                        entity: related.entity.clone(),
                        is_array,
                        back_reference,
                    }
                })
                .collect();
            let computed = schema
                .definition()
                .iter()
                .filter(|(_, slot)| slot.is_internal())
                .map(|(prop, _)| prop.clone())
                .collect();
            InspectedSchema {
                name: schema.name().to_string(),
                relations,
                computed,
            }
        })
        .collect()
}

fn run_inspect(args: InspectArgs) -> Result<(), String> {
    let (catalog, config) = load_catalog(&args.catalog)?;
    let registry = generate(&catalog, &config)?;
    let inspected = inspect_registry(&registry);

    match args.format {
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&inspected)
                .map_err(|e| format!("Failed to serialize output: {e}"))?;
            println!("{json}");
        }
        InspectFormat::Text => {
            for schema in &inspected {
                println!("{}", schema.name);
                for relation in &schema.relations {
                    let arity = if relation.is_array { "many" } else { "one" };
                    let back = relation.back_reference.as_deref().unwrap_or("-");
                    println!(
                        "  {} -> {} ({arity}, back: {back})",
                        relation.prop, relation.entity
                    );
                }
            }
        }
    }
    Ok(())
}

fn run_relation(args: RelationArgs) -> Result<(), String> {
    let (catalog, config) = load_catalog(&args.catalog)?;
    let registry = generate(&catalog, &config)?;

    let entity: serde_json::Value = serde_json::from_str(&args.entity)
        .map_err(|e| format!("Failed to parse --entity: {e}"))?;
    let relation = registry
        .try_schema(&args.schema)
        .and_then(|schema| schema.get_relation(&entity, &args.related))
        .map_err(|e| e.to_string())?;

    let json = serde_json::to_string_pretty(&relation)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), String> {
    let (catalog, config) = load_catalog(&args.catalog)?;
    let registry = generate(&catalog, &config)?;

    let raw = if args.input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .map_err(|err| format!("Failed to read stdin: {err}"))?;
        raw
    } else {
        fs::read_to_string(&args.input)
            .map_err(|err| format!("Failed to read '{}': {err}", args.input))?
    };
    let payload: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse payload: {e}"))?;

    let normalized =
        normalize(&registry, &args.schema, &payload, &config.normalize).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&normalized)
        .map_err(|e| format!("Failed to serialize output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }
    Ok(())
}
