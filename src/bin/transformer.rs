//! transformer CLI - inspect schemas and flatten object graphs into mappings
//!
//! Flattened objects are written to stdout (or `--output`) as NDJSON or a JSON array;
//! progress messages go to stderr.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use transformer::{
    Mapping, MappingDataBuilder, MappingWriter, ObjectGraph, OutputFormat, PropertyKind, Schema,
    Source, Transformer, TransformerConfig,
};

#[derive(Parser)]
#[command(name = "transformer")]
#[command(version, about = "Schema-driven object-graph mapper", long_about = None)]
struct Cli {
    /// Transformer configuration (mapping type, name markers, schema path)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema file and print its entities
    ValidateSchema {
        /// Schema YAML (defaults to the schema named in --config)
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Flatten objects of an object graph into mappings
    Flatten {
        /// Schema YAML (defaults to the schema named in --config)
        #[arg(short, long)]
        schema: Option<PathBuf>,

        /// Object graph document (YAML or JSON)
        #[arg(short, long)]
        graph: PathBuf,

        /// Flatten every object of this entity
        #[arg(short, long, conflicts_with = "object")]
        entity: Option<String>,

        /// Flatten the object with this key
        #[arg(long)]
        object: Option<String>,

        /// Output layout
        #[arg(short, long, value_enum, default_value = "ndjson")]
        format: Format,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether a source entity maps to a destination type name
    Check {
        /// Source entity name (e.g. UserModelObject)
        #[arg(short, long)]
        source: String,

        /// Destination type name (e.g. UserPlainObject)
        #[arg(short, long)]
        destination: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Ndjson,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Ndjson => OutputFormat::Ndjson,
            Format::Json => OutputFormat::JsonArray,
        }
    }
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config).and_then(|config| match cli.command {
        Commands::ValidateSchema { schema } => validate_schema(&config, schema),
        Commands::Flatten {
            schema,
            graph,
            entity,
            object,
            format,
            output,
        } => flatten(&config, schema, graph, entity, object, format.into(), output),
        Commands::Check {
            source,
            destination,
        } => check(&config, &source, &destination),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<TransformerConfig, String> {
    match path {
        Some(path) => TransformerConfig::load_from_file(path),
        None => Ok(TransformerConfig::default()),
    }
}

/// Load the schema from an explicit path, falling back to the configured one
fn load_schema(config: &TransformerConfig, schema: Option<PathBuf>) -> Result<Schema, String> {
    let result = match schema {
        Some(path) => Schema::load_from_file(&path),
        None => config.load_schema(),
    };
    result.map_err(|e| format!("Failed to load schema: {}", e))
}

fn validate_schema(config: &TransformerConfig, schema: Option<PathBuf>) -> Result<(), String> {
    let schema = load_schema(config, schema)?;

    for entity in schema.entities() {
        let attributes = entity
            .properties
            .iter()
            .filter(|p| matches!(p.kind, PropertyKind::Attribute { .. }))
            .count();
        println!(
            "  ✓ {} ({} attributes, {} relationships)",
            entity.name,
            attributes,
            entity.relationships().count()
        );
    }

    println!("✅ Schema is valid: {} entities", schema.len());
    Ok(())
}

fn flatten(
    config: &TransformerConfig,
    schema: Option<PathBuf>,
    graph_path: PathBuf,
    entity: Option<String>,
    object: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), String> {
    let schema = load_schema(config, schema)?;
    let graph = ObjectGraph::load_from_file(schema, &graph_path)
        .map_err(|e| format!("Failed to load graph {}: {}", graph_path.display(), e))?;

    let sources: Vec<Source> = match (entity, object) {
        (Some(entity), _) => {
            if !graph.schema().has_entity(&entity) {
                return Err(format!("Unknown entity '{}'", entity));
            }
            graph.objects_of(&entity).map(Source::from).collect()
        }
        (None, Some(key)) => {
            let id = graph
                .lookup(&key)
                .ok_or_else(|| format!("Unknown object '{}'", key))?;
            let object = graph
                .object(id)
                .ok_or_else(|| format!("Unknown object '{}'", key))?;
            vec![Source::from(object)]
        }
        (None, None) => return Err("Either --entity or --object is required".to_string()),
    };

    let mappings: Vec<Mapping> = Transformer::from_config(config)
        .builder()
        .flatten_all(&sources)
        .map_err(|e| e.to_string())?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).map_err(|e| format!("Failed to create {}: {}", path.display(), e))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let mut writer = MappingWriter::new(writer, format).map_err(|e| e.to_string())?;
    writer.write_all(&mappings).map_err(|e| e.to_string())?;
    let written = writer.finish().map_err(|e| e.to_string())?;

    eprintln!("  ✓ {} objects flattened", written);
    Ok(())
}

fn check(config: &TransformerConfig, source: &str, destination: &str) -> Result<(), String> {
    Transformer::from_config(config)
        .builder()
        .names_match(source, destination)
        .map_err(|e| e.to_string())?;

    println!("✅ {} maps to {}", source, destination);
    Ok(())
}
