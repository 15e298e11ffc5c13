use std::fs;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use relgen::cli::{Cli, Command, GenerateArgs, SourceArgs};
use relgen::codegen::init_models::InitModelsGenerator;
use relgen::codegen::model::ModelGenerator;
use relgen::codegen::Generator;
use relgen::dialect::{adapter_for, Dialect};
use relgen::error::RelgenError;
use relgen::introspect::build_schema;
use relgen::introspect::capture::{skeleton, CaptureExecutor};
use relgen::schema::SchemaModel;
use relgen::writer::write_files;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Queries(source) => queries(&source),
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let (mut schema, dialect) = match (&args.capture, &args.model) {
        (Some(path), _) => {
            let executor = CaptureExecutor::load(path)?;
            let dialect = match args.source.dialect()? {
                Some(dialect) => dialect,
                None => executor.dialect().ok_or_else(|| {
                    RelgenError::UnknownDialect("capture names no dialect; pass --dialect".into())
                })?,
            };
            tracing::debug!("Replaying {dialect} catalog from {}", path.display());
            let options = args.source.build_options(dialect);
            let schema = build_schema(&executor, adapter_for(dialect), &options).await?;
            (schema, dialect)
        }
        (None, Some(path)) => {
            let schema: SchemaModel = serde_json::from_str(&fs::read_to_string(path)?)?;
            let dialect = args.source.dialect()?.unwrap_or_else(|| {
                tracing::warn!("No --dialect given for {}, assuming postgres", path.display());
                Dialect::Postgres
            });
            (schema, dialect)
        }
        (None, None) => return Err(anyhow!("either --capture or --model is required")),
    };

    let options = args.generator_options(dialect)?;
    schema.relate(&options.relation_options())?;
    tracing::debug!(
        "Found {} tables and {} relations",
        schema.tables.len(),
        schema.relations.len()
    );

    if let Some(ref path) = args.dump_model {
        fs::write(path, serde_json::to_string_pretty(&schema)?)?;
        tracing::info!("Schema model written to {}", path.display());
    }

    let mut files = ModelGenerator.generate(&schema, &options);
    if !args.no_init_models {
        files.extend(InitModelsGenerator.generate(&schema, &options));
    }

    if args.no_write {
        for file in &files {
            println!("// {}\n{}", file.path.display(), file.contents);
        }
    } else {
        let written = write_files(&args.output, &files)?;
        tracing::info!(
            "Wrote {} files to {}",
            written.len(),
            args.output.display()
        );
    }

    Ok(())
}

fn queries(source: &SourceArgs) -> Result<()> {
    let dialect = source
        .dialect()?
        .ok_or_else(|| anyhow!("--dialect is required"))?;
    let tables = source.table_names(dialect);
    let capture = skeleton(adapter_for(dialect), &tables, &source.build_options(dialect));
    println!("{}", serde_json::to_string_pretty(&capture)?);
    Ok(())
}
