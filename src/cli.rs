use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::codegen::GeneratorOptions;
use crate::dialect::Dialect;
use crate::error::RelgenError;
use crate::introspect::BuildOptions;
use crate::schema::TableName;

/// Generate Sequelize models, with inferred associations, from database catalog metadata.
#[derive(Parser, Debug)]
#[command(name = "relgen", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a catalog capture (or a dumped model), infer relations, and write model files
    Generate(GenerateArgs),
    /// Print a capture skeleton with every catalog query the generator would issue
    Queries(SourceArgs),
}

/// Which catalog to read and which tables to take from it.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Database dialect: postgres, mysql, sqlite, mssql
    #[arg(long, env = "RELGEN_DIALECT")]
    pub dialect: Option<String>,

    /// Schema to load (defaults to the dialect's default schema)
    #[arg(long, env = "RELGEN_SCHEMA")]
    pub schema: Option<String>,

    /// Tables to process (comma-delimited, `name` or `schema.name`)
    #[arg(long)]
    pub tables: Option<String>,

    /// Tables to skip (comma-delimited); ignored when --tables is given
    #[arg(long)]
    pub skip_tables: Option<String>,

    /// Include views
    #[arg(long)]
    pub views: bool,

    /// Capture index definitions
    #[arg(long)]
    pub indexes: bool,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Catalog capture file to replay
    #[arg(long, env = "RELGEN_CAPTURE", conflicts_with = "model", required_unless_present = "model")]
    pub capture: Option<PathBuf>,

    /// Previously dumped schema model (see --dump-model)
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Model name case: c, k, l, o, p, s, u
    #[arg(long, default_value = "o")]
    pub case_model: String,

    /// Property name case: c, k, l, o, p, s, u
    #[arg(long, default_value = "o")]
    pub case_prop: String,

    /// File name case: c, k, l, o, p, s, u
    #[arg(long, default_value = "o")]
    pub case_file: String,

    /// Keep table names plural in model names
    #[arg(long)]
    pub no_singularize: bool,

    /// Output language: es5, esm
    #[arg(long, default_value = "es5")]
    pub lang: String,

    /// Omit `as:` aliases from associations
    #[arg(long)]
    pub no_alias: bool,

    /// Do not generate the init-models file
    #[arg(long)]
    pub no_init_models: bool,

    /// Columns to leave out of every model (comma-delimited)
    #[arg(long)]
    pub skip_fields: Option<String>,

    /// Output directory
    #[arg(long, short, env = "RELGEN_OUTPUT", default_value = "./models")]
    pub output: PathBuf,

    /// Print generated files instead of writing them
    #[arg(long)]
    pub no_write: bool,

    /// Write the captured schema model, with relations, as JSON
    #[arg(long)]
    pub dump_model: Option<PathBuf>,
}

/// Split a comma-delimited flag into trimmed, non-empty entries.
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

impl SourceArgs {
    pub fn dialect(&self) -> Result<Option<Dialect>, RelgenError> {
        self.dialect.as_deref().map(str::parse).transpose()
    }

    pub fn table_list(&self) -> Vec<String> {
        split_list(self.tables.as_deref())
    }

    /// Schema from the flag, falling back to the dialect's default.
    pub fn schema_or_default(&self, dialect: Dialect) -> Option<String> {
        self.schema
            .clone()
            .or_else(|| dialect.default_schema().map(str::to_string))
    }

    pub fn build_options(&self, dialect: Dialect) -> BuildOptions {
        BuildOptions {
            tables: self.table_list(),
            skip_tables: split_list(self.skip_tables.as_deref()),
            schema: self.schema_or_default(dialect),
            views: self.views,
            indexes: self.indexes,
        }
    }

    /// The --tables entries as table names, for the capture skeleton.
    pub fn table_names(&self, dialect: Dialect) -> Vec<TableName> {
        let schema = self.schema_or_default(dialect);
        self.table_list()
            .iter()
            .map(|t| {
                let table = TableName::parse(t);
                match table.schema {
                    Some(_) => table,
                    None => TableName::new(schema.as_deref(), &table.name),
                }
            })
            .collect()
    }
}

impl GenerateArgs {
    pub fn generator_options(&self, dialect: Dialect) -> Result<GeneratorOptions, RelgenError> {
        Ok(GeneratorOptions {
            dialect,
            lang: self.lang.parse()?,
            case_model: self.case_model.parse()?,
            case_prop: self.case_prop.parse()?,
            case_file: self.case_file.parse()?,
            singularize: !self.no_singularize,
            no_alias: self.no_alias,
            skip_fields: split_list(self.skip_fields.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::Lang;
    use crate::naming::CaseStyle;

    fn generate_args(args: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(["relgen", "generate"].iter().chain(args)).unwrap();
        match cli.command {
            Command::Generate(args) => args,
            Command::Queries(_) => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_defaults() {
        let args = generate_args(&["--capture", "shop.json"]);
        assert_eq!(args.output, PathBuf::from("./models"));
        let options = args.generator_options(Dialect::Mysql).unwrap();
        assert_eq!(options.lang, Lang::Es5);
        assert_eq!(options.case_model, CaseStyle::Original);
        assert!(options.singularize);
        assert!(options.skip_fields.is_empty());
    }

    #[test]
    fn test_generate_options() {
        let args = generate_args(&[
            "--capture", "shop.json",
            "--case-model", "p",
            "--case-prop", "c",
            "--lang", "esm",
            "--no-singularize",
            "--skip-fields", "created_at, updated_at",
            "--tables", "order,public.customer",
        ]);
        let options = args.generator_options(Dialect::Postgres).unwrap();
        assert_eq!(options.case_model, CaseStyle::Pascal);
        assert_eq!(options.case_prop, CaseStyle::Camel);
        assert_eq!(options.lang, Lang::Esm);
        assert!(!options.singularize);
        assert_eq!(options.skip_fields, vec!["created_at", "updated_at"]);

        let build = args.source.build_options(Dialect::Postgres);
        assert_eq!(build.tables, vec!["order", "public.customer"]);
        assert_eq!(build.schema.as_deref(), Some("public"));
    }

    #[test]
    fn test_capture_or_model_required() {
        assert!(Cli::try_parse_from(["relgen", "generate"]).is_err());
        assert!(Cli::try_parse_from([
            "relgen", "generate", "--capture", "a.json", "--model", "b.json"
        ])
        .is_err());
    }

    #[test]
    fn test_bad_case_option() {
        let args = generate_args(&["--model", "m.json", "--case-prop", "x"]);
        assert!(matches!(
            args.generator_options(Dialect::Sqlite),
            Err(RelgenError::UnknownCase(_))
        ));
    }

    #[test]
    fn test_queries_table_names() {
        let cli = Cli::try_parse_from([
            "relgen", "queries", "--dialect", "mssql", "--tables", "Orders,sales.Customers",
        ])
        .unwrap();
        let Command::Queries(source) = cli.command else {
            panic!("expected queries");
        };
        let dialect = source.dialect().unwrap().unwrap();
        assert_eq!(dialect, Dialect::Mssql);
        let names: Vec<String> = source
            .table_names(dialect)
            .iter()
            .map(TableName::qualified)
            .collect();
        assert_eq!(names, vec!["dbo.Orders", "sales.Customers"]);
    }
}
