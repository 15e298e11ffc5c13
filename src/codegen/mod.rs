pub mod init_models;
pub mod model;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::dialect::Dialect;
use crate::error::RelgenError;
use crate::naming::{recase, CaseStyle};
use crate::relations::RelationOptions;
use crate::schema::{SchemaModel, TableName};

/// Output module flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    /// CommonJS `require` / `module.exports`
    #[default]
    Es5,
    /// ES modules `import` / `export`
    Esm,
}

impl FromStr for Lang {
    type Err = RelgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "es5" | "js" => Ok(Lang::Es5),
            "esm" | "es6" => Ok(Lang::Esm),
            other => Err(RelgenError::UnknownLang(other.to_string())),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lang::Es5 => "es5",
            Lang::Esm => "esm",
        })
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    pub dialect: Dialect,
    pub lang: Lang,
    pub case_model: CaseStyle,
    pub case_prop: CaseStyle,
    pub case_file: CaseStyle,
    pub singularize: bool,
    pub no_alias: bool,
    /// Column names left out of every model.
    pub skip_fields: Vec<String>,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Postgres,
            lang: Lang::default(),
            case_model: CaseStyle::Original,
            case_prop: CaseStyle::Original,
            case_file: CaseStyle::Original,
            singularize: true,
            no_alias: false,
            skip_fields: Vec::new(),
        }
    }
}

impl GeneratorOptions {
    /// Naming options for relation inference, so aliases and model names agree.
    pub fn relation_options(&self) -> RelationOptions {
        RelationOptions {
            case_model: self.case_model,
            case_prop: self.case_prop,
            singularize: self.singularize,
        }
    }

    /// Table name for a `SchemaModel` key, split on the schema dot only where
    /// the dialect has schemas.
    pub fn table_name(&self, key: &str) -> TableName {
        if self.dialect.has_schemas() {
            TableName::parse(key)
        } else {
            TableName::new(None, key)
        }
    }

    pub fn model_name(&self, table: &TableName) -> String {
        recase(self.case_model, &table.name, self.singularize)
    }

    pub fn file_stem(&self, table: &TableName) -> String {
        recase(self.case_file, &table.name, false)
    }
}

/// One rendered output file, with a path relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Trait for code generators.
pub trait Generator {
    fn generate(&self, schema: &SchemaModel, options: &GeneratorOptions) -> Vec<GeneratedFile>;
}

/// Render a column default as a JavaScript expression.
///
/// Returns `None` for defaults that should not be emitted: `NULL` and
/// sequence defaults on serial columns.
pub fn format_default(default: &str, data_type: &str, dialect: Dialect) -> Option<String> {
    if is_serial_default(default, dialect) {
        return None;
    }
    let cleaned = match dialect {
        Dialect::Postgres => strip_pg_typecast(default),
        Dialect::Mssql => strip_mssql_parens(default),
        Dialect::Mysql | Dialect::Sqlite => default.trim(),
    };
    if cleaned.is_empty() || cleaned.eq_ignore_ascii_case("null") {
        return None;
    }

    let lower_type = data_type.to_ascii_lowercase();
    if is_boolean_type(&lower_type) {
        match cleaned.to_ascii_lowercase().trim_matches('\'') {
            "true" | "1" | "b'1'" => return Some("true".to_string()),
            "false" | "0" | "b'0'" => return Some("false".to_string()),
            _ => {}
        }
    }

    if let Some(literal) = string_literal(cleaned) {
        return Some(format!("\"{}\"", escape_js_string(&literal)));
    }
    if cleaned.parse::<f64>().is_ok() {
        return Some(cleaned.to_string());
    }
    if is_now_function(cleaned) {
        return Some("Sequelize.Sequelize.fn('now')".to_string());
    }
    // MySQL reports string defaults without quotes
    if dialect == Dialect::Mysql && !cleaned.contains('(') {
        return Some(format!("\"{}\"", escape_js_string(cleaned)));
    }
    Some(format!(
        "Sequelize.Sequelize.literal('{}')",
        cleaned.replace('\\', "\\\\").replace('\'', "\\'")
    ))
}

fn is_boolean_type(lower_type: &str) -> bool {
    lower_type.starts_with("bool") || lower_type == "bit" || lower_type == "tinyint(1)"
}

fn is_now_function(expr: &str) -> bool {
    matches!(
        expr.to_ascii_lowercase().as_str(),
        "now()"
            | "current_timestamp"
            | "current_timestamp()"
            | "getdate()"
            | "sysdatetime()"
            | "localtimestamp"
            | "datetime('now')"
    )
}

/// `'it''s'` -> `it's`; anything not wholly quoted is not a literal.
fn string_literal(expr: &str) -> Option<String> {
    let inner = expr.strip_prefix('\'')?.strip_suffix('\'')?;
    if inner.replace("''", "").contains('\'') {
        return None;
    }
    Some(inner.replace("''", "'"))
}

/// Strip PostgreSQL type casts from a default expression.
/// e.g. "'hello'::character varying" -> "'hello'"
/// e.g. "0::integer" -> "0"
fn strip_pg_typecast(expr: &str) -> &str {
    // Find the last :: that's not inside quotes
    if let Some(pos) = find_typecast_pos(expr) {
        expr[..pos].trim()
    } else {
        expr.trim()
    }
}

fn find_typecast_pos(expr: &str) -> Option<usize> {
    let bytes = expr.as_bytes();
    let mut in_quotes = false;
    let mut in_parens = 0u32;
    let mut i = 0;
    let mut last_cast_pos = None;

    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quotes = !in_quotes,
            b'(' if !in_quotes => in_parens += 1,
            b')' if !in_quotes => in_parens = in_parens.saturating_sub(1),
            b':' if !in_quotes && in_parens == 0 && i + 1 < bytes.len() && bytes[i + 1] == b':' => {
                last_cast_pos = Some(i);
                i += 1; // skip second ':'
            }
            _ => {}
        }
        i += 1;
    }

    last_cast_pos
}

/// Strip MSSQL wrapping parentheses and leading N from string literals.
/// e.g. "((0))" -> "0"
/// e.g. "(N'hello')" -> "'hello'"
fn strip_mssql_parens(expr: &str) -> &str {
    let mut s = expr.trim();
    while s.starts_with('(') && s.ends_with(')') {
        s = &s[1..s.len() - 1];
    }
    if s.starts_with("N'") {
        s = &s[1..];
    }
    s.trim()
}

/// Check if a column default is a serial/sequence default.
/// PG: starts with `nextval(`; other engines report identity columns without a default.
pub fn is_serial_default(default: &str, dialect: Dialect) -> bool {
    match dialect {
        Dialect::Postgres => default.trim_start().starts_with("nextval("),
        Dialect::Mysql | Dialect::Sqlite | Dialect::Mssql => false,
    }
}

/// Escape a string for a double-quoted JavaScript literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
