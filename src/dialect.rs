use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelgenError;
use crate::introspect::row::{self, Row};
use crate::introspect::{mssql, mysql, pg, sqlite};
use crate::schema::{ColumnDescriptor, TableName};

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Mysql,
    Sqlite,
    Mssql,
}

impl Dialect {
    /// Return the default schema name for this dialect, if it has schemas.
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            Dialect::Postgres => Some("public"),
            Dialect::Mssql => Some("dbo"),
            Dialect::Mysql | Dialect::Sqlite => None,
        }
    }

    /// Whether a dot in a table key separates a schema. SQLite has none, so a
    /// table named `v1.events` stays whole.
    pub fn has_schemas(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }
}

impl FromStr for Dialect {
    type Err = RelgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::Mysql),
            "sqlite" => Ok(Dialect::Sqlite),
            "mssql" => Ok(Dialect::Mssql),
            other => Err(RelgenError::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgres",
            Dialect::Mysql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::Mssql => "mssql",
        };
        f.write_str(name)
    }
}

/// A foreign-key catalog row in the common six-field shape.
///
/// The untouched driver row stays available in `raw` so dialect predicates
/// can read engine-specific columns such as `column_key` or `is_identity`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FkRow {
    pub constraint_name: Option<String>,
    pub source_schema: Option<String>,
    pub source_table: String,
    pub source_column: String,
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_column: Option<String>,
    pub raw: Row,
}

impl FkRow {
    /// Map a row whose columns already carry the six-field names.
    pub fn from_row(table: &str, raw: &Row) -> Self {
        Self {
            constraint_name: row::non_empty(raw, "constraint_name"),
            source_schema: row::non_empty(raw, "source_schema"),
            source_table: row::non_empty(raw, "source_table").unwrap_or_else(|| table.to_string()),
            source_column: row::text(raw, "source_column").unwrap_or_default(),
            target_schema: row::non_empty(raw, "target_schema"),
            target_table: row::non_empty(raw, "target_table"),
            target_column: row::non_empty(raw, "target_column"),
            raw: raw.clone(),
        }
    }

    /// Both the source and the target column are present after trimming.
    pub fn has_endpoints(&self) -> bool {
        !self.source_column.trim().is_empty()
            && self
                .target_column
                .as_deref()
                .is_some_and(|c| !c.trim().is_empty())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        row::text(&self.raw, key)
    }
}

/// Catalog SQL and row interpretation for one database engine.
pub trait DialectAdapter: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Query listing tables; `None` means the executor's native listing is used.
    fn show_tables_query(&self, _schema: Option<&str>, _views: bool) -> Option<String> {
        None
    }

    /// Query returning one row per key column (primary, unique and foreign) of a table.
    fn get_foreign_keys_query(&self, table: &str, schema: Option<&str>) -> String;

    /// Reshape an engine-native row into the six-field form; `None` keeps the generic mapping.
    fn remap_foreign_keys_row(&self, _table: &str, _row: &Row) -> Option<FkRow> {
        None
    }

    fn count_trigger_query(&self, table: &str, schema: Option<&str>) -> Option<String>;

    fn describe_columns_query(&self, table: &str, schema: Option<&str>) -> String;

    /// Turn a describe row into `(column name, descriptor)`.
    fn remap_column_row(&self, raw: &Row) -> Option<(String, ColumnDescriptor)> {
        default_column_row(raw)
    }

    fn show_indexes_query(&self, _table: &str, _schema: Option<&str>) -> Option<String> {
        None
    }

    fn is_primary_key(&self, row: &FkRow) -> bool;

    /// Database-generated key. `all` holds every key row of the table.
    fn is_serial_key(&self, row: &FkRow, all: &[FkRow]) -> bool;

    /// Unique-constraint membership. `all` holds every key row of the table.
    fn is_unique(&self, _row: &FkRow, _all: &[FkRow]) -> bool {
        false
    }

    fn is_foreign_key(&self, row: &FkRow) -> bool {
        row.has_endpoints()
    }
}

static POSTGRES: pg::PostgresAdapter = pg::PostgresAdapter;
static MYSQL: mysql::MysqlAdapter = mysql::MysqlAdapter;
static SQLITE: sqlite::SqliteAdapter = sqlite::SqliteAdapter;
static MSSQL: mssql::MssqlAdapter = mssql::MssqlAdapter;

/// Look up the adapter for a dialect.
pub fn adapter_for(dialect: Dialect) -> &'static dyn DialectAdapter {
    match dialect {
        Dialect::Postgres => &POSTGRES,
        Dialect::Mysql => &MYSQL,
        Dialect::Sqlite => &SQLITE,
        Dialect::Mssql => &MSSQL,
    }
}

/// Quote a string as a SQL literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// `AND column = 'schema'`, or nothing when no schema was requested.
pub fn schema_condition(column: &str, schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("AND {column} = {}", quote_literal(schema)),
        None => String::new(),
    }
}

/// Descriptor mapping shared by every dialect's describe query.
///
/// Expects the aliases `column_name`, `data_type`, `is_nullable`,
/// `column_default`, `is_primary`, `is_identity`, `is_unique`, `comment`
/// and `special`.
pub fn default_column_row(raw: &Row) -> Option<(String, ColumnDescriptor)> {
    let name = row::non_empty(raw, "column_name")?;
    let descriptor = ColumnDescriptor {
        data_type: row::text(raw, "data_type").unwrap_or_default(),
        allow_null: row::flag(raw, "is_nullable"),
        default_value: row::text(raw, "column_default"),
        primary_key: row::flag(raw, "is_primary"),
        auto_increment: row::flag(raw, "is_identity"),
        unique: row::flag(raw, "is_unique"),
        comment: row::non_empty(raw, "comment"),
        special: row::list(raw, "special"),
        foreign_key: None,
    };
    Some((name, descriptor))
}

/// Schema to use for a table's catalog queries.
pub fn query_schema<'a>(table: &'a TableName, fallback: Option<&'a str>) -> Option<&'a str> {
    table.schema.as_deref().or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("MySQL".parse::<Dialect>().unwrap(), Dialect::Mysql);
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn test_default_schema() {
        assert_eq!(Dialect::Postgres.default_schema(), Some("public"));
        assert_eq!(Dialect::Mssql.default_schema(), Some("dbo"));
        assert_eq!(Dialect::Sqlite.default_schema(), None);
        assert!(Dialect::Mysql.has_schemas());
        assert!(!Dialect::Sqlite.has_schemas());
    }

    #[test]
    fn test_adapter_dispatch() {
        for dialect in [Dialect::Postgres, Dialect::Mysql, Dialect::Sqlite, Dialect::Mssql] {
            assert_eq!(adapter_for(dialect).dialect(), dialect);
        }
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal("o'brien"), "'o''brien'");
        assert_eq!(schema_condition("t.schema", Some("public")), "AND t.schema = 'public'");
        assert_eq!(schema_condition("t.schema", None), "");
    }

    #[test]
    fn test_fk_row_endpoints() {
        let raw = json!({
            "constraint_name": "order_customer_fk",
            "source_column": "customer_id",
            "target_table": "customer",
            "target_column": " ",
        });
        let row = FkRow::from_row("order", raw.as_object().unwrap());
        assert_eq!(row.source_table, "order");
        assert_eq!(row.target_column, None);
        assert!(!row.has_endpoints());
    }

    #[test]
    fn test_default_column_row() {
        let raw = json!({
            "column_name": "email",
            "data_type": "character varying(255)",
            "is_nullable": "NO",
            "column_default": null,
            "is_primary": false,
            "is_unique": 1,
            "comment": "",
        });
        let (name, col) = default_column_row(raw.as_object().unwrap()).unwrap();
        assert_eq!(name, "email");
        assert!(!col.allow_null);
        assert!(col.unique);
        assert_eq!(col.comment, None);
        assert_eq!(col.default_value, None);
    }
}
