//! Replay of recorded catalog rows.
//!
//! A capture file holds the rows each catalog query returned, keyed by the
//! query text:
//!
//! ```json
//! {
//!   "dialect": "postgres",
//!   "tables": [{"table_name": "order", "table_schema": "public"}],
//!   "queries": [{"sql": "SELECT ...", "rows": [{"constraint_name": "..."}]}]
//! }
//! ```
//!
//! Query text is compared after collapsing whitespace, so indentation in the
//! file does not matter.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dialect::{query_schema, Dialect, DialectAdapter};
use crate::error::RelgenError;
use crate::introspect::executor::CatalogExecutor;
use crate::introspect::row::Row;
use crate::introspect::BuildOptions;
use crate::schema::TableName;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
    #[serde(default)]
    pub tables: Vec<Value>,
    #[serde(default)]
    pub queries: Vec<CapturedQuery>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapturedQuery {
    pub sql: String,
    #[serde(default)]
    pub rows: Vec<Row>,
}

/// Collapse every whitespace run to a single space.
pub fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Answers catalog queries from a [`CaptureFile`].
#[derive(Debug, Clone, Default)]
pub struct CaptureExecutor {
    dialect: Option<Dialect>,
    tables: Vec<Value>,
    queries: HashMap<String, Vec<Row>>,
}

impl CaptureExecutor {
    pub fn new(capture: CaptureFile) -> Self {
        let mut queries = HashMap::new();
        for query in capture.queries {
            queries
                .entry(normalize_sql(&query.sql))
                .or_insert_with(Vec::new)
                .extend(query.rows);
        }
        Self {
            dialect: capture.dialect,
            tables: capture.tables,
            queries,
        }
    }

    pub fn load(path: &Path) -> Result<Self, RelgenError> {
        let text = fs::read_to_string(path)
            .map_err(|e| RelgenError::Capture(format!("{}: {e}", path.display())))?;
        let capture: CaptureFile = serde_json::from_str(&text)
            .map_err(|e| RelgenError::Capture(format!("{}: {e}", path.display())))?;
        tracing::debug!(
            "Loaded capture with {} queries from {}",
            capture.queries.len(),
            path.display()
        );
        Ok(Self::new(capture))
    }

    /// Dialect recorded in the capture, if any.
    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }
}

#[async_trait]
impl CatalogExecutor for CaptureExecutor {
    async fn query(&self, sql: &str) -> Result<Vec<Row>, RelgenError> {
        let key = normalize_sql(sql);
        match self.queries.get(&key) {
            Some(rows) => Ok(rows.clone()),
            None => Err(RelgenError::Capture(format!(
                "no rows captured for query: {key}"
            ))),
        }
    }

    async fn list_tables(&self, _schema: Option<&str>) -> Result<Vec<Value>, RelgenError> {
        Ok(self.tables.clone())
    }
}

/// Every query the schema builder would issue for `tables`, with empty row
/// lists ready to be filled in. The listing query is pre-filled with the
/// tables themselves.
pub fn skeleton(
    adapter: &dyn DialectAdapter,
    tables: &[TableName],
    options: &BuildOptions,
) -> CaptureFile {
    let fallback = options.schema.as_deref();
    let listing: Vec<Value> = tables
        .iter()
        .map(|table| {
            json!({
                "table_name": table.name,
                "table_schema": table.schema.as_deref().or(fallback),
            })
        })
        .collect();

    let mut queries = Vec::new();
    if let Some(sql) = adapter.show_tables_query(fallback, options.views) {
        queries.push(CapturedQuery {
            sql: normalize_sql(&sql),
            rows: listing
                .iter()
                .filter_map(|row| row.as_object().cloned())
                .collect(),
        });
    }

    for table in tables {
        let schema = query_schema(table, fallback);
        let mut statements = vec![
            adapter.get_foreign_keys_query(&table.name, schema),
            adapter.describe_columns_query(&table.name, schema),
        ];
        statements.extend(adapter.count_trigger_query(&table.name, schema));
        if options.indexes {
            statements.extend(adapter.show_indexes_query(&table.name, schema));
        }
        queries.extend(statements.iter().map(|sql| CapturedQuery {
            sql: normalize_sql(sql),
            rows: Vec::new(),
        }));
    }

    CaptureFile {
        dialect: Some(adapter.dialect()),
        tables: listing,
        queries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::adapter_for;
    use std::io::Write;

    #[test]
    fn test_normalize_sql() {
        assert_eq!(normalize_sql("\n  SELECT a,\n\t b\n FROM t  "), "SELECT a, b FROM t");
    }

    #[tokio::test]
    async fn test_replays_by_normalized_sql() {
        let capture: CaptureFile = serde_json::from_str(
            r#"{
                "dialect": "sqlite",
                "tables": ["order"],
                "queries": [{"sql": "SELECT  1\n AS n", "rows": [{"n": 1}]}]
            }"#,
        )
        .unwrap();
        let executor = CaptureExecutor::new(capture);
        assert_eq!(executor.dialect(), Some(Dialect::Sqlite));

        let rows = executor.query("SELECT 1 AS n").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(executor.list_tables(None).await.unwrap(), vec![json!("order")]);

        let err = executor.query("SELECT 2").await.unwrap_err();
        assert!(matches!(err, RelgenError::Capture(_)));
    }

    #[test]
    fn test_load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = CaptureExecutor::load(file.path()).unwrap_err();
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_skeleton_lists_every_query() {
        let tables = vec![TableName::parse("order"), TableName::parse("customer")];
        let options = BuildOptions {
            indexes: true,
            ..Default::default()
        };
        let capture = skeleton(adapter_for(Dialect::Sqlite), &tables, &options);
        // listing + (foreign keys, columns, triggers, indexes) per table
        assert_eq!(capture.queries.len(), 1 + 4 * 2);
        assert_eq!(capture.queries[0].rows.len(), 2);
        assert!(capture.queries[1..].iter().all(|q| q.rows.is_empty()));
        assert_eq!(capture.tables[0], json!({"table_name": "order", "table_schema": null}));
    }
}
