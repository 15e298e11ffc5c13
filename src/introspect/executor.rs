use async_trait::async_trait;
use serde_json::Value;

use crate::error::RelgenError;
use crate::introspect::row::Row;

/// Something that can answer catalog queries.
///
/// The schema builder only ever talks to the database through this trait, so
/// a live driver, a recorded capture, or a test fixture are interchangeable.
#[async_trait]
pub trait CatalogExecutor: Send + Sync {
    /// Run one catalog query and return its rows.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, RelgenError>;

    /// Driver-native table listing, used when the dialect has no listing query.
    ///
    /// Entries may be objects (`{table_name, table_schema}` or
    /// `{tableName, tableSchema}`) or bare table-name strings.
    async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<Value>, RelgenError>;
}
