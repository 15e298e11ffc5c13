use serde::Deserialize;
use serde_json::Value;

use crate::dialect::DialectAdapter;
use crate::error::RelgenError;
use crate::introspect::executor::CatalogExecutor;
use crate::introspect::BuildOptions;
use crate::schema::TableName;

/// The shapes a table-listing row comes back in, depending on the driver.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTableRow {
    Snake {
        #[serde(alias = "TABLE_NAME", alias = "name")]
        table_name: String,
        #[serde(default, alias = "TABLE_SCHEMA")]
        table_schema: Option<String>,
    },
    Camel {
        #[serde(rename = "tableName")]
        table_name: String,
        #[serde(default, rename = "tableSchema", alias = "schema")]
        table_schema: Option<String>,
    },
    Bare(String),
}

impl RawTableRow {
    pub fn into_table_name(self, fallback_schema: Option<&str>) -> TableName {
        let (schema, name) = match self {
            RawTableRow::Snake {
                table_name,
                table_schema,
            }
            | RawTableRow::Camel {
                table_name,
                table_schema,
            } => (table_schema, table_name),
            RawTableRow::Bare(name) => (None, name),
        };
        TableName::new(schema.as_deref().or(fallback_schema), &name)
    }
}

/// List every table the catalog reports, in discovery order.
pub async fn list_tables(
    executor: &dyn CatalogExecutor,
    adapter: &dyn DialectAdapter,
    options: &BuildOptions,
) -> Result<Vec<TableName>, RelgenError> {
    let schema = options.schema.as_deref();
    let rows: Vec<Value> = match adapter.show_tables_query(schema, options.views) {
        Some(sql) => executor
            .query(&sql)
            .await
            .map_err(|e| RelgenError::TableListing(e.to_string()))?
            .into_iter()
            .map(Value::Object)
            .collect(),
        None => executor
            .list_tables(schema)
            .await
            .map_err(|e| RelgenError::TableListing(e.to_string()))?,
    };

    let mut tables = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<RawTableRow>(row.clone()) {
            Ok(raw) => tables.push(raw.into_table_name(schema)),
            Err(_) => tracing::warn!("Ignoring unrecognized table listing row: {row}"),
        }
    }
    Ok(tables)
}

/// Apply the include list, or failing that the exclude list.
pub fn filter_tables(mut tables: Vec<TableName>, options: &BuildOptions) -> Vec<TableName> {
    if !options.tables.is_empty() {
        let wanted: Vec<TableName> = options.tables.iter().map(|t| TableName::parse(t)).collect();
        tables.retain(|t| wanted.iter().any(|w| w.matches(t)));
    } else if !options.skip_tables.is_empty() {
        let skipped: Vec<TableName> = options
            .skip_tables
            .iter()
            .map(|t| TableName::parse(t))
            .collect();
        tables.retain(|t| !skipped.iter().any(|s| s.matches(t)));
    }
    tables
}
