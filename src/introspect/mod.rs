//! Schema capture: drive a dialect's catalog queries through an executor and
//! assemble the results into a [`SchemaModel`].

pub mod capture;
pub mod executor;
pub mod foreign_keys;
pub mod mssql;
pub mod mysql;
pub mod pg;
pub mod row;
pub mod sqlite;
pub mod tables;

use futures::future::join_all;
use indexmap::IndexMap;

use crate::dialect::{query_schema, DialectAdapter};
use crate::error::RelgenError;
use crate::introspect::executor::CatalogExecutor;
use crate::introspect::row::Row;
use crate::schema::{ColumnMap, ForeignKeyMap, IndexInfo, SchemaModel, TableName};

/// Which tables to capture, and what to capture for each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// Tables to include (`name` or `schema.name`); empty means all.
    pub tables: Vec<String>,
    /// Tables to skip, consulted only when `tables` is empty.
    pub skip_tables: Vec<String>,
    pub schema: Option<String>,
    pub views: bool,
    pub indexes: bool,
}

/// Everything fetched for one table, merged into the model after fan-in.
#[derive(Debug)]
struct TableCapture {
    columns: ColumnMap,
    foreign_keys: ForeignKeyMap,
    has_trigger: bool,
    indexes: Vec<IndexInfo>,
}

/// Capture the catalog into a [`SchemaModel`]. Relations are not inferred here.
///
/// Only a failed table listing is fatal. A table whose own queries fail is
/// logged and left out of the model.
pub async fn build_schema(
    executor: &dyn CatalogExecutor,
    adapter: &dyn DialectAdapter,
    options: &BuildOptions,
) -> Result<SchemaModel, RelgenError> {
    let listed = tables::list_tables(executor, adapter, options).await?;
    let listed_count = listed.len();
    let selected = tables::filter_tables(listed, options);
    tracing::debug!(
        "Capturing {} of {} listed tables",
        selected.len(),
        listed_count
    );

    let captures = join_all(
        selected
            .iter()
            .map(|table| capture_table(executor, adapter, table, options)),
    )
    .await;

    let mut model = SchemaModel::new();
    for (table, result) in selected.iter().zip(captures) {
        let capture = match result {
            Ok(capture) => capture,
            Err(e) => {
                tracing::warn!("Skipping table {table}: {e}");
                continue;
            }
        };
        let key = table.qualified();
        if capture.has_trigger {
            model.has_trigger_tables.insert(key.clone());
        }
        if !capture.indexes.is_empty() {
            model.indexes.insert(key.clone(), capture.indexes);
        }
        model.tables.insert(key.clone(), capture.columns);
        model.foreign_keys.insert(key, capture.foreign_keys);
    }

    tracing::debug!("Captured {} tables", model.tables.len());
    Ok(model)
}

async fn capture_table(
    executor: &dyn CatalogExecutor,
    adapter: &dyn DialectAdapter,
    table: &TableName,
    options: &BuildOptions,
) -> Result<TableCapture, RelgenError> {
    let schema = query_schema(table, options.schema.as_deref());
    let fk_sql = adapter.get_foreign_keys_query(&table.name, schema);
    let columns_sql = adapter.describe_columns_query(&table.name, schema);
    let trigger_sql = adapter.count_trigger_query(&table.name, schema);
    let index_sql = if options.indexes {
        adapter.show_indexes_query(&table.name, schema)
    } else {
        None
    };

    let (fk_rows, column_rows, trigger_rows, index_rows) = tokio::try_join!(
        executor.query(&fk_sql),
        executor.query(&columns_sql),
        optional_query(executor, trigger_sql.as_deref()),
        optional_query(executor, index_sql.as_deref()),
    )?;

    let foreign_keys = foreign_keys::normalize_foreign_keys(adapter, table, &fk_rows);
    let mut columns: ColumnMap = column_rows
        .iter()
        .filter_map(|raw| adapter.remap_column_row(raw))
        .collect();
    attach_foreign_keys(&mut columns, &foreign_keys);

    let has_trigger = trigger_rows
        .first()
        .and_then(|r| row::int(r, "trigger_count"))
        .is_some_and(|count| count > 0);

    Ok(TableCapture {
        columns,
        foreign_keys,
        has_trigger,
        indexes: group_indexes(&index_rows),
    })
}

async fn optional_query(
    executor: &dyn CatalogExecutor,
    sql: Option<&str>,
) -> Result<Vec<Row>, RelgenError> {
    match sql {
        Some(sql) => executor.query(sql).await,
        None => Ok(Vec::new()),
    }
}

/// Hang each key spec off its column and fold its flags into the descriptor.
fn attach_foreign_keys(columns: &mut ColumnMap, foreign_keys: &ForeignKeyMap) {
    for (name, spec) in foreign_keys {
        let Some(column) = columns.get_mut(name) else {
            continue;
        };
        // A marker shared with another column is a composite constraint.
        let sole_unique = spec.is_unique.is_set()
            && !foreign_keys
                .iter()
                .any(|(other, f)| other != name && f.is_unique == spec.is_unique);
        column.primary_key |= spec.is_primary_key;
        column.auto_increment |= spec.is_serial_key;
        column.unique |= sole_unique && !spec.is_primary_key;
        column.foreign_key = Some(spec.clone());
    }
}

/// Group one-row-per-column index results by index name.
fn group_indexes(rows: &[Row]) -> Vec<IndexInfo> {
    let mut grouped: IndexMap<String, IndexInfo> = IndexMap::new();
    for raw in rows {
        let (Some(name), Some(column)) = (
            row::non_empty(raw, "index_name"),
            row::non_empty(raw, "column_name"),
        ) else {
            continue;
        };
        grouped
            .entry(name.clone())
            .or_insert_with(|| IndexInfo {
                name,
                unique: row::flag(raw, "is_unique"),
                columns: Vec::new(),
            })
            .columns
            .push(column);
    }
    grouped.into_values().collect()
}
