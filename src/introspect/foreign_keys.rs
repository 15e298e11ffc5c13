use crate::dialect::{DialectAdapter, FkRow};
use crate::introspect::row::Row;
use crate::schema::{ForeignKeyMap, ForeignKeySpec, ForeignSources, TableName, UniqueMarker};

/// Turn a table's key rows into one merged spec per source column.
pub fn normalize_foreign_keys(
    adapter: &dyn DialectAdapter,
    table: &TableName,
    rows: &[Row],
) -> ForeignKeyMap {
    let fk_rows: Vec<FkRow> = rows
        .iter()
        .map(|raw| {
            adapter
                .remap_foreign_keys_row(&table.name, raw)
                .unwrap_or_else(|| FkRow::from_row(&table.name, raw))
        })
        .filter(|row| !row.source_column.trim().is_empty())
        .collect();

    let mut specs = ForeignKeyMap::new();
    for row in &fk_rows {
        let spec = to_spec(adapter, table, row, &fk_rows);
        match specs.get_mut(&spec.source_column) {
            Some(existing) => existing.merge(spec),
            None => {
                specs.insert(spec.source_column.clone(), spec);
            }
        }
    }
    specs
}

fn to_spec(
    adapter: &dyn DialectAdapter,
    table: &TableName,
    row: &FkRow,
    all: &[FkRow],
) -> ForeignKeySpec {
    let is_foreign_key = row.has_endpoints() && adapter.is_foreign_key(row);

    let source_schema = row.source_schema.clone().or_else(|| table.schema.clone());
    // A reference without a schema points into the source table's schema.
    let target_schema = match row.target_table {
        Some(_) => row.target_schema.clone().or_else(|| source_schema.clone()),
        None => row.target_schema.clone(),
    };

    let is_unique = if adapter.is_unique(row, all) {
        match row.constraint_name {
            Some(ref name) => UniqueMarker::Constraint(name.clone()),
            None => UniqueMarker::Flag(true),
        }
    } else {
        UniqueMarker::Flag(false)
    };

    let foreign_sources = is_foreign_key.then(|| ForeignSources {
        source_schema: source_schema.clone(),
        source_table: row.source_table.clone(),
        source_column: row.source_column.clone(),
        target_schema: target_schema.clone(),
        target_table: row.target_table.clone(),
        target_column: row.target_column.clone().unwrap_or_default(),
    });

    ForeignKeySpec {
        constraint_name: row.constraint_name.clone(),
        source_schema,
        source_table: row.source_table.clone(),
        source_column: row.source_column.clone(),
        target_schema,
        target_table: row.target_table.clone(),
        target_column: row.target_column.clone(),
        is_foreign_key,
        is_primary_key: adapter.is_primary_key(row),
        is_unique,
        is_serial_key: adapter.is_serial_key(row, all),
        foreign_sources,
    }
}
