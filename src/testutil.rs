use indexmap::IndexMap;

use crate::schema::{ColumnDescriptor, ForeignKeyMap, ForeignKeySpec, ForeignSources, TableName};

/// A structural foreign key from `table.column` to `target.target_column`.
/// Table names may be schema-qualified.
pub fn foreign_key(table: &str, column: &str, target: &str, target_column: &str) -> ForeignKeySpec {
    let source = TableName::parse(table);
    let target = TableName::parse(target);
    ForeignKeySpec {
        constraint_name: Some(format!("{}_{column}_fkey", source.name)),
        source_schema: source.schema.clone(),
        source_table: source.name.clone(),
        source_column: column.to_string(),
        target_schema: target.schema.clone(),
        target_table: Some(target.name.clone()),
        target_column: Some(target_column.to_string()),
        is_foreign_key: true,
        foreign_sources: Some(ForeignSources {
            source_schema: source.schema,
            source_table: source.name,
            source_column: column.to_string(),
            target_schema: target.schema,
            target_table: Some(target.name),
            target_column: target_column.to_string(),
        }),
        ..Default::default()
    }
}

/// A primary-key column that is not a foreign key.
pub fn primary_key(table: &str, column: &str) -> ForeignKeySpec {
    let source = TableName::parse(table);
    ForeignKeySpec {
        constraint_name: Some(format!("{}_pkey", source.name)),
        source_schema: source.schema,
        source_table: source.name,
        source_column: column.to_string(),
        is_primary_key: true,
        ..Default::default()
    }
}

/// Group specs into per-table maps keyed the way the schema builder keys them.
pub fn fk_maps(specs: Vec<ForeignKeySpec>) -> IndexMap<String, ForeignKeyMap> {
    let mut maps: IndexMap<String, ForeignKeyMap> = IndexMap::new();
    for spec in specs {
        let table = TableName::new(spec.source_schema.as_deref(), &spec.source_table).qualified();
        let fields = maps.entry(table).or_default();
        match fields.get_mut(&spec.source_column) {
            Some(existing) => existing.merge(spec),
            None => {
                fields.insert(spec.source_column.clone(), spec);
            }
        }
    }
    maps
}

/// A non-nullable column of the given raw type with no default.
pub fn test_column(data_type: &str) -> ColumnDescriptor {
    ColumnDescriptor {
        data_type: data_type.to_string(),
        allow_null: false,
        ..Default::default()
    }
}
