use crate::dialect::{default_column_row, quote_literal, Dialect, DialectAdapter, FkRow};
use crate::introspect::row::Row;
use crate::schema::ColumnDescriptor;

pub struct MysqlAdapter;

/// `= 'schema'`, or the connection's current database when none was given.
fn schema_filter(schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("= {}", quote_literal(schema)),
        None => "= DATABASE()".to_string(),
    }
}

impl MysqlAdapter {
    fn is_unique_constraint_row(row: &FkRow) -> bool {
        row.constraint_name.as_deref() != Some("PRIMARY") && row.target_table.is_none()
    }
}

impl DialectAdapter for MysqlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn show_tables_query(&self, schema: Option<&str>, views: bool) -> Option<String> {
        let types = if views {
            "'BASE TABLE', 'VIEW'"
        } else {
            "'BASE TABLE'"
        };
        Some(format!(
            r#"
        SELECT TABLE_NAME AS table_name, TABLE_SCHEMA AS table_schema
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_TYPE IN ({types})
          AND TABLE_SCHEMA {}
        ORDER BY TABLE_NAME
        "#,
            schema_filter(schema)
        ))
    }

    fn get_foreign_keys_query(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            r#"
        SELECT K.CONSTRAINT_NAME AS constraint_name,
               K.CONSTRAINT_SCHEMA AS source_schema,
               K.TABLE_NAME AS source_table,
               K.COLUMN_NAME AS source_column,
               K.REFERENCED_TABLE_SCHEMA AS target_schema,
               K.REFERENCED_TABLE_NAME AS target_table,
               K.REFERENCED_COLUMN_NAME AS target_column,
               C.EXTRA AS extra,
               C.COLUMN_KEY AS column_key
        FROM INFORMATION_SCHEMA.KEY_COLUMN_USAGE AS K
        LEFT JOIN INFORMATION_SCHEMA.COLUMNS AS C
            ON C.TABLE_NAME = K.TABLE_NAME
            AND C.COLUMN_NAME = K.COLUMN_NAME
            AND C.TABLE_SCHEMA = K.CONSTRAINT_SCHEMA
        WHERE K.TABLE_NAME = {}
          AND K.CONSTRAINT_SCHEMA {}
        ORDER BY K.CONSTRAINT_NAME, K.ORDINAL_POSITION
        "#,
            quote_literal(table),
            schema_filter(schema)
        )
    }

    fn count_trigger_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT COUNT(0) AS trigger_count
        FROM INFORMATION_SCHEMA.TRIGGERS AS t
        WHERE t.EVENT_OBJECT_TABLE = {}
          AND t.EVENT_OBJECT_SCHEMA {}
        "#,
            quote_literal(table),
            schema_filter(schema)
        ))
    }

    fn describe_columns_query(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            r#"
        SELECT c.COLUMN_NAME AS column_name,
               c.COLUMN_TYPE AS data_type,
               c.IS_NULLABLE AS is_nullable,
               c.COLUMN_DEFAULT AS column_default,
               c.COLUMN_KEY = 'PRI' AS is_primary,
               c.EXTRA LIKE '%auto_increment%' AS is_identity,
               c.COLUMN_KEY = 'UNI' AS is_unique,
               c.COLUMN_COMMENT AS comment
        FROM INFORMATION_SCHEMA.COLUMNS AS c
        WHERE c.TABLE_NAME = {}
          AND c.TABLE_SCHEMA {}
        ORDER BY c.ORDINAL_POSITION
        "#,
            quote_literal(table),
            schema_filter(schema)
        )
    }

    fn remap_column_row(&self, raw: &Row) -> Option<(String, ColumnDescriptor)> {
        let (name, mut column) = default_column_row(raw)?;
        column.special = enum_labels(&column.data_type);
        Some((name, column))
    }

    fn show_indexes_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT INDEX_NAME AS index_name, NON_UNIQUE = 0 AS is_unique, COLUMN_NAME AS column_name
        FROM INFORMATION_SCHEMA.STATISTICS
        WHERE TABLE_NAME = {}
          AND TABLE_SCHEMA {}
          AND INDEX_NAME <> 'PRIMARY'
        ORDER BY INDEX_NAME, SEQ_IN_INDEX
        "#,
            quote_literal(table),
            schema_filter(schema)
        ))
    }

    fn is_primary_key(&self, row: &FkRow) -> bool {
        row.constraint_name.as_deref() == Some("PRIMARY")
    }

    fn is_serial_key(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        row.text("extra")
            .is_some_and(|extra| extra.to_ascii_lowercase().contains("auto_increment"))
    }

    /// KEY_COLUMN_USAGE only lists primary, unique and foreign keys, so a row
    /// that is neither primary nor referencing belongs to a unique constraint.
    /// A referencing row flagged `UNI` counts only when no such row exists for
    /// the column, so the unique constraint's own name wins the marker.
    fn is_unique(&self, row: &FkRow, all: &[FkRow]) -> bool {
        if Self::is_unique_constraint_row(row) {
            return true;
        }
        let flagged = row
            .text("column_key")
            .is_some_and(|key| key.eq_ignore_ascii_case("UNI"));
        flagged
            && !all.iter().any(|other| {
                other.source_column == row.source_column && Self::is_unique_constraint_row(other)
            })
    }

    fn is_foreign_key(&self, row: &FkRow) -> bool {
        row.has_endpoints() && !self.is_serial_key(row, &[])
    }
}

/// Labels of an `enum('a','b')` column type.
fn enum_labels(column_type: &str) -> Vec<String> {
    let lower = column_type.to_ascii_lowercase();
    if !lower.starts_with("enum(") || !column_type.ends_with(')') {
        return Vec::new();
    }
    column_type[5..column_type.len() - 1]
        .split(',')
        .map(|label| label.trim().trim_matches('\'').replace("''", "'"))
        .filter(|label| !label.is_empty())
        .collect()
}
