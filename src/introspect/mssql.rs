use crate::dialect::{quote_literal, Dialect, DialectAdapter, FkRow};
use crate::introspect::row;

pub struct MssqlAdapter;

/// `OBJECT_ID(QUOTENAME('dbo') + '.' + QUOTENAME('table'))`
fn object_id(table: &str, schema: Option<&str>) -> String {
    let schema = schema.unwrap_or("dbo");
    format!(
        "OBJECT_ID(QUOTENAME({}) + '.' + QUOTENAME({}))",
        quote_literal(schema),
        quote_literal(table)
    )
}

impl DialectAdapter for MssqlAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Mssql
    }

    fn show_tables_query(&self, schema: Option<&str>, views: bool) -> Option<String> {
        let types = if views {
            "'BASE TABLE', 'VIEW'"
        } else {
            "'BASE TABLE'"
        };
        let schema_filter = match schema {
            Some(schema) => format!("AND t.TABLE_SCHEMA = {}", quote_literal(schema)),
            None => String::new(),
        };
        Some(format!(
            r#"
        SELECT t.TABLE_NAME AS table_name, t.TABLE_SCHEMA AS table_schema
        FROM INFORMATION_SCHEMA.TABLES t
        WHERE t.TABLE_TYPE IN ({types})
          {schema_filter}
        ORDER BY t.TABLE_NAME
        "#
        ))
    }

    fn get_foreign_keys_query(&self, table: &str, schema: Option<&str>) -> String {
        let schema_name = quote_literal(schema.unwrap_or("dbo"));
        format!(
            r#"
        SELECT
            tc.CONSTRAINT_NAME AS constraint_name,
            tc.CONSTRAINT_TYPE AS constraint_type,
            tc.TABLE_SCHEMA AS source_schema,
            tc.TABLE_NAME AS source_table,
            kcu.COLUMN_NAME AS source_column,
            NULL AS target_schema,
            NULL AS target_table,
            NULL AS target_column,
            COLUMNPROPERTY({object}, kcu.COLUMN_NAME, 'IsIdentity') AS is_identity
        FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
        JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
            ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
            AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
            AND kcu.TABLE_NAME = tc.TABLE_NAME
        WHERE tc.TABLE_SCHEMA = {schema_name}
          AND tc.TABLE_NAME = {table_name}
          AND tc.CONSTRAINT_TYPE IN ('PRIMARY KEY', 'UNIQUE')
        UNION ALL
        SELECT
            fk.name,
            'FOREIGN KEY',
            SCHEMA_NAME(t.schema_id),
            t.name,
            COL_NAME(fkc.parent_object_id, fkc.parent_column_id),
            SCHEMA_NAME(ref_t.schema_id),
            ref_t.name,
            COL_NAME(fkc.referenced_object_id, fkc.referenced_column_id),
            COLUMNPROPERTY(fkc.parent_object_id, COL_NAME(fkc.parent_object_id, fkc.parent_column_id), 'IsIdentity')
        FROM sys.foreign_keys fk
        JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id
        JOIN sys.tables t ON t.object_id = fk.parent_object_id
        JOIN sys.tables ref_t ON ref_t.object_id = fk.referenced_object_id
        WHERE fk.parent_object_id = {object}
        "#,
            object = object_id(table, schema),
            table_name = quote_literal(table),
        )
    }

    fn count_trigger_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT COUNT(0) AS trigger_count
        FROM sys.objects tr
        JOIN sys.objects tb ON tr.parent_object_id = tb.object_id
        WHERE tr.type = 'TR' AND tb.object_id = {}
        "#,
            object_id(table, schema)
        ))
    }

    fn describe_columns_query(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            r#"
        SELECT
            c.COLUMN_NAME AS column_name,
            CASE
                WHEN c.CHARACTER_MAXIMUM_LENGTH = -1 THEN c.DATA_TYPE + '(MAX)'
                WHEN c.CHARACTER_MAXIMUM_LENGTH IS NOT NULL
                    THEN c.DATA_TYPE + '(' + CAST(c.CHARACTER_MAXIMUM_LENGTH AS VARCHAR(10)) + ')'
                ELSE c.DATA_TYPE
            END AS data_type,
            c.IS_NULLABLE AS is_nullable,
            c.COLUMN_DEFAULT AS column_default,
            CASE WHEN EXISTS (
                SELECT 1
                FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
                JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu
                    ON kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME
                    AND kcu.TABLE_SCHEMA = tc.TABLE_SCHEMA
                    AND kcu.TABLE_NAME = tc.TABLE_NAME
                WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
                  AND tc.TABLE_SCHEMA = c.TABLE_SCHEMA
                  AND tc.TABLE_NAME = c.TABLE_NAME
                  AND kcu.COLUMN_NAME = c.COLUMN_NAME
            ) THEN 1 ELSE 0 END AS is_primary,
            COLUMNPROPERTY({object}, c.COLUMN_NAME, 'IsIdentity') AS is_identity,
            CAST(ep.value AS NVARCHAR(MAX)) AS comment
        FROM INFORMATION_SCHEMA.COLUMNS c
        LEFT JOIN sys.columns sc
            ON sc.object_id = {object}
            AND sc.name = c.COLUMN_NAME
        LEFT JOIN sys.extended_properties ep
            ON ep.major_id = sc.object_id
            AND ep.minor_id = sc.column_id
            AND ep.name = 'MS_Description'
        WHERE c.TABLE_SCHEMA = {schema_name} AND c.TABLE_NAME = {table_name}
        ORDER BY c.ORDINAL_POSITION
        "#,
            object = object_id(table, schema),
            schema_name = quote_literal(schema.unwrap_or("dbo")),
            table_name = quote_literal(table),
        )
    }

    fn show_indexes_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT
            i.name AS index_name,
            i.is_unique,
            COL_NAME(ic.object_id, ic.column_id) AS column_name
        FROM sys.indexes i
        JOIN sys.index_columns ic
            ON ic.object_id = i.object_id AND ic.index_id = i.index_id
        WHERE i.object_id = {}
          AND i.is_primary_key = 0
          AND i.is_unique_constraint = 0
          AND i.type <> 0
          AND ic.key_ordinal > 0
        ORDER BY i.name, ic.key_ordinal
        "#,
            object_id(table, schema)
        ))
    }

    fn is_primary_key(&self, row: &FkRow) -> bool {
        row.text("constraint_type").as_deref() == Some("PRIMARY KEY")
    }

    fn is_serial_key(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        row::flag(&row.raw, "is_identity")
    }

    fn is_unique(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        row.text("constraint_type").as_deref() == Some("UNIQUE")
    }

    fn is_foreign_key(&self, row: &FkRow) -> bool {
        row.text("constraint_type").as_deref() == Some("FOREIGN KEY")
    }
}
