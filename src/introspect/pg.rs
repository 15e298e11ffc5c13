use crate::dialect::{quote_literal, schema_condition, Dialect, DialectAdapter, FkRow};

pub struct PostgresAdapter;

impl DialectAdapter for PostgresAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn show_tables_query(&self, schema: Option<&str>, views: bool) -> Option<String> {
        let types = if views {
            "'BASE TABLE', 'VIEW'"
        } else {
            "'BASE TABLE'"
        };
        Some(format!(
            r#"
        SELECT t.table_name, t.table_schema
        FROM information_schema.tables t
        WHERE t.table_type IN ({types})
          AND t.table_schema NOT IN ('pg_catalog', 'information_schema')
          {}
        ORDER BY t.table_schema, t.table_name
        "#,
            schema_condition("t.table_schema", schema)
        ))
    }

    fn get_foreign_keys_query(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            r#"
        SELECT DISTINCT
            tc.constraint_name, tc.constraint_type,
            tc.constraint_schema AS source_schema, tc.table_name AS source_table,
            kcu.column_name AS source_column,
            CASE WHEN tc.constraint_type = 'FOREIGN KEY' THEN ccu.table_schema ELSE NULL END AS target_schema,
            CASE WHEN tc.constraint_type = 'FOREIGN KEY' THEN ccu.table_name ELSE NULL END AS target_table,
            CASE WHEN tc.constraint_type = 'FOREIGN KEY' THEN ccu.column_name ELSE NULL END AS target_column,
            co.column_default AS extra, co.identity_generation AS generation
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON kcu.constraint_name = tc.constraint_name
            AND kcu.table_schema = tc.table_schema
            AND kcu.table_name = tc.table_name
        JOIN information_schema.constraint_column_usage ccu
            ON ccu.constraint_name = tc.constraint_name
            AND ccu.constraint_schema = tc.constraint_schema
        JOIN information_schema.columns co
            ON co.table_schema = kcu.table_schema
            AND co.table_name = kcu.table_name
            AND co.column_name = kcu.column_name
        WHERE tc.table_name = {}
            {}
        "#,
            quote_literal(table),
            schema_condition("tc.constraint_schema", schema)
        )
    }

    fn count_trigger_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT COUNT(0) AS trigger_count
        FROM information_schema.triggers t
        WHERE t.event_object_table = {}
            {}
        "#,
            quote_literal(table),
            schema_condition("t.event_object_schema", schema)
        ))
    }

    fn describe_columns_query(&self, table: &str, schema: Option<&str>) -> String {
        format!(
            r#"
        SELECT c.column_name,
               CASE
                   WHEN c.data_type IN ('USER-DEFINED', 'ARRAY') THEN c.udt_name
                   WHEN c.character_maximum_length IS NOT NULL
                       THEN c.data_type || '(' || c.character_maximum_length || ')'
                   WHEN c.data_type = 'numeric' AND c.numeric_precision IS NOT NULL
                       THEN 'numeric(' || c.numeric_precision || ',' || c.numeric_scale || ')'
                   ELSE c.data_type
               END AS data_type,
               c.is_nullable, c.column_default,
               EXISTS (
                   SELECT 1
                   FROM information_schema.table_constraints tc
                   JOIN information_schema.key_column_usage kcu
                       USING (constraint_name, table_schema, table_name)
                   WHERE tc.constraint_type = 'PRIMARY KEY'
                       AND tc.table_schema = c.table_schema
                       AND tc.table_name = c.table_name
                       AND kcu.column_name = c.column_name
               ) AS is_primary,
               (c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%') AS is_identity,
               col_description(
                   (quote_ident(c.table_schema) || '.' || quote_ident(c.table_name))::regclass,
                   c.ordinal_position
               ) AS comment,
               (
                   SELECT array_agg(e.enumlabel ORDER BY e.enumsortorder)
                   FROM pg_catalog.pg_type t
                   JOIN pg_catalog.pg_enum e ON t.oid = e.enumtypid
                   WHERE t.typname = c.udt_name
               ) AS special
        FROM information_schema.columns c
        WHERE c.table_name = {}
            {}
        ORDER BY c.ordinal_position
        "#,
            quote_literal(table),
            schema_condition("c.table_schema", schema)
        )
    }

    fn show_indexes_query(&self, table: &str, schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT i.relname AS index_name, ix.indisunique AS is_unique, a.attname AS column_name
        FROM pg_index ix
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = ANY(ix.indkey)
        WHERE t.relname = {} AND NOT ix.indisprimary
            {}
        ORDER BY i.relname, array_position(ix.indkey, a.attnum)
        "#,
            quote_literal(table),
            schema_condition("n.nspname", schema)
        ))
    }

    fn is_primary_key(&self, row: &FkRow) -> bool {
        row.text("constraint_type").as_deref() == Some("PRIMARY KEY")
    }

    fn is_serial_key(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        let sequence_default = row.text("extra").is_some_and(|extra| {
            extra.starts_with("nextval") && extra.contains("_seq") && extra.contains("::regclass")
        });
        let identity = matches!(
            row.text("generation").as_deref(),
            Some("ALWAYS") | Some("BY DEFAULT")
        );
        sequence_default || identity
    }

    fn is_unique(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        row.text("constraint_type").as_deref() == Some("UNIQUE")
    }

    fn is_foreign_key(&self, row: &FkRow) -> bool {
        row.text("constraint_type").as_deref() == Some("FOREIGN KEY")
    }
}
