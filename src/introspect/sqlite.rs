use crate::dialect::{quote_literal, Dialect, DialectAdapter, FkRow};
use crate::introspect::row::{self, Row};

/// SQLite has no schemas; every query ignores the schema argument.
pub struct SqliteAdapter;

impl DialectAdapter for SqliteAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn show_tables_query(&self, _schema: Option<&str>, views: bool) -> Option<String> {
        let types = if views { "'table', 'view'" } else { "'table'" };
        Some(format!(
            r#"
        SELECT name AS table_name
        FROM sqlite_master
        WHERE type IN ({types}) AND name NOT LIKE 'sqlite_%'
        ORDER BY name
        "#
        ))
    }

    fn get_foreign_keys_query(&self, table: &str, _schema: Option<&str>) -> String {
        let t = quote_literal(table);
        format!(
            r#"
        SELECT 'fk_' || fk.id AS constraint_name, 'FOREIGN KEY' AS constraint_type,
               {t} AS source_table, fk."from" AS source_column,
               fk."table" AS target_table, fk."to" AS target_column,
               ti.pk AS pk, ti.type AS type
        FROM pragma_foreign_key_list({t}) AS fk
        LEFT JOIN pragma_table_info({t}) AS ti ON ti.name = fk."from"
        UNION ALL
        SELECT {t} || '_pk', 'PRIMARY KEY', {t}, ti.name, NULL, NULL, ti.pk, ti.type
        FROM pragma_table_info({t}) AS ti
        WHERE ti.pk > 0
        UNION ALL
        SELECT il.name, 'UNIQUE', {t}, ii.name, NULL, NULL, 0, NULL
        FROM pragma_index_list({t}) AS il
        JOIN pragma_index_info(il.name) AS ii
        WHERE il."unique" = 1 AND il.origin = 'u'
        "#
        )
    }

    /// Plain `PRAGMA foreign_key_list` rows carry `id`, `from`, `table` and `to`.
    fn remap_foreign_keys_row(&self, table: &str, raw: &Row) -> Option<FkRow> {
        let source_column = row::text(raw, "from")?;
        let id = row::text(raw, "id").unwrap_or_default();
        Some(FkRow {
            constraint_name: Some(format!("{table}_{id}")),
            source_schema: None,
            source_table: table.to_string(),
            source_column,
            target_schema: None,
            target_table: row::non_empty(raw, "table"),
            target_column: row::non_empty(raw, "to"),
            raw: raw.clone(),
        })
    }

    fn count_trigger_query(&self, table: &str, _schema: Option<&str>) -> Option<String> {
        Some(format!(
            r#"
        SELECT COUNT(0) AS trigger_count
        FROM sqlite_master
        WHERE type = 'trigger' AND tbl_name = {}
        "#,
            quote_literal(table)
        ))
    }

    fn describe_columns_query(&self, table: &str, _schema: Option<&str>) -> String {
        let t = quote_literal(table);
        format!(
            r#"
        SELECT name AS column_name, type AS data_type,
               CASE WHEN "notnull" = 0 THEN 'YES' ELSE 'NO' END AS is_nullable,
               dflt_value AS column_default,
               pk > 0 AS is_primary,
               (pk = 1 AND upper(type) = 'INTEGER'
                AND (SELECT COUNT(*) FROM pragma_table_info({t}) WHERE pk > 0) = 1) AS is_identity
        FROM pragma_table_info({t})
        ORDER BY cid
        "#
        )
    }

    fn show_indexes_query(&self, table: &str, _schema: Option<&str>) -> Option<String> {
        let t = quote_literal(table);
        Some(format!(
            r#"
        SELECT il.name AS index_name, il."unique" AS is_unique, ii.name AS column_name
        FROM pragma_index_list({t}) AS il
        JOIN pragma_index_info(il.name) AS ii
        WHERE il.origin = 'c'
        ORDER BY il.name, ii.seqno
        "#
        ))
    }

    fn is_primary_key(&self, row: &FkRow) -> bool {
        row::int(&row.raw, "pk").is_some_and(|pk| pk > 0)
    }

    /// Only a single-column `INTEGER PRIMARY KEY` aliases the rowid.
    fn is_serial_key(&self, row: &FkRow, all: &[FkRow]) -> bool {
        let mut key_columns: Vec<&str> = all
            .iter()
            .filter(|other| self.is_primary_key(other))
            .map(|other| other.source_column.as_str())
            .collect();
        key_columns.sort_unstable();
        key_columns.dedup();

        row::int(&row.raw, "pk") == Some(1)
            && key_columns.len() <= 1
            && row
                .text("type")
                .is_some_and(|t| t.eq_ignore_ascii_case("INTEGER"))
    }

    fn is_unique(&self, row: &FkRow, _all: &[FkRow]) -> bool {
        row.text("constraint_type").as_deref() == Some("UNIQUE")
    }

    fn is_foreign_key(&self, row: &FkRow) -> bool {
        row.has_endpoints()
            && row
                .text("constraint_type")
                .map_or(true, |t| t == "FOREIGN KEY")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_remap_pragma_row() {
        let raw = json!({"id": 0, "seq": 0, "table": "customer", "from": "customer_id", "to": "id"});
        let row = SqliteAdapter
            .remap_foreign_keys_row("order", raw.as_object().unwrap())
            .unwrap();
        assert_eq!(row.constraint_name.as_deref(), Some("order_0"));
        assert_eq!(row.source_table, "order");
        assert_eq!(row.target_table.as_deref(), Some("customer"));
        assert!(SqliteAdapter.is_foreign_key(&row));
        assert!(!SqliteAdapter.is_primary_key(&row));
    }

    #[test]
    fn test_union_rows_need_no_remap() {
        let raw = json!({"constraint_name": "order_pk", "source_column": "id"});
        assert!(SqliteAdapter
            .remap_foreign_keys_row("order", raw.as_object().unwrap())
            .is_none());
    }

    #[test]
    fn test_predicates() {
        let raw = json!({
            "constraint_name": "order_pk",
            "constraint_type": "PRIMARY KEY",
            "source_column": "id",
            "pk": 1,
            "type": "integer",
        });
        let pk = FkRow::from_row("order", raw.as_object().unwrap());
        assert!(SqliteAdapter.is_primary_key(&pk));
        assert!(SqliteAdapter.is_serial_key(&pk, std::slice::from_ref(&pk)));
        assert!(!SqliteAdapter.is_foreign_key(&pk));
    }

    #[test]
    fn test_composite_primary_key_is_not_serial() {
        let key_row = |column: &str, pk: i64| {
            let raw = json!({
                "constraint_name": "product_tag_pk",
                "constraint_type": "PRIMARY KEY",
                "source_column": column,
                "pk": pk,
                "type": "INTEGER",
            });
            FkRow::from_row("product_tag", raw.as_object().unwrap())
        };
        let all = vec![key_row("product_id", 1), key_row("tag_id", 2)];
        assert!(all.iter().all(|row| SqliteAdapter.is_primary_key(row)));
        assert!(!SqliteAdapter.is_serial_key(&all[0], &all));
        assert!(!SqliteAdapter.is_serial_key(&all[1], &all));
    }

    #[test]
    fn test_describe_counts_key_columns() {
        let sql = SqliteAdapter.describe_columns_query("product_tag", None);
        let key_count = "(SELECT COUNT(*) FROM pragma_table_info('product_tag') WHERE pk > 0) = 1";
        assert!(sql.contains(key_count));
    }

    #[test]
    fn test_queries_quote_table_name() {
        let sql = SqliteAdapter.get_foreign_keys_query("it's", None);
        assert!(sql.contains("pragma_foreign_key_list('it''s')"));
    }
}
