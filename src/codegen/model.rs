use std::path::PathBuf;

use crate::codegen::{
    escape_js_string, format_default, GeneratedFile, Generator, GeneratorOptions, Lang,
};
use crate::naming::recase;
use crate::schema::{ColumnDescriptor, ColumnMap, IndexInfo, SchemaModel, TableName};
use crate::typemap::map_column_type;

/// One `sequelize.define` file per table.
pub struct ModelGenerator;

impl Generator for ModelGenerator {
    fn generate(&self, schema: &SchemaModel, options: &GeneratorOptions) -> Vec<GeneratedFile> {
        schema
            .tables
            .iter()
            .map(|(key, columns)| {
                let table = options.table_name(key);
                GeneratedFile {
                    path: PathBuf::from(format!("{}.js", options.file_stem(&table))),
                    contents: render_model(key, &table, columns, schema, options),
                }
            })
            .collect()
    }
}

fn render_model(
    key: &str,
    table: &TableName,
    columns: &ColumnMap,
    schema: &SchemaModel,
    options: &GeneratorOptions,
) -> String {
    let mut out = String::new();
    match options.lang {
        Lang::Es5 => {
            out.push_str("const Sequelize = require('sequelize');\n");
            out.push_str("module.exports = function(sequelize, DataTypes) {\n");
        }
        Lang::Esm => {
            out.push_str("import Sequelize, { DataTypes } from 'sequelize';\n\n");
            out.push_str("export default function(sequelize) {\n");
        }
    }
    out.push_str(&format!(
        "  return sequelize.define('{}', {{\n",
        quote_single(&options.model_name(table))
    ));

    let fields: Vec<String> = columns
        .iter()
        .filter(|(name, _)| !options.skip_fields.contains(name))
        .map(|(name, col)| render_field(name, col, options))
        .collect();
    out.push_str(&fields.join(",\n"));
    out.push_str("\n  }, {\n");

    let mut table_options = vec![
        "sequelize".to_string(),
        format!("tableName: '{}'", quote_single(&table.name)),
    ];
    if let Some(ref schema_name) = table.schema {
        table_options.push(format!("schema: '{}'", quote_single(schema_name)));
    }
    if schema.has_trigger(key) {
        table_options.push("hasTrigger: true".to_string());
    }
    table_options.push("timestamps: false".to_string());
    if let Some(indexes) = schema.indexes.get(key).filter(|i| !i.is_empty()) {
        table_options.push(render_indexes(indexes));
    }
    let table_options: Vec<String> = table_options.iter().map(|o| format!("    {o}")).collect();
    out.push_str(&table_options.join(",\n"));
    out.push_str("\n  });\n");

    match options.lang {
        Lang::Es5 => out.push_str("};\n"),
        Lang::Esm => out.push_str("}\n"),
    }
    out
}

fn render_field(name: &str, col: &ColumnDescriptor, options: &GeneratorOptions) -> String {
    let prop = recase(options.case_prop, name, false);

    let mut attrs: Vec<String> = Vec::new();
    if col.auto_increment {
        attrs.push("autoIncrement: true".to_string());
    }
    attrs.push(format!("type: {}", map_column_type(col, options.dialect)));
    attrs.push(format!("allowNull: {}", col.allow_null));
    if let Some(default) = col
        .default_value
        .as_deref()
        .and_then(|d| format_default(d, &col.data_type, options.dialect))
    {
        attrs.push(format!("defaultValue: {default}"));
    }
    if col.primary_key {
        attrs.push("primaryKey: true".to_string());
    } else if col.unique {
        attrs.push("unique: true".to_string());
    }
    if let Some(ref comment) = col.comment {
        attrs.push(format!("comment: \"{}\"", escape_js_string(comment)));
    }
    if let Some(references) = render_references(col) {
        attrs.push(references);
    }
    if prop != name {
        attrs.push(format!("field: '{}'", quote_single(name)));
    }

    let attrs: Vec<String> = attrs.iter().map(|a| format!("      {a}")).collect();
    format!("    {}: {{\n{}\n    }}", js_key(&prop), attrs.join(",\n"))
}

fn render_references(col: &ColumnDescriptor) -> Option<String> {
    let spec = col.foreign_key.as_ref().filter(|fk| fk.is_foreign_key)?;
    let sources = spec.foreign_sources.as_ref()?;
    let target = sources.target()?;
    let model = match target.schema {
        Some(ref schema) => format!(
            "{{ tableName: '{}', schema: '{}' }}",
            quote_single(&target.name),
            quote_single(schema)
        ),
        None => format!("'{}'", quote_single(&target.name)),
    };
    Some(format!(
        "references: {{\n        model: {model},\n        key: '{}'\n      }}",
        quote_single(&sources.target_column)
    ))
}

fn render_indexes(indexes: &[IndexInfo]) -> String {
    let mut out = String::from("indexes: [\n");
    for index in indexes {
        out.push_str("      {\n");
        out.push_str(&format!("        name: \"{}\",\n", escape_js_string(&index.name)));
        out.push_str(&format!("        unique: {},\n", index.unique));
        out.push_str("        fields: [\n");
        for column in &index.columns {
            out.push_str(&format!(
                "          {{ name: \"{}\" }},\n",
                escape_js_string(column)
            ));
        }
        out.push_str("        ]\n");
        out.push_str("      },\n");
    }
    out.push_str("    ]");
    out
}

/// Escape a string for a single-quoted JavaScript literal.
fn quote_single(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Object keys that are not plain identifiers need quoting.
fn js_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        name.to_string()
    } else {
        format!("\"{}\"", escape_js_string(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use crate::naming::CaseStyle;
    use crate::testutil::{foreign_key, test_column};
    use indoc::indoc;

    fn order_schema() -> SchemaModel {
        let mut columns = ColumnMap::new();
        columns.insert(
            "id".to_string(),
            ColumnDescriptor {
                primary_key: true,
                auto_increment: true,
                default_value: Some("nextval('order_id_seq'::regclass)".to_string()),
                ..test_column("integer")
            },
        );
        columns.insert(
            "customer_id".to_string(),
            ColumnDescriptor {
                allow_null: true,
                foreign_key: Some(foreign_key("public.order", "customer_id", "public.customer", "id")),
                ..test_column("integer")
            },
        );
        columns.insert(
            "status".to_string(),
            ColumnDescriptor {
                default_value: Some("'new'::character varying".to_string()),
                comment: Some("Order state".to_string()),
                ..test_column("character varying(20)")
            },
        );

        let mut schema = SchemaModel::new();
        schema.tables.insert("public.order".to_string(), columns);
        schema.has_trigger_tables.insert("public.order".to_string());
        schema
    }

    fn camel_options() -> GeneratorOptions {
        GeneratorOptions {
            dialect: Dialect::Postgres,
            case_prop: CaseStyle::Camel,
            ..Default::default()
        }
    }

    #[test]
    fn test_model_es5() {
        let files = ModelGenerator.generate(&order_schema(), &camel_options());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, PathBuf::from("order.js"));
        assert_eq!(
            files[0].contents,
            indoc! {"
                const Sequelize = require('sequelize');
                module.exports = function(sequelize, DataTypes) {
                  return sequelize.define('order', {
                    id: {
                      autoIncrement: true,
                      type: DataTypes.INTEGER,
                      allowNull: false,
                      primaryKey: true
                    },
                    customerId: {
                      type: DataTypes.INTEGER,
                      allowNull: true,
                      references: {
                        model: { tableName: 'customer', schema: 'public' },
                        key: 'id'
                      },
                      field: 'customer_id'
                    },
                    status: {
                      type: DataTypes.STRING(20),
                      allowNull: false,
                      defaultValue: \"new\",
                      comment: \"Order state\"
                    }
                  }, {
                    sequelize,
                    tableName: 'order',
                    schema: 'public',
                    hasTrigger: true,
                    timestamps: false
                  });
                };
            "}
        );
    }

    #[test]
    fn test_model_esm_with_skip_fields_and_indexes() {
        let mut schema = order_schema();
        schema.indexes.insert(
            "public.order".to_string(),
            vec![IndexInfo {
                name: "order_status_idx".to_string(),
                unique: false,
                columns: vec!["status".to_string()],
            }],
        );
        let options = GeneratorOptions {
            lang: Lang::Esm,
            skip_fields: vec!["customer_id".to_string(), "status".to_string()],
            ..camel_options()
        };
        let files = ModelGenerator.generate(&schema, &options);
        assert_eq!(
            files[0].contents,
            indoc! {r#"
                import Sequelize, { DataTypes } from 'sequelize';

                export default function(sequelize) {
                  return sequelize.define('order', {
                    id: {
                      autoIncrement: true,
                      type: DataTypes.INTEGER,
                      allowNull: false,
                      primaryKey: true
                    }
                  }, {
                    sequelize,
                    tableName: 'order',
                    schema: 'public',
                    hasTrigger: true,
                    timestamps: false,
                    indexes: [
                      {
                        name: "order_status_idx",
                        unique: false,
                        fields: [
                          { name: "status" },
                        ]
                      },
                    ]
                  });
                }
            "#}
        );
    }

    #[test]
    fn test_file_and_model_casing() {
        let mut schema = SchemaModel::new();
        schema
            .tables
            .insert("order_items".to_string(), ColumnMap::new());
        let options = GeneratorOptions {
            dialect: Dialect::Sqlite,
            case_model: CaseStyle::Pascal,
            case_file: CaseStyle::Kebab,
            ..Default::default()
        };
        let files = ModelGenerator.generate(&schema, &options);
        assert_eq!(files[0].path, PathBuf::from("order-items.js"));
        assert!(files[0].contents.contains("sequelize.define('OrderItem', {"));
        assert!(!files[0].contents.contains("schema:"));
    }

    #[test]
    fn test_sqlite_dotted_table_has_no_schema() {
        let mut schema = SchemaModel::new();
        schema.tables.insert("v1.events".to_string(), ColumnMap::new());
        let options = GeneratorOptions {
            dialect: Dialect::Sqlite,
            ..Default::default()
        };
        let files = ModelGenerator.generate(&schema, &options);
        assert_eq!(files[0].path, PathBuf::from("v1.events.js"));
        assert!(files[0].contents.contains("tableName: 'v1.events'"));
        assert!(!files[0].contents.contains("schema:"));

        let postgres = GeneratorOptions::default();
        let table = postgres.table_name("v1.events");
        assert_eq!(table.schema.as_deref(), Some("v1"));
        assert_eq!(table.name, "events");
    }

    #[test]
    fn test_js_key() {
        assert_eq!(js_key("customerId"), "customerId");
        assert_eq!(js_key("order-date"), "\"order-date\"");
        assert_eq!(js_key("2fa"), "\"2fa\"");
    }
}
