use std::path::PathBuf;

use crate::codegen::{GeneratedFile, Generator, GeneratorOptions, Lang};
use crate::schema::{Relation, SchemaModel};

/// The `init-models` file: load every model, then wire up the associations.
pub struct InitModelsGenerator;

impl Generator for InitModelsGenerator {
    fn generate(&self, schema: &SchemaModel, options: &GeneratorOptions) -> Vec<GeneratedFile> {
        let models: Vec<(String, String)> = schema
            .tables
            .keys()
            .map(|key| {
                let table = options.table_name(key);
                (options.model_name(&table), options.file_stem(&table))
            })
            .collect();

        let mut out = String::new();
        match options.lang {
            Lang::Es5 => {
                out.push_str("var DataTypes = require(\"sequelize\").DataTypes;\n");
                for (model, file) in &models {
                    out.push_str(&format!("var _{model} = require(\"./{file}\");\n"));
                }
                out.push_str("\nfunction initModels(sequelize) {\n");
                for (model, _) in &models {
                    out.push_str(&format!("  var {model} = _{model}(sequelize, DataTypes);\n"));
                }
            }
            Lang::Esm => {
                for (model, file) in &models {
                    out.push_str(&format!("import _{model} from \"./{file}.js\";\n"));
                }
                out.push_str("\nexport default function initModels(sequelize) {\n");
                for (model, _) in &models {
                    out.push_str(&format!("  const {model} = _{model}(sequelize);\n"));
                }
            }
        }

        let associations: Vec<String> = schema
            .relations
            .iter()
            .filter(|rel| {
                schema.tables.contains_key(&rel.parent_table)
                    && schema.tables.contains_key(&rel.child_table)
                    && rel
                        .join_model
                        .as_ref()
                        .map_or(true, |join| models.iter().any(|(model, _)| model == join))
            })
            .flat_map(|rel| associations(rel, options.no_alias))
            .collect();
        if !associations.is_empty() {
            out.push('\n');
            for line in &associations {
                out.push_str(&format!("  {line}\n"));
            }
        }

        out.push_str("\n  return {\n");
        for (model, _) in &models {
            out.push_str(&format!("    {model},\n"));
        }
        out.push_str("  };\n}\n");

        if options.lang == Lang::Es5 {
            out.push_str("module.exports = initModels;\n");
            out.push_str("module.exports.initModels = initModels;\n");
            out.push_str("module.exports.default = initModels;\n");
        }

        vec![GeneratedFile {
            path: PathBuf::from("init-models.js"),
            contents: out,
        }]
    }
}

/// The association calls for one relation. Many-to-many relations are
/// declared from both sides.
fn associations(rel: &Relation, no_alias: bool) -> Vec<String> {
    let alias = |name: &str| {
        if no_alias {
            String::new()
        } else {
            format!("as: \"{name}\", ")
        }
    };

    if rel.is_m2m {
        let (Some(join), Some(child_id)) = (&rel.join_model, &rel.child_id) else {
            return Vec::new();
        };
        return vec![
            format!(
                "{}.belongsToMany({}, {{ {}through: {join}, foreignKey: \"{}\", otherKey: \"{child_id}\" }});",
                rel.parent_model,
                rel.child_model,
                alias(&rel.child_prop),
                rel.parent_id,
            ),
            format!(
                "{}.belongsToMany({}, {{ {}through: {join}, foreignKey: \"{child_id}\", otherKey: \"{}\" }});",
                rel.child_model,
                rel.parent_model,
                alias(&rel.parent_prop),
                rel.parent_id,
            ),
        ];
    }

    let has = if rel.is_one { "hasOne" } else { "hasMany" };
    vec![
        format!(
            "{}.belongsTo({}, {{ {}foreignKey: \"{}\" }});",
            rel.child_model,
            rel.parent_model,
            alias(&rel.parent_prop),
            rel.parent_id,
        ),
        format!(
            "{}.{has}({}, {{ {}foreignKey: \"{}\" }});",
            rel.parent_model,
            rel.child_model,
            alias(&rel.child_prop),
            rel.parent_id,
        ),
    ]
}
