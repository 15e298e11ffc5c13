//! Relation inference over captured foreign keys.
//!
//! Every structural foreign key becomes one parent/child relation. A foreign
//! key that is also part of a composite primary key marks its table as a
//! likely junction table, and each pair of such keys additionally yields a
//! many-to-many relation between the two tables they reference.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::error::RelgenError;
use crate::naming::{pluralize, recase, singularize, CaseStyle};
use crate::schema::{ForeignKeyMap, ForeignKeySpec, ForeignSources, Relation, TableName};

/// Naming options applied while inferring relations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationOptions {
    pub case_model: CaseStyle,
    pub case_prop: CaseStyle,
    pub singularize: bool,
}

impl Default for RelationOptions {
    fn default() -> Self {
        Self {
            case_model: CaseStyle::Original,
            case_prop: CaseStyle::Original,
            singularize: true,
        }
    }
}

/// Aliases already claimed, as `(owning parent table, recased alias)`.
type UsedNames = HashSet<(String, String)>;

/// Infer the relation list for a fully captured foreign-key map.
///
/// Output is sorted by `(parent_table, child_table)` and depends only on the
/// map's contents, never on the order tables were discovered in.
pub fn infer_relations(
    foreign_keys: &IndexMap<String, ForeignKeyMap>,
    options: &RelationOptions,
) -> Result<Vec<Relation>, RelgenError> {
    let mut used = UsedNames::new();
    let mut relations = Vec::new();

    let mut tables: Vec<&String> = foreign_keys.keys().collect();
    tables.sort();

    for table in tables {
        let fields = &foreign_keys[table];
        let mut parent_props: HashMap<&str, String> = HashMap::new();
        let mut pairs: Vec<(&str, &str)> = Vec::new();

        for (column, spec) in fields {
            if !spec.is_foreign_key {
                continue;
            }
            let parent_prop =
                add_forward(table, column, spec, fields, options, &mut used, &mut relations)?;
            parent_props.insert(column.as_str(), parent_prop);

            if let Some(pair) = junction_pair(column, spec, fields) {
                if !pairs.contains(&pair) {
                    pairs.push(pair);
                }
            }
        }

        for (first, second) in pairs {
            add_many_to_many(
                table,
                (first, second),
                fields,
                &parent_props,
                options,
                &mut used,
                &mut relations,
            )?;
        }
    }

    relations.sort_by(|a, b| {
        a.parent_table
            .cmp(&b.parent_table)
            .then_with(|| a.child_table.cmp(&b.child_table))
    });

    tracing::debug!("Inferred {} relations", relations.len());
    Ok(relations)
}

/// Emit the parent/child relation for one foreign key and return the alias
/// the child uses to reach its parent.
fn add_forward(
    table: &str,
    column: &str,
    spec: &ForeignKeySpec,
    fields: &ForeignKeyMap,
    options: &RelationOptions,
    used: &mut UsedNames,
    relations: &mut Vec<Relation>,
) -> Result<String, RelgenError> {
    let (sources, target) = endpoints(table, column, spec)?;
    let parent_table = target.qualified();
    let child_name = sources.source_table.as_str();

    let parent_prop = parent_alias(column, &target.name, &parent_table, false, options, used);
    let is_one = is_one_to_one(column, spec, fields);
    let child_alias = child_alias(column, child_name, &parent_table, options, used);
    let child_prop = if is_one {
        singularize(&child_alias)
    } else {
        pluralize(&child_alias)
    };

    relations.push(Relation {
        parent_id: column.to_string(),
        parent_model: model_name(&target.name, options),
        parent_prop: parent_prop.clone(),
        parent_table,
        child_model: model_name(child_name, options),
        child_prop,
        child_table: table.to_string(),
        is_one,
        is_m2m: false,
        join_model: None,
        child_id: None,
    });

    Ok(parent_prop)
}

/// A foreign key inside the primary key pairs with the first other such key
/// of its table. The pair is ordered by column position, so each unordered
/// pair is reported once with the earlier column first.
fn junction_pair<'a>(
    column: &'a str,
    spec: &ForeignKeySpec,
    fields: &'a ForeignKeyMap,
) -> Option<(&'a str, &'a str)> {
    if !spec.is_primary_key {
        return None;
    }
    let (partner, _) = fields
        .iter()
        .find(|(other, f)| other.as_str() != column && f.is_foreign_key && f.is_primary_key)?;
    let position = fields.get_index_of(column)?;
    let partner_position = fields.get_index_of(partner.as_str())?;
    if position < partner_position {
        Some((column, partner.as_str()))
    } else {
        Some((partner.as_str(), column))
    }
}

/// Link the two tables a junction pair references, skipping the junction.
fn add_many_to_many(
    table: &str,
    (first, second): (&str, &str),
    fields: &ForeignKeyMap,
    parent_props: &HashMap<&str, String>,
    options: &RelationOptions,
    used: &mut UsedNames,
    relations: &mut Vec<Relation>,
) -> Result<(), RelgenError> {
    let (sources, target) = endpoints(table, first, &fields[first])?;
    let (_, other_target) = endpoints(table, second, &fields[second])?;
    let parent_table = target.qualified();

    let parent_prop = parent_props.get(first).map_or(first, String::as_str);
    let other_alias = parent_alias(
        second,
        &other_target.name,
        &parent_table,
        true,
        options,
        used,
    );

    relations.push(Relation {
        parent_id: first.to_string(),
        parent_model: model_name(&target.name, options),
        parent_prop: pluralize(parent_prop),
        parent_table,
        child_model: model_name(&other_target.name, options),
        child_prop: pluralize(&other_alias),
        child_table: other_target.qualified(),
        is_one: false,
        is_m2m: true,
        join_model: Some(model_name(&sources.source_table, options)),
        child_id: Some(second.to_string()),
    });

    Ok(())
}

/// Resolve the source identifiers and target table of a structural foreign key.
fn endpoints<'a>(
    table: &str,
    column: &str,
    spec: &'a ForeignKeySpec,
) -> Result<(&'a ForeignSources, TableName), RelgenError> {
    let malformed = || RelgenError::MalformedForeignKey {
        table: table.to_string(),
        column: column.to_string(),
    };
    let sources = spec.foreign_sources.as_ref().ok_or_else(malformed)?;
    let target = sources.target().ok_or_else(malformed)?;
    Ok((sources, target))
}

fn model_name(table_name: &str, options: &RelationOptions) -> String {
    recase(options.case_model, table_name, options.singularize)
}

/// One-to-one when the column is the table's only primary-key column, or when
/// it carries a unique marker no other column shares.
fn is_one_to_one(column: &str, spec: &ForeignKeySpec, fields: &ForeignKeyMap) -> bool {
    let sole_primary = spec.is_primary_key
        && !fields
            .iter()
            .any(|(other, f)| f.is_primary_key && other.as_str() != column);
    let sole_unique = spec.is_unique.is_set()
        && !fields
            .iter()
            .any(|(other, f)| f.is_unique == spec.is_unique && other.as_str() != column);
    sole_primary || sole_unique
}

/// Alias used by the child row to reach its parent (`belongsTo` side).
///
/// Many-to-many aliases always take the `column_target` form so that the
/// junction's column names stay visible in the generated association.
fn parent_alias(
    column: &str,
    target_name: &str,
    owner: &str,
    m2m: bool,
    options: &RelationOptions,
    used: &mut UsedNames,
) -> String {
    let mut name = trim_id(column);
    if m2m || name == column {
        name = format!("{column}_{target_name}");
    }
    while used.contains(&alias_key(owner, &name, options)) {
        name = format!("{name}_{target_name}");
    }
    let key = alias_key(owner, &name, options);
    let alias = key.1.clone();
    used.insert(key);
    alias
}

/// Alias used by the parent row to reach its children (`hasMany`/`hasOne` side).
fn child_alias(
    column: &str,
    child_name: &str,
    owner: &str,
    options: &RelationOptions,
    used: &mut UsedNames,
) -> String {
    let mut name = child_name.to_string();
    if used.contains(&alias_key(owner, &name, options)) {
        name = format!("{}_{child_name}", trim_id(column));
        while used.contains(&alias_key(owner, &name, options)) {
            name = format!("{name}_{child_name}");
        }
    }
    let key = alias_key(owner, &name, options);
    let alias = key.1.clone();
    used.insert(key);
    alias
}

fn alias_key(owner: &str, name: &str, options: &RelationOptions) -> (String, String) {
    (owner.to_string(), recase(options.case_prop, name, true))
}

/// Strip a trailing `id` (any case, names longer than 3 characters) and then
/// one trailing underscore.
pub fn trim_id(name: &str) -> String {
    let mut trimmed = name;
    if trimmed.chars().count() > 3 && trimmed.to_ascii_lowercase().ends_with("id") {
        trimmed = &trimmed[..trimmed.len() - 2];
    }
    if let Some(stripped) = trimmed.strip_suffix('_') {
        trimmed = stripped;
    }
    trimmed.to_string()
}
