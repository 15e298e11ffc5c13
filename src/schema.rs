use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::RelgenError;
use crate::relations::{infer_relations, RelationOptions};

/// Column descriptors of one table, keyed by column name in catalog order.
pub type ColumnMap = IndexMap<String, ColumnDescriptor>;

/// Foreign-key specs of one table, keyed by source column name.
pub type ForeignKeyMap = IndexMap<String, ForeignKeySpec>;

/// A possibly schema-qualified table identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl TableName {
    pub fn new(schema: Option<&str>, name: &str) -> Self {
        Self {
            schema: schema.filter(|s| !s.is_empty()).map(str::to_string),
            name: name.to_string(),
        }
    }

    /// Parse `"schema.name"` or a bare `"name"`.
    pub fn parse(qualified: &str) -> Self {
        match qualified.split_once('.') {
            Some((schema, name)) => Self::new(Some(schema), name),
            None => Self::new(None, qualified),
        }
    }

    /// The key used for this table in every `SchemaModel` map.
    pub fn qualified(&self) -> String {
        self.to_string()
    }

    /// Case-sensitive match where an absent schema on either side matches any schema.
    pub fn matches(&self, other: &TableName) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.schema, &other.schema) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.schema {
            Some(ref schema) => write!(f, "{schema}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Metadata for a single column, as described by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnDescriptor {
    /// Raw engine type, e.g. `character varying(100)` or `int(11)`.
    pub data_type: String,
    pub allow_null: bool,
    pub default_value: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub unique: bool,
    pub comment: Option<String>,
    /// Enum labels for enumerated types.
    pub special: Vec<String>,
    pub foreign_key: Option<ForeignKeySpec>,
}

/// Unique-constraint marker: a bare flag or the name of the covering constraint.
///
/// Composite unique constraints put the same name on every member column, which
/// is how the inferrer tells them apart from single-column ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UniqueMarker {
    Flag(bool),
    Constraint(String),
}

impl UniqueMarker {
    pub fn is_set(&self) -> bool {
        match self {
            UniqueMarker::Flag(flag) => *flag,
            UniqueMarker::Constraint(_) => true,
        }
    }
}

impl Default for UniqueMarker {
    fn default() -> Self {
        UniqueMarker::Flag(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignSources {
    pub source_schema: Option<String>,
    pub source_table: String,
    pub source_column: String,
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_column: String,
}

impl ForeignSources {
    pub fn source(&self) -> TableName {
        TableName::new(self.source_schema.as_deref(), &self.source_table)
    }

    pub fn target(&self) -> Option<TableName> {
        self.target_table
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| TableName::new(self.target_schema.as_deref(), t))
    }
}

/// One column's key participation: foreign key edge, primary key, unique, serial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignKeySpec {
    pub constraint_name: Option<String>,
    pub source_schema: Option<String>,
    pub source_table: String,
    pub source_column: String,
    pub target_schema: Option<String>,
    pub target_table: Option<String>,
    pub target_column: Option<String>,
    pub is_foreign_key: bool,
    pub is_primary_key: bool,
    pub is_unique: UniqueMarker,
    pub is_serial_key: bool,
    pub foreign_sources: Option<ForeignSources>,
}

impl ForeignKeySpec {
    /// Fold another catalog row for the same column into this spec.
    pub fn merge(&mut self, other: ForeignKeySpec) {
        if other.constraint_name.is_some() {
            self.constraint_name = other.constraint_name;
        }
        if other.foreign_sources.is_some() {
            self.target_schema = other.target_schema;
            self.target_table = other.target_table;
            self.target_column = other.target_column;
            self.foreign_sources = other.foreign_sources;
        }
        if other.is_unique.is_set() {
            self.is_unique = other.is_unique;
        }
        self.is_foreign_key |= other.is_foreign_key;
        self.is_primary_key |= other.is_primary_key;
        self.is_serial_key |= other.is_serial_key;
    }
}

/// Metadata for a database index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub unique: bool,
    pub columns: Vec<String>,
}

/// One inferred association between two tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    /// Foreign-key column on the child (or junction) table.
    pub parent_id: String,
    pub parent_model: String,
    /// Alias the child uses to reach its parent.
    pub parent_prop: String,
    pub parent_table: String,
    pub child_model: String,
    /// Alias the parent uses to reach its children.
    pub child_prop: String,
    pub child_table: String,
    pub is_one: bool,
    #[serde(rename = "isM2M")]
    pub is_m2m: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_id: Option<String>,
}

/// Everything captured from the catalog, plus the relations inferred from it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaModel {
    pub tables: IndexMap<String, ColumnMap>,
    pub foreign_keys: IndexMap<String, ForeignKeyMap>,
    pub has_trigger_tables: BTreeSet<String>,
    pub indexes: IndexMap<String, Vec<IndexInfo>>,
    pub relations: Vec<Relation>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run relation inference over the captured foreign keys and store the result.
    pub fn relate(&mut self, options: &RelationOptions) -> Result<(), RelgenError> {
        self.relations = infer_relations(&self.foreign_keys, options)?;
        Ok(())
    }

    pub fn has_trigger(&self, table: &str) -> bool {
        self.has_trigger_tables.contains(table)
    }
}
