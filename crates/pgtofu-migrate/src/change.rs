//! The atomic unit of a schema diff, and the typed `Details` bag it carries.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    AddSchema,
    DropSchema,
    AddExtension,
    DropExtension,
    ModifyExtension,
    AddCustomType,
    DropCustomType,
    AddSequence,
    DropSequence,
    AddTable,
    DropTable,
    AddColumn,
    DropColumn,
    ModifyColumnType,
    ModifyColumnNullability,
    ModifyColumnDefault,
    ModifyColumnComment,
    ModifyTableComment,
    AddConstraint,
    DropConstraint,
    ModifyConstraint,
    AddIndex,
    DropIndex,
    AddPartition,
    DropPartition,
    AddView,
    DropView,
    ModifyView,
    AddMaterializedView,
    DropMaterializedView,
    ModifyMaterializedView,
    AddFunction,
    DropFunction,
    ModifyFunction,
    AddTrigger,
    DropTrigger,
    AddHypertable,
    DropHypertable,
    AddCompressionPolicy,
    DropCompressionPolicy,
    ModifyCompressionPolicy,
    AddRetentionPolicy,
    DropRetentionPolicy,
    AddContinuousAggregate,
    DropContinuousAggregate,
    ModifyContinuousAggregate,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

/// A single polymorphic value stored under a well-known `Details` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Str(String),
    Bool(bool),
    Int(i64),
    List(Vec<String>),
}

impl DetailValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            DetailValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self {
            DetailValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// The keyed bag attached to a `Change`. Accessors fail with
/// `Error::InvalidDetails` rather than panicking when a key is absent or
/// holds the wrong shape of value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Details(#[serde(default)] pub HashMap<String, DetailValue>);

impl Details {
    pub fn new() -> Self {
        Details(HashMap::new())
    }

    pub fn insert(mut self, key: impl Into<String>, value: DetailValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get_str<'a>(&'a self, change: &Change, key: &str) -> Result<&'a str> {
        self.0
            .get(key)
            .and_then(DetailValue::as_str)
            .ok_or_else(|| Error::invalid_details(change, key))
    }

    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(DetailValue::as_str)
    }

    pub fn get_bool(&self, change: &Change, key: &str) -> Result<bool> {
        self.0
            .get(key)
            .and_then(DetailValue::as_bool)
            .ok_or_else(|| Error::invalid_details(change, key))
    }

    pub fn get_bool_opt(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(DetailValue::as_bool)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Change {
    #[serde(rename = "type")]
    pub kind: ChangeType,
    pub object_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub details: Details,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub object_type: String,
}

impl Change {
    /// Lower-cased `"schema.name"`, collapsing any extra dotted components
    /// (trigger/function disambiguation suffixes) down to two, per the
    /// normalisation rule used for dependency-graph matching.
    pub fn normalized_object_name(&self) -> String {
        let base = self.object_name.split('(').next().unwrap_or(&self.object_name);
        let parts: Vec<&str> = base.split('.').collect();
        let lower = match parts.as_slice() {
            [name] => format!("public.{}", name.to_lowercase()),
            [schema, name] => format!("{}.{}", schema.to_lowercase(), name.to_lowercase()),
            [schema, table, _rest @ ..] => format!("{}.{}", schema.to_lowercase(), table.to_lowercase()),
            [] => String::new(),
        };
        lower
    }

    /// Splits `object_name` into its schema and bare-name components and
    /// quotes/joins them via [`crate::ident::qualified_name`], preserving
    /// case (unlike `normalized_object_name`, which lower-cases for graph
    /// matching). Use this to build a DDL target from a change whose
    /// object has no corresponding schema snapshot entry to read `schema`/
    /// `name` fields from directly (e.g. a Drop builder with no lookup, or
    /// a comment-only Modify path). Any `(argtypes)` disambiguation suffix
    /// is dropped first; a name with no `.` is treated as bare with an
    /// empty (public-defaulting) schema.
    pub fn qualified_object_name(&self) -> String {
        let base = self.object_name.split('(').next().unwrap_or(&self.object_name);
        match base.split_once('.') {
            Some((schema, name)) => crate::ident::qualified_name(schema, name),
            None => crate::ident::qualified_name("", base),
        }
    }

    /// The schema a change belongs to, for batching purposes: the object's
    /// own name for schema-level changes, otherwise the prefix before the
    /// first `.`, defaulting to `public`.
    pub fn schema_name(&self) -> String {
        match self.kind {
            ChangeType::AddSchema | ChangeType::DropSchema => self.object_name.to_lowercase(),
            _ => {
                let base = self.object_name.split('(').next().unwrap_or(&self.object_name);
                match base.split_once('.') {
                    Some((schema, _)) => schema.to_lowercase(),
                    None => "public".to_string(),
                }
            }
        }
    }

    /// The table a change belongs to (last dotted component before any
    /// `(argtypes)` suffix), lower-cased. Empty for schema/extension-level
    /// changes that have no owning table.
    pub fn table_name(&self) -> Option<String> {
        let base = self.object_name.split('(').next().unwrap_or(&self.object_name);
        match self.kind {
            ChangeType::AddSchema
            | ChangeType::DropSchema
            | ChangeType::AddExtension
            | ChangeType::DropExtension
            | ChangeType::ModifyExtension => None,
            _ => base
                .rsplit('.')
                .next()
                .map(|s| s.to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }

    pub fn is_add(&self) -> bool {
        matches!(
            self.kind,
            ChangeType::AddSchema
                | ChangeType::AddExtension
                | ChangeType::AddCustomType
                | ChangeType::AddSequence
                | ChangeType::AddTable
                | ChangeType::AddColumn
                | ChangeType::AddConstraint
                | ChangeType::AddIndex
                | ChangeType::AddPartition
                | ChangeType::AddView
                | ChangeType::AddMaterializedView
                | ChangeType::AddFunction
                | ChangeType::AddTrigger
                | ChangeType::AddHypertable
                | ChangeType::AddCompressionPolicy
                | ChangeType::AddRetentionPolicy
                | ChangeType::AddContinuousAggregate
        )
    }

    pub fn is_drop(&self) -> bool {
        matches!(
            self.kind,
            ChangeType::DropSchema
                | ChangeType::DropExtension
                | ChangeType::DropCustomType
                | ChangeType::DropSequence
                | ChangeType::DropTable
                | ChangeType::DropColumn
                | ChangeType::DropConstraint
                | ChangeType::DropIndex
                | ChangeType::DropPartition
                | ChangeType::DropView
                | ChangeType::DropMaterializedView
                | ChangeType::DropFunction
                | ChangeType::DropTrigger
                | ChangeType::DropHypertable
                | ChangeType::DropCompressionPolicy
                | ChangeType::DropRetentionPolicy
                | ChangeType::DropContinuousAggregate
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiffResult {
    pub current: Database,
    pub desired: Database,
    #[serde(default)]
    pub changes: Vec<Change>,
}
