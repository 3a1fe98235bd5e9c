//! The immutable schema model consumed by builders and formatters.
//!
//! This is the "schema model" the top-level contract describes as an
//! external collaborator: produced by a diff tool, never mutated here.
//! Lookups (`Database::table`, `Database::view`, …) resolve a change's
//! `object_name` against whichever snapshot (`current` or `desired`) a
//! builder needs.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Database {
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<Extension>,
    #[serde(default)]
    pub custom_types: Vec<CustomType>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub views: Vec<View>,
    #[serde(default)]
    pub materialized_views: Vec<MaterializedView>,
    #[serde(default)]
    pub functions: Vec<Function>,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub continuous_aggregates: Vec<ContinuousAggregate>,
}

fn qualified(schema: &str, name: &str) -> String {
    let schema = if schema.is_empty() { "public" } else { schema };
    format!("{}.{}", schema.to_lowercase(), name.to_lowercase())
}

impl Database {
    pub fn table(&self, qualified_name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| qualified(&t.schema, &t.name) == qualified_name.to_lowercase())
    }

    pub fn view(&self, qualified_name: &str) -> Option<&View> {
        self.views
            .iter()
            .find(|v| qualified(&v.schema, &v.name) == qualified_name.to_lowercase())
    }

    pub fn materialized_view(&self, qualified_name: &str) -> Option<&MaterializedView> {
        self.materialized_views
            .iter()
            .find(|v| qualified(&v.schema, &v.name) == qualified_name.to_lowercase())
    }

    /// `object_name` may carry a `(argtypes)` disambiguation suffix (per the
    /// Change.ObjectName contract); it is ignored for lookup purposes here
    /// since two overloads are never both present in the same snapshot in
    /// practice for this generator's inputs.
    pub fn function(&self, object_name: &str) -> Option<&Function> {
        let base = object_name.split('(').next().unwrap_or(object_name);
        self.functions
            .iter()
            .find(|f| qualified(&f.schema, &f.name) == base.to_lowercase())
    }

    pub fn trigger(&self, object_name: &str) -> Option<&Trigger> {
        let parts: Vec<&str> = object_name.split('.').collect();
        let (table, name) = match parts.as_slice() {
            [schema, table, trig] => (qualified(schema, table), trig.to_lowercase()),
            [table, trig] => (qualified("public", table), trig.to_lowercase()),
            _ => return None,
        };
        self.triggers
            .iter()
            .find(|t| qualified(&t.schema, &t.table) == table && t.name.to_lowercase() == name)
    }

    pub fn sequence(&self, qualified_name: &str) -> Option<&Sequence> {
        self.sequences
            .iter()
            .find(|s| qualified(&s.schema, &s.name) == qualified_name.to_lowercase())
    }

    pub fn custom_type(&self, qualified_name: &str) -> Option<&CustomType> {
        self.custom_types
            .iter()
            .find(|c| qualified(&c.schema, &c.name) == qualified_name.to_lowercase())
    }

    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.extensions
            .iter()
            .find(|e| e.name.to_lowercase() == name.to_lowercase())
    }

    pub fn continuous_aggregate(&self, qualified_name: &str) -> Option<&ContinuousAggregate> {
        self.continuous_aggregates
            .iter()
            .find(|c| qualified(&c.schema, &c.view_name) == qualified_name.to_lowercase())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub partitions: Vec<Partition>,
    #[serde(default)]
    pub partition_strategy: Option<PartitionStrategy>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub hypertable: Option<Hypertable>,
    #[serde(default)]
    pub compression: Option<CompressionSettings>,
    #[serde(default)]
    pub retention_policy: Option<RetentionPolicy>,
}

impl Table {
    pub fn qualified_name(&self) -> String {
        qualified(&self.schema, &self.name)
    }

    pub fn is_compressed(&self) -> bool {
        self.compression
            .as_ref()
            .map(|c| c.enabled && (!c.segmentby.is_empty() || !c.orderby.is_empty()))
            .unwrap_or(false)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| {
            c.name
                .as_deref()
                .map(|n| n.eq_ignore_ascii_case(name))
                .unwrap_or(false)
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
    Exclude,
    Other,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub name: Option<String>,
    pub kind: Option<ConstraintKind>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub ref_schema: Option<String>,
    #[serde(default)]
    pub ref_table: Option<String>,
    #[serde(default)]
    pub ref_columns: Vec<String>,
    #[serde(default)]
    pub on_delete: Option<String>,
    #[serde(default)]
    pub on_update: Option<String>,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default)]
    pub deferrable: bool,
    #[serde(default)]
    pub initially_deferred: bool,
}

impl Default for ConstraintKind {
    fn default() -> Self {
        ConstraintKind::Other
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Index {
    pub schema: String,
    pub table: String,
    pub name: String,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub using: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Partition {
    pub schema: String,
    pub name: String,
    pub parent_schema: String,
    pub parent_table: String,
    /// e.g. `FOR VALUES FROM ('2024-01-01') TO ('2024-02-01')`
    pub definition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartitionStrategy {
    /// `RANGE`, `LIST`, or `HASH`.
    pub kind: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct View {
    pub schema: String,
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MaterializedView {
    pub schema: String,
    pub name: String,
    pub definition: String,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArgMode {
    In,
    Out,
    Inout,
    Variadic,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionArg {
    #[serde(default)]
    pub mode: Option<ArgMode>,
    #[serde(default)]
    pub name: Option<String>,
    pub data_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Function {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub args: Vec<FunctionArg>,
    pub return_type: String,
    pub body: String,
    pub language: String,
    #[serde(default)]
    pub volatility: Option<String>,
    #[serde(default)]
    pub security_definer: bool,
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Function {
    pub fn arg_types_sig(&self) -> String {
        self.args
            .iter()
            .map(|a| a.data_type.clone())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerTiming {
    Before,
    After,
    #[serde(rename = "instead of")]
    InsteadOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerEvent {
    Insert,
    Update,
    Delete,
    Truncate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerLevel {
    Row,
    Statement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub timing: TriggerTiming,
    pub events: Vec<TriggerEvent>,
    pub level: TriggerLevel,
    #[serde(default)]
    pub when_clause: Option<String>,
    pub function_schema: String,
    pub function_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hypertable {
    pub schema: String,
    pub table: String,
    pub time_column: String,
    #[serde(default)]
    pub chunk_time_interval: Option<String>,
    #[serde(default)]
    pub number_partitions: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompressionSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub segmentby: Vec<String>,
    /// `(column, direction)` pairs, direction one of `ASC`/`DESC`.
    #[serde(default)]
    pub orderby: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionPolicy {
    pub schema: String,
    pub table: String,
    pub retention_period: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContinuousAggregate {
    pub schema: String,
    pub view_name: String,
    pub hypertable_schema: String,
    pub hypertable_table: String,
    pub query: String,
    #[serde(default)]
    pub with_no_data: bool,
    #[serde(default)]
    pub refresh_start_offset: Option<String>,
    #[serde(default)]
    pub refresh_end_offset: Option<String>,
    #[serde(default)]
    pub refresh_schedule_interval: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomType {
    pub schema: String,
    pub name: String,
    pub definition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extension {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
}
