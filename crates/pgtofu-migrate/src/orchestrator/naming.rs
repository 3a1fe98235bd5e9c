//! Derives a human-readable migration description from a batch of
//! changes (§4.6.2).

use std::collections::HashSet;

use crate::change::{Change, ChangeType};
use crate::version::sanitize_description;

fn category(kind: ChangeType) -> &'static str {
    use ChangeType::*;
    match kind {
        AddTable | DropTable => "table-set",
        AddColumn | DropColumn | ModifyColumnType | ModifyColumnNullability | ModifyColumnDefault
        | ModifyColumnComment | ModifyTableComment => "table-set",
        AddConstraint | DropConstraint | ModifyConstraint => "table-set",
        AddIndex | DropIndex => "index-set",
        AddView | DropView | ModifyView | AddMaterializedView | DropMaterializedView | ModifyMaterializedView => {
            "view-set"
        }
        AddFunction | DropFunction | ModifyFunction | AddTrigger | DropTrigger => "function-set",
        AddHypertable | DropHypertable | AddCompressionPolicy | DropCompressionPolicy | ModifyCompressionPolicy
        | AddRetentionPolicy | DropRetentionPolicy | AddContinuousAggregate | DropContinuousAggregate
        | ModifyContinuousAggregate => "timescale-set",
        _ => "other",
    }
}

fn category_verb(kind: ChangeType) -> Option<&'static str> {
    use ChangeType::*;
    Some(match kind {
        AddSchema => "add_schema",
        DropSchema => "drop_schema",
        AddTable => "add_table",
        DropTable => "drop_table",
        AddColumn => "add_columns",
        DropColumn => "drop_columns",
        ModifyColumnType => "modify_column_types",
        AddIndex => "add_index",
        DropIndex => "drop_index",
        AddConstraint => "add_constraint",
        DropConstraint => "drop_constraint",
        AddView | AddMaterializedView | ModifyView | ModifyMaterializedView => "update_view",
        AddFunction | ModifyFunction => "update_function",
        AddHypertable => "add_hypertable",
        AddCompressionPolicy => "add_compression",
        AddRetentionPolicy => "add_retention",
        AddContinuousAggregate => "add_continuous_aggregate",
        _ => return None,
    })
}

/// Strips a trailing `(argtypes)` disambiguation suffix, then the table
/// for column-family changes (next-to-last dotted component) or the last
/// component otherwise, then trailing non-alphanumerics.
fn simple_object_name(change: &Change) -> String {
    let base = change.object_name.split('(').next().unwrap_or(&change.object_name);
    let parts: Vec<&str> = base.split('.').collect();
    let is_column_change = matches!(
        change.kind,
        ChangeType::AddColumn
            | ChangeType::DropColumn
            | ChangeType::ModifyColumnType
            | ChangeType::ModifyColumnNullability
            | ChangeType::ModifyColumnDefault
            | ChangeType::ModifyColumnComment
    );
    let raw = if is_column_change && parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        parts.last().copied().unwrap_or(base)
    };
    raw.trim_end_matches(|c: char| !c.is_ascii_alphanumeric()).to_string()
}

fn schema_prefix(changes: &[Change]) -> String {
    let mut schemas: Vec<String> = changes
        .iter()
        .map(|c| c.schema_name())
        .filter(|s| s != "public")
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    schemas.sort();
    match schemas.len() {
        0 => String::new(),
        1 => format!("{}_", schemas[0]),
        2 => format!("{}_and_{}_", schemas[0], schemas[1]),
        _ => "multi_schema_".to_string(),
    }
}

pub fn derive_description(changes: &[Change]) -> String {
    if changes.is_empty() {
        return "no_changes".to_string();
    }

    let prefix = schema_prefix(changes);

    if changes.len() == 1 {
        let verb = category_verb(changes[0].kind).unwrap_or("schema_changes");
        if verb == "schema_changes" {
            return sanitize_description(verb);
        }
        let suffix = simple_object_name(&changes[0]);
        return sanitize_description(&format!("{}{}_{}", prefix, verb, suffix));
    }

    let kinds: HashSet<ChangeType> = changes.iter().map(|c| c.kind).collect();
    if kinds.len() == 1 {
        let verb = category_verb(changes[0].kind).unwrap_or("schema_changes");
        if verb == "schema_changes" {
            return sanitize_description(verb);
        }
        let suffix = simple_object_name(&changes[0]);
        return sanitize_description(&format!("{}{}_{}", prefix, verb, suffix));
    }

    let categories: HashSet<&'static str> = changes.iter().map(|c| category(c.kind)).collect();
    if categories.len() == 1 {
        let cat = *categories.iter().next().unwrap();
        let name = match cat {
            "table-set" => "update_tables",
            "index-set" => "update_indexes",
            "view-set" => "update_views",
            "function-set" => "update_functions",
            "timescale-set" => "update_timescale",
            _ => "schema_changes",
        };
        return sanitize_description(&format!("{}{}", prefix, name));
    }

    sanitize_description("schema_changes")
}
