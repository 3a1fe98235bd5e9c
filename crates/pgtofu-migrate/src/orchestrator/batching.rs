//! Groups a diff's changes into per-file batches (§4.6.1): schema-creation
//! first, extensions next, then per-schema groups ordered by inter-schema
//! dependency, intra-schema sorted by table/priority, finally split under
//! the operation cap while respecting cohesion rules.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::change::{Change, ChangeType, DiffResult};
use crate::graph::Graph;
use crate::options::Options;

fn is_schema_change(kind: ChangeType) -> bool {
    matches!(kind, ChangeType::AddSchema | ChangeType::DropSchema)
}

fn is_extension_change(kind: ChangeType) -> bool {
    matches!(
        kind,
        ChangeType::AddExtension | ChangeType::DropExtension | ChangeType::ModifyExtension
    )
}

fn table_priority(kind: ChangeType) -> u32 {
    use ChangeType::*;
    match kind {
        AddTable => 1,
        ModifyTableComment => 2,
        AddColumn => 3,
        ModifyColumnComment => 4,
        ModifyColumnType => 5,
        ModifyColumnNullability => 6,
        ModifyColumnDefault => 7,
        AddConstraint => 8,
        AddIndex => 9,
        _ => 100,
    }
}

/// Maps a normalised or raw-qualified object name to the schema it belongs
/// to, built from every change in the diff (not just the batch being
/// ordered), as §4.6.1 step 4 requires for `DependsOn` resolution.
fn build_name_to_schema(all_changes: &[Change]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for c in all_changes {
        let schema = c.schema_name();
        map.insert(c.normalized_object_name(), schema.clone());
        let raw_lower = c.object_name.to_lowercase();
        map.entry(raw_lower).or_insert_with(|| schema.clone());
    }
    map
}

fn resolve_dependency_schema(dep: &str, name_to_schema: &HashMap<String, String>) -> Option<String> {
    let lower = dep.to_lowercase();
    if let Some(schema) = name_to_schema.get(&lower) {
        return Some(schema.clone());
    }
    if !lower.contains('.') {
        let bare = format!("public.{}", lower);
        if let Some(schema) = name_to_schema.get(&bare) {
            return Some(schema.clone());
        }
    }
    None
}

/// Orders schema names by inter-schema dependency (falling back to
/// alphabetical on a cycle), then stably moves schemas that are themselves
/// being created or dropped this migration to the front.
fn order_schemas(
    groups: &BTreeMap<String, Vec<Change>>,
    all_changes: &[Change],
    schema_creation_schemas: &HashSet<String>,
) -> Vec<String> {
    let name_to_schema = build_name_to_schema(all_changes);

    let mut graph: Graph<String> = Graph::new();
    for schema in groups.keys() {
        graph.add_node(schema.clone());
    }
    for (schema, changes) in groups {
        for change in changes {
            for dep in &change.depends_on {
                if let Some(dep_schema) = resolve_dependency_schema(dep, &name_to_schema) {
                    if &dep_schema != schema && graph.has_node(&dep_schema) {
                        let _ = graph.add_edge(schema, &dep_schema);
                    }
                }
            }
        }
    }

    let ordered = match graph.topological_sort() {
        Ok(order) => order,
        Err(_) => {
            let mut names: Vec<String> = groups.keys().cloned().collect();
            names.sort();
            names
        }
    };

    let (front, rest): (Vec<String>, Vec<String>) =
        ordered.into_iter().partition(|s| schema_creation_schemas.contains(s));
    front.into_iter().chain(rest).collect()
}

/// Sorts one schema's changes per §4.6.1 step 5: table groups ordered by
/// minimum `order` (ties by table name), then within a group by the fixed
/// priority table (ties by the change's own `order`).
fn sort_schema_changes(mut changes: Vec<Change>) -> Vec<Change> {
    let mut table_min_order: HashMap<String, i64> = HashMap::new();
    for c in &changes {
        let key = c.table_name().unwrap_or_default();
        let entry = table_min_order.entry(key).or_insert(c.order);
        if c.order < *entry {
            *entry = c.order;
        }
    }

    changes.sort_by(|a, b| {
        let a_schema_change = is_schema_change(a.kind);
        let b_schema_change = is_schema_change(b.kind);
        if a_schema_change != b_schema_change {
            return if a_schema_change { Ordering::Less } else { Ordering::Greater };
        }

        let a_table = a.table_name().unwrap_or_default();
        let b_table = b.table_name().unwrap_or_default();
        if a_table != b_table {
            let a_min = table_min_order.get(&a_table).copied().unwrap_or(0);
            let b_min = table_min_order.get(&b_table).copied().unwrap_or(0);
            return a_min.cmp(&b_min).then_with(|| a_table.cmp(&b_table));
        }

        table_priority(a.kind)
            .cmp(&table_priority(b.kind))
            .then_with(|| a.order.cmp(&b.order))
    });

    changes
}

fn columns_of_index(diff: &DiffResult, change: &Change) -> Vec<String> {
    let Some(index_name) = change.details.get_str_opt("index") else {
        return Vec::new();
    };
    let Some(table) = diff.desired.table(&change.normalized_object_name()) else {
        return Vec::new();
    };
    table
        .indexes
        .iter()
        .find(|i| i.name.eq_ignore_ascii_case(index_name))
        .map(|i| i.columns.clone())
        .unwrap_or_default()
}

/// Returns true when a split between `batch` (so far) and `next` would
/// violate one of the five cohesion rules in §4.6.1 step 6.
fn forbids_split(batch: &[Change], next: &Change, diff: &DiffResult) -> bool {
    let batch_object_names: HashSet<String> = batch.iter().map(|c| c.normalized_object_name()).collect();
    if next
        .depends_on
        .iter()
        .any(|dep| batch_object_names.contains(&dep.to_lowercase()))
    {
        return true;
    }

    if let Some(next_table) = next.table_name() {
        if batch.iter().any(|c| c.table_name().as_deref() == Some(next_table.as_str())) {
            return true;
        }
    }

    if matches!(next.kind, ChangeType::AddView | ChangeType::AddMaterializedView) {
        let drop_kind = if next.kind == ChangeType::AddView {
            ChangeType::DropView
        } else {
            ChangeType::DropMaterializedView
        };
        if batch
            .iter()
            .any(|c| c.kind == drop_kind && c.normalized_object_name() == next.normalized_object_name())
        {
            return true;
        }
    }

    if next.kind == ChangeType::AddConstraint {
        if batch.iter().any(|c| {
            c.kind == ChangeType::DropConstraint && c.normalized_object_name() == next.normalized_object_name()
        }) {
            return true;
        }
    }

    if next.kind == ChangeType::AddIndex {
        let index_columns = columns_of_index(diff, next);
        if !index_columns.is_empty() {
            let added_columns: HashSet<String> = batch
                .iter()
                .filter(|c| c.kind == ChangeType::AddColumn)
                .filter_map(|c| c.details.get_str_opt("column_name"))
                .map(|s| s.to_lowercase())
                .collect();
            if index_columns.iter().any(|col| added_columns.contains(&col.to_lowercase())) {
                return true;
            }
        }
    }

    false
}

fn split_under_cap(changes: Vec<Change>, max_ops: usize, diff: &DiffResult) -> Vec<Vec<Change>> {
    let mut batches: Vec<Vec<Change>> = Vec::new();
    let mut current: Vec<Change> = Vec::new();

    for change in changes {
        if !current.is_empty() && current.len() >= max_ops && !forbids_split(&current, &change, diff) {
            batches.push(std::mem::take(&mut current));
        }
        current.push(change);
    }
    if !current.is_empty() {
        batches.push(current);
    }
    batches
}

pub fn build_batches(diff: &DiffResult, options: &Options) -> Vec<Vec<Change>> {
    let mut schema_batch: Vec<Change> = Vec::new();
    let mut extension_batch: Vec<Change> = Vec::new();
    let mut remainder: Vec<Change> = Vec::new();

    for change in &diff.changes {
        if is_schema_change(change.kind) {
            schema_batch.push(change.clone());
        } else if is_extension_change(change.kind) {
            extension_batch.push(change.clone());
        } else {
            remainder.push(change.clone());
        }
    }

    let schema_creation_schemas: HashSet<String> = schema_batch.iter().map(|c| c.schema_name()).collect();

    let mut groups: BTreeMap<String, Vec<Change>> = BTreeMap::new();
    for change in remainder {
        groups.entry(change.schema_name()).or_default().push(change);
    }

    let schema_order = order_schemas(&groups, &diff.changes, &schema_creation_schemas);

    let mut ordered_remainder: Vec<Change> = Vec::new();
    for schema in &schema_order {
        if let Some(changes) = groups.remove(schema) {
            ordered_remainder.extend(sort_schema_changes(changes));
        }
    }

    let mut batches: Vec<Vec<Change>> = Vec::new();
    if !schema_batch.is_empty() {
        batches.push(schema_batch);
    }
    if !extension_batch.is_empty() {
        batches.push(extension_batch);
    }
    batches.extend(split_under_cap(ordered_remainder, options.max_operations_per_file, diff));

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{DetailValue, Details, Severity};
    use crate::schema::Database;

    fn change(kind: ChangeType, object_name: &str, order: i64, depends_on: Vec<&str>) -> Change {
        Change {
            kind,
            object_name: object_name.to_string(),
            description: String::new(),
            order,
            depends_on: depends_on.into_iter().map(String::from).collect(),
            details: Details::new(),
            severity: Severity::Info,
            object_type: String::new(),
        }
    }

    fn diff_with(changes: Vec<Change>) -> DiffResult {
        DiffResult {
            current: Database::default(),
            desired: Database::default(),
            changes,
        }
    }

    #[test]
    fn schema_and_extension_batches_come_first() {
        let changes = vec![
            change(ChangeType::AddTable, "public.widgets", 0, vec![]),
            change(ChangeType::AddExtension, "pgcrypto", 0, vec![]),
            change(ChangeType::AddSchema, "billing", 0, vec![]),
        ];
        let diff = diff_with(changes);
        let options = Options::default();
        let batches = build_batches(&diff, &options);
        assert_eq!(batches[0][0].kind, ChangeType::AddSchema);
        assert_eq!(batches[1][0].kind, ChangeType::AddExtension);
        assert_eq!(batches[2][0].kind, ChangeType::AddTable);
    }

    #[test]
    fn cross_schema_dependency_orders_dependency_first() {
        let changes = vec![
            change(ChangeType::AddTable, "content.items", 1, vec!["app.codes"]),
            change(ChangeType::AddTable, "app.codes", 0, vec![]),
        ];
        let diff = diff_with(changes);
        let options = Options::default();
        let batches = build_batches(&diff, &options);
        let flattened: Vec<&Change> = batches.iter().flatten().collect();
        let app_pos = flattened.iter().position(|c| c.object_name == "app.codes").unwrap();
        let content_pos = flattened.iter().position(|c| c.object_name == "content.items").unwrap();
        assert!(app_pos < content_pos);
    }

    #[test]
    fn primary_key_replacement_stays_cohesive_despite_low_cap() {
        let mut drop_pk = change(ChangeType::DropConstraint, "public.orders", 0, vec![]);
        drop_pk.details = Details::new().insert("constraint", DetailValue::Str("orders_pkey_old".into()));
        let mut add_pk = change(ChangeType::AddConstraint, "public.orders", 1, vec![]);
        add_pk.details = Details::new().insert("constraint", DetailValue::Str("orders_pkey".into()));
        let changes = vec![drop_pk, add_pk];
        let diff = diff_with(changes);
        let mut options = Options::default();
        options.max_operations_per_file = 1;
        let batches = build_batches(&diff, &options);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn table_group_ordering_respects_add_table_priority() {
        let changes = vec![
            change(ChangeType::AddColumn, "public.widgets", 1, vec![]),
            change(ChangeType::AddTable, "public.widgets", 0, vec![]),
        ];
        let diff = diff_with(changes);
        let options = Options::default();
        let batches = build_batches(&diff, &options);
        let flattened: Vec<&Change> = batches.iter().flatten().collect();
        assert_eq!(flattened[0].kind, ChangeType::AddTable);
        assert_eq!(flattened[1].kind, ChangeType::AddColumn);
    }
}
