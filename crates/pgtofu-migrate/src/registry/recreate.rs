//! Special-cased recreation paths: kinds whose DOWN cannot be expressed
//! as a shallow inverse-type swap because synthesising the CREATE
//! requires reading the full object out of the source-of-truth snapshot.

use crate::change::{Change, ChangeType};
use crate::ddl::{format_comment, format_create_table, format_function, format_hypertable, format_materialized_view, format_trigger, format_view};
use crate::error::Result;
use crate::ident::qualified_name;
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;

/// Returns `Some(stmt)` when `change.kind` has a special recreation path;
/// `None` lets the caller fall through to the self-reverse/inverse-map
/// logic.
pub fn try_build(change: &Change, ctx: &Context) -> Result<Option<DDLStatement>> {
    let stmt = match change.kind {
        ChangeType::AddTable => Some(drop_table_for_down(change, ctx)?),
        ChangeType::DropTable => Some(add_table_for_down(change, ctx)?),
        ChangeType::DropTrigger => Some(add_trigger_for_down(change, ctx)?),
        ChangeType::DropView => Some(add_view_for_down(change, ctx)?),
        ChangeType::DropMaterializedView => Some(add_materialized_view_for_down(change, ctx)?),
        ChangeType::DropFunction => Some(add_function_for_down(change, ctx)?),
        ChangeType::DropHypertable => Some(recreate_hypertable_for_down(change, ctx)?),
        _ => None,
    };
    Ok(stmt)
}

fn drop_table_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let target = change.qualified_object_name();
    Ok(DDLStatement::new(
        format!("DROP TABLE {}{} CASCADE;", ctx.if_exists(), target),
        change.description.clone(),
    )
    .unsafe_()
    .requires_tx())
}

fn add_table_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let table = ctx.table(Snapshot::Current, change, &change.normalized_object_name())?;
    let mut parts = vec![format_create_table(table, ctx.idempotent)?];

    if let Some(ht) = &table.hypertable {
        parts.push(format!("{};", format_hypertable(ht)?));
    }
    if let Some(compression) = &table.compression {
        if compression.enabled {
            parts.push(format!(
                "{};",
                crate::ddl::format_compression_policy(&table.schema, &table.name, compression)
            ));
        }
    }
    if let Some(retention) = &table.retention_policy {
        parts.push(format!("{};", crate::ddl::format_retention_policy(retention)?));
    }
    for column in &table.columns {
        if let Some(comment) = &column.comment {
            if !comment.trim().is_empty() {
                let target = format!(
                    "{}.{}",
                    table.qualified_name(),
                    crate::ident::quote_identifier(&column.name)
                );
                parts.push(format_comment("COLUMN", &target, Some(comment)));
            }
        }
    }
    if let Some(comment) = &table.comment {
        if !comment.trim().is_empty() {
            parts.push(format_comment("TABLE", &table.qualified_name(), Some(comment)));
        }
    }

    Ok(DDLStatement::new(parts.join("\n\n"), change.description.clone()).requires_tx())
}

fn add_trigger_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let trig = ctx.trigger(Snapshot::Current, change, &change.normalized_object_name())?;
    Ok(DDLStatement::new(format!("{};", format_trigger(trig)?), change.description.clone()))
}

fn add_view_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let view = ctx.view(Snapshot::Current, change, &change.normalized_object_name())?;
    let mut parts = vec![format!("{};", format_view(view, true)?)];
    if let Some(comment) = &view.comment {
        if !comment.trim().is_empty() {
            let target = qualified_name(&view.schema, &view.name);
            parts.push(format_comment("VIEW", &target, Some(comment)));
        }
    }
    Ok(DDLStatement::new(parts.join("\n\n"), change.description.clone()).requires_tx())
}

fn add_materialized_view_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let view = ctx.materialized_view(Snapshot::Current, change, &change.normalized_object_name())?;
    let mut parts = vec![format!("{};", format_materialized_view(view)?)];
    if let Some(comment) = &view.comment {
        if !comment.trim().is_empty() {
            let target = qualified_name(&view.schema, &view.name);
            parts.push(format_comment("MATERIALIZED VIEW", &target, Some(comment)));
        }
    }
    Ok(DDLStatement::new(parts.join("\n\n"), change.description.clone()).requires_tx())
}

fn add_function_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let func = ctx.function(Snapshot::Current, change, &change.normalized_object_name())?;
    let mut parts = vec![format!("{};", format_function(func, true)?)];
    if let Some(comment) = &func.comment {
        if !comment.trim().is_empty() {
            let schema = if func.schema.is_empty() { "public" } else { &func.schema };
            let target = format!(
                "{}.{}({})",
                crate::ident::quote_identifier(schema),
                func.name.to_uppercase(),
                func.arg_types_sig()
            );
            parts.push(format_comment("FUNCTION", &target, Some(comment)));
        }
    }
    Ok(DDLStatement::new(parts.join("\n\n"), change.description.clone()))
}

fn recreate_hypertable_for_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    let target = change.qualified_object_name();
    let mut parts = vec![format!(
        "-- WARNING: manual intervention required to restore {} as a hypertable; the statement below is a best-effort attempt.",
        target
    )];
    if let Ok(table) = ctx.table(Snapshot::Current, change, &change.normalized_object_name()) {
        if let Some(ht) = &table.hypertable {
            if let Ok(sql) = format_hypertable(ht) {
                parts.push(format!("{};", sql));
            }
        }
    }
    Ok(DDLStatement::new(parts.join("\n"), change.description.clone()).unsafe_())
}
