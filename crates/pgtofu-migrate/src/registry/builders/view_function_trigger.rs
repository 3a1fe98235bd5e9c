//! Builders for views, materialized views, functions, and triggers.

use crate::change::{Change, ChangeType};
use crate::ddl::{format_comment, format_function, format_materialized_view, format_trigger, format_view};
use crate::error::{Error, Result};
use crate::ident::{qualified_name, quote_identifier};
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;
use crate::schema::Function;

fn function_upper_target(schema: &str, func: &Function) -> String {
    let schema = if schema.is_empty() { "public" } else { schema };
    format!(
        "{}.{}({})",
        quote_identifier(schema),
        func.name.to_uppercase(),
        func.arg_types_sig()
    )
}

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use ChangeType::*;
    match change.kind {
        AddView => {
            let view = ctx.view(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(format!("{};", format_view(view, true)?), change.description.clone()).requires_tx())
        }
        DropView => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP VIEW {}{};", ctx.if_exists(), target),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx())
        }
        ModifyView => build_modify_view(change, ctx, Snapshot::Desired, "new_comment"),
        AddMaterializedView => {
            let view = ctx.materialized_view(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(
                format!("{};", format_materialized_view(view)?),
                change.description.clone(),
            )
            .requires_tx())
        }
        DropMaterializedView => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP MATERIALIZED VIEW {}{};", ctx.if_exists(), target),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx())
        }
        ModifyMaterializedView => build_modify_materialized_view(change, ctx, Snapshot::Desired, "new_comment"),
        AddFunction => {
            let func = ctx.function(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(format!("{};", format_function(func, true)?), change.description.clone()))
        }
        DropFunction => {
            let func = ctx.function(Snapshot::Current, change, &change.normalized_object_name())?;
            let target = function_upper_target(&func.schema, func);
            Ok(DDLStatement::new(
                format!("DROP FUNCTION {}{};", ctx.if_exists(), target),
                change.description.clone(),
            )
            .unsafe_())
        }
        ModifyFunction => build_modify_function(change, ctx, Snapshot::Desired, "new_comment"),
        AddTrigger => {
            let trig = ctx.trigger(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(format!("{};", format_trigger(trig)?), change.description.clone()))
        }
        DropTrigger => {
            let trig = ctx.trigger(Snapshot::Current, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(
                format!(
                    "DROP TRIGGER {}{} ON {};",
                    ctx.if_exists(),
                    quote_identifier(&trig.name),
                    qualified_name(&trig.schema, &trig.table)
                ),
                change.description.clone(),
            )
            .unsafe_())
        }
        _ => Err(Error::unsupported(change)),
    }
}

fn build_modify_view(change: &Change, ctx: &Context, snapshot: Snapshot, comment_key: &str) -> Result<DDLStatement> {
    let other_key = if comment_key == "new_comment" { "old_comment" } else { "new_comment" };
    let target = change.qualified_object_name();
    if change.details.get_str_opt(comment_key).is_some() && change.details.get_str_opt(other_key).is_some() {
        let comment = change.details.get_str_opt(comment_key);
        return Ok(DDLStatement::new(format_comment("VIEW", &target, comment), change.description.clone()));
    }
    let view = ctx.view(snapshot, change, &change.normalized_object_name())?;
    Ok(DDLStatement::new(format!("{};", format_view(view, true)?), change.description.clone()).requires_tx())
}

fn build_modify_materialized_view(
    change: &Change,
    ctx: &Context,
    snapshot: Snapshot,
    comment_key: &str,
) -> Result<DDLStatement> {
    let other_key = if comment_key == "new_comment" { "old_comment" } else { "new_comment" };
    let target = change.qualified_object_name();
    if change.details.get_str_opt(comment_key).is_some() && change.details.get_str_opt(other_key).is_some() {
        let comment = change.details.get_str_opt(comment_key);
        return Ok(DDLStatement::new(
            format_comment("MATERIALIZED VIEW", &target, comment),
            change.description.clone(),
        ));
    }
    let view = ctx.materialized_view(snapshot, change, &change.normalized_object_name())?;
    let sql = format!(
        "DROP MATERIALIZED VIEW {}{};\n\n{};",
        ctx.if_exists(),
        target,
        format_materialized_view(view)?
    );
    Ok(DDLStatement::new(sql, change.description.clone()).unsafe_().requires_tx())
}

fn build_modify_function(change: &Change, ctx: &Context, snapshot: Snapshot, comment_key: &str) -> Result<DDLStatement> {
    let other_key = if comment_key == "new_comment" { "old_comment" } else { "new_comment" };
    if change.details.get_str_opt(comment_key).is_some() && change.details.get_str_opt(other_key).is_some() {
        let comment = change.details.get_str_opt(comment_key);
        let func = ctx.function(snapshot, change, &change.normalized_object_name())?;
        let target = match comment {
            Some(c) if !c.trim().is_empty() => function_upper_target(&func.schema, func),
            _ => qualified_name(&func.schema, &func.name),
        };
        return Ok(DDLStatement::new(format_comment("FUNCTION", &target, comment), change.description.clone()));
    }
    let func = ctx.function(snapshot, change, &change.normalized_object_name())?;
    Ok(DDLStatement::new(format!("{};", format_function(func, true)?), change.description.clone()))
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    match change.kind {
        ChangeType::ModifyView => build_modify_view(change, ctx, Snapshot::Current, "old_comment"),
        ChangeType::ModifyMaterializedView => build_modify_materialized_view(change, ctx, Snapshot::Current, "old_comment"),
        ChangeType::ModifyFunction => build_modify_function(change, ctx, Snapshot::Current, "old_comment"),
        _ => Err(Error::unsupported(change)),
    }
}
