//! Builders for TimescaleDB-specific changes: hypertables, compression
//! policies, retention policies, and continuous aggregates.

use crate::change::{Change, ChangeType};
use crate::ddl::{format_compression_policy, format_continuous_aggregate, format_retention_policy};
use crate::error::{Error, Result};
use crate::ident::quote_literal;
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use ChangeType::*;
    match change.kind {
        AddHypertable => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let ht = table
                .hypertable
                .as_ref()
                .ok_or_else(|| Error::not_found("Hypertable", table.qualified_name()))?;
            Ok(DDLStatement::new(
                format!("{};", crate::ddl::format_hypertable(ht)?),
                change.description.clone(),
            ))
        }
        DropHypertable => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!(
                    "-- WARNING: TimescaleDB has no operation to convert hypertable {} back into a regular table; manual intervention required.",
                    target
                ),
                change.description.clone(),
            )
            .unsafe_())
        }
        AddCompressionPolicy => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let settings = table
                .compression
                .as_ref()
                .ok_or_else(|| Error::not_found("Hypertable", table.qualified_name()))?;
            Ok(DDLStatement::new(
                format!("{};", format_compression_policy(&table.schema, &table.name, settings)),
                change.description.clone(),
            ))
        }
        DropCompressionPolicy => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("ALTER TABLE {} SET (timescaledb.compress = false);", target),
                change.description.clone(),
            ))
        }
        ModifyCompressionPolicy => build_modify_compression(change, ctx, Snapshot::Desired),
        AddRetentionPolicy => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let policy = table
                .retention_policy
                .as_ref()
                .ok_or_else(|| Error::not_found("Hypertable", table.qualified_name()))?;
            Ok(DDLStatement::new(
                format!("{};", format_retention_policy(policy)?),
                change.description.clone(),
            ))
        }
        DropRetentionPolicy => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("SELECT remove_retention_policy({});", quote_literal(&target.replace('"', ""))),
                change.description.clone(),
            ))
        }
        AddContinuousAggregate => {
            let agg = ctx.continuous_aggregate(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(format_continuous_aggregate(agg)?, change.description.clone()))
        }
        DropContinuousAggregate => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP MATERIALIZED VIEW {}{};", ctx.if_exists(), target),
                change.description.clone(),
            )
            .unsafe_())
        }
        ModifyContinuousAggregate => build_modify_aggregate(change, ctx, Snapshot::Desired, "new_comment"),
        _ => Err(Error::unsupported(change)),
    }
}

fn build_modify_compression(change: &Change, ctx: &Context, snapshot: Snapshot) -> Result<DDLStatement> {
    let table = ctx.table(snapshot, change, &change.normalized_object_name())?;
    let settings = table
        .compression
        .as_ref()
        .ok_or_else(|| Error::not_found("Hypertable", table.qualified_name()))?;
    Ok(DDLStatement::new(
        format!("{};", format_compression_policy(&table.schema, &table.name, settings)),
        change.description.clone(),
    ))
}

fn build_modify_aggregate(change: &Change, ctx: &Context, snapshot: Snapshot, comment_key: &str) -> Result<DDLStatement> {
    let other_key = if comment_key == "new_comment" { "old_comment" } else { "new_comment" };
    let target = change.qualified_object_name();
    if change.details.get_str_opt(comment_key).is_some() && change.details.get_str_opt(other_key).is_some() {
        let comment = change.details.get_str_opt(comment_key);
        return Ok(DDLStatement::new(
            crate::ddl::format_comment("MATERIALIZED VIEW", &target, comment),
            change.description.clone(),
        ));
    }
    let agg = ctx.continuous_aggregate(snapshot, change, &change.normalized_object_name())?;
    let sql = format!(
        "DROP MATERIALIZED VIEW {}{};\n\n{}",
        ctx.if_exists(),
        target,
        format_continuous_aggregate(agg)?
    );
    Ok(DDLStatement::new(sql, change.description.clone()).unsafe_())
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    match change.kind {
        ChangeType::ModifyCompressionPolicy => build_modify_compression(change, ctx, Snapshot::Current),
        ChangeType::ModifyContinuousAggregate => build_modify_aggregate(change, ctx, Snapshot::Current, "old_comment"),
        _ => Err(Error::unsupported(change)),
    }
}
