//! Builders for table-, column-, and partition-level changes.

use crate::change::{Change, ChangeType};
use crate::compression_wrap;
use crate::ddl::{self, format_column};
use crate::error::{Error, Result};
use crate::ident::{normalize_data_type, normalize_default_value, qualified_name, quote_identifier};
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;
use crate::schema::{Database, Partition, Table};

fn find_partition<'a>(db: &'a Database, qualified: &str) -> Option<(&'a Table, &'a Partition)> {
    db.tables.iter().find_map(|t| {
        t.partitions
            .iter()
            .find(|p| format!("{}.{}", p.schema.to_lowercase(), p.name.to_lowercase()) == qualified)
            .map(|p| (t, p))
    })
}

fn column_name(change: &Change) -> Result<&str> {
    change.details.get_str(change, "column_name")
}

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use ChangeType::*;
    match change.kind {
        AddTable => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let sql = ddl::format_create_table(table, ctx.idempotent)?;
            Ok(DDLStatement::new(sql, change.description.clone()).requires_tx())
        }
        DropTable => {
            let target = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP TABLE {}{} CASCADE;", ctx.if_exists(), target),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx())
        }
        AddColumn => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let col_name = column_name(change)?;
            let column = table
                .column(col_name)
                .ok_or_else(|| Error::not_found("Column", format!("{}.{}", table.qualified_name(), col_name)))?;
            let coldef = format_column(column)?;
            let target = qualified_name(&table.schema, &table.name);
            let if_not_exists = if ctx.idempotent { "IF NOT EXISTS " } else { "" };
            let mut stmt = DDLStatement::new(
                format!("ALTER TABLE {} ADD COLUMN {}{};", target, if_not_exists, coldef),
                change.description.clone(),
            )
            .requires_tx();
            if !column.nullable && column.default.is_none() {
                stmt = stmt.unsafe_();
            }
            Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
        }
        DropColumn => {
            let table = ctx.table(Snapshot::Current, change, &change.normalized_object_name())?;
            let col_name = column_name(change)?;
            let target = qualified_name(&table.schema, &table.name);
            let stmt = DDLStatement::new(
                format!(
                    "ALTER TABLE {} DROP COLUMN {}{};",
                    target,
                    ctx.if_exists(),
                    quote_identifier(col_name)
                ),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx();
            Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
        }
        ModifyColumnType => build_modify_type(change, ctx, "new_type"),
        ModifyColumnNullability => build_modify_nullability(change, ctx, "new_nullable"),
        ModifyColumnDefault => build_modify_default(change, ctx, "new_default"),
        ModifyColumnComment => build_modify_column_comment(change, "new_comment"),
        ModifyTableComment => build_modify_table_comment(change, "new_comment"),
        AddPartition => {
            let qualified = change.normalized_object_name();
            let (_, partition) = find_partition(&ctx.diff.desired, &qualified)
                .ok_or_else(|| Error::not_found("Table", format!("partition {}", change.object_name)))?;
            Ok(DDLStatement::new(
                ddl::format_partition_statement(partition, ctx.idempotent),
                change.description.clone(),
            )
            .requires_tx())
        }
        DropPartition => {
            let qualified = change.normalized_object_name();
            let (_, partition) = find_partition(&ctx.diff.current, &qualified)
                .ok_or_else(|| Error::not_found("Table", format!("partition {}", change.object_name)))?;
            Ok(DDLStatement::new(
                format!(
                    "DROP TABLE {}{};",
                    ctx.if_exists(),
                    qualified_name(&partition.schema, &partition.name)
                ),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx())
        }
        _ => Err(Error::unsupported(change)),
    }
}

fn build_modify_type(change: &Change, ctx: &Context, type_key: &str) -> Result<DDLStatement> {
    let snapshot = if type_key == "new_type" { Snapshot::Desired } else { Snapshot::Current };
    let table = ctx.table(snapshot, change, &change.normalized_object_name())?;
    let col_name = column_name(change)?;
    let new_type = normalize_data_type(change.details.get_str(change, type_key)?);
    let target = qualified_name(&table.schema, &table.name);
    let col = quote_identifier(col_name);
    let stmt = DDLStatement::new(
        format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {} USING {}::{};",
            target, col, new_type, col, new_type
        ),
        change.description.clone(),
    )
    .unsafe_()
    .requires_tx();
    Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
}

fn build_modify_nullability(change: &Change, ctx: &Context, nullable_key: &str) -> Result<DDLStatement> {
    let snapshot = if nullable_key == "new_nullable" { Snapshot::Desired } else { Snapshot::Current };
    let table = ctx.table(snapshot, change, &change.normalized_object_name())?;
    let col_name = column_name(change)?;
    let nullable = change.details.get_bool(change, nullable_key)?;
    let target = qualified_name(&table.schema, &table.name);
    let col = quote_identifier(col_name);
    let action = if nullable { "DROP NOT NULL" } else { "SET NOT NULL" };
    let mut stmt = DDLStatement::new(
        format!("ALTER TABLE {} ALTER COLUMN {} {};", target, col, action),
        change.description.clone(),
    )
    .requires_tx();
    if !nullable {
        stmt = stmt.unsafe_();
    }
    Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
}

fn build_modify_default(change: &Change, ctx: &Context, default_key: &str) -> Result<DDLStatement> {
    let snapshot = if default_key == "new_default" { Snapshot::Desired } else { Snapshot::Current };
    let table = ctx.table(snapshot, change, &change.normalized_object_name())?;
    let col_name = column_name(change)?;
    let default = change.details.get_str_opt(default_key);
    let target = qualified_name(&table.schema, &table.name);
    let col = quote_identifier(col_name);
    let action = match default {
        Some(d) if !d.trim().is_empty() => format!("SET DEFAULT {}", normalize_default_value(d)),
        _ => "DROP DEFAULT".to_string(),
    };
    Ok(DDLStatement::new(
        format!("ALTER TABLE {} ALTER COLUMN {} {};", target, col, action),
        change.description.clone(),
    )
    .requires_tx())
}

fn build_modify_column_comment(change: &Change, comment_key: &str) -> Result<DDLStatement> {
    let col_name = column_name(change)?;
    let table_qualified = change.qualified_object_name();
    let comment = change.details.get_str_opt(comment_key);
    let target = format!("{}.{}", table_qualified, quote_identifier(col_name));
    Ok(DDLStatement::new(
        ddl::format_comment("COLUMN", &target, comment),
        change.description.clone(),
    )
    .requires_tx())
}

fn build_modify_table_comment(change: &Change, comment_key: &str) -> Result<DDLStatement> {
    let target = change.qualified_object_name();
    let comment = change.details.get_str_opt(comment_key);
    Ok(DDLStatement::new(
        ddl::format_comment("TABLE", &target, comment),
        change.description.clone(),
    )
    .requires_tx())
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    match change.kind {
        ChangeType::ModifyColumnType => build_modify_type(change, ctx, "old_type"),
        ChangeType::ModifyColumnNullability => build_modify_nullability(change, ctx, "old_nullable"),
        ChangeType::ModifyColumnDefault => build_modify_default(change, ctx, "old_default"),
        ChangeType::ModifyColumnComment => build_modify_column_comment(change, "old_comment"),
        ChangeType::ModifyTableComment => build_modify_table_comment(change, "old_comment"),
        _ => Err(Error::unsupported(change)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{Details, DetailValue, DiffResult, Severity};
    use crate::schema::Column;

    fn widgets_table() -> Table {
        Table {
            schema: "public".to_string(),
            name: "widgets".to_string(),
            columns: vec![Column {
                name: "price".to_string(),
                data_type: "integer".to_string(),
                nullable: true,
                default: None,
                comment: None,
            }],
            constraints: vec![],
            indexes: vec![],
            partitions: vec![],
            partition_strategy: None,
            comment: None,
            hypertable: None,
            compression: None,
            retention_policy: None,
        }
    }

    fn change(kind: ChangeType, object_name: &str, details: Details) -> Change {
        Change {
            kind,
            object_name: object_name.to_string(),
            description: "desc".to_string(),
            order: 0,
            depends_on: vec![],
            details,
            severity: Severity::Info,
            object_type: String::new(),
        }
    }

    #[test]
    fn add_column_marks_unsafe_when_not_null_no_default() {
        let mut desired = Database::default();
        desired.tables.push(widgets_table());
        let mut table = desired.tables[0].clone();
        table.columns[0].nullable = false;
        desired.tables[0] = table;
        let diff = DiffResult {
            current: Database::default(),
            desired,
            changes: vec![],
        };
        let details = Details::new().insert("column_name", DetailValue::Str("price".into()));
        let c = change(ChangeType::AddColumn, "public.widgets", details);
        let ctx = Context::new(&diff, true);
        let stmt = build_up(&c, &ctx).unwrap();
        assert!(stmt.sql.contains("ADD COLUMN IF NOT EXISTS price INTEGER NOT NULL;"));
        assert!(stmt.is_unsafe);
    }

    #[test]
    fn modify_nullability_down_swaps_to_old_value() {
        let mut current = Database::default();
        current.tables.push(widgets_table());
        let diff = DiffResult {
            current,
            desired: Database::default(),
            changes: vec![],
        };
        let details = Details::new()
            .insert("column_name", DetailValue::Str("price".into()))
            .insert("old_nullable", DetailValue::Bool(true));
        let c = change(ChangeType::ModifyColumnNullability, "public.widgets", details);
        let ctx = Context::new(&diff, true);
        let stmt = build_down(&c, &ctx).unwrap();
        assert!(stmt.sql.contains("DROP NOT NULL"));
        assert!(!stmt.is_unsafe);
    }
}
