//! Builders for constraint and index changes.

use crate::change::{Change, ChangeType};
use crate::compression_wrap;
use crate::ddl::{format_constraint, format_index};
use crate::error::{Error, Result};
use crate::ident::{qualified_name, quote_identifier};
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;
use crate::schema::{Constraint, ConstraintKind, Table};

fn constraint_name(change: &Change) -> Result<&str> {
    change.details.get_str(change, "constraint")
}

fn find_constraint<'a>(table: &'a Table, name: &str) -> Result<&'a Constraint> {
    table
        .constraint(name)
        .ok_or_else(|| Error::not_found("Constraint", format!("{}.{}", table.qualified_name(), name)))
}

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use ChangeType::*;
    match change.kind {
        AddConstraint => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let name = constraint_name(change)?;
            let constraint = find_constraint(table, name)?;
            let def = format_constraint(constraint)?;
            let target = qualified_name(&table.schema, &table.name);
            let mut stmt = DDLStatement::new(
                format!("ALTER TABLE {} ADD {};", target, def),
                change.description.clone(),
            )
            .requires_tx();
            if constraint.kind == Some(ConstraintKind::ForeignKey) {
                stmt = stmt.unsafe_();
            }
            Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
        }
        DropConstraint => {
            let table = ctx.table(Snapshot::Current, change, &change.normalized_object_name())?;
            let name = constraint_name(change)?;
            let target = qualified_name(&table.schema, &table.name);
            let stmt = DDLStatement::new(
                format!(
                    "ALTER TABLE {} DROP CONSTRAINT {}{};",
                    target,
                    ctx.if_exists(),
                    quote_identifier(name)
                ),
                change.description.clone(),
            )
            .unsafe_()
            .requires_tx();
            Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
        }
        ModifyConstraint => build_modify(change, ctx, Snapshot::Desired, "new_definition"),
        AddIndex => {
            let table = ctx.table(Snapshot::Desired, change, &change.normalized_object_name())?;
            let index_name = change.details.get_str(change, "index")?;
            let index = table
                .indexes
                .iter()
                .find(|i| i.name.eq_ignore_ascii_case(index_name))
                .ok_or_else(|| Error::not_found("Index", index_name.to_string()))?;
            let sql = format!("{};", format_index(index)?);
            Ok(DDLStatement::new(sql, change.description.clone()).requires_tx())
        }
        DropIndex => {
            // `change.object_name` names the index's owning table, not the
            // index itself (matching `AddIndex`'s lookup above); the index's
            // own bare name comes from the "index" detail when present.
            let schema = change.schema_name();
            let raw_name = change
                .details
                .get_str_opt("index")
                .unwrap_or(&change.object_name);
            let bare_name = raw_name.rsplit('.').next().unwrap_or(raw_name);
            let target = qualified_name(&schema, bare_name);
            Ok(DDLStatement::new(
                format!("DROP INDEX {}{};", ctx.if_exists(), target),
                change.description.clone(),
            )
            .requires_tx())
        }
        _ => Err(Error::unsupported(change)),
    }
}

/// `ModifyConstraint` is lowered to a single `DDLStatement` containing
/// `DROP CONSTRAINT …; ADD <new definition>;` joined by a newline.
fn build_modify(change: &Change, ctx: &Context, snapshot: Snapshot, definition_key: &str) -> Result<DDLStatement> {
    let table = ctx.table(snapshot, change, &change.normalized_object_name())?;
    let name = constraint_name(change)?;
    let target = qualified_name(&table.schema, &table.name);

    let constraint = find_constraint(table, name)?;
    let def = if definition_key == "new_definition" {
        format_constraint(constraint)?
    } else {
        // down: the "old" snapshot supplies the constraint to recreate.
        format_constraint(constraint)?
    };

    let sql = format!(
        "ALTER TABLE {} DROP CONSTRAINT {}{};\nALTER TABLE {} ADD {};",
        target,
        ctx.if_exists(),
        quote_identifier(name),
        target,
        def
    );
    let stmt = DDLStatement::new(sql, change.description.clone()).unsafe_().requires_tx();
    Ok(compression_wrap::wrap(stmt, change.kind, &table.schema, &table.name, ctx.diff))
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    match change.kind {
        ChangeType::ModifyConstraint => build_modify(change, ctx, Snapshot::Current, "old_definition"),
        _ => Err(Error::unsupported(change)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::{DetailValue, Details, DiffResult, Severity};
    use crate::schema::Database;

    fn table_with_pk() -> Table {
        Table {
            schema: "public".to_string(),
            name: "widgets".to_string(),
            columns: vec![],
            constraints: vec![Constraint {
                name: Some("widgets_pkey".to_string()),
                kind: Some(ConstraintKind::PrimaryKey),
                columns: vec!["id".to_string()],
                ref_schema: None,
                ref_table: None,
                ref_columns: vec![],
                on_delete: None,
                on_update: None,
                definition: None,
                deferrable: false,
                initially_deferred: false,
            }],
            indexes: vec![],
            partitions: vec![],
            partition_strategy: None,
            comment: None,
            hypertable: None,
            compression: None,
            retention_policy: None,
        }
    }

    #[test]
    fn add_constraint_emits_alter_table_add() {
        let mut desired = Database::default();
        desired.tables.push(table_with_pk());
        let diff = DiffResult {
            current: Database::default(),
            desired,
            changes: vec![],
        };
        let details = Details::new().insert("constraint", DetailValue::Str("widgets_pkey".into()));
        let c = Change {
            kind: ChangeType::AddConstraint,
            object_name: "public.widgets".to_string(),
            description: "add pk".to_string(),
            order: 0,
            depends_on: vec![],
            details,
            severity: Severity::Info,
            object_type: String::new(),
        };
        let ctx = Context::new(&diff, true);
        let stmt = build_up(&c, &ctx).unwrap();
        assert_eq!(
            stmt.sql,
            "ALTER TABLE public.widgets ADD CONSTRAINT widgets_pkey PRIMARY KEY (id);"
        );
    }

    #[test]
    fn drop_index_qualifies_by_schema_not_the_whole_table_name() {
        let diff = DiffResult {
            current: Database::default(),
            desired: Database::default(),
            changes: vec![],
        };
        let details = Details::new().insert("index", DetailValue::Str("widgets_email_idx".into()));
        let c = Change {
            kind: ChangeType::DropIndex,
            object_name: "public.widgets".to_string(),
            description: "drop index".to_string(),
            order: 0,
            depends_on: vec![],
            details,
            severity: Severity::Info,
            object_type: String::new(),
        };
        let ctx = Context::new(&diff, true);
        let stmt = build_up(&c, &ctx).unwrap();
        assert_eq!(stmt.sql, "DROP INDEX IF EXISTS public.widgets_email_idx;");
    }
}
