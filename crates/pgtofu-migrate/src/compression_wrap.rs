//! Wraps a column/constraint DDL statement with a disable-compression /
//! operation / re-enable-compression envelope when the target table is a
//! compressed hypertable, coordinating with any co-occurring
//! `ModifyCompressionPolicy` change on the same table to avoid
//! double-enabling.

use crate::change::{ChangeType, DiffResult};
use crate::ddl::compression::{format_compression_policy, format_disable_compression};
use crate::result::DDLStatement;
use crate::schema::Table;

const WRAPPED_KINDS: &[ChangeType] = &[
    ChangeType::AddColumn,
    ChangeType::DropColumn,
    ChangeType::ModifyColumnType,
    ChangeType::ModifyColumnNullability,
    ChangeType::AddConstraint,
    ChangeType::DropConstraint,
    ChangeType::ModifyConstraint,
];

fn is_compressed(table: Option<&Table>) -> bool {
    table.map(|t| t.is_compressed()).unwrap_or(false)
}

/// Returns `true` when `kind` is one of the statement kinds this wrapper
/// applies to (column/constraint operations; not ModifyColumnDefault, not
/// comment operations).
pub fn applies_to(kind: ChangeType) -> bool {
    WRAPPED_KINDS.contains(&kind)
}

/// Wraps `stmt` in the decompress/operate/recompress envelope when
/// `schema.table` is a compressed hypertable in either snapshot of
/// `diff`. A no-op for regular tables and for uncompressed hypertables.
pub fn wrap(
    stmt: DDLStatement,
    kind: ChangeType,
    schema: &str,
    table_name: &str,
    diff: &DiffResult,
) -> DDLStatement {
    if !applies_to(kind) {
        return stmt;
    }
    let qualified = format!("{}.{}", if schema.is_empty() { "public" } else { schema }, table_name);
    let current = diff.current.table(&qualified);
    let desired = diff.desired.table(&qualified);
    let compressed_table = if is_compressed(current) {
        current
    } else if is_compressed(desired) {
        desired
    } else {
        return stmt;
    };
    let settings = match &compressed_table.compression {
        Some(s) => s,
        None => return stmt,
    };

    let qualified_display = format!(
        "{}.{}",
        if schema.is_empty() { "public" } else { schema },
        table_name
    );
    let warning = format!(
        "-- WARNING: decompress chunks of {} before running this statement manually if compression blocks it",
        qualified_display
    );
    let disable = format!("{};", format_disable_compression(schema, table_name));
    let body = stmt.terminated_sql();

    let target_normalized = qualified_display.to_lowercase();
    let has_pending_policy_mod = diff.changes.iter().any(|c| {
        c.kind == ChangeType::ModifyCompressionPolicy
            && c.normalized_object_name() == target_normalized
    });

    let mut parts = vec![warning, disable, body];
    if !has_pending_policy_mod {
        let enable = format_compression_policy(schema, table_name, settings);
        parts.push(format!("{};", enable));
    }

    let mut wrapped = DDLStatement::new(parts.join("\n"), stmt.description);
    wrapped.is_unsafe = true;
    wrapped.requires_tx = stmt.requires_tx;
    wrapped.cannot_use_tx = stmt.cannot_use_tx;
    wrapped
}
