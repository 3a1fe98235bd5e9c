//! Per-change-type builder registry: dispatches a `Change` to a DDL
//! builder for UP, and derives DOWN generically from an inverse-type map,
//! a self-reverse map (Modify kinds swap which side of `Details` is
//! authoritative), or a special-cased recreation path.

pub mod builders;
pub mod recreate;

use crate::change::{Change, ChangeType, DiffResult};
use crate::error::{Error, Result};
use crate::result::DDLStatement;
use crate::schema::{Database, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    Current,
    Desired,
}

pub struct Context<'a> {
    pub diff: &'a DiffResult,
    pub idempotent: bool,
}

impl<'a> Context<'a> {
    pub fn new(diff: &'a DiffResult, idempotent: bool) -> Self {
        Context { diff, idempotent }
    }

    fn db(&self, snapshot: Snapshot) -> &Database {
        match snapshot {
            Snapshot::Current => &self.diff.current,
            Snapshot::Desired => &self.diff.desired,
        }
    }

    pub fn table(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&Table> {
        self.db(snapshot)
            .table(name)
            .ok_or_else(|| Error::not_found("Table", format!("{} (for {})", name, change.object_name)))
    }

    pub fn view(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::View> {
        self.db(snapshot)
            .view(name)
            .ok_or_else(|| Error::not_found("View", format!("{} (for {})", name, change.object_name)))
    }

    pub fn materialized_view(
        &self,
        snapshot: Snapshot,
        change: &Change,
        name: &str,
    ) -> Result<&crate::schema::MaterializedView> {
        self.db(snapshot)
            .materialized_view(name)
            .ok_or_else(|| Error::not_found("MaterializedView", format!("{} (for {})", name, change.object_name)))
    }

    pub fn function(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::Function> {
        self.db(snapshot)
            .function(name)
            .ok_or_else(|| Error::not_found("Function", format!("{} (for {})", name, change.object_name)))
    }

    pub fn trigger(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::Trigger> {
        self.db(snapshot)
            .trigger(name)
            .ok_or_else(|| Error::not_found("Trigger", format!("{} (for {})", name, change.object_name)))
    }

    pub fn sequence(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::Sequence> {
        self.db(snapshot)
            .sequence(name)
            .ok_or_else(|| Error::not_found("Sequence", format!("{} (for {})", name, change.object_name)))
    }

    pub fn custom_type(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::CustomType> {
        self.db(snapshot)
            .custom_type(name)
            .ok_or_else(|| Error::not_found("CustomType", format!("{} (for {})", name, change.object_name)))
    }

    pub fn extension(&self, snapshot: Snapshot, change: &Change, name: &str) -> Result<&crate::schema::Extension> {
        self.db(snapshot)
            .extension(name)
            .ok_or_else(|| Error::not_found("Extension", format!("{} (for {})", name, change.object_name)))
    }

    pub fn continuous_aggregate(
        &self,
        snapshot: Snapshot,
        change: &Change,
        name: &str,
    ) -> Result<&crate::schema::ContinuousAggregate> {
        self.db(snapshot)
            .continuous_aggregate(name)
            .ok_or_else(|| Error::not_found("ContinuousAggregate", format!("{} (for {})", name, change.object_name)))
    }

    pub fn if_exists(&self) -> &'static str {
        if self.idempotent { "IF EXISTS " } else { "" }
    }

    pub fn if_not_exists(&self) -> &'static str {
        if self.idempotent { "IF NOT EXISTS " } else { "" }
    }
}

/// `Add ↔ Drop` pairs for every kind that has one; kinds with no plain
/// inverse (the Modify kinds) return `None` here and are handled via the
/// self-reverse map instead.
pub fn inverse_type(kind: ChangeType) -> Option<ChangeType> {
    use ChangeType::*;
    Some(match kind {
        AddSchema => DropSchema,
        DropSchema => AddSchema,
        AddExtension => DropExtension,
        DropExtension => AddExtension,
        AddCustomType => DropCustomType,
        DropCustomType => AddCustomType,
        AddSequence => DropSequence,
        DropSequence => AddSequence,
        AddTable => DropTable,
        DropTable => AddTable,
        AddColumn => DropColumn,
        DropColumn => AddColumn,
        AddConstraint => DropConstraint,
        DropConstraint => AddConstraint,
        AddIndex => DropIndex,
        DropIndex => AddIndex,
        AddPartition => DropPartition,
        DropPartition => AddPartition,
        AddView => DropView,
        DropView => AddView,
        AddMaterializedView => DropMaterializedView,
        DropMaterializedView => AddMaterializedView,
        AddFunction => DropFunction,
        DropFunction => AddFunction,
        AddTrigger => DropTrigger,
        DropTrigger => AddTrigger,
        AddHypertable => DropHypertable,
        DropHypertable => AddHypertable,
        AddCompressionPolicy => DropCompressionPolicy,
        DropCompressionPolicy => AddCompressionPolicy,
        AddRetentionPolicy => DropRetentionPolicy,
        DropRetentionPolicy => AddRetentionPolicy,
        AddContinuousAggregate => DropContinuousAggregate,
        DropContinuousAggregate => AddContinuousAggregate,
        _ => return None,
    })
}

/// All `Modify*` kinds dispatch to the builder's own `build_down`, which
/// swaps which side of `Details` is authoritative.
pub fn is_self_reverse(kind: ChangeType) -> bool {
    use ChangeType::*;
    matches!(
        kind,
        ModifyExtension
            | ModifyColumnType
            | ModifyColumnNullability
            | ModifyColumnDefault
            | ModifyColumnComment
            | ModifyTableComment
            | ModifyConstraint
            | ModifyView
            | ModifyMaterializedView
            | ModifyFunction
            | ModifyCompressionPolicy
            | ModifyContinuousAggregate
    )
}

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use builders::*;
    use ChangeType::*;
    match change.kind {
        AddSchema | DropSchema | AddExtension | DropExtension | ModifyExtension | AddCustomType
        | DropCustomType | AddSequence | DropSequence => schema_extension::build_up(change, ctx),

        AddTable | DropTable | AddColumn | DropColumn | ModifyColumnType | ModifyColumnNullability
        | ModifyColumnDefault | ModifyColumnComment | ModifyTableComment | AddPartition | DropPartition => {
            table_column::build_up(change, ctx)
        }

        AddConstraint | DropConstraint | ModifyConstraint | AddIndex | DropIndex => {
            constraint_index::build_up(change, ctx)
        }

        AddView | DropView | ModifyView | AddMaterializedView | DropMaterializedView
        | ModifyMaterializedView | AddFunction | DropFunction | ModifyFunction | AddTrigger | DropTrigger => {
            view_function_trigger::build_up(change, ctx)
        }

        AddHypertable | DropHypertable | AddCompressionPolicy | DropCompressionPolicy
        | ModifyCompressionPolicy | AddRetentionPolicy | DropRetentionPolicy | AddContinuousAggregate
        | DropContinuousAggregate | ModifyContinuousAggregate => timescale::build_up(change, ctx),
    }
}

fn build_down_self_reverse(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use builders::*;
    use ChangeType::*;
    match change.kind {
        ModifyExtension => schema_extension::build_down(change, ctx),
        ModifyColumnType | ModifyColumnNullability | ModifyColumnDefault | ModifyColumnComment
        | ModifyTableComment => table_column::build_down(change, ctx),
        ModifyConstraint => constraint_index::build_down(change, ctx),
        ModifyView | ModifyMaterializedView | ModifyFunction => view_function_trigger::build_down(change, ctx),
        ModifyCompressionPolicy | ModifyContinuousAggregate => timescale::build_down(change, ctx),
        _ => Err(Error::unsupported(change)),
    }
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    if let Some(stmt) = recreate::try_build(change, ctx)? {
        return Ok(stmt);
    }
    if is_self_reverse(change.kind) {
        return build_down_self_reverse(change, ctx);
    }
    if let Some(inverse) = inverse_type(change.kind) {
        let mut inverted = change.clone();
        inverted.kind = inverse;
        return build_up(&inverted, ctx);
    }
    Err(Error::unsupported(change))
}
