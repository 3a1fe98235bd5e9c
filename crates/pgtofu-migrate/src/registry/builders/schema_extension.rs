//! Builders for schema, extension, custom-type, and sequence changes —
//! all of them simple one-statement CREATE/DROP/ALTER kinds with no
//! recreation path.

use crate::change::{Change, ChangeType};
use crate::error::{Error, Result};
use crate::ident::{qualified_name, quote_identifier};
use crate::registry::{Context, Snapshot};
use crate::result::DDLStatement;

pub fn build_up(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    use ChangeType::*;
    match change.kind {
        AddSchema => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            Ok(DDLStatement::new(
                format!("CREATE SCHEMA {}{};", ctx.if_not_exists(), name),
                change.description.clone(),
            ))
        }
        DropSchema => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            Ok(DDLStatement::new(
                format!("DROP SCHEMA {}{};", ctx.if_exists(), name),
                change.description.clone(),
            )
            .unsafe_())
        }
        AddExtension => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            Ok(DDLStatement::new(
                format!("CREATE EXTENSION {}{};", ctx.if_not_exists(), name),
                change.description.clone(),
            ))
        }
        DropExtension => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            Ok(DDLStatement::new(
                format!("DROP EXTENSION {}{};", ctx.if_exists(), name),
                change.description.clone(),
            )
            .unsafe_())
        }
        ModifyExtension => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            let version = change.details.get_str_opt("new_definition");
            let sql = match version {
                Some(v) if !v.trim().is_empty() => {
                    format!("ALTER EXTENSION {} UPDATE TO '{}';", name, v.trim())
                }
                _ => format!("ALTER EXTENSION {} UPDATE;", name),
            };
            Ok(DDLStatement::new(sql, change.description.clone()).unsafe_())
        }
        AddCustomType => {
            let ct = ctx.custom_type(Snapshot::Desired, change, &change.normalized_object_name())?;
            Ok(DDLStatement::new(
                format!("CREATE TYPE {} AS {};", qualified_name(&ct.schema, &ct.name), ct.definition.trim()),
                change.description.clone(),
            ))
        }
        DropCustomType => {
            let name = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP TYPE {}{};", ctx.if_exists(), name),
                change.description.clone(),
            )
            .unsafe_())
        }
        AddSequence => {
            let name = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("CREATE SEQUENCE {}{};", ctx.if_not_exists(), name),
                change.description.clone(),
            ))
        }
        DropSequence => {
            let name = change.qualified_object_name();
            Ok(DDLStatement::new(
                format!("DROP SEQUENCE {}{};", ctx.if_exists(), name),
                change.description.clone(),
            )
            .unsafe_())
        }
        _ => Err(Error::unsupported(change)),
    }
}

pub fn build_down(change: &Change, ctx: &Context) -> Result<DDLStatement> {
    match change.kind {
        ChangeType::ModifyExtension => {
            let name = quote_identifier(&change.object_name.to_lowercase());
            let version = change.details.get_str_opt("old_definition");
            let sql = match version {
                Some(v) if !v.trim().is_empty() => {
                    format!("ALTER EXTENSION {} UPDATE TO '{}';", name, v.trim())
                }
                _ => format!("ALTER EXTENSION {} UPDATE;", name),
            };
            Ok(DDLStatement::new(sql, change.description.clone()).unsafe_())
        }
        _ => Err(Error::unsupported(change)),
    }
}
