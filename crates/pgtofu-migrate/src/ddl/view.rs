use crate::error::{Error, Result};
use crate::ident::qualified_name;
use crate::schema::{MaterializedView, View};

/// `CREATE [OR REPLACE] VIEW schema.name AS\n<definition>`.
pub fn format_view(view: &View, or_replace: bool) -> Result<String> {
    if view.definition.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "view {} has no definition",
            view.name
        )));
    }
    let keyword = if or_replace { "CREATE OR REPLACE VIEW" } else { "CREATE VIEW" };
    Ok(format!(
        "{} {} AS\n{}",
        keyword,
        qualified_name(&view.schema, &view.name),
        view.definition.trim()
    ))
}

/// `CREATE MATERIALIZED VIEW schema.name AS\n<definition>`; there is no
/// OR REPLACE variant for materialized views.
pub fn format_materialized_view(view: &MaterializedView) -> Result<String> {
    if view.definition.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "materialized view {} has no definition",
            view.name
        )));
    }
    Ok(format!(
        "CREATE MATERIALIZED VIEW {} AS\n{}",
        qualified_name(&view.schema, &view.name),
        view.definition.trim()
    ))
}
