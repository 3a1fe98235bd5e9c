use crate::ddl::comment::format_comment;
use crate::error::{Error, Result};
use crate::ident::{qualified_name, quote_literal};
use crate::schema::ContinuousAggregate;

/// `CREATE MATERIALIZED VIEW schema.view\nWITH (timescaledb.continuous) AS\n<query>\nWITH [NO ]DATA;`
/// followed by an optional `add_continuous_aggregate_policy` call and an
/// optional `COMMENT ON VIEW`, each its own statement separated by a
/// blank line within the returned text.
pub fn format_continuous_aggregate(agg: &ContinuousAggregate) -> Result<String> {
    if agg.query.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "continuous aggregate {} has no query",
            agg.view_name
        )));
    }
    let target = qualified_name(&agg.schema, &agg.view_name);
    let data_clause = if agg.with_no_data { "WITH NO DATA" } else { "WITH DATA" };

    let mut parts = vec![format!(
        "CREATE MATERIALIZED VIEW {}\nWITH (timescaledb.continuous) AS\n{}\n{};",
        target,
        agg.query.trim(),
        data_clause
    )];

    if agg.refresh_start_offset.is_some()
        || agg.refresh_end_offset.is_some()
        || agg.refresh_schedule_interval.is_some()
    {
        let mut args = vec![quote_literal(&target.replace('"', ""))];
        if let Some(start) = &agg.refresh_start_offset {
            args.push(format!("start_offset => INTERVAL {}", quote_literal(start)));
        }
        if let Some(end) = &agg.refresh_end_offset {
            args.push(format!("end_offset => INTERVAL {}", quote_literal(end)));
        }
        if let Some(schedule) = &agg.refresh_schedule_interval {
            args.push(format!(
                "schedule_interval => INTERVAL {}",
                quote_literal(schedule)
            ));
        }
        parts.push(format!(
            "SELECT add_continuous_aggregate_policy({});",
            args.join(", ")
        ));
    }

    if let Some(comment) = &agg.comment {
        parts.push(format_comment("VIEW", &target, Some(comment)));
    }

    Ok(parts.join("\n\n"))
}
