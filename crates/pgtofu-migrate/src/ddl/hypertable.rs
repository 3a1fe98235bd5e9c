use crate::error::{Error, Result};
use crate::ident::quote_literal;
use crate::schema::Hypertable;

/// `SELECT create_hypertable('schema.table', 'timecol'[, chunk_time_interval => INTERVAL 'p'][, number_partitions => N])`.
pub fn format_hypertable(ht: &Hypertable) -> Result<String> {
    if ht.time_column.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "hypertable {}.{} has no time column",
            ht.schema, ht.table
        )));
    }
    let schema = if ht.schema.is_empty() { "public" } else { &ht.schema };
    let table_lit = quote_literal(&format!("{}.{}", schema, ht.table));
    let mut args = vec![table_lit, quote_literal(&ht.time_column)];
    if let Some(interval) = &ht.chunk_time_interval {
        if !interval.trim().is_empty() {
            args.push(format!(
                "chunk_time_interval => INTERVAL {}",
                quote_literal(interval)
            ));
        }
    }
    if let Some(n) = ht.number_partitions {
        args.push(format!("number_partitions => {}", n));
    }
    Ok(format!("SELECT create_hypertable({})", args.join(", ")))
}
