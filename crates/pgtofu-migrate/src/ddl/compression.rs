use std::collections::HashSet;

use crate::ident::qualified_name;
use crate::schema::CompressionSettings;

fn dedup_segmentby(cols: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for c in cols {
        let key = c.trim().to_lowercase();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        out.push(c.trim().to_string());
    }
    out
}

fn dedup_orderby(cols: &[(String, String)]) -> Vec<(String, String)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (col, dir) in cols {
        let dir = if dir.trim().is_empty() {
            "ASC".to_string()
        } else {
            dir.trim().to_uppercase()
        };
        let key = format!("{}|{}", col.trim().to_lowercase(), dir);
        if !seen.insert(key) {
            continue;
        }
        out.push((col.trim().to_string(), dir));
    }
    out
}

/// `ALTER TABLE schema.table SET (timescaledb.compress[, timescaledb.compress_segmentby = '…', timescaledb.compress_orderby = '…'])`.
pub fn format_compression_policy(schema: &str, table: &str, settings: &CompressionSettings) -> String {
    let mut opts = vec!["timescaledb.compress".to_string()];

    let segmentby = dedup_segmentby(&settings.segmentby);
    if !segmentby.is_empty() {
        opts.push(format!(
            "timescaledb.compress_segmentby = '{}'",
            segmentby.join(",")
        ));
    }

    let orderby = dedup_orderby(&settings.orderby);
    if !orderby.is_empty() {
        let joined = orderby
            .iter()
            .map(|(col, dir)| format!("{} {}", col, dir))
            .collect::<Vec<_>>()
            .join(", ");
        opts.push(format!("timescaledb.compress_orderby = '{}'", joined));
    }

    format!(
        "ALTER TABLE {} SET ({})",
        qualified_name(schema, table),
        opts.join(", ")
    )
}

/// `ALTER TABLE schema.table SET (timescaledb.compress = false)`.
pub fn format_disable_compression(schema: &str, table: &str) -> String {
    format!(
        "ALTER TABLE {} SET (timescaledb.compress = false)",
        qualified_name(schema, table)
    )
}
