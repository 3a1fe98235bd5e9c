//! Assembles the final text of one migration file (§4.6.3): header block,
//! transaction envelope, and per-statement comments.

use chrono::Utc;

use crate::options::{Options, TransactionMode};
use crate::result::{DDLStatement, Direction};

fn should_wrap(mode: TransactionMode, statements: &[DDLStatement]) -> bool {
    match mode {
        TransactionMode::Always => true,
        TransactionMode::Never => false,
        TransactionMode::Auto => !statements.iter().any(|s| s.cannot_use_tx),
    }
}

pub fn assemble_file(
    version: u32,
    description: &str,
    direction: Direction,
    statements: &[DDLStatement],
    change_descriptions: &[String],
    options: &Options,
) -> String {
    let mut out = String::new();

    if options.include_comments {
        out.push_str(&format!("-- Version: {:06}\n", version));
        out.push_str(&format!("-- Description: {}\n", description));
        out.push_str(&format!("-- Direction: {}\n", direction.as_str()));
        out.push_str(&format!("-- Generated: {}\n", Utc::now().to_rfc3339()));
        if !change_descriptions.is_empty() {
            out.push_str("-- Changes:\n");
            for desc in change_descriptions {
                out.push_str(&format!("--   - {}\n", desc));
            }
        }
        out.push('\n');
    }

    let wrap = should_wrap(options.transaction_mode, statements);
    if wrap {
        out.push_str("BEGIN;\n\n");
    }

    for (i, stmt) in statements.iter().enumerate() {
        if options.include_comments && !stmt.description.is_empty() {
            out.push_str(&format!("-- {}\n", stmt.description));
        }
        if stmt.is_unsafe {
            out.push_str("-- WARNING: potentially unsafe statement\n");
        }
        out.push_str(&stmt.terminated_sql());
        out.push('\n');
        if i + 1 < statements.len() {
            out.push('\n');
        }
    }

    if wrap {
        out.push_str("\nCOMMIT;\n");
    }

    out
}
