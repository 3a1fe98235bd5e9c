use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::ident::{normalize_data_type, quote_identifier};
use crate::schema::Column;

static SERIAL_DEFAULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^nextval\(\s*'(?:[A-Za-z_][A-Za-z0-9_]*\.)?[A-Za-z_][A-Za-z0-9_]*_seq'(?:::regclass)?\s*\)$").unwrap()
});

fn serial_width(data_type: &str) -> Option<&'static str> {
    match data_type.to_uppercase().as_str() {
        "SMALLINT" | "INT2" => Some("SMALLSERIAL"),
        "INTEGER" | "INT4" | "INT" => Some("SERIAL"),
        "BIGINT" | "INT8" => Some("BIGSERIAL"),
        _ => None,
    }
}

/// `quoted_name <type>[ NOT NULL][ DEFAULT <value>]`, with the
/// `nextval(...)` + integer-width shorthand rewritten to
/// SMALLSERIAL/SERIAL/BIGSERIAL (omitting the DEFAULT clause).
pub fn format_column(col: &Column) -> Result<String> {
    if col.name.trim().is_empty() {
        return Err(Error::InvalidOptions("column name must not be empty".into()));
    }
    if col.data_type.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "column {} has no data type",
            col.name
        )));
    }

    let mut tokens = vec![quote_identifier(&col.name)];

    let serial = col
        .default
        .as_deref()
        .filter(|d| SERIAL_DEFAULT.is_match(d.trim()))
        .and_then(|_| serial_width(&col.data_type));

    if let Some(serial_type) = serial {
        tokens.push(serial_type.to_string());
        if !col.nullable {
            tokens.push("NOT NULL".to_string());
        }
        return Ok(tokens.join(" "));
    }

    tokens.push(normalize_data_type(&col.data_type));
    if !col.nullable {
        tokens.push("NOT NULL".to_string());
    }
    if let Some(default) = &col.default {
        if !default.trim().is_empty() {
            tokens.push("DEFAULT".to_string());
            tokens.push(crate::ident::normalize_default_value(default));
        }
    }

    Ok(tokens.join(" "))
}
