//! Identifier quoting, literal formatting, and value normalization.
//!
//! These are the primitives every DDL formatter builds on; kept
//! dependency-free (no `Change`/`Database` types) so they can be unit
//! tested in isolation.

use once_cell::sync::Lazy;
use regex::Regex;

/// Quotes `name` in double quotes unless it is already a valid bare
/// identifier (non-empty, first char not a digit, all chars `[a-z0-9_]`).
pub fn quote_identifier(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }
    let bare = name
        .chars()
        .next()
        .map(|c| !c.is_ascii_digit())
        .unwrap_or(false)
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if bare {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Produces `schema.name`, quoting each component; an empty schema
/// defaults to `public`.
pub fn qualified_name(schema: &str, name: &str) -> String {
    let schema = if schema.is_empty() { "public" } else { schema };
    format!("{}.{}", quote_identifier(schema), quote_identifier(name))
}

/// Single-quoted SQL string literal, doubling embedded single quotes.
pub fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

static TRAILING_ARRAY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\[\s*\]\s*$").unwrap());

/// Upper-cases a data type and maps well-known verbose aliases to their
/// short forms, preserving a trailing `[]`.
pub fn normalize_data_type(data_type: &str) -> String {
    let trimmed = data_type.trim();
    let is_array = TRAILING_ARRAY.is_match(trimmed);
    let base = TRAILING_ARRAY.replace(trimmed, "").trim().to_string();
    let upper = base.to_uppercase();
    let mapped = match upper.as_str() {
        "TIMESTAMP WITH TIME ZONE" => "TIMESTAMPTZ".to_string(),
        "TIMESTAMP WITHOUT TIME ZONE" => "TIMESTAMP".to_string(),
        "TIME WITH TIME ZONE" => "TIMETZ".to_string(),
        "TIME WITHOUT TIME ZONE" => "TIME".to_string(),
        "CHARACTER VARYING" => "VARCHAR".to_string(),
        "CHARACTER" => "CHAR".to_string(),
        other => {
            if let Some(rest) = other.strip_prefix("CHARACTER VARYING(") {
                format!("VARCHAR({}", rest)
            } else if let Some(rest) = other.strip_prefix("CHARACTER(") {
                format!("CHAR({}", rest)
            } else {
                other.to_string()
            }
        }
    };
    if is_array {
        format!("{}[]", mapped)
    } else {
        mapped
    }
}

static BOOL_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\btrue\b|\bfalse\b").unwrap());
static STRING_CAST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'((?:[^'\\]|'')*)'::[A-Za-z_][A-Za-z0-9_ ]*(\[\])?").unwrap());
static ANY_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(\s*([A-Za-z_][A-Za-z0-9_.\x22]*)\s*=\s*ANY\s*\(\s*ARRAY\s*\[([^\]]*)\]\s*(?:::[A-Za-z_][A-Za-z0-9_\[\] ]*)?\s*\)\s*\)").unwrap()
});

fn upper_bool_literals(s: &str) -> String {
    BOOL_LITERAL
        .replace_all(s, |caps: &regex::Captures| caps[0].to_uppercase())
        .to_string()
}

fn strip_string_casts(s: &str) -> String {
    STRING_CAST.replace_all(s, "'$1'").to_string()
}

fn strip_elem_casts(elem: &str) -> String {
    let trimmed = elem.trim();
    if let Some(idx) = trimmed.find("::") {
        trimmed[..idx].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Upper-cases known builtin function names appearing as a call head
/// (`name(`), leaving arguments untouched.
fn upper_function_names(s: &str, names: &[&str]) -> String {
    let mut out = s.to_string();
    for name in names {
        let re = Regex::new(&format!(r"(?i)\b{}\s*\(", regex::escape(name))).unwrap();
        out = re
            .replace_all(&out, |caps: &regex::Captures| {
                let matched = &caps[0];
                let paren_idx = matched.rfind('(').unwrap();
                format!("{}{}", name.to_uppercase(), &matched[paren_idx..])
            })
            .to_string();
    }
    out
}

const BUILTIN_FUNCTIONS: &[&str] = &[
    "uuid_generate_v4",
    "uuid_generate_v1",
    "gen_random_uuid",
    "now",
    "current_timestamp",
    "current_date",
    "current_time",
    "current_user",
    "session_user",
    "localtime",
    "localtimestamp",
    "nextval",
    "setval",
    "currval",
    "lastval",
    "coalesce",
    "nullif",
    "greatest",
    "least",
    "array_agg",
    "string_agg",
    "json_agg",
    "jsonb_agg",
    "count",
    "sum",
    "avg",
    "min",
    "max",
];

/// Upper-cases boolean literals, strips string-literal `::type` casts,
/// upper-cases known function-name call heads, and rewrites
/// `(col = ANY (ARRAY[v1,v2,…]))` into `(col IN (v1, v2, …))`.
pub fn normalize_check_constraint(definition: &str) -> String {
    let s = upper_bool_literals(definition);
    let s = strip_string_casts(&s);
    let s = upper_function_names(&s, BUILTIN_FUNCTIONS);
    ANY_ARRAY
        .replace_all(&s, |caps: &regex::Captures| {
            let col = &caps[1];
            let elems = caps[2]
                .split(',')
                .map(strip_elem_casts)
                .collect::<Vec<_>>()
                .join(", ");
            format!("({} IN ({}))", col, elems)
        })
        .to_string()
}

/// `true/false` → `TRUE/FALSE`, strips string-literal casts, upper-cases
/// recognised builtin function call heads.
pub fn normalize_default_value(value: &str) -> String {
    let s = upper_bool_literals(value);
    let s = strip_string_casts(&s);
    upper_function_names(&s, BUILTIN_FUNCTIONS)
}

/// Upper-cases booleans and strips literal casts; used for index/view
/// `WHERE` clauses.
pub fn normalize_where_clause(clause: &str) -> String {
    let s = upper_bool_literals(clause);
    strip_string_casts(&s)
}
