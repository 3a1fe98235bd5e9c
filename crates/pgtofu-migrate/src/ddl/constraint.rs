use crate::error::{Error, Result};
use crate::ident::{normalize_check_constraint, qualified_name, quote_identifier};
use crate::schema::{Constraint, ConstraintKind};

fn quote_constraint_column(col: &str) -> String {
    let looks_like_expression = col.starts_with('(')
        || col
            .chars()
            .any(|c| matches!(c, '(' | ')' | '+' | '-' | '*' | '/' | '=' | '<' | '>' | ' '));
    if looks_like_expression {
        col.to_string()
    } else {
        quote_identifier(col)
    }
}

fn column_list(cols: &[String]) -> String {
    cols.iter()
        .map(|c| quote_constraint_column(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Re-indents a multi-line `CHECK (...)`-style definition so continuation
/// lines share a 4-space indent relative to the first line, with closing
/// `)`/`))` left flush on their own lines.
fn reindent_multiline(def: &str) -> String {
    let lines: Vec<&str> = def.lines().collect();
    if lines.len() <= 1 {
        return def.trim().to_string();
    }
    let mut out = Vec::with_capacity(lines.len());
    out.push(lines[0].trim_end().to_string());
    for line in &lines[1..] {
        let trimmed = line.trim();
        if trimmed.chars().all(|c| c == ')') {
            out.push(trimmed.to_string());
        } else {
            out.push(format!("    {}", trimmed));
        }
    }
    out.join("\n")
}

fn deferrable_suffix(c: &Constraint) -> String {
    if c.deferrable {
        if c.initially_deferred {
            " DEFERRABLE INITIALLY DEFERRED".to_string()
        } else {
            " DEFERRABLE".to_string()
        }
    } else {
        String::new()
    }
}

pub fn format_constraint(c: &Constraint) -> Result<String> {
    let prefix = match &c.name {
        Some(name) if !name.trim().is_empty() => format!("CONSTRAINT {} ", quote_identifier(name)),
        _ => String::new(),
    };

    let kind = c.kind.unwrap_or(ConstraintKind::Other);
    let body = match kind {
        ConstraintKind::PrimaryKey => {
            if c.columns.is_empty() {
                return Err(Error::InvalidOptions(
                    "PRIMARY KEY constraint requires columns".into(),
                ));
            }
            format!("PRIMARY KEY ({})", column_list(&c.columns))
        }
        ConstraintKind::Unique => {
            if c.columns.is_empty() {
                return Err(Error::InvalidOptions(
                    "UNIQUE constraint requires columns".into(),
                ));
            }
            format!("UNIQUE ({})", column_list(&c.columns))
        }
        ConstraintKind::ForeignKey => {
            if c.columns.is_empty() {
                return Err(Error::InvalidOptions(
                    "FOREIGN KEY constraint requires columns".into(),
                ));
            }
            let ref_table = c
                .ref_table
                .as_deref()
                .ok_or_else(|| Error::InvalidOptions("FOREIGN KEY constraint requires ref_table".into()))?;
            let ref_schema = c.ref_schema.as_deref().unwrap_or("");
            let target = qualified_name(ref_schema, ref_table);
            let mut s = format!(
                "FOREIGN KEY ({}) REFERENCES {}",
                column_list(&c.columns),
                target
            );
            if !c.ref_columns.is_empty() {
                s.push_str(&format!("({})", column_list(&c.ref_columns)));
            }
            if let Some(on_delete) = &c.on_delete {
                if !on_delete.trim().is_empty() && !on_delete.eq_ignore_ascii_case("no action") {
                    s.push_str(&format!(" ON DELETE {}", on_delete.to_uppercase()));
                }
            }
            if let Some(on_update) = &c.on_update {
                if !on_update.trim().is_empty() && !on_update.eq_ignore_ascii_case("no action") {
                    s.push_str(&format!(" ON UPDATE {}", on_update.to_uppercase()));
                }
            }
            s
        }
        ConstraintKind::Check => {
            let def = c
                .definition
                .as_deref()
                .ok_or_else(|| Error::InvalidOptions("CHECK constraint requires a definition".into()))?;
            let normalized = normalize_check_constraint(def);
            let with_keyword = if normalized.trim_start().to_uppercase().starts_with("CHECK") {
                normalized
            } else {
                format!("CHECK {}", normalized)
            };
            reindent_multiline(&with_keyword)
        }
        ConstraintKind::Exclude => {
            let def = c
                .definition
                .as_deref()
                .ok_or_else(|| Error::InvalidOptions("EXCLUDE constraint requires a definition".into()))?;
            format!("EXCLUDE {}", def)
        }
        ConstraintKind::Other => {
            let def = c.definition.as_deref().filter(|d| !d.trim().is_empty());
            match def {
                Some(def) => def.to_string(),
                None => return Err(Error::InvalidOptions("constraint requires a definition".into())),
            }
        }
    };

    Ok(format!("{}{}{}", prefix, body, deferrable_suffix(c)))
}
