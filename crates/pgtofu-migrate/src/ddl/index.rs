use crate::error::{Error, Result};
use crate::ident::{normalize_where_clause, qualified_name, quote_identifier};
use crate::schema::Index;

fn column_list(cols: &[String]) -> String {
    cols.iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE [UNIQUE] INDEX quoted_name ON schema.table[ USING type] (cols)[ INCLUDE (cols)][ WHERE expr]`.
pub fn format_index(idx: &Index) -> Result<String> {
    if idx.columns.is_empty() {
        return Err(Error::InvalidOptions(format!(
            "index {} requires at least one column",
            idx.name
        )));
    }
    let mut s = String::from("CREATE ");
    if idx.unique {
        s.push_str("UNIQUE ");
    }
    s.push_str("INDEX ");
    s.push_str(&quote_identifier(&idx.name));
    s.push_str(" ON ");
    s.push_str(&qualified_name(&idx.schema, &idx.table));

    if let Some(using) = &idx.using {
        let using_lower = using.trim().to_lowercase();
        if !using_lower.is_empty() && using_lower != "btree" {
            s.push_str(&format!(" USING {}", using.trim()));
        }
    }

    s.push_str(&format!(" ({})", column_list(&idx.columns)));

    if !idx.include.is_empty() {
        s.push_str(&format!(" INCLUDE ({})", column_list(&idx.include)));
    }

    if let Some(where_clause) = &idx.where_clause {
        if !where_clause.trim().is_empty() {
            s.push_str(&format!(" WHERE {}", normalize_where_clause(where_clause)));
        }
    }

    Ok(s)
}
