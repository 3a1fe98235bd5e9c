use crate::error::{Error, Result};
use crate::ident::quote_identifier;
use crate::schema::{ArgMode, Function};

fn strip_dollar_quotes(body: &str) -> String {
    let trimmed = body.trim();
    if let Some(rest) = trimmed.strip_prefix("$$") {
        if let Some(inner) = rest.strip_suffix("$$") {
            return inner.trim_matches('\n').to_string();
        }
    }
    trimmed.to_string()
}

fn format_arg_list(func: &Function) -> String {
    func.args
        .iter()
        .map(|arg| {
            let mut parts = Vec::new();
            match arg.mode {
                Some(ArgMode::Out) => parts.push("OUT".to_string()),
                Some(ArgMode::Inout) => parts.push("INOUT".to_string()),
                Some(ArgMode::Variadic) => parts.push("VARIADIC".to_string()),
                Some(ArgMode::In) | None => {}
            }
            if let Some(name) = &arg.name {
                if !name.is_empty() {
                    parts.push(name.clone());
                }
            }
            parts.push(arg.data_type.clone());
            parts.join(" ")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `CREATE [OR REPLACE] FUNCTION schema.UPPERNAME(arglist)\n\nRETURNS rettype AS $$\n<body>\n$$ LANGUAGE lang [volatility] [SECURITY DEFINER] [STRICT]`.
///
/// The function name is emitted upper-case and unquoted, exploiting
/// Postgres's case-folding of unquoted identifiers, to match how
/// `ModifyFunction` comment targets must resolve.
pub fn format_function(func: &Function, or_replace: bool) -> Result<String> {
    if func.body.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "function {} has no body",
            func.name
        )));
    }
    if func.return_type.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "function {} has no return type",
            func.name
        )));
    }
    if func.language.trim().is_empty() {
        return Err(Error::InvalidOptions(format!(
            "function {} has no language",
            func.name
        )));
    }

    let keyword = if or_replace {
        "CREATE OR REPLACE FUNCTION"
    } else {
        "CREATE FUNCTION"
    };
    let schema = if func.schema.is_empty() { "public" } else { &func.schema };
    let target = format!("{}.{}", quote_identifier(schema), func.name.to_uppercase());

    let mut tail = format!("LANGUAGE {}", func.language);
    if let Some(vol) = &func.volatility {
        if !vol.trim().is_empty() && !vol.eq_ignore_ascii_case("volatile") {
            tail.push(' ');
            tail.push_str(&vol.to_uppercase());
        }
    }
    if func.security_definer {
        tail.push_str(" SECURITY DEFINER");
    }
    if func.strict {
        tail.push_str(" STRICT");
    }

    Ok(format!(
        "{} {}({})\n\nRETURNS {} AS $$\n{}\n$$ {}",
        keyword,
        target,
        format_arg_list(func),
        func.return_type,
        strip_dollar_quotes(&func.body),
        tail
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn func() -> Function {
        Function {
            schema: "public".to_string(),
            name: "touch_updated_at".to_string(),
            args: vec![],
            return_type: "trigger".to_string(),
            body: "BEGIN NEW.updated_at = now(); RETURN NEW; END;".to_string(),
            language: "plpgsql".to_string(),
            volatility: None,
            security_definer: false,
            strict: false,
            comment: None,
        }
    }

    #[test]
    fn basic_function() {
        let f = func();
        let out = format_function(&f, true).unwrap();
        assert!(out.starts_with("CREATE OR REPLACE FUNCTION public.TOUCH_UPDATED_AT()"));
        assert!(out.contains("RETURNS trigger AS $$"));
        assert!(out.ends_with("LANGUAGE plpgsql"));
    }

    #[test]
    fn volatility_and_flags() {
        let mut f = func();
        f.volatility = Some("stable".to_string());
        f.security_definer = true;
        f.strict = true;
        let out = format_function(&f, false).unwrap();
        assert!(out.ends_with("LANGUAGE plpgsql STABLE SECURITY DEFINER STRICT"));
    }

    #[test]
    fn strips_dollar_quoted_body() {
        let mut f = func();
        f.body = "$$BEGIN RETURN 1; END;$$".to_string();
        let out = format_function(&f, false).unwrap();
        assert!(out.contains("BEGIN RETURN 1; END;"));
        assert!(!out.contains("$$BEGIN"));
    }

    #[test]
    fn empty_body_errs() {
        let mut f = func();
        f.body = String::new();
        assert!(format_function(&f, false).is_err());
    }
}
