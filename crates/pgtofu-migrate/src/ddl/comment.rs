use crate::ident::quote_literal;

/// `COMMENT ON <OBJ> <target> IS NULL;` when `comment` is empty/`None`;
/// otherwise `COMMENT ON <OBJ> <target> IS <literal>;`. A comment
/// containing a newline (or an explicit `multiline` request) is emitted
/// as one single-quoted literal per line, each on its own indented line.
pub fn format_comment(object_kind: &str, target: &str, comment: Option<&str>) -> String {
    let comment = comment.map(str::trim).filter(|c| !c.is_empty());
    match comment {
        None => format!("COMMENT ON {} {} IS NULL;", object_kind, target),
        Some(text) if text.contains('\n') => {
            let lines = text
                .lines()
                .map(|line| format!("    {}", quote_literal(line)))
                .collect::<Vec<_>>()
                .join("\n");
            format!("COMMENT ON {} {} IS\n{};", object_kind, target, lines.trim_start())
        }
        Some(text) => format!(
            "COMMENT ON {} {} IS {};",
            object_kind,
            target,
            quote_literal(text)
        ),
    }
}
