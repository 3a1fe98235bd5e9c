use crate::ddl::column::format_column;
use crate::ddl::constraint::format_constraint;
use crate::error::Result;
use crate::ident::{qualified_name, quote_identifier};
use crate::schema::Table;

fn indent_block(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    text.lines()
        .map(|l| format!("{}{}", pad, l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Columns then constraints, each on its own 4-space-indented line,
/// comma-separated, wrapped in `( … )`; a partition strategy appends
/// ` PARTITION BY <TYPE> (cols)`; each of the table's partitions then
/// emits its own `CREATE TABLE IF NOT EXISTS … PARTITION OF …;` as a
/// separate statement.
pub fn format_create_table(table: &Table, idempotent: bool) -> Result<String> {
    let mut members = Vec::new();
    for col in &table.columns {
        members.push(indent_block(&format_column(col)?, 4));
    }
    for constraint in &table.constraints {
        members.push(indent_block(&format_constraint(constraint)?, 4));
    }

    let if_not_exists = if idempotent { "IF NOT EXISTS " } else { "" };
    let mut create = format!(
        "CREATE TABLE {}{} (\n{}\n)",
        if_not_exists,
        qualified_name(&table.schema, &table.name),
        members.join(",\n")
    );

    if let Some(strategy) = &table.partition_strategy {
        let cols = strategy
            .columns
            .iter()
            .map(|c| quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");
        create.push_str(&format!(" PARTITION BY {} ({})", strategy.kind.to_uppercase(), cols));
    }
    create.push(';');

    let mut parts = vec![create];
    for partition in &table.partitions {
        parts.push(format_partition_statement(partition, idempotent));
    }

    Ok(parts.join("\n\n"))
}

/// `CREATE TABLE [IF NOT EXISTS] <partname> PARTITION OF <parent>\n<partition_definition>;`.
pub fn format_partition_statement(partition: &crate::schema::Partition, idempotent: bool) -> String {
    let if_not_exists = if idempotent { "IF NOT EXISTS " } else { "" };
    format!(
        "CREATE TABLE {}{} PARTITION OF {}\n{};",
        if_not_exists,
        qualified_name(&partition.schema, &partition.name),
        qualified_name(&partition.parent_schema, &partition.parent_table),
        partition.definition.trim()
    )
}
