//! Universal properties that must hold across every generated migration,
//! independent of any one scenario.

use pgtofu_migrate::change::{Change, ChangeType, Details, Severity};
use pgtofu_migrate::ident::quote_identifier;
use pgtofu_migrate::schema::{Database, Table};
use pgtofu_migrate::version::{format_filename, next_migration_version, parse_filename};
use pgtofu_migrate::result::Direction;
use pgtofu_migrate::{generate, DiffResult, Options, TransactionMode};

fn change(kind: ChangeType, object_name: &str, order: i64) -> Change {
    Change {
        kind,
        object_name: object_name.to_string(),
        description: format!("{:?} {}", kind, object_name),
        order,
        depends_on: vec![],
        details: Details::new(),
        severity: Severity::Info,
        object_type: String::new(),
    }
}

fn bare_table(schema: &str, name: &str) -> Table {
    Table {
        schema: schema.to_string(),
        name: name.to_string(),
        columns: vec![],
        constraints: vec![],
        indexes: vec![],
        partitions: vec![],
        partition_strategy: None,
        comment: None,
        hypertable: None,
        compression: None,
        retention_policy: None,
    }
}

/// Filename grammar round-trips through format/parse.
#[test]
fn filename_round_trips() {
    let name = format_filename(42, "Add Users Table!", Direction::Up);
    assert_eq!(name, "000042_add_users_table.up.sql");
    let parsed = parse_filename(&name).unwrap();
    assert_eq!(parsed.version, 42);
    assert_eq!(parsed.description, "add_users_table");
    assert_eq!(parsed.direction, Direction::Up);
}

/// `next_migration_version` reflects the highest version already on disk.
#[test]
fn next_version_accounts_for_existing_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format_filename(5, "init", Direction::Up)), "").unwrap();
    std::fs::write(dir.path().join(format_filename(5, "init", Direction::Down)), "").unwrap();
    assert_eq!(next_migration_version(dir.path(), 1).unwrap(), 6);
}

/// Every identifier containing characters outside `[a-z0-9_]`, or starting
/// with a digit, gets double-quoted; plain lowercase identifiers do not.
#[test]
fn identifier_quoting_invariant() {
    assert_eq!(quote_identifier("users"), "users");
    assert_eq!(quote_identifier("Users"), "\"Users\"");
    assert_eq!(quote_identifier("order"), "order");
    assert_eq!(quote_identifier("2fa_codes"), "\"2fa_codes\"");
    assert_eq!(quote_identifier("weird name"), "\"weird name\"");
}

/// Every emitted DDL statement in generated content ends with a semicolon
/// before its trailing newline.
#[test]
fn every_statement_terminates_with_semicolon() {
    let mut desired = Database::default();
    desired.tables.push(bare_table("public", "widgets"));
    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![change(ChangeType::AddTable, "public.widgets", 0)],
    };
    let result = generate(&diff, &Options::default()).unwrap();
    for pair in &result.pairs {
        for file in [Some(&pair.up), pair.down.as_ref()].into_iter().flatten() {
            for line in file.content.lines() {
                let trimmed = line.trim();
                if trimmed.is_empty() || trimmed.starts_with("--") || trimmed == "BEGIN;" || trimmed == "COMMIT;" {
                    continue;
                }
                assert!(trimmed.ends_with(';'), "non-terminated line: {trimmed}");
            }
        }
    }
}

/// `TransactionMode::Never` never wraps a file in BEGIN/COMMIT, regardless
/// of what the statements inside would otherwise require.
#[test]
fn transaction_mode_never_suppresses_wrapping() {
    let mut desired = Database::default();
    desired.tables.push(bare_table("public", "widgets"));
    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![change(ChangeType::AddTable, "public.widgets", 0)],
    };
    let mut options = Options::default();
    options.transaction_mode = TransactionMode::Never;
    let result = generate(&diff, &options).unwrap();
    for pair in &result.pairs {
        assert!(!pair.up.content.contains("BEGIN;"));
        assert!(!pair.up.content.contains("COMMIT;"));
    }
}

/// An empty diff (no changes at all) produces no files and a single
/// explanatory warning instead of erroring.
#[test]
fn empty_diff_is_a_no_op_with_warning() {
    let diff = DiffResult {
        current: Database::default(),
        desired: Database::default(),
        changes: vec![],
    };
    let result = generate(&diff, &Options::default()).unwrap();
    assert!(result.pairs.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.files_written, 0);
}

/// Invalid options (zero start_version) are rejected before any batching
/// or file construction is attempted.
#[test]
fn invalid_options_are_rejected_up_front() {
    let diff = DiffResult {
        current: Database::default(),
        desired: Database::default(),
        changes: vec![change(ChangeType::AddTable, "public.widgets", 0)],
    };
    let mut options = Options::default();
    options.start_version = 0;
    let err = generate(&diff, &options).unwrap_err();
    assert!(matches!(err, pgtofu_migrate::Error::InvalidOptions(_)));
}

/// `DropTable` on a table subsumes a same-batch `DropHypertable` on the
/// same table: the hypertable drop produces no separate statement since
/// dropping the table implies it.
#[test]
fn drop_table_subsumes_drop_hypertable_in_same_batch() {
    let mut current = Database::default();
    let mut table = bare_table("public", "metrics");
    table.hypertable = Some(pgtofu_migrate::schema::Hypertable {
        schema: "public".to_string(),
        table: "metrics".to_string(),
        time_column: "ts".to_string(),
        chunk_time_interval: None,
        number_partitions: None,
    });
    current.tables.push(table);

    let drop_hypertable = change(ChangeType::DropHypertable, "public.metrics", 0);
    let drop_table = change(ChangeType::DropTable, "public.metrics", 1);

    let diff = DiffResult {
        current,
        desired: Database::default(),
        changes: vec![drop_hypertable, drop_table],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let up = &result.pairs[0].up.content;
    assert_eq!(up.matches("DROP TABLE").count(), 1);
    assert!(!up.contains("manual intervention"));
}

/// A comment-only `ModifyTableComment` on a table created earlier in the
/// same batch (via `AddTable`) is dropped from the DOWN stream, since
/// `AddTable`'s own DOWN already removes the table outright.
#[test]
fn comment_only_modify_is_skipped_in_down_when_table_added_same_batch() {
    let mut desired = Database::default();
    let mut table = bare_table("public", "widgets");
    table.comment = Some("a nice table".to_string());
    desired.tables.push(table);

    let add_table = change(ChangeType::AddTable, "public.widgets", 0);
    let mut modify_comment = change(ChangeType::ModifyTableComment, "public.widgets", 1);
    modify_comment.details = Details::new()
        .insert("old_comment", pgtofu_migrate::change::DetailValue::Str("".into()))
        .insert("new_comment", pgtofu_migrate::change::DetailValue::Str("a nice table".into()));

    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![add_table, modify_comment],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let down = result.pairs[0].down.as_ref().unwrap();
    assert_eq!(down.content.matches("COMMENT ON TABLE").count(), 0);
    assert_eq!(down.content.matches("DROP TABLE").count(), 1);
}
