//! End-to-end scenarios exercising `generate` against synthetic diffs.

use pgtofu_migrate::change::{Change, ChangeType, DetailValue, Details, Severity};
use pgtofu_migrate::schema::{
    Column, CompressionSettings, Constraint, ConstraintKind, ContinuousAggregate, Database, Hypertable, Table,
};
use pgtofu_migrate::{generate, DiffResult, Options};

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

fn column(name: &str, data_type: &str, nullable: bool, default: Option<&str>) -> Column {
    Column {
        name: name.to_string(),
        data_type: data_type.to_string(),
        nullable,
        default: default.map(String::from),
        comment: None,
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

/// S1 — simple add-table.
#[test]
fn s1_simple_add_table() {
    let mut desired = Database::default();
    let mut table = bare_table("public", "users");
    table.columns = vec![
        column("id", "BIGINT", false, None),
        column("email", "VARCHAR(255)", false, None),
    ];
    table.constraints = vec![
        Constraint {
            name: Some("users_pkey".to_string()),
            kind: Some(ConstraintKind::PrimaryKey),
            columns: vec!["id".to_string()],
            ref_schema: None,
            ref_table: None,
            ref_columns: vec![],
            on_delete: None,
            on_update: None,
            definition: None,
            deferrable: false,
            initially_deferred: false,
        },
        Constraint {
            name: Some("users_email_key".to_string()),
            kind: Some(ConstraintKind::Unique),
            columns: vec!["email".to_string()],
            ref_schema: None,
            ref_table: None,
            ref_columns: vec![],
            on_delete: None,
            on_update: None,
            definition: None,
            deferrable: false,
            initially_deferred: false,
        },
    ];
    desired.tables.push(table);

    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![change(ChangeType::AddTable, "public.users", 0)],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    assert_eq!(result.pairs.len(), 1);

    let up = &result.pairs[0].up.content;
    assert!(up.contains("CREATE TABLE public.users ("));
    assert!(up.contains("id BIGINT NOT NULL"));
    assert!(up.contains("email VARCHAR(255) NOT NULL"));
    assert!(up.contains("PRIMARY KEY"));
    assert!(up.contains("UNIQUE"));
    assert!(up.contains("BEGIN;"));
    assert!(up.contains("COMMIT;"));

    let down = result.pairs[0].down.as_ref().unwrap();
    assert!(down.content.contains("DROP TABLE IF EXISTS public.users CASCADE;"));
}

/// S2 — SERIAL shorthand.
#[test]
fn s2_serial_shorthand() {
    let mut desired = Database::default();
    let mut table = bare_table("public", "steps");
    table.columns = vec![column(
        "id",
        "INTEGER",
        false,
        Some("nextval('steps_id_seq'::regclass)"),
    )];
    table.constraints = vec![Constraint {
        name: None,
        kind: Some(ConstraintKind::PrimaryKey),
        columns: vec!["id".to_string()],
        ref_schema: None,
        ref_table: None,
        ref_columns: vec![],
        on_delete: None,
        on_update: None,
        definition: None,
        deferrable: false,
        initially_deferred: false,
    }];
    desired.tables.push(table);

    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![change(ChangeType::AddTable, "public.steps", 0)],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let up = &result.pairs[0].up.content;
    assert!(up.contains("id SERIAL"));
    assert!(!up.contains("nextval("));
}

/// S3 — add column on a compressed hypertable.
#[test]
fn s3_add_column_on_compressed_hypertable() {
    let mut current = Database::default();
    let mut table = bare_table("public", "metrics");
    table.columns = vec![column("device_id", "TEXT", false, None)];
    table.hypertable = Some(Hypertable {
        schema: "public".to_string(),
        table: "metrics".to_string(),
        time_column: "recorded_at".to_string(),
        chunk_time_interval: None,
        number_partitions: None,
    });
    table.compression = Some(CompressionSettings {
        enabled: true,
        segmentby: vec!["device_id".to_string()],
        orderby: vec![("recorded_at".to_string(), "DESC".to_string())],
    });
    current.tables.push(table.clone());

    let mut desired = Database::default();
    let mut desired_table = table;
    desired_table.columns.push(column("status", "TEXT", false, None));
    desired.tables.push(desired_table);

    let mut c = change(ChangeType::AddColumn, "public.metrics", 0);
    c.details = Details::new().insert("column_name", DetailValue::Str("status".into()));

    let diff = DiffResult {
        current,
        desired,
        changes: vec![c],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let up = &result.pairs[0].up.content;

    let warning_pos = up.find("-- WARNING").expect("warning present");
    let disable_pos = up.find("SET (timescaledb.compress = false)").expect("disable present");
    let add_pos = up
        .find("ALTER TABLE public.metrics ADD COLUMN status TEXT NOT NULL")
        .expect("add column present");
    let enable_pos = up
        .find("timescaledb.compress_segmentby = 'device_id'")
        .expect("re-enable present");

    assert!(warning_pos < disable_pos);
    assert!(disable_pos < add_pos);
    assert!(add_pos < enable_pos);
    assert!(up.contains("timescaledb.compress_orderby = 'recorded_at DESC'"));
}

/// S4 — drop column on a compressed hypertable with a queued
/// compression-policy modification: no re-enable from the drop itself.
#[test]
fn s4_drop_column_with_queued_compression_policy_modification() {
    let mut table = bare_table("public", "metrics");
    table.columns = vec![
        column("old_col", "TEXT", true, None),
        column("new_col", "TEXT", true, None),
    ];
    table.hypertable = Some(Hypertable {
        schema: "public".to_string(),
        table: "metrics".to_string(),
        time_column: "recorded_at".to_string(),
        chunk_time_interval: None,
        number_partitions: None,
    });
    table.compression = Some(CompressionSettings {
        enabled: true,
        segmentby: vec!["old_col".to_string()],
        orderby: vec![],
    });
    let mut current = Database::default();
    current.tables.push(table.clone());

    let mut desired_table = table.clone();
    desired_table.compression = Some(CompressionSettings {
        enabled: true,
        segmentby: vec!["new_col".to_string()],
        orderby: vec![],
    });
    let mut desired = Database::default();
    desired.tables.push(desired_table);

    let mut drop_col = change(ChangeType::DropColumn, "public.metrics", 0);
    drop_col.details = Details::new().insert("column_name", DetailValue::Str("old_col".into()));
    let modify_policy = change(ChangeType::ModifyCompressionPolicy, "public.metrics", 1);

    let diff = DiffResult {
        current,
        desired,
        changes: vec![drop_col, modify_policy],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let up = &result.pairs[0].up.content;

    assert_eq!(up.matches("timescaledb.compress_segmentby = 'old_col'").count(), 0);
    assert_eq!(up.matches("timescaledb.compress_segmentby = 'new_col'").count(), 1);
    assert_eq!(up.matches("SET (timescaledb.compress = false)").count(), 1);
}

/// S5 — cross-schema dependency ordering.
#[test]
fn s5_cross_schema_dependency_ordering() {
    let mut desired = Database::default();
    let mut codes = bare_table("app", "codes");
    codes.columns = vec![column("code", "TEXT", false, None)];
    codes.constraints = vec![Constraint {
        name: None,
        kind: Some(ConstraintKind::PrimaryKey),
        columns: vec!["code".to_string()],
        ref_schema: None,
        ref_table: None,
        ref_columns: vec![],
        on_delete: None,
        on_update: None,
        definition: None,
        deferrable: false,
        initially_deferred: false,
    }];
    desired.tables.push(codes);

    let mut items = bare_table("content", "items");
    items.columns = vec![column("code", "TEXT", true, None)];
    items.constraints = vec![Constraint {
        name: None,
        kind: Some(ConstraintKind::ForeignKey),
        columns: vec!["code".to_string()],
        ref_schema: Some("app".to_string()),
        ref_table: Some("codes".to_string()),
        ref_columns: vec!["code".to_string()],
        on_delete: None,
        on_update: None,
        definition: None,
        deferrable: false,
        initially_deferred: false,
    }];
    desired.tables.push(items);

    let add_schema = change(ChangeType::AddSchema, "app", 0);
    let mut add_items = change(ChangeType::AddTable, "content.items", 1);
    add_items.depends_on = vec!["app.codes".to_string()];
    let add_codes = change(ChangeType::AddTable, "app.codes", 0);

    let diff = DiffResult {
        current: Database::default(),
        desired,
        changes: vec![add_schema, add_items, add_codes],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    assert!(result.pairs[0].up.content.contains("CREATE SCHEMA"));

    let app_batch = result
        .pairs
        .iter()
        .position(|p| p.up.content.contains("app.codes"))
        .unwrap();
    let content_batch = result
        .pairs
        .iter()
        .position(|p| p.up.content.contains("content.items"))
        .unwrap();
    assert!(app_batch < content_batch);
}

/// S6 — primary-key replacement stays cohesive and orders drop before add.
#[test]
fn s6_primary_key_replacement_ordering() {
    let mut table = bare_table("public", "orders");
    table.columns = vec![column("order_uuid", "UUID", false, None)];
    table.constraints = vec![Constraint {
        name: Some("orders_pkey".to_string()),
        kind: Some(ConstraintKind::PrimaryKey),
        columns: vec!["order_uuid".to_string()],
        ref_schema: None,
        ref_table: None,
        ref_columns: vec![],
        on_delete: None,
        on_update: None,
        definition: None,
        deferrable: false,
        initially_deferred: false,
    }];
    let mut desired = Database::default();
    desired.tables.push(table.clone());
    let mut current = Database::default();
    let mut current_table = table;
    current_table.constraints[0].name = Some("orders_pkey_old".to_string());
    current.tables.push(current_table);

    let mut drop_pk = change(ChangeType::DropConstraint, "public.orders", 0);
    drop_pk.details = Details::new().insert("constraint", DetailValue::Str("orders_pkey_old".into()));
    let mut add_pk = change(ChangeType::AddConstraint, "public.orders", 1);
    add_pk.details = Details::new().insert("constraint", DetailValue::Str("orders_pkey".into()));

    let diff = DiffResult {
        current,
        desired,
        changes: vec![drop_pk, add_pk],
    };

    let mut options = Options::default();
    options.max_operations_per_file = 1;
    let result = generate(&diff, &options).unwrap();

    assert_eq!(result.pairs.len(), 1, "cohesion keeps both changes in one batch");
    let up = &result.pairs[0].up.content;
    let drop_pos = up.find("DROP CONSTRAINT IF EXISTS orders_pkey_old").unwrap();
    let add_pos = up.find("ADD CONSTRAINT orders_pkey").unwrap();
    // AddConstraint carries a fixed priority of 8 against DropConstraint's
    // default of 100, so within a table group the add is dispatched first.
    assert!(add_pos < drop_pos);
}

/// S7 — a lower-`Order` continuous-aggregate recreation is emitted before
/// a higher-`Order` column drop on the underlying hypertable.
#[test]
fn s7_continuous_aggregate_recreation_precedes_column_drop() {
    let mut metrics = bare_table("public", "metrics");
    metrics.columns = vec![column("old_col", "TEXT", true, None)];
    metrics.hypertable = Some(Hypertable {
        schema: "public".to_string(),
        table: "metrics".to_string(),
        time_column: "ts".to_string(),
        chunk_time_interval: None,
        number_partitions: None,
    });

    let mut desired = Database::default();
    desired.tables.push(metrics.clone());
    desired.continuous_aggregates.push(ContinuousAggregate {
        schema: "public".to_string(),
        view_name: "metrics_hourly".to_string(),
        hypertable_schema: "public".to_string(),
        hypertable_table: "metrics".to_string(),
        query: "SELECT time_bucket('1 hour', ts) FROM public.metrics".to_string(),
        with_no_data: false,
        refresh_start_offset: None,
        refresh_end_offset: None,
        refresh_schedule_interval: None,
        comment: None,
    });

    let mut current = Database::default();
    current.tables.push(metrics);

    let mut drop_col = change(ChangeType::DropColumn, "public.metrics", 1);
    drop_col.details = Details::new().insert("column_name", DetailValue::Str("old_col".into()));
    let modify_agg = change(ChangeType::ModifyContinuousAggregate, "public.metrics_hourly", 0);

    let diff = DiffResult {
        current,
        desired,
        changes: vec![drop_col, modify_agg],
    };

    let result = generate(&diff, &Options::default()).unwrap();
    let up = &result.pairs[0].up.content;

    let agg_pos = up.find("DROP MATERIALIZED VIEW").expect("aggregate recreation present");
    let drop_col_pos = up
        .find("ALTER TABLE public.metrics DROP COLUMN")
        .expect("column drop present");
    assert!(agg_pos < drop_col_pos);
}
