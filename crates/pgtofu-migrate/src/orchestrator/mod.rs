//! Ties batching (§4.6.1), naming (§4.6.2), registry dispatch, the
//! compression-toggle wrapper, and file formatting (§4.6.3) into the
//! top-level `generate` entry point (§4.6).

pub mod batching;
pub mod fileformat;
pub mod naming;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::change::{Change, ChangeType, DiffResult};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::registry::{self, Context};
use crate::result::{DDLStatement, Direction, GenerateResult, MigrationFile, MigrationPair};
use crate::version;

/// Drop-subsumption (testable property 9): a `DropTable` on `T` in the
/// same batch absorbs any `DropHypertable`/`DropCompressionPolicy`/
/// `DropRetentionPolicy` on `T` — the table drop cascades over them.
fn subsumed_by_drop_table(batch: &[Change], change: &Change) -> bool {
    if !matches!(
        change.kind,
        ChangeType::DropHypertable | ChangeType::DropCompressionPolicy | ChangeType::DropRetentionPolicy
    ) {
        return false;
    }
    let target = change.normalized_object_name();
    batch
        .iter()
        .any(|c| c.kind == ChangeType::DropTable && c.normalized_object_name() == target)
}

/// Comment-only changes (testable property 10): `ModifyTableComment`,
/// `ModifyColumnComment`, and `Modify{View,MaterializedView,Function,
/// ContinuousAggregate}` when both `old_comment` and `new_comment` are
/// present in `Details`.
fn is_comment_only(change: &Change) -> bool {
    match change.kind {
        ChangeType::ModifyTableComment | ChangeType::ModifyColumnComment => true,
        ChangeType::ModifyView
        | ChangeType::ModifyMaterializedView
        | ChangeType::ModifyFunction
        | ChangeType::ModifyContinuousAggregate => {
            change.details.get_str_opt("old_comment").is_some() && change.details.get_str_opt("new_comment").is_some()
        }
        _ => false,
    }
}

/// Whether `change`'s target object is itself created earlier in `batch`
/// via an `Add*` change (used to drop implied-rollback comment changes
/// from the DOWN stream).
fn target_created_in_batch(batch: &[Change], change: &Change) -> bool {
    let target = change.normalized_object_name();
    batch.iter().any(|c| {
        c.is_add() && c.normalized_object_name() == target
    })
}

fn build_up_statements(batch: &[Change], ctx: &Context) -> Result<(Vec<DDLStatement>, Vec<String>)> {
    let mut statements = Vec::new();
    let mut change_descriptions = Vec::new();

    for change in batch {
        if subsumed_by_drop_table(batch, change) {
            debug!(object = %change.object_name, "skipping change subsumed by DROP TABLE");
            continue;
        }
        let stmt = registry::build_up(change, ctx)?;
        change_descriptions.push(change.description.clone());
        statements.push(stmt);
    }

    Ok((statements, change_descriptions))
}

fn build_down_statements(batch: &[Change], ctx: &Context) -> (Vec<DDLStatement>, Vec<String>) {
    let mut statements = Vec::new();
    let mut warnings = Vec::new();

    for change in batch.iter().rev() {
        if subsumed_by_drop_table(batch, change) {
            continue;
        }
        if is_comment_only(change) && target_created_in_batch(batch, change) {
            continue;
        }
        match registry::build_down(change, ctx) {
            Ok(stmt) => statements.push(stmt),
            Err(e) => {
                let warning = format!(
                    "manual rollback required for: {} ({})",
                    change.description, e
                );
                warn!(object = %change.object_name, error = %e, "DOWN builder failed, inserting manual rollback placeholder");
                statements.push(
                    DDLStatement::new(
                        format!("-- WARNING: Manual rollback required for: {}", change.description),
                        change.description.clone(),
                    )
                    .unsafe_(),
                );
                warnings.push(warning);
            }
        }
    }

    (statements, warnings)
}

/// Runs a computed schema diff through batching, per-change dispatch, and
/// file assembly, returning the generated migration pairs and any
/// recoverable-error warnings. Writes files to `options.output_dir` unless
/// `options.preview_mode` is set.
pub fn generate(diff: &DiffResult, options: &Options) -> Result<GenerateResult> {
    options.validate()?;

    if diff.changes.is_empty() {
        return Ok(GenerateResult {
            pairs: Vec::new(),
            warnings: vec!["no changes detected".to_string()],
            files_written: 0,
        });
    }

    let batches = batching::build_batches(diff, options);
    let ctx = Context::new(diff, options.idempotent);

    let mut pairs = Vec::new();
    let mut warnings = Vec::new();

    for (i, batch) in batches.iter().enumerate() {
        let version = options.start_version + i as u32;
        let description = naming::derive_description(batch);

        let (up_statements, change_descriptions) = build_up_statements(batch, &ctx)?;
        let up_content = fileformat::assemble_file(
            version,
            &description,
            Direction::Up,
            &up_statements,
            &change_descriptions,
            options,
        );
        let up_file = MigrationFile {
            version,
            description: description.clone(),
            direction: Direction::Up,
            file_name: version::format_filename(version, &description, Direction::Up),
            content: up_content,
        };

        let down_file = if options.generate_down_migrations {
            let (down_statements, down_warnings) = build_down_statements(batch, &ctx);
            warnings.extend(down_warnings);
            let down_content = fileformat::assemble_file(
                version,
                &description,
                Direction::Down,
                &down_statements,
                &change_descriptions,
                options,
            );
            Some(MigrationFile {
                version,
                description: description.clone(),
                direction: Direction::Down,
                file_name: version::format_filename(version, &description, Direction::Down),
                content: down_content,
            })
        } else {
            None
        };

        pairs.push(MigrationPair {
            version,
            description,
            up: up_file,
            down: down_file,
        });
    }

    let mut files_written = 0;
    if !options.preview_mode {
        files_written = write_files(&pairs, Path::new(&options.output_dir))?;
    }

    info!(batches = pairs.len(), files_written, "migration generation complete");

    Ok(GenerateResult {
        pairs,
        warnings,
        files_written,
    })
}

fn write_files(pairs: &[MigrationPair], output_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(output_dir).map_err(|e| Error::io("create output directory", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(output_dir)
            .map_err(|e| Error::io("stat output directory", e))?
            .permissions();
        perms.set_mode(0o755);
        let _ = std::fs::set_permissions(output_dir, perms);
    }

    let mut count = 0;
    for pair in pairs {
        write_one(output_dir, &pair.up)?;
        count += 1;
        if let Some(down) = &pair.down {
            write_one(output_dir, down)?;
            count += 1;
        }
    }
    Ok(count)
}

fn write_one(output_dir: &Path, file: &MigrationFile) -> Result<()> {
    let path = output_dir.join(&file.file_name);
    std::fs::write(&path, &file.content).map_err(|e| Error::io("write migration file", e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = std::fs::metadata(&path)
            .map_err(|e| Error::io("stat migration file", e))?
            .permissions();
        perms.set_mode(0o644);
        let _ = std::fs::set_permissions(&path, perms);
    }

    Ok(())
}
