use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pgtofu_migrate::{generate, next_migration_version, DiffResult, Options, TransactionMode};

#[derive(Parser)]
#[command(name = "pgtofu-migrate")]
#[command(about = "Generates reversible PostgreSQL/TimescaleDB migration files from a schema diff", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TxMode {
    Auto,
    Always,
    Never,
}

impl From<TxMode> for TransactionMode {
    fn from(m: TxMode) -> Self {
        match m {
            TxMode::Auto => TransactionMode::Auto,
            TxMode::Always => TransactionMode::Always,
            TxMode::Never => TransactionMode::Never,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate migration files from a schema diff
    Generate {
        /// Path to a JSON-serialized DiffResult (current + desired snapshots, changes)
        #[arg(short, long)]
        diff: PathBuf,

        /// Directory to write migration files into
        #[arg(short, long, default_value = "./migrations")]
        output_dir: String,

        /// First version number to use; auto-detected from --output-dir when omitted
        #[arg(long)]
        start_version: Option<u32>,

        /// Soft cap on operations per migration file before splitting
        #[arg(long, default_value_t = 20)]
        max_operations_per_file: usize,

        /// Transaction wrapping policy
        #[arg(long, value_enum, default_value = "auto")]
        transaction_mode: TxMode,

        /// Omit header/statement comments from generated files
        #[arg(long)]
        no_comments: bool,

        /// Omit IF EXISTS / IF NOT EXISTS clauses
        #[arg(long)]
        no_idempotent: bool,

        /// Skip generating DOWN migrations
        #[arg(long)]
        no_down: bool,

        /// Print what would be generated without writing any files
        #[arg(long)]
        preview: bool,
    },

    /// Print the next migration version number for an output directory
    NextVersion {
        /// Directory to scan for existing `NNNNNN_description.{up|down}.sql` files
        #[arg(short, long, default_value = "./migrations")]
        output_dir: String,

        /// Version to fall back to when the directory is empty
        #[arg(long, default_value_t = 1)]
        start_version: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            diff,
            output_dir,
            start_version,
            max_operations_per_file,
            transaction_mode,
            no_comments,
            no_idempotent,
            no_down,
            preview,
        } => cmd_generate(
            &diff,
            output_dir,
            start_version,
            max_operations_per_file,
            transaction_mode.into(),
            no_comments,
            no_idempotent,
            no_down,
            preview,
        ),
        Commands::NextVersion {
            output_dir,
            start_version,
        } => cmd_next_version(&output_dir, start_version),
    }
}

fn load_diff(path: &Path) -> Result<DiffResult> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading diff file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing diff file {}", path.display()))
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    diff_path: &Path,
    output_dir: String,
    start_version: Option<u32>,
    max_operations_per_file: usize,
    transaction_mode: TransactionMode,
    no_comments: bool,
    no_idempotent: bool,
    no_down: bool,
    preview: bool,
) -> Result<()> {
    let diff = load_diff(diff_path)?;

    let start_version = match start_version {
        Some(v) => v,
        None => next_migration_version(Path::new(&output_dir), 1)?,
    };

    let options = Options {
        output_dir: output_dir.clone(),
        start_version,
        max_operations_per_file,
        transaction_mode,
        include_comments: !no_comments,
        idempotent: !no_idempotent,
        generate_down_migrations: !no_down,
        preview_mode: preview,
    };

    let result = generate(&diff, &options)?;

    if result.pairs.is_empty() {
        println!("No migration files generated.");
    } else {
        println!("Generated {} migration(s):", result.pairs.len());
        for pair in &result.pairs {
            if preview {
                println!("\n--- {} ---\n{}", pair.up.file_name, pair.up.content);
                if let Some(down) = &pair.down {
                    println!("\n--- {} ---\n{}", down.file_name, down.content);
                }
            } else {
                println!("  {}", pair.up.file_name);
                if let Some(down) = &pair.down {
                    println!("  {}", down.file_name);
                }
            }
        }
    }

    if !result.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &result.warnings {
            println!("  - {}", warning);
        }
    }

    if !preview {
        println!("\n{} file(s) written to {}", result.files_written, output_dir);
    }

    Ok(())
}

fn cmd_next_version(output_dir: &str, start_version: u32) -> Result<()> {
    let version = next_migration_version(Path::new(output_dir), start_version)?;
    println!("{:06}", version);
    Ok(())
}
