//! Converts a computed schema diff between two snapshots of a PostgreSQL
//! (with TimescaleDB) database into a versioned, reversible set of DDL
//! migration files.
//!
//! The entry point is [`generate`], which takes a [`DiffResult`] (the
//! output of an external diff producer) and an [`Options`] configuration,
//! and returns a [`GenerateResult`] bundling one [`MigrationPair`] per
//! migration file plus any warnings.
//!
//! ```no_run
//! use pgtofu_migrate::{generate, DiffResult, Options};
//!
//! # fn example(diff: &DiffResult) -> pgtofu_migrate::Result<()> {
//! let options = Options::default();
//! let result = generate(diff, &options)?;
//! for pair in &result.pairs {
//!     println!("{}", pair.up.file_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod change;
pub mod compression_wrap;
pub mod ddl;
pub mod error;
pub mod graph;
pub mod ident;
pub mod options;
pub mod orchestrator;
pub mod registry;
pub mod result;
pub mod schema;
pub mod version;

pub use change::{Change, ChangeType, DetailValue, Details, DiffResult, Severity};
pub use error::{Error, Result};
pub use options::{Options, TransactionMode};
pub use orchestrator::generate;
pub use result::{DDLStatement, Direction, GenerateResult, MigrationFile, MigrationPair};
pub use schema::Database;
pub use version::next_migration_version;
