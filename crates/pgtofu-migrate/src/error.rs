//! The error surface for migration generation.
//!
//! Every variant corresponds to one of the named failure conditions in the
//! external interface contract: validation failures fail a `Generate` call
//! before any statement is built, builder failures carry the offending
//! change, and I/O failures wrap the underlying `std::io::Error`.

use crate::change::Change;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("diff result must not be nil")]
    NilDiffResult,

    #[error("invalid options: {0}")]
    InvalidOptions(String),

    #[error("unsupported change type {kind:?} for change {object_name}")]
    UnsupportedChangeType { kind: String, object_name: String },

    #[error("invalid details for change {object_name}: missing or mistyped key {key:?}")]
    InvalidDetails { object_name: String, key: String },

    #[error("{kind} not found: {name}")]
    ObjectNotFound { kind: &'static str, name: String },

    #[error("io error during {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub fn invalid_details(change: &Change, key: impl Into<String>) -> Self {
        Error::InvalidDetails {
            object_name: change.object_name.clone(),
            key: key.into(),
        }
    }

    pub fn unsupported(change: &Change) -> Self {
        Error::UnsupportedChangeType {
            kind: format!("{:?}", change.kind),
            object_name: change.object_name.clone(),
        }
    }

    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::ObjectNotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn io(operation: &'static str, source: std::io::Error) -> Self {
        Error::Io { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
