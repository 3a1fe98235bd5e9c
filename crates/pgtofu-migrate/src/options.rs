//! Generator configuration and validation.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    Auto,
    Always,
    Never,
}

impl Default for TransactionMode {
    fn default() -> Self {
        TransactionMode::Auto
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub output_dir: String,
    pub start_version: u32,
    pub max_operations_per_file: usize,
    pub transaction_mode: TransactionMode,
    pub include_comments: bool,
    pub idempotent: bool,
    pub generate_down_migrations: bool,
    pub preview_mode: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            output_dir: "./migrations".to_string(),
            start_version: 1,
            max_operations_per_file: 20,
            transaction_mode: TransactionMode::Auto,
            include_comments: true,
            idempotent: true,
            generate_down_migrations: true,
            preview_mode: false,
        }
    }
}

impl Options {
    pub fn validate(&self) -> Result<()> {
        if self.start_version == 0 {
            return Err(Error::InvalidOptions(
                "start_version must be >= 1".to_string(),
            ));
        }
        if self.max_operations_per_file == 0 {
            return Err(Error::InvalidOptions(
                "max_operations_per_file must be >= 1".to_string(),
            ));
        }
        if self.output_dir.trim().is_empty() {
            return Err(Error::InvalidOptions(
                "output_dir must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Options::default().validate().is_ok());
    }

    #[test]
    fn zero_start_version_is_rejected() {
        let mut o = Options::default();
        o.start_version = 0;
        assert!(o.validate().is_err());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let mut o = Options::default();
        o.max_operations_per_file = 0;
        assert!(o.validate().is_err());
    }

    #[test]
    fn empty_output_dir_is_rejected() {
        let mut o = Options::default();
        o.output_dir = "   ".to_string();
        assert!(o.validate().is_err());
    }
}
