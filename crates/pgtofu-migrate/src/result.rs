//! Output types: individual statements, assembled files, and the overall
//! result of a `Generate` call.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DDLStatement {
    pub sql: String,
    pub description: String,
    #[serde(default)]
    pub is_unsafe: bool,
    #[serde(default)]
    pub requires_tx: bool,
    #[serde(default)]
    pub cannot_use_tx: bool,
}

impl DDLStatement {
    pub fn new(sql: impl Into<String>, description: impl Into<String>) -> Self {
        DDLStatement {
            sql: sql.into(),
            description: description.into(),
            is_unsafe: false,
            requires_tx: false,
            cannot_use_tx: false,
        }
    }

    pub fn unsafe_(mut self) -> Self {
        self.is_unsafe = true;
        self
    }

    pub fn requires_tx(mut self) -> Self {
        self.requires_tx = true;
        self
    }

    pub fn cannot_use_tx(mut self) -> Self {
        self.cannot_use_tx = true;
        self
    }

    /// Ensures the statement's SQL ends with `;`.
    pub fn terminated_sql(&self) -> String {
        let trimmed = self.sql.trim_end();
        if trimmed.ends_with(';') {
            trimmed.to_string()
        } else {
            format!("{};", trimmed)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationFile {
    pub version: u32,
    pub description: String,
    pub direction: Direction,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPair {
    pub version: u32,
    pub description: String,
    pub up: MigrationFile,
    pub down: Option<MigrationFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResult {
    pub pairs: Vec<MigrationPair>,
    pub warnings: Vec<String>,
    pub files_written: usize,
}
