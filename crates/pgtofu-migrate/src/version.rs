//! The `%06d_<description>.{up|down}.sql` filename grammar and the
//! `GetNextMigrationVersion` discovery helper.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::result::Direction;

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{6})_(.+)\.(up|down)\.sql$").unwrap());

/// Sanitizes a raw description into the form used in filenames: lowercase,
/// non-alphanumerics collapsed to `_`, trimmed, length-capped at 60 (with
/// any resulting trailing `_` stripped after truncation).
pub fn sanitize_description(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let collapsed = Regex::new(r"[^a-z0-9]+")
        .unwrap()
        .replace_all(&lower, "_")
        .to_string();
    let trimmed = collapsed.trim_matches('_').to_string();
    let truncated: String = trimmed.chars().take(60).collect();
    truncated.trim_end_matches('_').to_string()
}

pub fn format_filename(version: u32, description: &str, direction: Direction) -> String {
    format!(
        "{:06}_{}.{}.sql",
        version,
        sanitize_description(description),
        direction.as_str()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFilename {
    pub version: u32,
    pub description: String,
    pub direction: Direction,
}

pub fn parse_filename(name: &str) -> Option<ParsedFilename> {
    let caps = FILENAME_RE.captures(name)?;
    let version: u32 = caps[1].parse().ok()?;
    let direction = match &caps[3] {
        "up" => Direction::Up,
        "down" => Direction::Down,
        _ => return None,
    };
    Some(ParsedFilename {
        version,
        description: caps[2].to_string(),
        direction,
    })
}

/// Reads `output_dir`, parses every matching filename, and returns
/// `max(version_found, start_version - 1) + 1`. Missing directories are
/// treated as empty.
pub fn next_migration_version(output_dir: &Path, start_version: u32) -> std::io::Result<u32> {
    let mut max_found = start_version.saturating_sub(1);
    let entries = match std::fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(max_found + 1),
        Err(e) => return Err(e),
    };
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(parsed) = parse_filename(name) {
            max_found = max_found.max(parsed.version);
        }
    }
    Ok(max_found + 1)
}
