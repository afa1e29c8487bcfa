//! Command implementations.
//!
//! Names, notes, colors, and dates typed on the command line go through the
//! same sanitizer and predicates as imported backups.

pub mod activity;
pub mod backup;
pub mod completions;
pub mod log;
pub mod stats;
pub mod version;

use std::path::PathBuf;

use chrono::Local;

use crate::config::require_db_path;
use crate::error::{Error, Result};
use crate::storage::SqliteStorage;
use crate::validate::{
    ValidationLimits, is_valid_calendar_date, is_valid_hex_color, sanitize, truncate_chars,
};

/// Open the store at the resolved database path, creating it if needed.
pub(crate) fn open_storage(db_path: Option<&PathBuf>) -> Result<SqliteStorage> {
    let path = require_db_path(db_path.map(PathBuf::as_path))?;
    SqliteStorage::open(&path)
}

/// Sanitize an activity name, rejecting names that end up empty.
pub(crate) fn clean_name(raw: &str) -> Result<String> {
    let name = truncate_chars(&sanitize(raw), ValidationLimits::DEFAULT.max_name_length);
    if name.is_empty() {
        return Err(Error::InvalidArgument(
            "Activity name cannot be empty".to_string(),
        ));
    }
    Ok(name)
}

/// Sanitize log notes; blank notes become `None`.
pub(crate) fn clean_notes(raw: &str) -> Option<String> {
    let notes = truncate_chars(&sanitize(raw), ValidationLimits::DEFAULT.max_notes_length);
    (!notes.is_empty()).then_some(notes)
}

/// Check a hex color.
pub(crate) fn check_color(raw: &str) -> Result<String> {
    let color = raw.trim();
    if color.chars().count() > ValidationLimits::DEFAULT.max_color_length
        || !is_valid_hex_color(color)
    {
        return Err(Error::InvalidArgument(format!(
            "Invalid color '{raw}': expected #RGB or #RRGGBB"
        )));
    }
    Ok(color.to_string())
}

/// The given day, or today's local date.
pub(crate) fn resolve_date(raw: Option<&str>) -> Result<String> {
    let Some(raw) = raw else {
        return Ok(Local::now().date_naive().format("%Y-%m-%d").to_string());
    };

    let date = raw.trim();
    if !is_valid_calendar_date(date) {
        return Err(Error::InvalidArgument(format!(
            "Invalid date '{raw}': expected a real calendar date in YYYY-MM-DD format"
        )));
    }
    Ok(date.to_string())
}
