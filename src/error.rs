//! Error types for the activity tracker.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (`ErrorCode`)
//! - Category-based exit codes (2=db, 3=not_found, 4=validation, etc.)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Malformed backup files are not errors at the validation layer; they only
//! become [`Error::ImportRejected`] once a command decides to stop on them.

use thiserror::Error;

use crate::sync::SyncError;
use crate::validate::ValidationError;

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// How many validation errors a rejected import lists after the headline.
pub const MAX_DETAIL_ERRORS: usize = 5;

// ── Error Code ────────────────────────────────────────────────

/// Machine-readable error codes grouped by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Database (exit 2)
    DatabaseError,

    // Not Found (exit 3)
    ActivityNotFound,
    LogNotFound,

    // Validation (exit 4)
    InvalidArgument,
    ImportRejected,

    // Import/export (exit 6)
    SyncError,

    // Config (exit 7)
    ConfigError,

    // I/O (exit 8)
    IoError,
    JsonError,

    // Internal (exit 1)
    InternalError,
}

impl ErrorCode {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        match self {
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ActivityNotFound => "ACTIVITY_NOT_FOUND",
            Self::LogNotFound => "LOG_NOT_FOUND",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::ImportRejected => "IMPORT_REJECTED",
            Self::SyncError => "SYNC_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Category-based exit code (1-8).
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::InternalError => 1,
            Self::DatabaseError => 2,
            Self::ActivityNotFound | Self::LogNotFound => 3,
            Self::InvalidArgument | Self::ImportRejected => 4,
            Self::SyncError => 6,
            Self::ConfigError => 7,
            Self::IoError | Self::JsonError => 8,
        }
    }

    /// Whether retrying with corrected input can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InvalidArgument | Self::ImportRejected | Self::ActivityNotFound
        )
    }
}

// ── Error Enum ────────────────────────────────────────────────

/// Errors that can occur in tracker operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Activity not found: {id}")]
    ActivityNotFound { id: String },

    #[error("Activity not found: {id} (did you mean: {}?)", similar.join(", "))]
    ActivityNotFoundSimilar { id: String, similar: Vec<String> },

    #[error("No log for activity {activity_id} on {date}")]
    LogNotFound { activity_id: String, date: String },

    #[error("Import rejected: {}", errors.first().map_or("no details", |e| e.message.as_str()))]
    ImportRejected { errors: Vec<ValidationError> },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Map this error to its structured `ErrorCode`.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::ActivityNotFound { .. } | Self::ActivityNotFoundSimilar { .. } => {
                ErrorCode::ActivityNotFound
            }
            Self::LogNotFound { .. } => ErrorCode::LogNotFound,
            Self::ImportRejected { .. } => ErrorCode::ImportRejected,
            Self::InvalidArgument(_) => ErrorCode::InvalidArgument,
            Self::Sync(_) => ErrorCode::SyncError,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::JsonError,
            Self::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Category-based exit code, delegating to the `ErrorCode`.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.error_code().exit_code()
    }

    /// Context-aware recovery hint.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ActivityNotFound { id } => Some(format!(
                "No activity with ID or name '{id}'. Use `tracker activity list` to see activities."
            )),
            Self::ActivityNotFoundSimilar { similar, .. } => {
                Some(format!("Did you mean: {}?", similar.join(", ")))
            }

            Self::LogNotFound { activity_id, .. } => Some(format!(
                "Use `tracker log list --activity {activity_id}` to see recorded days."
            )),

            Self::ImportRejected { errors } => {
                let rest = errors.iter().skip(1);
                let remaining = errors.len().saturating_sub(1);
                if remaining == 0 {
                    return None;
                }
                let mut hint = String::from("Other problems:\n");
                for err in rest.take(MAX_DETAIL_ERRORS) {
                    hint.push_str(&format!("    {err}\n"));
                }
                if remaining > MAX_DETAIL_ERRORS {
                    hint.push_str(&format!(
                        "    ... and {} more\n",
                        remaining - MAX_DETAIL_ERRORS
                    ));
                }
                hint.push_str("  Fix the backup file, or export a fresh one with `tracker export`.");
                Some(hint)
            }

            Self::InvalidArgument(msg) => {
                if msg.contains("color") {
                    Some("Colors are hex values: #RGB or #RRGGBB (e.g. #10B981)".to_string())
                } else if msg.contains("date") {
                    Some("Dates use YYYY-MM-DD (e.g. 2024-01-15)".to_string())
                } else {
                    None
                }
            }

            Self::Sync(SyncError::FileTooLarge { .. }) => {
                Some("Backup files larger than 10 MB are not accepted.".to_string())
            }

            Self::Database(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Sync(_)
            | Self::Config(_)
            | Self::Other(_) => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let code = self.error_code();
        let mut obj = serde_json::json!({
            "error": {
                "code": code.as_str(),
                "message": self.to_string(),
                "retryable": code.is_retryable(),
                "exit_code": code.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        if let Self::ImportRejected { errors } = self {
            obj["error"]["details"] = serde_json::to_value(errors).unwrap_or_default();
        }

        obj
    }
}
