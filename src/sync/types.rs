//! Types shared by backup export and import.

use serde::Serialize;

/// Output format for exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Pretty-printed JSON bundle (importable).
    #[default]
    Json,
    /// Two-section CSV document (for spreadsheets; not importable).
    Csv,
}

impl ExportFormat {
    /// File extension without the dot.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
        }
    }

    /// MIME type handed to file-save collaborators.
    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// How imported records are applied to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Keep existing records; add imported ones with unseen ids.
    #[default]
    Merge,
    /// Discard the store's data and use the imported set.
    Replace,
}

/// Statistics for an export operation.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ExportStats {
    pub activities: usize,
    pub logs: usize,
}

impl ExportStats {
    #[must_use]
    pub fn total(&self) -> usize {
        self.activities + self.logs
    }

    /// Returns true if nothing was exported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Per-entity statistics for import operations.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    /// Imported records written to the store.
    pub added: usize,
    /// Imported records dropped because the id already existed.
    pub skipped: usize,
    /// Existing records discarded (replace mode only).
    pub removed: usize,
}

impl EntityStats {
    /// Imported records considered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.added + self.skipped
    }
}

/// Statistics for an import operation.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub activities: EntityStats,
    pub logs: EntityStats,
}

impl ImportStats {
    #[must_use]
    pub fn total_added(&self) -> usize {
        self.activities.added + self.logs.added
    }

    #[must_use]
    pub fn total_skipped(&self) -> usize {
        self.activities.skipped + self.logs.skipped
    }
}

/// Errors from reading and writing backup files.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backup file not found.
    #[error("Backup file not found: {0}")]
    FileNotFound(String),

    /// Backup file exceeds the import size cap.
    #[error("Backup file is too large ({size} bytes, maximum {max})")]
    FileTooLarge { size: u64, max: u64 },

    /// Only JSON bundles can be imported.
    #[error("Unsupported backup file: {0} (expected a .json file)")]
    UnsupportedFile(String),

    /// File contents are not UTF-8 text.
    #[error("Backup file is not valid UTF-8 text: {0}")]
    NotText(String),
}

/// Result type for file operations.
pub type SyncResult<T> = std::result::Result<T, SyncError>;
