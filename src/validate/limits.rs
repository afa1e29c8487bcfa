//! Validation limits.
//!
//! Every numeric bound the importer enforces lives here, in one immutable
//! value, so tests and callers can tighten or relax limits without touching
//! the validation logic.

use serde::Serialize;

/// Bounds applied to imported bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationLimits {
    /// Maximum number of activities in one bundle.
    pub max_activities: usize,
    /// Maximum number of log entries in one bundle.
    pub max_logs: usize,
    /// Maximum identifier length (characters).
    pub max_id_length: usize,
    /// Maximum activity name length (characters, after sanitization).
    pub max_name_length: usize,
    /// Maximum log notes length (characters, after sanitization).
    pub max_notes_length: usize,
    /// Maximum stored color length (characters).
    pub max_color_length: usize,
    /// Maximum size of an import file on disk (bytes).
    pub max_import_bytes: u64,
}

impl ValidationLimits {
    /// The limits shipped with the tracker.
    pub const DEFAULT: Self = Self {
        max_activities: 10_000,
        max_logs: 100_000,
        max_id_length: 100,
        max_name_length: 100,
        max_notes_length: 1000,
        max_color_length: 20,
        max_import_bytes: 10 * 1024 * 1024,
    };
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}
