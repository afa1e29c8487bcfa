//! Activity and daily log models.
//!
//! These are the records carried in backup bundles and stored in SQLite.
//! Field names serialize in camelCase so bundles stay compatible with
//! files written by earlier versions of the tracker.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Version string written into every export bundle.
pub const EXPORT_FORMAT_VERSION: &str = "1.0";

/// Default heatmap color for new activities.
pub const DEFAULT_ACTIVITY_COLOR: &str = "#10B981";

/// A tracked habit definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Unique identifier (`[A-Za-z0-9_-]+`).
    pub id: String,

    /// Display name, already sanitized.
    pub name: String,

    /// Hex color (`#RGB` or `#RRGGBB`).
    pub color: String,

    /// Creation timestamp (ISO-8601 text).
    pub created_at: String,

    /// Last modification timestamp, if the activity was ever edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One day's completion record for one activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: String,

    /// Activity this log belongs to. Not checked against existing activities.
    pub activity_id: String,

    /// Calendar day (`YYYY-MM-DD`).
    pub date: String,

    pub completed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: String,
}

/// Anything addressable by a string primary key.
///
/// Used by the merge engine to deduplicate activities and logs alike.
pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Activity {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for ActivityLog {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The top-level backup document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub activities: Vec<Activity>,
    pub logs: Vec<ActivityLog>,
    /// ISO-8601 timestamp of the export. Informational only.
    pub exported_at: String,
    pub version: String,
}

/// Sanitized records produced by a successful import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedData {
    pub activities: Vec<Activity>,
    pub logs: Vec<ActivityLog>,
}

impl ImportedData {
    /// Total number of records carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.activities.len() + self.logs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.logs.is_empty()
    }
}

/// Current time formatted the way bundles carry timestamps
/// (UTC, millisecond precision, `Z` suffix).
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generate a fresh record identifier.
///
/// UUIDs only contain hex digits and dashes, so they always satisfy the
/// identifier pattern enforced on import.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
