//! Data models for the activity tracker.
//!
//! - Activity
//! - ActivityLog
//! - ExportData (backup bundle)

pub mod activity;

pub use activity::{
    Activity, ActivityLog, DEFAULT_ACTIVITY_COLOR, EXPORT_FORMAT_VERSION, ExportData, Identified,
    ImportedData, new_id, timestamp_now,
};
