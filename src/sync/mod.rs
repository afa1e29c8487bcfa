//! Backup export and import.
//!
//! - **Export**: store → JSON bundle or two-section CSV, written atomically
//! - **Import**: file text → parse → validate → sanitize → merge or replace
//!
//! # File Format
//!
//! A backup is one pretty-printed JSON document:
//! ```json
//! {"activities":[...],"logs":[...],"exportedAt":"2024-01-15T10:00:00.000Z","version":"1.0"}
//! ```
//! Only `activities` and `logs` are read back on import.
//!
//! # Example
//!
//! ```ignore
//! use tracker::sync::{Exporter, ExportFormat, Importer, ImportMode};
//!
//! let (path, stats) = Exporter::new(&storage, ExportFormat::Json).export_to(None, &cwd)?;
//!
//! let stats = Importer::new(&mut storage, ImportMode::Merge).import_file(&path)?;
//! ```

mod export;
mod file;
mod import;
mod merge;
mod types;

pub use export::{
    BACKUP_FILE_PREFIX, Exporter, backup_file_name, default_backup_file_name, encode, to_csv,
    to_json, to_json_at,
};
pub use file::{atomic_write, read_backup_file};
pub use import::{ImportPipeline, Importer, ValidationResult, import_data, import_from_text};
pub use merge::{MergedData, merge, merge_by_id};
pub use types::{
    EntityStats, ExportFormat, ExportStats, ImportMode, ImportStats, SyncError, SyncResult,
};
