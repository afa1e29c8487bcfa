//! Backup file reading and atomic writing.
//!
//! - Atomic writes: write to temp file, sync to disk, then rename
//! - Bounded reads: import files are checked for type and size before the
//!   whole file is loaded into memory

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::sync::types::{SyncError, SyncResult};

/// Write content to a file atomically.
///
/// This function:
/// 1. Writes content to a temporary file next to the target
/// 2. Calls `fsync` to ensure data is on disk
/// 3. Atomically renames the temp file to the target path
///
/// If any step fails, the original file (if any) remains untouched.
///
/// # Errors
///
/// Returns an error if any file operation fails.
pub fn atomic_write(path: &Path, content: &str) -> SyncResult<()> {
    let temp_ext = match path.extension() {
        Some(ext) => format!("{}.tmp", ext.to_string_lossy()),
        None => "tmp".to_string(),
    };
    let temp_path = path.with_extension(temp_ext);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(content.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    debug!(path = %path.display(), bytes = content.len(), "wrote backup file");

    Ok(())
}

/// Read an import file as text.
///
/// Rejects missing files, non-`.json` files, and files larger than
/// `max_bytes` before reading their contents.
///
/// # Errors
///
/// Returns an error if the file is missing, has the wrong extension, is too
/// large, cannot be read, or is not UTF-8.
pub fn read_backup_file(path: &Path, max_bytes: u64) -> SyncResult<String> {
    if !path.exists() {
        return Err(SyncError::FileNotFound(path.display().to_string()));
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(SyncError::UnsupportedFile(path.display().to_string()));
    }

    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(SyncError::FileTooLarge {
            size,
            max: max_bytes,
        });
    }

    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| SyncError::NotText(path.display().to_string()))
}
