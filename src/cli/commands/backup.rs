//! Backup command implementations (export/import).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::commands::open_storage;
use crate::cli::{ExportFormatArg, import_mode};
use crate::config::default_export_dir;
use crate::error::Result;
use crate::sync::{ExportFormat, ExportStats, ImportMode, ImportStats, Exporter, Importer};

#[derive(Serialize)]
struct ExportOutput<'a> {
    path: String,
    format: ExportFormat,
    stats: &'a ExportStats,
}

#[derive(Serialize)]
struct ImportOutput<'a> {
    file: String,
    mode: ImportMode,
    stats: &'a ImportStats,
}

/// Execute the export command.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub fn export(
    format: ExportFormatArg,
    output: Option<&Path>,
    db_path: Option<&PathBuf>,
    json: bool,
) -> Result<()> {
    let format = ExportFormat::from(format);
    let storage = open_storage(db_path)?;
    let dir = default_export_dir()?;

    let (path, stats) = Exporter::new(&storage, format).export_to(output, &dir)?;

    if json {
        let output = ExportOutput {
            path: path.display().to_string(),
            format,
            stats: &stats,
        };
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("Export complete: {}", path.display());
        println!();
        println!("  Activities: {}", stats.activities);
        println!("  Logs:       {}", stats.logs);
    }
    Ok(())
}

/// Execute the import command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the backup is rejected, or
/// the store cannot be written.
pub fn import(file: &Path, replace: bool, db_path: Option<&PathBuf>, json: bool) -> Result<()> {
    let mode = import_mode(replace);
    let mut storage = open_storage(db_path)?;

    let stats = Importer::new(&mut storage, mode).import_file(file)?;

    if json {
        let output = ImportOutput {
            file: file.display().to_string(),
            mode,
            stats: &stats,
        };
        println!("{}", serde_json::to_string(&output)?);
        return Ok(());
    }

    println!("Import complete: {}", file.display());
    println!();
    println!(
        "  Activities: {} added, {} skipped",
        stats.activities.added, stats.activities.skipped
    );
    println!(
        "  Logs:       {} added, {} skipped",
        stats.logs.added, stats.logs.skipped
    );
    if mode == ImportMode::Replace {
        println!(
            "  Replaced:   {} activities, {} logs",
            stats.activities.removed, stats.logs.removed
        );
    }
    Ok(())
}
