//! Activity tracker - daily habits with a contribution-style heatmap.
//!
//! This crate provides the core functionality for the `tracker` CLI tool.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Data types (Activity, ActivityLog, backup bundle)
//! - [`validate`] - Validation and sanitization of untrusted backup data
//! - [`sync`] - Backup export, import pipeline, and merge
//! - [`storage`] - SQLite database layer
//! - [`stats`] - Streaks, completion rates, heatmap levels
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod stats;
pub mod storage;
pub mod sync;
pub mod validate;

pub use error::{Error, Result};

/// Escape a value for CSV output (wrap in quotes if it contains commas, quotes, or newlines).
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
