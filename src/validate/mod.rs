//! Validation of untrusted backup data.
//!
//! - [`schema`] - structural validator for export bundles and field predicates
//! - [`sanitize`] - markup stripping for free-text fields
//! - [`limits`] - the single source of numeric bounds
//! - [`suggest`] - edit-distance suggestions for lookups that miss
//!
//! Validation never fails with an `Err`: malformed input is described by a
//! [`ValidationReport`] carrying every problem found.

pub mod limits;
pub mod sanitize;
pub mod schema;
pub mod suggest;

use serde::Serialize;
use std::fmt;

pub use limits::ValidationLimits;
pub use sanitize::{sanitize, truncate_chars};
pub use schema::{
    SchemaValidator, contains_html_tag, is_valid_calendar_date, is_valid_datetime,
    is_valid_hex_color, is_valid_id, parse_calendar_date,
};
pub use suggest::{find_similar, levenshtein_distance};

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted/bracketed path, e.g. `activities[3].color`.
    pub field: String,
    /// Human-readable description.
    pub message: String,
    /// Index of the offending array element, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl ValidationError {
    /// Error not tied to an array element.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            index: None,
        }
    }

    /// Error scoped to an array element.
    #[must_use]
    pub fn at(field: impl Into<String>, message: impl Into<String>, index: usize) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            index: Some(index),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    #[must_use]
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a parsed bundle with the default limits.
#[must_use]
pub fn validate_export_data(data: &serde_json::Value) -> ValidationReport {
    SchemaValidator::default().validate(data)
}

/// Boolean view of [`validate_export_data`], for callers that only need a yes/no.
#[must_use]
pub fn is_valid_export_data(data: &serde_json::Value) -> bool {
    validate_export_data(data).valid
}
