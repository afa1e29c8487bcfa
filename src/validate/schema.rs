//! Structural validation of untrusted backup bundles.
//!
//! The validator walks a parsed `serde_json::Value` and reports every
//! problem it finds instead of stopping at the first one. Array-level
//! problems (missing, wrong type, over the count limit) are reported once
//! and suppress per-element checks for that array; element-level problems
//! are reported per field.

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::debug;

use super::limits::ValidationLimits;
use super::{ValidationError, ValidationReport};

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid id regex"));

static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[A-Fa-f0-9]{3}|[A-Fa-f0-9]{6})$").expect("valid color regex")
});

// ASCII digits only; `\d` would also accept other Unicode digits.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").expect("valid date regex"));

// Date-time string format: `YYYY[-MM[-DD]]` with an optional
// `THH:mm[:ss[.sss]]` and zone (`Z`, `±HH:mm` or `±HHMM`). A space is also
// accepted in place of the `T`.
static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([+-][0-9]{6}|[0-9]{4})(?:-([0-9]{2})(?:-([0-9]{2}))?)?(?:[T ]([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]+))?)?(Z|[+-][0-9]{2}:?[0-9]{2})?)?$",
    )
    .expect("valid datetime regex")
});

// ── Field predicates ─────────────────────────────────────────

/// Whether `id` matches the identifier character set.
#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    ID_RE.is_match(id)
}

/// Whether `text` contains something shaped like an HTML tag.
#[must_use]
pub fn contains_html_tag(text: &str) -> bool {
    HTML_TAG_RE.is_match(text)
}

/// Whether `color` is `#RGB` or `#RRGGBB` (case-insensitive).
#[must_use]
pub fn is_valid_hex_color(color: &str) -> bool {
    HEX_COLOR_RE.is_match(color)
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// Returns `None` for wrong layouts and for days that do not exist
/// (`2024-02-30`, `2023-02-29`, `2024-13-45`).
#[must_use]
pub fn parse_calendar_date(date: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(date)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether `date` is a real calendar day in `YYYY-MM-DD` form.
#[must_use]
pub fn is_valid_calendar_date(date: &str) -> bool {
    parse_calendar_date(date).is_some()
}

/// Whether `value` parses as a date/time.
///
/// Accepts the date-time string format (`2024`, `2024-01`,
/// `2024-01-15T10:00Z`, `2024-01-15T10:00:00.000+0000`, ...) and RFC 2822.
/// Calendar fields must name a real day.
#[must_use]
pub fn is_valid_datetime(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    parse_datetime_string(value).is_some() || DateTime::parse_from_rfc2822(value).is_ok()
}

fn parse_datetime_string(value: &str) -> Option<()> {
    let caps = DATETIME_RE.captures(value)?;
    let field = |i: usize, default: u32| -> Option<u32> {
        caps.get(i).map_or(Some(default), |m| m.as_str().parse().ok())
    };

    let year: i32 = caps[1].parse().ok()?;
    // `-000000` is not a valid extended year.
    if caps[1].starts_with('-') && year == 0 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, field(2, 1)?, field(3, 1)?)?;

    if caps.get(4).is_some() {
        let (hour, minute, second) = (field(4, 0)?, field(5, 0)?, field(6, 0)?);
        let midnight_end = hour == 24
            && minute == 0
            && second == 0
            && caps.get(7).is_none_or(|m| m.as_str().bytes().all(|b| b == b'0'));
        if (hour > 23 && !midnight_end) || minute > 59 || second > 59 {
            return None;
        }
    }

    if let Some(zone) = caps.get(8).map(|m| m.as_str()).filter(|z| *z != "Z") {
        let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
        let (hours, minutes): (u32, u32) = (digits[..2].parse().ok()?, digits[2..].parse().ok()?);
        if hours > 23 || minutes > 59 {
            return None;
        }
    }

    Some(())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

// ── Error collection ─────────────────────────────────────────

/// Error sink scoped to one array element.
struct ElementErrors<'a> {
    array: &'static str,
    index: usize,
    errors: &'a mut Vec<ValidationError>,
}

impl ElementErrors<'_> {
    /// Record an error against the element itself.
    fn reject(&mut self, message: &str) {
        self.errors.push(ValidationError::at(
            format!("{}[{}]", self.array, self.index),
            message,
            self.index,
        ));
    }

    /// Record an error against one field of the element.
    fn push(&mut self, key: &str, message: String) {
        self.errors.push(ValidationError::at(
            format!("{}[{}].{}", self.array, self.index, key),
            message,
            self.index,
        ));
    }

    /// Fetch a required string field, recording a type error otherwise.
    fn string<'v>(&mut self, obj: &'v Map<String, Value>, key: &str, label: &str) -> Option<&'v str> {
        if let Some(Value::String(s)) = obj.get(key) {
            Some(s.as_str())
        } else {
            self.push(key, format!("{label} must be a string"));
            None
        }
    }
}

// ── Validator ────────────────────────────────────────────────

/// Validates backup bundles against a set of [`ValidationLimits`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator {
    limits: ValidationLimits,
}

impl SchemaValidator {
    #[must_use]
    pub const fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    /// Validate a parsed bundle, accumulating every error found.
    #[must_use]
    pub fn validate(&self, data: &Value) -> ValidationReport {
        let mut errors = Vec::new();

        let Some(root) = data.as_object() else {
            errors.push(ValidationError::new("data", "Data must be an object"));
            return ValidationReport::from_errors(errors);
        };

        match root.get("activities") {
            Some(Value::Array(items)) => self.validate_activities(items, &mut errors),
            _ => errors.push(ValidationError::new(
                "activities",
                "Activities must be an array",
            )),
        }

        match root.get("logs") {
            Some(Value::Array(items)) => self.validate_logs(items, &mut errors),
            _ => errors.push(ValidationError::new("logs", "Logs must be an array")),
        }

        debug!(errors = errors.len(), "bundle validation finished");
        ValidationReport::from_errors(errors)
    }

    fn validate_activities(&self, items: &[Value], errors: &mut Vec<ValidationError>) {
        if items.len() > self.limits.max_activities {
            errors.push(ValidationError::new(
                "activities",
                format!(
                    "Too many activities (maximum {})",
                    self.limits.max_activities
                ),
            ));
            return;
        }

        for (index, item) in items.iter().enumerate() {
            let mut element = ElementErrors {
                array: "activities",
                index,
                errors: &mut *errors,
            };
            match item.as_object() {
                Some(obj) => self.validate_activity(&mut element, obj),
                None => element.reject("Activity must be an object"),
            }
        }
    }

    fn validate_logs(&self, items: &[Value], errors: &mut Vec<ValidationError>) {
        if items.len() > self.limits.max_logs {
            errors.push(ValidationError::new(
                "logs",
                format!("Too many log entries (maximum {})", self.limits.max_logs),
            ));
            return;
        }

        for (index, item) in items.iter().enumerate() {
            let mut element = ElementErrors {
                array: "logs",
                index,
                errors: &mut *errors,
            };
            match item.as_object() {
                Some(obj) => self.validate_log(&mut element, obj),
                None => element.reject("Log entry must be an object"),
            }
        }
    }

    fn validate_activity(&self, el: &mut ElementErrors<'_>, obj: &Map<String, Value>) {
        self.check_id(el, obj, "id", "Activity ID");

        if let Some(name) = el.string(obj, "name", "Activity name") {
            if name.is_empty() {
                el.push("name", "Activity name cannot be empty".to_string());
            }
            if char_len(name) > self.limits.max_name_length {
                el.push(
                    "name",
                    format!(
                        "Activity name must be at most {} characters",
                        self.limits.max_name_length
                    ),
                );
            }
        }

        if let Some(color) = el.string(obj, "color", "Activity color") {
            if !is_valid_hex_color(color) {
                el.push(
                    "color",
                    "Activity color must be a hex color (#RGB or #RRGGBB)".to_string(),
                );
            }
            if char_len(color) > self.limits.max_color_length {
                el.push(
                    "color",
                    format!(
                        "Activity color must be at most {} characters",
                        self.limits.max_color_length
                    ),
                );
            }
        }

        check_datetime(el, obj, "createdAt", "Activity createdAt");

        if obj.contains_key("updatedAt") {
            check_datetime(el, obj, "updatedAt", "Activity updatedAt");
        }
    }

    fn validate_log(&self, el: &mut ElementErrors<'_>, obj: &Map<String, Value>) {
        self.check_id(el, obj, "id", "Log ID");
        self.check_id(el, obj, "activityId", "Log activity ID");

        if let Some(date) = el.string(obj, "date", "Log date") {
            if !is_valid_calendar_date(date) {
                el.push(
                    "date",
                    "Log date must be a real calendar date in YYYY-MM-DD format".to_string(),
                );
            }
        }

        if !matches!(obj.get("completed"), Some(Value::Bool(_))) {
            el.push("completed", "Log completed must be a boolean".to_string());
        }

        match obj.get("notes") {
            None | Some(Value::Null) => {}
            Some(Value::String(notes)) => {
                if char_len(notes) > self.limits.max_notes_length {
                    el.push(
                        "notes",
                        format!(
                            "Log notes must be at most {} characters",
                            self.limits.max_notes_length
                        ),
                    );
                }
            }
            Some(_) => el.push("notes", "Log notes must be a string".to_string()),
        }

        check_datetime(el, obj, "createdAt", "Log createdAt");
    }

    /// Identifier checks. Each rule reports independently.
    fn check_id(&self, el: &mut ElementErrors<'_>, obj: &Map<String, Value>, key: &str, label: &str) {
        let Some(id) = el.string(obj, key, label) else {
            return;
        };

        if id.is_empty() {
            el.push(key, format!("{label} cannot be empty"));
        }
        if char_len(id) > self.limits.max_id_length {
            el.push(
                key,
                format!(
                    "{label} must be at most {} characters",
                    self.limits.max_id_length
                ),
            );
        }
        if contains_html_tag(id) {
            el.push(key, format!("{label} cannot contain HTML"));
        }
        if !is_valid_id(id) {
            el.push(
                key,
                format!("{label} may only contain letters, numbers, hyphens, and underscores"),
            );
        }
    }
}

fn check_datetime(el: &mut ElementErrors<'_>, obj: &Map<String, Value>, key: &str, label: &str) {
    if let Some(value) = el.string(obj, key, label) {
        if !is_valid_datetime(value) {
            el.push(key, format!("{label} must be a valid date"));
        }
    }
}
