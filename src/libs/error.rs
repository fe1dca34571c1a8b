//! Typed errors surfaced by the engine.
//!
//! Persistence and command code propagates `anyhow::Result`; the types here
//! carry the failures a caller must be able to tell apart: field-level
//! validation of ingested payloads, malformed report queries and invalid
//! configuration.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Per-field validation failures for one ingested payload.
///
/// Serializes as `{"FIELD": ["message", ...]}` so it can be embedded
/// directly into the `{message, errors}` rejection document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join("; ")))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors raised while interpreting a report or lookup query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReportError {
    #[error("Invalid {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Both from_date and to_date are required")]
    BothDatesRequired,

    #[error("from_date {from} is after to_date {to}")]
    InvertedRange { from: String, to: String },

    #[error("Invalid {dimension} selector: '{value}'")]
    InvalidSelector { dimension: &'static str, value: String },

    #[error("Unknown mode taxonomy '{0}'")]
    UnknownTaxonomy(String),
}

/// Errors raised by configuration values that break engine invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Shift end {end} must be after shift start {start}")]
    InvertedShift { start: String, end: String },

    #[error("Break {start}-{end} must lie inside the shift window and end after it starts")]
    BreakOutsideShift { start: String, end: String },

    #[error("Taxonomy '{name}' must define exactly one productive mode, found {found}")]
    ProductiveModeCount { name: String, found: usize },

    #[error("Taxonomy '{name}' defines mode {code} more than once")]
    DuplicateModeCode { name: String, code: i32 },
}
