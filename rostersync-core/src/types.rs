//! Domain types shared by every rostersync crate.
//!
//! All record fields are opaque strings: rates such as `$20/hr` are compared
//! textually and never parsed as numbers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Employee name as written in the roster: the join key between the roster
/// and the profile tree. Case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmployeeName(pub String);

impl fmt::Display for EmployeeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EmployeeName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EmployeeName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl EmployeeName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One roster row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub name: EmployeeName,
    pub status: String,
    pub rate: String,
    pub profession: String,
}

impl EmployeeRecord {
    /// The roster value for a tracked field.
    pub fn value(&self, field: TrackedField) -> &str {
        match field {
            TrackedField::Id => &self.id,
            TrackedField::Rate => &self.rate,
            TrackedField::Status => &self.status,
            TrackedField::Profession => &self.profession,
        }
    }
}

/// The four profile fields kept in sync with the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackedField {
    #[serde(rename = "ID")]
    Id,
    Rate,
    Status,
    Profession,
}

impl TrackedField {
    /// All tracked fields in reconciliation order.
    pub fn all() -> &'static [TrackedField] {
        &[
            TrackedField::Id,
            TrackedField::Rate,
            TrackedField::Status,
            TrackedField::Profession,
        ]
    }

    /// Bold label used in profile markdown (`**<label>:**`).
    pub fn label(&self) -> &'static str {
        match self {
            TrackedField::Id => "ID",
            TrackedField::Rate => "Rate",
            TrackedField::Status => "Status",
            TrackedField::Profession => "Profession",
        }
    }
}

impl fmt::Display for TrackedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single field rewritten (or, in dry-run, that would be rewritten).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub file: String,
    pub employee: EmployeeName,
    pub field: TrackedField,
    pub new_value: String,
    pub timestamp: DateTime<Utc>,
}

/// A per-document failure. Never aborts the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Run counters, emitted in the summary and the run artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub profiles_found: usize,
    pub profiles_updated: usize,
    pub profiles_created: usize,
    pub profiles_skipped: usize,
    pub folders_created: usize,
    pub fields_changed: usize,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
