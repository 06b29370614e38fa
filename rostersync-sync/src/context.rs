//! Mutable run accumulators.
//!
//! One `RunContext` is created per run and threaded by `&mut` through the
//! reconciler and provisioner. Every record method also emits the matching
//! log line, so callers never log and record separately.

use chrono::Utc;

use rostersync_core::{ChangeRecord, EmployeeName, ErrorRecord, RunStats, TrackedField};

#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub dry_run: bool,
    pub stats: RunStats,
    pub changes: Vec<ChangeRecord>,
    pub errors: Vec<ErrorRecord>,
}

impl RunContext {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    pub fn record_change(&mut self, file: &str, employee: &EmployeeName, field: TrackedField, new_value: &str) {
        tracing::info!(
            path = %file,
            employee = %employee,
            field = %field,
            value = %new_value,
            dry_run = self.dry_run,
            "field updated"
        );
        self.stats.fields_changed += 1;
        self.changes.push(ChangeRecord {
            file: file.to_string(),
            employee: employee.clone(),
            field,
            new_value: new_value.to_string(),
            timestamp: Utc::now(),
        });
    }

    pub fn record_error(&mut self, file: &str, error: impl std::fmt::Display) {
        let error = error.to_string();
        tracing::error!(path = %file, error = %error, "profile failed");
        self.errors.push(ErrorRecord {
            file: file.to_string(),
            error,
            timestamp: Utc::now(),
        });
    }

    /// Count a skipped profile or roster record. Skips are never errors.
    pub fn record_skip(&mut self, subject: &str, reason: &str) {
        tracing::warn!(subject = %subject, reason, "skipped");
        self.stats.profiles_skipped += 1;
    }

    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}
