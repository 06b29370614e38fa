//! Persisted run record (`last_sync.json`).
//!
//! Advisory only: written after a non-dry run, never read back by a run.
//! Writes use the `.tmp` + rename pattern.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rostersync_core::{ChangeRecord, ErrorRecord, RunStats};

use crate::context::RunContext;
use crate::error::{io_err, SyncError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub timestamp: DateTime<Utc>,
    pub dry_run: bool,
    pub stats: RunStats,
    pub changes_count: usize,
    pub errors_count: usize,
    /// The most recent changes, oldest first.
    pub changes: Vec<ChangeRecord>,
    pub errors: Vec<ErrorRecord>,
}

impl RunArtifact {
    /// Snapshot `ctx`, keeping at most `change_limit` trailing changes.
    pub fn from_context(ctx: &RunContext, timestamp: DateTime<Utc>, change_limit: usize) -> Self {
        let skip = ctx.changes.len().saturating_sub(change_limit);
        Self {
            timestamp,
            dry_run: ctx.dry_run,
            stats: ctx.stats.clone(),
            changes_count: ctx.changes.len(),
            errors_count: ctx.errors.len(),
            changes: ctx.changes[skip..].to_vec(),
            errors: ctx.errors.clone(),
        }
    }
}

/// Write `artifact` to `path` atomically, creating parent directories.
pub fn save_at(path: &Path, artifact: &RunArtifact) -> Result<(), SyncError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let json = serde_json::to_string_pretty(artifact)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}
