//! Run coordinator: roster → listing → matching → reconcile / provision.
//!
//! ## Sequence
//!
//! 1. Download and parse the roster. A missing roster is fatal.
//! 2. List profile documents under the profile root (all pages).
//! 3. Derive a name from each document path and match it to a roster record.
//!    Unusable paths and unmatched names are skips.
//! 4. Walk the roster in order. Records with documents are reconciled,
//!    records without any are provisioned.
//! 5. Outside dry-run, persist the run artifact.
//!
//! Only steps 1 and 2 can fail the call; everything after is recorded in the
//! [`RunReport`].

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use rostersync_core::{
    match_employee, parse_roster, ChangeRecord, EmployeeName, EmployeeRecord, ErrorRecord, Roster,
    RunStats, SyncConfig,
};
use rostersync_renderer::{path_safe, ProfileRenderer};

use crate::artifact::{self, RunArtifact};
use crate::context::RunContext;
use crate::error::SyncError;
use crate::locator::{derive_employee_name, find_profile_documents};
use crate::provisioner::provision;
use crate::reconciler::sync_profile;
use crate::store::ProfileStore;

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stats: RunStats,
    pub changes: Vec<ChangeRecord>,
    pub errors: Vec<ErrorRecord>,
    /// Where the run artifact was written, if it was.
    pub artifact: Option<PathBuf>,
}

impl RunReport {
    /// A run succeeds iff no per-document error was recorded.
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Documents grouped by the roster record they resolved to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub by_employee: HashMap<EmployeeName, Vec<String>>,
    /// `(path, reason)` for every document that resolved to no record.
    pub skipped: Vec<(String, &'static str)>,
}

/// Download and parse the roster at `path`.
pub fn load_roster(store: &dyn ProfileStore, path: &str) -> Result<Roster, SyncError> {
    let content = store.download(path).map_err(|err| {
        if err.is_not_found() {
            SyncError::RosterNotFound {
                path: path.to_string(),
            }
        } else {
            SyncError::Store(err)
        }
    })?;
    let parsed = parse_roster(&content);
    for name in &parsed.duplicates {
        tracing::warn!(employee = %name, "duplicate roster entry; later row wins");
    }
    if parsed.roster.is_empty() {
        tracing::warn!(path, "roster contains no employee rows");
    }
    tracing::info!(path, employees = parsed.roster.len(), "roster loaded");
    Ok(parsed.roster)
}

/// List profile documents, treating a missing profile root as empty.
pub fn list_documents(store: &dyn ProfileStore, config: &SyncConfig) -> Result<Vec<String>, SyncError> {
    match find_profile_documents(
        store,
        config.root(),
        &config.profile_prefix,
        &config.profile_extension,
    ) {
        Ok(docs) => Ok(docs),
        Err(err) if err.is_not_found() => {
            tracing::warn!(root = config.root(), "profile root does not exist; nothing to reconcile");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Resolve every document to at most one roster record.
pub fn assign_documents(documents: Vec<String>, roster: &Roster) -> Assignment {
    let mut assignment = Assignment::default();
    for path in documents {
        let Some(name) = derive_employee_name(&path) else {
            assignment.skipped.push((path, "no employee name in path"));
            continue;
        };
        let record = match match_employee(name.as_str(), roster) {
            Some((record, kind)) => {
                tracing::debug!(path = %path, employee = %record.name, kind = ?kind, "matched");
                Some(record)
            }
            None => match_folder_name(name.as_str(), roster).inspect(|record| {
                tracing::debug!(path = %path, employee = %record.name, "matched by folder name");
            }),
        };
        match record {
            Some(record) => assignment
                .by_employee
                .entry(record.name.clone())
                .or_default()
                .push(path),
            None => assignment.skipped.push((path, "no roster match")),
        }
    }
    assignment
}

/// The record whose provisioned folder name is `folder`. Names holding path
/// separators are written to disk with those replaced, so the folder never
/// equals the roster name itself.
fn match_folder_name<'r>(folder: &str, roster: &'r Roster) -> Option<&'r EmployeeRecord> {
    let folded = folder.to_lowercase();
    roster
        .iter()
        .find(|r| path_safe(r.name.as_str().trim()).to_lowercase() == folded)
}

/// Execute one reconciliation run against `store`.
pub fn run(
    store: &dyn ProfileStore,
    config: &SyncConfig,
    renderer: &ProfileRenderer,
    dry_run: bool,
) -> Result<RunReport, SyncError> {
    config.validate()?;
    let started_at = Utc::now();
    tracing::info!(backend = store.backend(), dry_run, "run started");

    let roster = load_roster(store, &config.roster_path)?;
    let documents = list_documents(store, config)?;

    let mut ctx = RunContext::new(dry_run);
    ctx.stats.profiles_found = documents.len();

    let assignment = assign_documents(documents, &roster);
    for (path, reason) in &assignment.skipped {
        ctx.record_skip(path, reason);
    }

    for record in roster.iter() {
        match assignment.by_employee.get(&record.name) {
            Some(paths) => {
                for path in paths {
                    sync_profile(store, path, record, &mut ctx);
                }
            }
            None => {
                provision(store, record, config.root(), renderer, &mut ctx);
            }
        }
    }

    let finished_at = Utc::now();
    let artifact = if dry_run {
        None
    } else {
        let snapshot = RunArtifact::from_context(&ctx, finished_at, config.artifact_change_limit);
        match artifact::save_at(&config.state_file, &snapshot) {
            Ok(()) => Some(config.state_file.clone()),
            Err(err) => {
                tracing::warn!(path = %config.state_file.display(), error = %err, "run artifact not written");
                None
            }
        }
    };

    tracing::info!(
        updated = ctx.stats.profiles_updated,
        created = ctx.stats.profiles_created,
        skipped = ctx.stats.profiles_skipped,
        errors = ctx.errors.len(),
        "run finished"
    );

    Ok(RunReport {
        dry_run,
        started_at,
        finished_at,
        stats: ctx.stats,
        changes: ctx.changes,
        errors: ctx.errors,
        artifact,
    })
}
