//! Read-only preview for `rostersync diff`.

use chrono::Utc;
use similar::TextDiff;

use rostersync_core::{ErrorRecord, SyncConfig};
use rostersync_renderer::ProfileRenderer;

use crate::coordinator::{assign_documents, list_documents, load_roster};
use crate::error::SyncError;
use crate::provisioner::{self, ProvisionPlan};
use crate::reconciler::reconcile_content;
use crate::store::ProfileStore;

/// Unified diff for one existing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDiff {
    pub path: String,
    pub unified_diff: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preview {
    pub diffs: Vec<ProfileDiff>,
    pub creations: Vec<ProvisionPlan>,
    /// Documents or records that would be skipped, with the reason.
    pub skipped: Vec<(String, &'static str)>,
    pub errors: Vec<ErrorRecord>,
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.diffs.is_empty() && self.creations.is_empty()
    }
}

/// Compute what a run would do without writing anything.
pub fn preview(
    store: &dyn ProfileStore,
    config: &SyncConfig,
    renderer: &ProfileRenderer,
) -> Result<Preview, SyncError> {
    config.validate()?;
    let roster = load_roster(store, &config.roster_path)?;
    let assignment = assign_documents(list_documents(store, config)?, &roster);

    let mut out = Preview {
        skipped: assignment.skipped.clone(),
        ..Preview::default()
    };

    for record in roster.iter() {
        let Some(paths) = assignment.by_employee.get(&record.name) else {
            match provisioner::plan(record, config.root(), renderer) {
                Ok(Some(plan)) => out.creations.push(plan),
                Ok(None) => out
                    .skipped
                    .push((record.name.to_string(), "no department matches profession")),
                Err(err) => out.errors.push(error_record(record.name.as_str(), err)),
            }
            continue;
        };

        for path in paths {
            let existing = match store.download(path) {
                Ok(content) => content,
                Err(err) => {
                    out.errors.push(error_record(path, err));
                    continue;
                }
            };
            let result = reconcile_content(&existing, record);
            if !result.changed() {
                continue;
            }
            let header = path.trim_start_matches('/');
            let unified = TextDiff::from_lines(&existing, &result.content)
                .unified_diff()
                .header(&format!("a/{header}"), &format!("b/{header}"))
                .context_radius(3)
                .to_string();
            out.diffs.push(ProfileDiff {
                path: path.clone(),
                unified_diff: unified,
            });
        }
    }

    Ok(out)
}

fn error_record(file: &str, err: impl std::fmt::Display) -> ErrorRecord {
    ErrorRecord {
        file: file.to_string(),
        error: err.to_string(),
        timestamp: Utc::now(),
    }
}
