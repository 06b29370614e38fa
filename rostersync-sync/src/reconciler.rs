//! Field reconciliation for existing profile documents.
//!
//! Each tracked field has a single-line anchor:
//!
//! ```text
//! **ID:** E100
//! - **Rate:** $20
//! - **Status:** Active
//! - **Profession:** Developer
//! ```
//!
//! Only the value span of the first occurrence is replaced; every other byte of
//! the document is preserved. A missing anchor leaves the field alone.

use std::sync::OnceLock;

use regex::Regex;

use rostersync_core::{EmployeeRecord, TrackedField};

use crate::context::RunContext;
use crate::store::ProfileStore;

/// One field whose document value differs from the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: TrackedField,
    pub old_value: String,
    pub new_value: String,
}

/// Rewritten document text plus the fields that changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub content: String,
    pub changes: Vec<FieldChange>,
}

impl Reconciliation {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }
}

fn anchor(field: TrackedField) -> &'static Regex {
    static ANCHORS: OnceLock<[Regex; 4]> = OnceLock::new();
    let anchors = ANCHORS.get_or_init(|| {
        let build = |pattern: &str| Regex::new(pattern).expect("anchor pattern is valid");
        [
            build(r"(\*\*ID:\*\*)([ \t]*)([^\r\n]*)"),
            build(r"(- \*\*Rate:\*\*)([ \t]*)([^\r\n]*)"),
            build(r"(- \*\*Status:\*\*)([ \t]*)([^\r\n]*)"),
            build(r"(- \*\*Profession:\*\*)([ \t]*)([^\r\n]*)"),
        ]
    });
    match field {
        TrackedField::Id => &anchors[0],
        TrackedField::Rate => &anchors[1],
        TrackedField::Status => &anchors[2],
        TrackedField::Profession => &anchors[3],
    }
}

/// Set `field` to `value` in `content`.
///
/// Returns the rewritten text and the previous value, or `None` when the
/// anchor is absent or already holds `value` (compared trimmed). A blank value
/// differs from any non-blank one; the label keeps a single space before the
/// new value when it had none.
pub fn update_field(content: &str, field: TrackedField, value: &str) -> Option<(String, String)> {
    let caps = anchor(field).captures(content)?;
    let gap = caps.get(2)?;
    let span = caps.get(3)?;
    let current = span.as_str().trim();
    if current == value.trim() {
        return None;
    }
    // Splice rather than Regex::replace so `$` in values is never expanded.
    let mut out = String::with_capacity(content.len() + value.len() + 1);
    out.push_str(&content[..span.start()]);
    if gap.as_str().is_empty() {
        out.push(' ');
    }
    out.push_str(value);
    out.push_str(&content[span.end()..]);
    Some((out, current.to_string()))
}

/// Apply every tracked field of `record` to `content`.
pub fn reconcile_content(content: &str, record: &EmployeeRecord) -> Reconciliation {
    let mut current = content.to_string();
    let mut changes = Vec::new();
    for &field in TrackedField::all() {
        let new_value = record.value(field);
        if let Some((updated, old_value)) = update_field(&current, field, new_value) {
            current = updated;
            changes.push(FieldChange {
                field,
                old_value,
                new_value: new_value.to_string(),
            });
        }
    }
    Reconciliation {
        content: current,
        changes,
    }
}

/// Reconcile one stored profile against its roster record.
///
/// Download and upload failures are recorded in `ctx` and never propagate.
/// Returns `true` when the document was (or in dry-run would be) rewritten.
pub fn sync_profile(
    store: &dyn ProfileStore,
    path: &str,
    record: &EmployeeRecord,
    ctx: &mut RunContext,
) -> bool {
    let content = match store.download(path) {
        Ok(content) => content,
        Err(err) => {
            ctx.record_error(path, format!("download failed: {err}"));
            return false;
        }
    };

    let result = reconcile_content(&content, record);
    if !result.changed() {
        tracing::debug!("unchanged: {path}");
        return false;
    }

    if ctx.dry_run {
        tracing::info!("[dry-run] would write: {path}");
    } else if let Err(err) = store.upload(path, &result.content) {
        ctx.record_error(path, format!("upload failed: {err}"));
        return false;
    }

    for change in &result.changes {
        ctx.record_change(path, &record.name, change.field, &change.new_value);
    }
    ctx.stats.profiles_updated += 1;
    true
}
