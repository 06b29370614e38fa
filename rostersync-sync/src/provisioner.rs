//! Creation of folders and profile documents for roster records that have no
//! profile yet.

use rostersync_core::{infer_department, Department, EmployeeRecord};
use rostersync_renderer::{path_safe, ProfileRenderer, RenderError};

use crate::context::RunContext;
use crate::store::{join_path, FolderOutcome, ProfileStore};

/// Where and what a new profile would be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub department: Department,
    /// `<root>/<department>/<name>`
    pub folder: String,
    /// `<folder>/<prefix> <Profession> <name><ext>`
    pub document: String,
    pub content: String,
}

/// Plan a new profile for `record`. `Ok(None)` when no department matches the
/// profession.
pub fn plan(
    record: &EmployeeRecord,
    root: &str,
    renderer: &ProfileRenderer,
) -> Result<Option<ProvisionPlan>, RenderError> {
    let Some(department) = infer_department(&record.profession) else {
        return Ok(None);
    };
    let rendered = renderer.render(record)?;
    let department_dir = join_path(root, department.folder_name());
    let folder = join_path(&department_dir, &path_safe(record.name.as_str().trim()));
    let document = join_path(&folder, &rendered.file_name);
    Ok(Some(ProvisionPlan {
        department,
        folder,
        document,
        content: rendered.content,
    }))
}

/// Provision `record`: ensure its folder exists, then upload the rendered
/// document. Failures are recorded in `ctx`; unknown departments are skips.
///
/// Returns `true` when a document was (or in dry-run would be) created.
pub fn provision(
    store: &dyn ProfileStore,
    record: &EmployeeRecord,
    root: &str,
    renderer: &ProfileRenderer,
    ctx: &mut RunContext,
) -> bool {
    let plan = match plan(record, root, renderer) {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            ctx.record_skip(
                record.name.as_str(),
                "no department matches profession",
            );
            return false;
        }
        Err(err) => {
            ctx.record_error(record.name.as_str(), format!("render failed: {err}"));
            return false;
        }
    };

    let exists = match store.folder_exists(&plan.folder) {
        Ok(exists) => exists,
        Err(err) => {
            ctx.record_error(&plan.folder, format!("folder check failed: {err}"));
            return false;
        }
    };

    if ctx.dry_run {
        if !exists {
            ctx.stats.folders_created += 1;
        }
        tracing::info!(department = %plan.department, "[dry-run] would create: {}", plan.document);
        ctx.stats.profiles_created += 1;
        return true;
    }

    if !exists {
        match store.create_folder(&plan.folder) {
            Ok(FolderOutcome::Created) => {
                tracing::info!("created folder: {}", plan.folder);
                ctx.stats.folders_created += 1;
            }
            Ok(FolderOutcome::AlreadyExists) => {
                tracing::debug!("folder already exists: {}", plan.folder);
            }
            Err(err) => {
                ctx.record_error(&plan.folder, format!("folder creation failed: {err}"));
                return false;
            }
        }
    }

    if let Err(err) = store.upload(&plan.document, &plan.content) {
        ctx.record_error(&plan.document, format!("upload failed: {err}"));
        return false;
    }
    tracing::info!(department = %plan.department, "created profile: {}", plan.document);
    ctx.stats.profiles_created += 1;
    true
}
