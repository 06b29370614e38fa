//! Profile document discovery and employee-name derivation from paths.

use rostersync_core::EmployeeName;

use crate::store::{EntryKind, ProfileStore, StoreError};

/// Recursively list every file under `root` named `<prefix>…<extension>`,
/// following listing cursors to the end. Provider order is preserved.
pub fn find_profile_documents(
    store: &dyn ProfileStore,
    root: &str,
    prefix: &str,
    extension: &str,
) -> Result<Vec<String>, StoreError> {
    let mut found = Vec::new();
    let mut page = store.list_folder(root, true)?;
    let mut pages = 1usize;
    loop {
        found.extend(
            page.entries
                .into_iter()
                .filter(|e| e.kind == EntryKind::File)
                .filter(|e| e.name.starts_with(prefix) && e.name.ends_with(extension))
                .map(|e| e.path),
        );
        if !page.has_more {
            break;
        }
        page = store.list_folder_continue(&page.cursor)?;
        pages += 1;
    }
    tracing::info!(root, pages, documents = found.len(), "profile documents listed");
    Ok(found)
}

/// Employee name from a profile path: the parent folder's name with any
/// leading ordinal (`03 Jane Doe`) removed.
///
/// Paths with fewer than four `/`-separated segments carry no name.
pub fn derive_employee_name(path: &str) -> Option<EmployeeName> {
    let parts: Vec<&str> = path.split('/').collect();
    if parts.len() < 4 {
        return None;
    }
    let folder = parts[parts.len() - 2];
    let name = folder
        .trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace())
        .trim();
    if name.is_empty() {
        None
    } else {
        Some(EmployeeName::from(name))
    }
}
