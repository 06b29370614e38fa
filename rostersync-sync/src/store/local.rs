//! Local mirror backend: the storage contract over a directory on disk.
//!
//! Provider path `/Nov25/Dev/Jane Doe` maps to `<root>/Nov25/Dev/Jane Doe`.
//! Uploads use the `.tmp` + rename pattern so a crash never leaves a
//! half-written profile. Listings are sorted by path and paged with
//! `page_size` entries per page; the cursor encodes the next offset.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::store::{
    Account, Entry, EntryKind, FolderOutcome, ListPage, ProfileStore, StoreError, StoreErrorCode,
};

const DEFAULT_PAGE_SIZE: usize = 500;

pub struct LocalStore {
    root: PathBuf,
    page_size: usize,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the listing page size (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        if !path.starts_with('/') {
            return Err(StoreError::new(
                StoreErrorCode::Protocol,
                format!("path '{path}' must be absolute"),
            ));
        }
        let mut out = self.root.clone();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(StoreError::new(
                    StoreErrorCode::Protocol,
                    format!("path '{path}' escapes the store root"),
                ));
            }
            out.push(segment);
        }
        Ok(out)
    }

    fn collect(
        &self,
        dir: &Path,
        provider_dir: &str,
        recursive: bool,
        out: &mut Vec<Entry>,
    ) -> Result<(), StoreError> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)
            .map_err(|e| io_store_err(dir, e))?
            .filter_map(|e| e.ok())
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".rostersync.tmp") {
                continue;
            }
            let provider_path = format!("{}/{}", provider_dir.trim_end_matches('/'), name);
            let file_type = entry.file_type().map_err(|e| io_store_err(&entry.path(), e))?;
            if file_type.is_dir() {
                out.push(Entry {
                    kind: EntryKind::Folder,
                    name,
                    path: provider_path.clone(),
                });
                if recursive {
                    self.collect(&entry.path(), &provider_path, true, out)?;
                }
            } else if file_type.is_file() {
                out.push(Entry {
                    kind: EntryKind::File,
                    name,
                    path: provider_path,
                });
            }
        }
        Ok(())
    }

    fn page(&self, path: &str, recursive: bool, offset: usize) -> Result<ListPage, StoreError> {
        let dir = self.resolve(path)?;
        if !dir.is_dir() {
            return Err(StoreError::not_found(path));
        }
        let mut all = Vec::new();
        self.collect(&dir, path, recursive, &mut all)?;

        let end = (offset + self.page_size).min(all.len());
        let entries = all.get(offset..end).map(<[Entry]>::to_vec).unwrap_or_default();
        Ok(ListPage {
            entries,
            cursor: encode_cursor(end, recursive, path),
            has_more: end < all.len(),
        })
    }
}

fn encode_cursor(offset: usize, recursive: bool, path: &str) -> String {
    format!("{offset}:{}:{path}", u8::from(recursive))
}

fn decode_cursor(cursor: &str) -> Option<(usize, bool, &str)> {
    let mut parts = cursor.splitn(3, ':');
    let offset = parts.next()?.parse().ok()?;
    let recursive = match parts.next()? {
        "1" => true,
        "0" => false,
        _ => return None,
    };
    Some((offset, recursive, parts.next()?))
}

fn io_store_err(path: &Path, err: std::io::Error) -> StoreError {
    let code = match err.kind() {
        ErrorKind::NotFound => StoreErrorCode::NotFound,
        ErrorKind::AlreadyExists => StoreErrorCode::Conflict,
        _ => StoreErrorCode::Io,
    };
    StoreError::new(code, format!("{}: {err}", path.display()))
}

impl ProfileStore for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn current_account(&self) -> Result<Account, StoreError> {
        if !self.root.is_dir() {
            return Err(StoreError::new(
                StoreErrorCode::NotFound,
                format!("local root {} is not a directory", self.root.display()),
            ));
        }
        Ok(Account {
            email: "local".to_string(),
            display_name: self.root.display().to_string(),
        })
    }

    fn download(&self, path: &str) -> Result<String, StoreError> {
        let file = self.resolve(path)?;
        if file.is_dir() {
            return Err(StoreError::new(
                StoreErrorCode::Protocol,
                format!("{path} is a folder"),
            ));
        }
        let bytes = std::fs::read(&file).map_err(|e| io_store_err(&file, e))?;
        String::from_utf8(bytes).map_err(|e| {
            StoreError::new(StoreErrorCode::Protocol, format!("{path} is not UTF-8: {e}"))
        })
    }

    fn upload(&self, path: &str, content: &str) -> Result<(), StoreError> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_store_err(parent, e))?;
        }
        let tmp = PathBuf::from(format!("{}.rostersync.tmp", target.display()));
        std::fs::write(&tmp, content).map_err(|e| io_store_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &target) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_store_err(&target, e));
        }
        Ok(())
    }

    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListPage, StoreError> {
        self.page(path, recursive, 0)
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListPage, StoreError> {
        let (offset, recursive, path) = decode_cursor(cursor).ok_or_else(|| {
            StoreError::new(StoreErrorCode::Protocol, format!("malformed cursor '{cursor}'"))
        })?;
        self.page(path, recursive, offset)
    }

    fn folder_exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.resolve(path)?.is_dir())
    }

    fn create_folder(&self, path: &str) -> Result<FolderOutcome, StoreError> {
        let dir = self.resolve(path)?;
        if dir.is_dir() {
            return Ok(FolderOutcome::AlreadyExists);
        }
        match std::fs::create_dir_all(&dir) {
            Ok(()) => Ok(FolderOutcome::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && dir.is_dir() => {
                Ok(FolderOutcome::AlreadyExists)
            }
            Err(e) => Err(io_store_err(&dir, e)),
        }
    }
}
