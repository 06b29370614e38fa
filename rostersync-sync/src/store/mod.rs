//! Storage provider abstraction.
//!
//! Paths are provider paths: absolute, `/`-separated, e.g.
//! `/Nov25/Dev/Jane Doe/Profile Developer Jane Doe.md`.
//!
//! | Backend            | Use                                              |
//! |--------------------|--------------------------------------------------|
//! | [`DropboxClient`]  | Dropbox HTTP API, bearer credential              |
//! | [`LocalStore`]     | a locally synced mirror of the same folder tree  |
//!
//! [`DropboxClient`]: dropbox::DropboxClient
//! [`LocalStore`]: local::LocalStore

pub mod dropbox;
pub mod local;

use std::fmt;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Classified provider failure. Callers branch on the code, never on the
/// transport's own error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorCode {
    NotFound,
    Conflict,
    ExpiredCredential,
    InvalidCredential,
    RateLimited,
    Network,
    Io,
    Protocol,
}

impl StoreErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::ExpiredCredential => "expired_credential",
            Self::InvalidCredential => "invalid_credential",
            Self::RateLimited => "rate_limited",
            Self::Network => "network_error",
            Self::Io => "io_error",
            Self::Protocol => "protocol_error",
        }
    }

    /// Worth another attempt after a pause.
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimited)
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(StoreErrorCode::NotFound, format!("{path} does not exist"))
    }

    pub fn is_not_found(&self) -> bool {
        self.code == StoreErrorCode::NotFound
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// One listed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub kind: EntryKind,
    /// Last path segment.
    pub name: String,
    /// Full display path.
    pub path: String,
}

/// A page of listing results. `has_more` means `cursor` must be passed to
/// [`ProfileStore::list_folder_continue`] to get the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub entries: Vec<Entry>,
    pub cursor: String,
    pub has_more: bool,
}

/// Result of a folder creation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOutcome {
    Created,
    AlreadyExists,
}

/// Identity returned by the credential check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub email: String,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// ProfileStore
// ---------------------------------------------------------------------------

/// Operations a run needs from the storage provider.
pub trait ProfileStore {
    /// Short backend label for logs.
    fn backend(&self) -> &'static str;

    /// Account lookup used to validate credentials.
    fn current_account(&self) -> Result<Account, StoreError>;

    /// Download a document as UTF-8 text.
    fn download(&self, path: &str) -> Result<String, StoreError>;

    /// Upload a document, overwriting any existing content.
    fn upload(&self, path: &str, content: &str) -> Result<(), StoreError>;

    /// First page of a folder listing.
    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListPage, StoreError>;

    /// Next page of a listing started with [`ProfileStore::list_folder`].
    fn list_folder_continue(&self, cursor: &str) -> Result<ListPage, StoreError>;

    fn folder_exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Create a folder. An existing folder is [`FolderOutcome::AlreadyExists`],
    /// not an error.
    fn create_folder(&self, path: &str) -> Result<FolderOutcome, StoreError>;
}

/// Join provider path segments with `/`.
pub fn join_path(base: &str, child: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        child.trim_start_matches('/')
    )
}

/// Last segment of a provider path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
