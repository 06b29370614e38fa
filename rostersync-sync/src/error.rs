//! Error types for rostersync-sync.
//!
//! Everything in [`SyncError`] is fatal to a run. Per-document failures never
//! surface here; they are recorded in the [`RunContext`](crate::RunContext).

use std::path::PathBuf;

use thiserror::Error;

use rostersync_core::ConfigError;
use rostersync_renderer::RenderError;

use crate::store::StoreError;

/// All fatal errors that can arise from a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A storage failure during setup (roster download, tree listing).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The roster document does not exist at the configured path.
    #[error("roster source not found: {path}")]
    RosterNotFound { path: String },

    /// Credentials were rejected and could not be refreshed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// No access credential was supplied.
    #[error("access token required; set DROPBOX_ACCESS_TOKEN or pass --token")]
    MissingCredential,

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (run artifact).
    #[error("run artifact JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
