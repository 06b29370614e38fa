//! # rostersync-sync
//!
//! Storage access and the reconciliation run.
//!
//! Call [`coordinator::run`] with any [`ProfileStore`] to reconcile the profile
//! tree against the roster, or [`diff::preview`] for a read-only unified diff of
//! what a run would change. [`auth::authenticate`] validates (and if needed
//! refreshes) provider credentials before either.

pub mod artifact;
pub mod auth;
pub mod context;
pub mod coordinator;
pub mod diff;
pub mod error;
pub mod locator;
pub mod provisioner;
pub mod reconciler;
pub mod retry;
pub mod store;

pub use artifact::RunArtifact;
pub use auth::{authenticate, AuthState, Reauthenticate, RefreshCredentials, TokenExchange};
pub use context::RunContext;
pub use coordinator::{run, RunReport};
pub use diff::{preview, Preview, ProfileDiff};
pub use error::SyncError;
pub use retry::RetryPolicy;
pub use store::{
    dropbox::DropboxClient, local::LocalStore, Account, Entry, EntryKind, FolderOutcome,
    ListPage, ProfileStore, StoreError, StoreErrorCode,
};
