//! Credential flags and backend construction.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_core::SyncConfig;
use rostersync_sync::{
    authenticate, DropboxClient, LocalStore, ProfileStore, RefreshCredentials, RetryPolicy,
    SyncError,
};

/// Dropbox credentials. Flags override the environment.
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// Dropbox access token.
    #[arg(long, env = "DROPBOX_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// App key used to refresh an expired access token.
    #[arg(long, env = "DROPBOX_APP_KEY", hide_env_values = true)]
    pub app_key: Option<String>,

    /// App secret used to refresh an expired access token.
    #[arg(long, env = "DROPBOX_APP_SECRET", hide_env_values = true)]
    pub app_secret: Option<String>,

    /// Long-lived refresh token.
    #[arg(long, env = "DROPBOX_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,
}

impl CredentialArgs {
    pub fn refresh(&self) -> Option<RefreshCredentials> {
        RefreshCredentials::from_parts(
            self.app_key.clone(),
            self.app_secret.clone(),
            self.refresh_token.clone(),
        )
    }

    pub fn open_dropbox(&self, cfg: &SyncConfig) -> Result<Box<dyn ProfileStore>> {
        let token = self
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(SyncError::MissingCredential)?;
        let mut client = DropboxClient::new(token).with_retry(RetryPolicy::from(cfg.retry.clone()));
        let account = authenticate(&mut client, self.refresh().as_ref())
            .context("could not authenticate with Dropbox")?;
        tracing::info!(account = %account.display_name, "using Dropbox");
        Ok(Box::new(client))
    }
}

pub fn open_local(root: &Path) -> Result<Box<dyn ProfileStore>> {
    let store = LocalStore::new(root);
    store
        .current_account()
        .with_context(|| format!("local root {} is not usable", root.display()))?;
    tracing::info!(root = %root.display(), "using local mirror");
    Ok(Box::new(store))
}
