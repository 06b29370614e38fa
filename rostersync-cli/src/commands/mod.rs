pub mod credentials;
pub mod diff;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use rostersync_core::{config, SyncConfig};
use rostersync_renderer::ProfileRenderer;
use rostersync_sync::ProfileStore;

use credentials::CredentialArgs;

/// Storage, configuration and template options shared by every command.
#[derive(Args, Debug)]
pub struct CommonArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Use a locally synced copy of the Dropbox tree instead of the API.
    #[arg(long, value_name = "DIR")]
    pub local_root: Option<PathBuf>,

    /// Config file (default: ~/.rostersync/config.yaml when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding a `profile.md.tera` that replaces the built-in template.
    #[arg(long, value_name = "DIR")]
    pub template_dir: Option<PathBuf>,
}

impl CommonArgs {
    pub fn load_config(&self) -> Result<SyncConfig> {
        let cfg = match &self.config {
            Some(path) => config::load_from(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => config::load().context("failed to load ~/.rostersync/config.yaml")?,
        };
        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    pub fn renderer(&self, cfg: &SyncConfig) -> Result<ProfileRenderer> {
        let renderer = ProfileRenderer::with_template_dir(self.template_dir.as_deref())
            .context("failed to load profile template")?;
        Ok(renderer.with_naming(cfg.profile_prefix.clone(), cfg.profile_extension.clone()))
    }

    /// Open the selected backend and validate its credentials.
    pub fn open_store(&self, cfg: &SyncConfig) -> Result<Box<dyn ProfileStore>> {
        if let Some(root) = &self.local_root {
            return credentials::open_local(root);
        }
        self.credentials.open_dropbox(cfg)
    }
}
