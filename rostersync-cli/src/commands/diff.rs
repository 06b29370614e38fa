//! `rostersync diff`: unified diffs for what `sync` would write.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use rostersync_sync::preview;

use super::CommonArgs;

/// Arguments for `rostersync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.common.load_config()?;
        let renderer = self.common.renderer(&cfg)?;
        let store = self.common.open_store(&cfg)?;

        let result = preview(store.as_ref(), &cfg, &renderer).context("diff failed")?;

        if result.is_empty() {
            println!("No differences.");
        }

        for diff in &result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        if !result.creations.is_empty() {
            println!("{}", "Would create".bold());
            for plan in &result.creations {
                println!("  +  {}", plan.document.green());
            }
        }

        for (subject, reason) in &result.skipped {
            println!("  ·  {} ({reason})", subject.bright_black());
        }

        for err in &result.errors {
            eprintln!("{} {}: {}", "error:".red(), err.file, err.error);
        }

        Ok(())
    }
}
