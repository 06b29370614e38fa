//! `rostersync sync`: reconcile the profile tree against the roster.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use rostersync_core::{ChangeRecord, ErrorRecord, RunStats};
use rostersync_sync::{run, RunReport};

use super::CommonArgs;

const SAMPLE_CHANGES: usize = 10;

/// Arguments for `rostersync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Report what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the run summary as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let cfg = self.common.load_config()?;
        let renderer = self.common.renderer(&cfg)?;
        let store = self.common.open_store(&cfg)?;

        let report = run(store.as_ref(), &cfg, &renderer, self.dry_run).context("sync failed")?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&ReportJson::from(&report))?);
        } else {
            print_summary(&report);
        }

        if !report.succeeded() {
            bail!("{} profile(s) failed", report.errors.len());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct ReportJson<'a> {
    dry_run: bool,
    started_at: String,
    finished_at: String,
    stats: &'a RunStats,
    changes: &'a [ChangeRecord],
    errors: &'a [ErrorRecord],
    artifact: Option<String>,
}

impl<'a> From<&'a RunReport> for ReportJson<'a> {
    fn from(r: &'a RunReport) -> Self {
        Self {
            dry_run: r.dry_run,
            started_at: r.started_at.to_rfc3339(),
            finished_at: r.finished_at.to_rfc3339(),
            stats: &r.stats,
            changes: &r.changes,
            errors: &r.errors,
            artifact: r.artifact.as_ref().map(|p| p.display().to_string()),
        }
    }
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

fn count_rows(stats: &RunStats) -> Vec<CountRow> {
    [
        ("Profiles found", stats.profiles_found),
        ("Profiles updated", stats.profiles_updated),
        ("Profiles created", stats.profiles_created),
        ("Profiles skipped", stats.profiles_skipped),
        ("Folders created", stats.folders_created),
        ("Fields changed", stats.fields_changed),
    ]
    .into_iter()
    .map(|(metric, count)| CountRow { metric, count })
    .collect()
}

fn print_summary(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let elapsed: chrono::Duration = report.finished_at - report.started_at;
    println!(
        "{prefix}rostersync v{} | {} ms",
        env!("CARGO_PKG_VERSION"),
        elapsed.num_milliseconds()
    );

    let mut table = Table::new(count_rows(&report.stats));
    table.with(Style::rounded());
    println!("{table}");

    if !report.changes.is_empty() {
        println!("{}", "Changes".bold());
        for change in report.changes.iter().take(SAMPLE_CHANGES) {
            println!(
                "  ✎  {} · {} → {}  ({})",
                change.employee,
                change.field,
                change.new_value,
                change.file.bright_black()
            );
        }
        if report.changes.len() > SAMPLE_CHANGES {
            println!("  … and {} more", report.changes.len() - SAMPLE_CHANGES);
        }
    }

    if !report.errors.is_empty() {
        println!("{}", "Errors".bold().red());
        for err in &report.errors {
            println!("  ✗  {}: {}", err.file, err.error.red());
        }
    }

    if let Some(path) = &report.artifact {
        println!("Run record: {}", path.display());
    }

    if report.succeeded() {
        println!("{prefix}{}", "✓ sync complete".green());
    } else {
        println!(
            "{prefix}{}",
            format!("✗ sync finished with {} error(s)", report.errors.len()).red()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_rows_cover_every_counter() {
        let stats = RunStats {
            profiles_found: 4,
            profiles_updated: 1,
            profiles_created: 2,
            profiles_skipped: 1,
            folders_created: 2,
            fields_changed: 3,
        };
        let rows = count_rows(&stats);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows.iter().map(|r| r.count).sum::<usize>(), 13);
        let table = Table::new(rows).to_string();
        assert!(table.contains("Folders created"));
    }
}
