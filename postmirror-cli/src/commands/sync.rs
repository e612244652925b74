//! `postmirror sync` — fetch the remote records and mirror them locally.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use postmirror_sync::{
    pipeline::{self, RunMode},
    ReconciliationResult, StoreLayout,
};

use super::{fetch_records, MirrorArgs};

/// Arguments for `postmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Show what would change without writing or moving any files.
    #[arg(long)]
    pub dry_run: bool,

    /// Reconcile even when the source returned no records (archives every local file).
    #[arg(long)]
    pub allow_empty: bool,

    /// Emit a machine-readable JSON report.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct SyncReportJson<'a> {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    dry_run: bool,
    store_dir: String,
    archive_dir: String,
    #[serde(flatten)]
    result: &'a ReconciliationResult,
}

impl SyncArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let started_at = Utc::now();
        let cfg = self.mirror.resolve(config_path)?;
        let records = fetch_records(&cfg)?;

        if records.is_empty() && !self.allow_empty {
            tracing::warn!("source returned no records; skipping reconciliation");
            println!(
                "No content received from the source; nothing changed. \
                 Pass --allow-empty to archive every local file."
            );
            return Ok(());
        }

        let layout = StoreLayout::from(&cfg);
        let mode = if self.dry_run {
            RunMode::DryRun
        } else {
            RunMode::Apply
        };
        let result = pipeline::run(&records, &layout, mode)
            .with_context(|| format!("sync failed for '{}'", layout.store_dir.display()))?;

        if self.json {
            let payload = SyncReportJson {
                started_at,
                finished_at: Utc::now(),
                dry_run: self.dry_run,
                store_dir: layout.store_dir.display().to_string(),
                archive_dir: layout.archive_dir.display().to_string(),
                result: &result,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
            );
            return Ok(());
        }

        print_results(&layout, &result, self.dry_run);
        Ok(())
    }
}

fn print_results(layout: &StoreLayout, result: &ReconciliationResult, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let store = layout.store_dir.display();

    if result.is_noop() {
        println!(
            "{prefix}✓ '{store}' — nothing to do ({} unchanged)",
            result.unchanged
        );
    } else {
        println!(
            "{prefix}✓ '{store}' synced ({} created, {} updated, {} archived, {} unchanged)",
            result.created.len(),
            result.updated.len(),
            result.archived.len(),
            result.unchanged,
        );
    }

    if !result.created.is_empty() {
        println!("{}", "Created:".green().bold());
        for name in &result.created {
            println!("  +  {name}");
        }
    }
    if !result.updated.is_empty() {
        println!("{}", "Updated:".yellow().bold());
        for name in &result.updated {
            println!("  ✎  {name}");
        }
    }
    if !result.archived.is_empty() {
        println!("{}", "Archived:".magenta().bold());
        for name in &result.archived {
            println!("  →  {name}  ({})", layout.archive_dir.join(name.as_str()).display());
        }
    }
    if !result.skipped.is_empty() {
        println!("{}", "Skipped:".bright_black().bold());
        for skip in &result.skipped {
            println!("  ·  record {}: {}", skip.identifier, skip.reason);
        }
    }
    if !result.abandoned.is_empty() {
        println!("{}", "Abandoned:".red().bold());
        for file in &result.abandoned {
            println!("  !  {}: {}", file.file_name, file.reason);
        }
    }
}
