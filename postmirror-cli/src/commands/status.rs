//! `postmirror status` — per-file view of what a sync would do.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use postmirror_sync::{engine, normalize_all, Action, StoreLayout};

use super::{fetch_records, MirrorArgs};

/// Arguments for `postmirror status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize)]
struct FileStatus {
    file: String,
    status: &'static str,
    detail: String,
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    files: Vec<FileStatus>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    remote: usize,
    local: usize,
    pending: usize,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl StatusArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let cfg = self.mirror.resolve(config_path)?;
        let records = fetch_records(&cfg)?;
        let layout = StoreLayout::from(&cfg);

        let normalized = normalize_all(&records);
        let (plan, index) = engine::plan_only(&normalized.entries, &layout)
            .with_context(|| format!("cannot read store '{}'", layout.store_dir.display()))?;

        let mut rows: Vec<FileStatus> = plan
            .actions
            .iter()
            .map(|action| FileStatus {
                file: action.file_name().to_string(),
                status: action_key(action),
                detail: action_detail(action, &layout),
            })
            .collect();
        rows.extend(plan.abandoned.iter().map(|a| FileStatus {
            file: a.file_name.to_string(),
            status: "abandoned",
            detail: a.reason.clone(),
        }));
        rows.extend(normalized.skipped.iter().map(|s| FileStatus {
            file: format!("(record {})", s.identifier),
            status: "skipped",
            detail: s.reason.to_string(),
        }));

        let pending = plan.actions.iter().filter(|a| a.is_mutation()).count();
        let summary = StatusSummaryJson {
            remote: records.len(),
            local: index.len(),
            pending,
        };

        if self.json {
            let payload = StatusReportJson {
                summary,
                files: rows,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&layout, summary, rows);
        Ok(())
    }
}

fn print_table(layout: &StoreLayout, summary: StatusSummaryJson, rows: Vec<FileStatus>) {
    println!(
        "postmirror v{} | {} remote | {} local | {} pending",
        env!("CARGO_PKG_VERSION"),
        summary.remote,
        summary.local,
        summary.pending,
    );
    if rows.is_empty() {
        println!("Nothing in '{}' and nothing remote.", layout.store_dir.display());
        return;
    }

    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|row| StatusTableRow {
            file: row.file,
            status: status_label(row.status),
            detail: row.detail,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if summary.pending > 0 {
        println!("Run 'postmirror sync' to apply {} change(s).", summary.pending);
    }
}

fn action_key(action: &Action) -> &'static str {
    match action {
        Action::Create(_) => "create",
        Action::Update(_) => "update",
        Action::Unchanged(_) => "unchanged",
        Action::Archive(_) => "archive",
    }
}

fn action_detail(action: &Action, layout: &StoreLayout) -> String {
    match action {
        Action::Create(entry) => format!("new, {} bytes", entry.content.len()),
        Action::Update(entry) => format!("content changed, {} bytes", entry.content.len()),
        Action::Unchanged(_) => "up to date".to_string(),
        Action::Archive(name) => format!(
            "not in source; to {}",
            layout.archive_dir.join(name.as_str()).display()
        ),
    }
}

fn status_label(key: &str) -> String {
    match key {
        "create" => "CREATE".green().bold().to_string(),
        "update" => "UPDATE".yellow().bold().to_string(),
        "unchanged" => "CURRENT".bright_black().to_string(),
        "archive" => "ARCHIVE".magenta().bold().to_string(),
        "abandoned" => "ABANDONED".red().bold().to_string(),
        other => other.to_uppercase(),
    }
}
