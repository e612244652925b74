//! `postmirror diff` — show unified diffs for what sync would change.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use postmirror_sync::{diff::diff_plan, engine, normalize_all, StoreLayout};

use super::{fetch_records, MirrorArgs};

/// Arguments for `postmirror diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,
}

impl DiffArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let cfg = self.mirror.resolve(config_path)?;
        let records = fetch_records(&cfg)?;
        let layout = StoreLayout::from(&cfg);

        let normalized = normalize_all(&records);
        let (plan, index) = engine::plan_only(&normalized.entries, &layout)
            .with_context(|| format!("cannot read store '{}'", layout.store_dir.display()))?;
        let diffs = diff_plan(&plan, &index);

        if diffs.is_empty() {
            println!("No differences for '{}'.", layout.store_dir.display());
            return Ok(());
        }

        for diff in diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }
        Ok(())
    }
}
