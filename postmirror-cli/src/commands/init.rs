//! `postmirror init [--source <URL|FILE>] [--store <DIR>] [--archive <DIR>] [--force]`

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;

use postmirror_core::{config, Config};

use super::MirrorArgs;

/// Write a config file for this mirror.
#[derive(Args, Debug)]
pub struct InitArgs {
    #[command(flatten)]
    pub mirror: MirrorArgs,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => config::config_path().context("could not determine config location")?,
        };
        if path.exists() && !self.force {
            bail!(
                "config already exists at {}; pass --force to overwrite",
                path.display()
            );
        }

        let cfg = self.mirror.apply_to(Config::default());
        cfg.validate()?;
        config::save_file(&path, &cfg)
            .with_context(|| format!("failed to write config '{}'", path.display()))?;

        println!("✓ Wrote config to {}", path.display());
        match &cfg.source {
            Some(source) => println!("  source:  {source}"),
            None => println!("  source:  (unset — pass --source to sync)"),
        }
        println!("  store:   {}", cfg.store_dir.display());
        println!("  archive: {}", cfg.archive_dir.display());
        Ok(())
    }
}
