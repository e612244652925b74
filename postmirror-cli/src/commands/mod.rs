//! Subcommands and the option handling they share.

pub mod diff;
pub mod init;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use postmirror_core::{config, types::RemoteRecord, Config};

use crate::source;

/// Source and directory overrides accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct MirrorArgs {
    /// Remote endpoint (http/https URL) or path to a JSON file.
    #[arg(long)]
    pub source: Option<String>,

    /// Active store directory.
    #[arg(long, value_name = "DIR")]
    pub store: Option<PathBuf>,

    /// Archive directory for files no longer present remotely.
    #[arg(long, value_name = "DIR")]
    pub archive: Option<PathBuf>,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl MirrorArgs {
    /// Overlay these flags on `base`.
    pub fn apply_to(&self, mut base: Config) -> Config {
        if let Some(source) = &self.source {
            base.source = Some(source.clone());
        }
        if let Some(store) = &self.store {
            base.store_dir = store.clone();
        }
        if let Some(archive) = &self.archive {
            base.archive_dir = archive.clone();
        }
        if let Some(timeout) = self.timeout {
            base.timeout_secs = Some(timeout);
        }
        base
    }

    /// Config file (explicit path or `~/.postmirror/config.yaml`) plus flags.
    pub fn resolve(&self, config_path: Option<&Path>) -> Result<Config> {
        let base = match config_path {
            Some(path) => config::load_file(path)
                .with_context(|| format!("failed to load config '{}'", path.display()))?,
            None => config::load_or_default().context("failed to load config")?,
        };
        let cfg = self.apply_to(base);
        cfg.validate()?;
        Ok(cfg)
    }
}

/// Fetch the full record list for `cfg`.
pub fn fetch_records(cfg: &Config) -> Result<Vec<RemoteRecord>> {
    let source = cfg
        .source
        .as_deref()
        .context("no source configured; pass --source or run `postmirror init --source <URL>`")?;
    let timeout = cfg.timeout_secs.map(Duration::from_secs);
    source::fetch(source, timeout).with_context(|| format!("failed to fetch records from {source}"))
}
