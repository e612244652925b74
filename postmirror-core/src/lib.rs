//! postmirror core library — domain types, config persistence, errors.
//!
//! - [`types`] — remote records, file names, normalized entries
//! - [`config`] — load / save / validate `~/.postmirror/config.yaml`
//! - [`error`] — [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use types::{FileName, NormalizedEntry, RecordId, RemoteRecord};
