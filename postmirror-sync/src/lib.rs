//! # postmirror-sync
//!
//! Mirrors a list of remote content records into a flat directory of files.
//!
//! Call [`pipeline::run`] with the fetched records and a [`StoreLayout`]; the
//! pieces ([`normalize_all`], [`LocalStoreIndex`], [`engine::plan`] /
//! [`engine::apply`], [`archive`]) are public for callers that need them
//! separately.

pub mod archive;
pub mod diff;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod local_index;
pub mod normalize;
pub mod pipeline;
pub mod writer;

pub use engine::{
    reconcile, AbandonedFile, Action, ReconciliationPlan, ReconciliationResult, StoreLayout,
};
pub use error::SyncError;
pub use local_index::LocalStoreIndex;
pub use normalize::{normalize, normalize_all, SkipReason, SkippedRecord};
pub use pipeline::RunMode;
