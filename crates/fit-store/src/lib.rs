//! Snapshot storage for fit
//!
//! This crate holds everything that lives inside a store file: the
//! append-only content blob, the binary codec that persists a store, and the
//! snapshot engine that tracks files and decides what each save records.

pub mod blob;
pub mod codec;
pub mod engine;
pub mod store;

// Re-export main types
pub use blob::Blob;
pub use codec::{decode_store, encode_store, DecodeLimits, FORMAT_VERSION};
pub use engine::{
    ChangeKind, EngineState, FileChange, LoadReport, SaveOutcome, SaveReport, SnapshotEngine,
    SnapshotSelector, SnapshotSummary, VerifyIssue, VerifyReport,
};
pub use store::{Store, StoreOptions};

use fit_core::error::FitError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, FitError>;
