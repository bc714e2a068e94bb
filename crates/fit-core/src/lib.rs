//! # fit-core
//!
//! Core types and utilities shared across all fit crates.
//!
//! This crate provides:
//! - A from-scratch SHA-1 digest engine with base64 text rendering
//! - FileRecord, Snapshot and TrackingSet entity types
//! - FitError enum for unified error handling
//! - Path utilities for resolving tracked files against a store directory
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `digest`: SHA-1 hashing and digest encodings
//! - `types`: Entity model (records, snapshots, tracking set)
//! - `error`: Error types and result aliases
//! - `utils`: Utility functions and helpers

pub mod digest;
pub mod error;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use digest::{Base64Digest, Sha1Digest};
pub use error::{ErrorKind, FitError, FitResult};
pub use types::{BlobRange, FileRecord, RecordPath, Snapshot, TrackingSet};
