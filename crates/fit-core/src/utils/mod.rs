//! Utility functions and helpers.
//!
//! Common functionality used across multiple fit crates.

pub mod path;

// Re-export commonly used utilities
pub use path::{is_safe_path, normalize_path, resolve_record_path, safe_join, store_root, with_store_extension};
