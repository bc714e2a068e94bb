//! Path utilities for resolving tracked files.
//!
//! Tracked paths are stored relative to the directory that holds the store
//! file; these helpers keep them from escaping it.

use crate::error::{FitError, FitResult};
use crate::types::RecordPath;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

/// Normalize a path by resolving . and .. components
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => {
                // Leading `..` stays so the caller can see the escape
                match components.last() {
                    Some(Utf8Component::Normal(_)) => {
                        components.pop();
                    },
                    _ => components.push(component),
                }
            },
            other => components.push(other),
        }
    }

    components.iter().map(|c| c.as_str()).collect()
}

/// Check if a path is safe (relative, no directory traversal)
pub fn is_safe_path(path: &Utf8Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Utf8Component::CurDir => {},
            Utf8Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Utf8Component::Normal(_) => {
                depth += 1;
            },
            _ => return false,
        }
    }

    true
}

/// Safely join paths, preventing directory traversal
pub fn safe_join(base: &Utf8Path, path: &Utf8Path) -> FitResult<Utf8PathBuf> {
    if !is_safe_path(path) {
        return Err(FitError::invalid_path(
            path.as_str(),
            "path must be relative and stay inside the store directory",
        ));
    }

    let normalized = normalize_path(path);
    if normalized.as_str().is_empty() {
        return Err(FitError::invalid_path(path.as_str(), "path must name a file"));
    }

    Ok(base.join(normalized))
}

/// Resolve a record path against the store directory
pub fn resolve_record_path(root: &Utf8Path, path: &RecordPath) -> FitResult<Utf8PathBuf> {
    safe_join(root, Utf8Path::new(path.as_str()))
}

/// Directory that tracked paths are relative to: the parent of the store file
pub fn store_root(store_path: &Utf8Path) -> Utf8PathBuf {
    match store_path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_path_buf(),
        _ => Utf8PathBuf::from("."),
    }
}

/// Append the store extension to a store name.
///
/// The suffix is always added, so `notes.fit` becomes `notes.fit.fit`.
pub fn with_store_extension(name: &Utf8Path, extension: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.{}", name, extension))
}
