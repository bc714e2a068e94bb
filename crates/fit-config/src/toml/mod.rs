//! fit.toml configuration parsing
//!
//! Every field is optional so that a file only overrides what it names; the
//! layering in [`crate::merge`] fills the rest from lower-priority sources.

use camino::Utf8Path;
use fit_core::error::FitError;
use serde::Deserialize;
use std::ops::Range;

use crate::ConfigResult;

/// Complete fit.toml configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FitToml {
    /// Store file handling
    #[serde(default)]
    pub store: StoreSection,

    /// Logging
    #[serde(default)]
    pub log: LogSection,
}

/// `[store]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StoreSection {
    /// Suffix that `create` appends to store names
    pub extension: Option<String>,

    /// Largest blob accepted when decoding a store file
    pub max_blob_bytes: Option<u64>,

    /// Replace the store file through a temporary file and rename
    pub atomic_writes: Option<bool>,
}

/// `[log]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LogSection {
    /// Filter directive, e.g. `warn` or `fit_store=debug`
    pub level: Option<String>,
}

/// Parse TOML text into a FitToml configuration
pub fn parse_fit_toml(content: &str) -> ConfigResult<FitToml> {
    // Syntax pass first; its errors carry better positions
    content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| parse_error(content, "TOML syntax error", e.message(), e.span()))?;

    // Then the typed pass
    let config: FitToml = ::toml::from_str(content)
        .map_err(|e| parse_error(content, "Invalid configuration", e.message(), e.span()))?;

    validate_config(&config)?;

    Ok(config)
}

/// Validate the fields a file sets
pub fn validate_config(config: &FitToml) -> ConfigResult<()> {
    if let Some(extension) = &config.store.extension {
        validate_extension("store.extension", extension)?;
    }

    if let Some(max_blob_bytes) = config.store.max_blob_bytes {
        validate_max_blob_bytes("store.max_blob_bytes", max_blob_bytes)?;
    }

    if let Some(level) = &config.log.level {
        if level.trim().is_empty() {
            return Err(FitError::ConfigValidation {
                field: "log.level".to_string(),
                reason: "log level must not be empty".to_string(),
            });
        }
    }

    Ok(())
}

/// Load and parse a configuration file
pub fn load_from_file(path: &Utf8Path) -> ConfigResult<FitToml> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| FitError::io(format!("Failed to read {}", path), e))?;

    parse_fit_toml(&content).map_err(|e| match e {
        FitError::TomlParse {
            message,
            line,
            column,
        } => FitError::TomlParse {
            message: format!("in {}: {}", path, message),
            line,
            column,
        },
        FitError::ConfigValidation { field, reason } => FitError::ConfigValidation {
            field,
            reason: format!("{} (in {})", reason, path),
        },
        other => other,
    })
}

pub(crate) fn validate_extension(field: &str, extension: &str) -> ConfigResult<()> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(FitError::ConfigValidation {
            field: field.to_string(),
            reason: format!(
                "extension '{}' must be non-empty and contain only ASCII letters and digits",
                extension
            ),
        });
    }
    Ok(())
}

pub(crate) fn validate_max_blob_bytes(field: &str, value: u64) -> ConfigResult<()> {
    if value == 0 {
        return Err(FitError::ConfigValidation {
            field: field.to_string(),
            reason: "max_blob_bytes must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn parse_error(content: &str, prefix: &str, message: &str, span: Option<Range<usize>>) -> FitError {
    let (line, column) = span
        .map(|span| line_column(content, span.start))
        .unwrap_or((1, 1));
    FitError::TomlParse {
        message: format!("{}: {}", prefix, message.trim()),
        line,
        column,
    }
}

/// 1-based line and column of a byte offset
fn line_column(content: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(content.len());
    let before = &content.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}
