//! Configuration parsing for fit
//!
//! This crate handles parsing and validation of fit.toml files and layers
//! them with the global config, environment variables and command-line
//! flags into one resolved [`FitConfig`].

pub mod merge;
pub mod toml;

// Re-export main types
pub use self::merge::{ConfigLayering, ConfigLoader, ConfigSource, FitConfig};
pub use self::toml::{FitToml, LogSection, StoreSection};

use fit_core::error::FitError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, FitError>;

/// File name of project configuration
pub const PROJECT_CONFIG_FILE: &str = "fit.toml";
