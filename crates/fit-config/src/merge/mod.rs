//! Configuration layering, fallback logic, and environment overrides
//!
//! Priority, lowest first: built-in defaults, `~/.fit/config.toml`, the
//! project `fit.toml` (or an explicit `--config` file), `FIT_*` environment
//! variables, command-line flags.

use camino::{Utf8Path, Utf8PathBuf};
use fit_core::error::FitError;
use std::collections::HashMap;

use crate::toml::{self as fit_toml, FitToml};
use crate::{ConfigResult, PROJECT_CONFIG_FILE};

/// Default store file suffix
pub const DEFAULT_EXTENSION: &str = "fit";

/// Default decode ceiling for the blob (1 GiB)
pub const DEFAULT_MAX_BLOB_BYTES: u64 = 1 << 30;

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Environment variable names
pub const ENV_EXTENSION: &str = "FIT_STORE_EXTENSION";
pub const ENV_MAX_BLOB_BYTES: &str = "FIT_MAX_BLOB_BYTES";
pub const ENV_ATOMIC_WRITES: &str = "FIT_ATOMIC_WRITES";
pub const ENV_LOG: &str = "FIT_LOG";

/// Keys accepted as command-line overrides
pub const CLI_EXTENSION: &str = "extension";
pub const CLI_LOG_LEVEL: &str = "log_level";

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitConfig {
    pub extension: String,
    pub max_blob_bytes: u64,
    pub atomic_writes: bool,
    pub log_level: String,
    /// Layers that contributed, lowest priority first
    pub sources: Vec<ConfigSource>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            max_blob_bytes: DEFAULT_MAX_BLOB_BYTES,
            atomic_writes: true,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            sources: vec![ConfigSource::Defaults],
        }
    }
}

impl FitConfig {
    /// Overlay the fields a file sets
    fn apply_file(&mut self, file: FitToml, source: ConfigSource) {
        if let Some(extension) = file.store.extension {
            self.extension = extension;
        }
        if let Some(max_blob_bytes) = file.store.max_blob_bytes {
            self.max_blob_bytes = max_blob_bytes;
        }
        if let Some(atomic_writes) = file.store.atomic_writes {
            self.atomic_writes = atomic_writes;
        }
        if let Some(level) = file.log.level {
            self.log_level = level;
        }
        self.sources.push(source);
    }
}

/// Configuration source tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Defaults,
    /// Global config file
    Global(Utf8PathBuf),
    /// Project fit.toml found from the working directory
    Project(Utf8PathBuf),
    /// File passed with --config
    Explicit(Utf8PathBuf),
    /// Environment variable
    Environment(String),
    /// CLI flag
    CommandLine,
}

/// Main configuration loading interface
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Directory holding config.toml; `None` when there is no home directory
    global_dir: Option<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that looks in `cwd` and the user's home directory
    pub fn new(cwd: Utf8PathBuf) -> Self {
        let global_dir = dirs::home_dir()
            .and_then(|home| Utf8PathBuf::try_from(home).ok())
            .map(|home| home.join(".fit"));
        Self { cwd, global_dir }
    }

    /// Use `dir` instead of `~/.fit` for the global config
    pub fn with_global_dir(mut self, dir: Option<Utf8PathBuf>) -> Self {
        self.global_dir = dir;
        self
    }

    /// Find a file by walking up from the working directory
    pub fn resolve_config_path(&self, filename: &str) -> Option<Utf8PathBuf> {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }

        None
    }

    /// Load the project fit.toml, if one is found
    pub fn load_project_config(&self) -> ConfigResult<Option<(FitToml, ConfigSource)>> {
        match self.resolve_config_path(PROJECT_CONFIG_FILE) {
            Some(path) => {
                let config = fit_toml::load_from_file(&path)?;
                Ok(Some((config, ConfigSource::Project(path))))
            },
            None => Ok(None),
        }
    }

    /// Load the global configuration, if present
    pub fn load_global_config(&self) -> ConfigResult<Option<(FitToml, ConfigSource)>> {
        let Some(dir) = &self.global_dir else {
            return Ok(None);
        };

        let path = dir.join("config.toml");
        if path.is_file() {
            let config = fit_toml::load_from_file(&path)?;
            Ok(Some((config, ConfigSource::Global(path))))
        } else {
            Ok(None)
        }
    }

    /// Load an explicitly named config file; it must exist
    pub fn load_explicit_config(&self, path: &Utf8Path) -> ConfigResult<(FitToml, ConfigSource)> {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        let config = fit_toml::load_from_file(&path)?;
        Ok((config, ConfigSource::Explicit(path)))
    }

    /// Resolve every layer into one configuration
    pub fn load(
        &self,
        explicit: Option<&Utf8Path>,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<FitConfig> {
        let global = self.load_global_config()?;
        let project = match explicit {
            Some(path) => Some(self.load_explicit_config(path)?),
            None => self.load_project_config()?,
        };

        ConfigLayering::merge_configs(global, project, env_overrides, cli_overrides)
    }
}

/// Configuration layering and merging
pub struct ConfigLayering;

impl ConfigLayering {
    /// Merge configuration layers over the defaults
    pub fn merge_configs(
        global_config: Option<(FitToml, ConfigSource)>,
        project_config: Option<(FitToml, ConfigSource)>,
        env_overrides: HashMap<String, String>,
        cli_overrides: HashMap<String, String>,
    ) -> ConfigResult<FitConfig> {
        let mut merged = FitConfig::default();

        for (file, source) in global_config.into_iter().chain(project_config) {
            merged.apply_file(file, source);
        }

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut merged, &env_overrides)?;

        // Apply CLI flag overrides (highest priority)
        Self::apply_cli_overrides(&mut merged, &cli_overrides)?;

        Self::validate(&merged)?;
        Ok(merged)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(
        config: &mut FitConfig,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        // Fixed order so errors and sources are deterministic
        for key in [ENV_EXTENSION, ENV_MAX_BLOB_BYTES, ENV_ATOMIC_WRITES, ENV_LOG] {
            let Some(value) = overrides.get(key) else {
                continue;
            };
            match key {
                ENV_EXTENSION => config.extension = value.clone(),
                ENV_MAX_BLOB_BYTES => {
                    config.max_blob_bytes =
                        value.trim().parse().map_err(|e| FitError::ConfigValidation {
                            field: key.to_string(),
                            reason: format!("'{}' is not a byte count: {}", value, e),
                        })?;
                },
                ENV_ATOMIC_WRITES => config.atomic_writes = parse_bool(key, value)?,
                _ => config.log_level = value.clone(),
            }
            config.sources.push(ConfigSource::Environment(key.to_string()));
        }

        Ok(())
    }

    /// Apply CLI flag overrides
    fn apply_cli_overrides(
        config: &mut FitConfig,
        overrides: &HashMap<String, String>,
    ) -> ConfigResult<()> {
        let mut applied = false;
        if let Some(extension) = overrides.get(CLI_EXTENSION) {
            config.extension = extension.clone();
            applied = true;
        }
        if let Some(level) = overrides.get(CLI_LOG_LEVEL) {
            config.log_level = level.clone();
            applied = true;
        }
        if applied {
            config.sources.push(ConfigSource::CommandLine);
        }

        Ok(())
    }

    fn validate(config: &FitConfig) -> ConfigResult<()> {
        fit_toml::validate_extension("extension", &config.extension)?;
        fit_toml::validate_max_blob_bytes("max_blob_bytes", config.max_blob_bytes)?;
        Ok(())
    }

    /// Collect `FIT_*` environment variable overrides
    pub fn collect_env_overrides() -> HashMap<String, String> {
        Self::collect_env_overrides_from(std::env::vars())
    }

    /// Keep only the `FIT_*` entries of `vars`
    pub fn collect_env_overrides_from<I>(vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter(|(key, _)| key.starts_with("FIT_"))
            .collect()
    }
}

fn parse_bool(field: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(FitError::ConfigValidation {
            field: field.to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}
