//! Settings for the engine itself, loaded from files or the environment

use crate::{ConfigError, Result, StaticMetadata};
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use strategy_forge_types::{Dex, Network, StrategyFamily};

/// Default prefix for environment overrides
pub const ENV_PREFIX: &str = "STRATEGY_FORGE";

/// Engine settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Networks, families and DEXes accepted by validation
    #[serde(default)]
    pub support: SupportSettings,

    /// Hot-reload configuration
    #[serde(default)]
    pub watcher: WatcherSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportSettings {
    #[serde(default = "default_networks")]
    pub networks: Vec<Network>,

    #[serde(default = "default_families")]
    pub families: Vec<StrategyFamily>,

    #[serde(default = "default_dexes")]
    pub dexes: Vec<Dex>,
}

impl SupportSettings {
    /// Metadata table restricted to the configured members
    pub fn metadata(&self) -> StaticMetadata {
        StaticMetadata::restricted(
            self.networks.clone(),
            self.families.clone(),
            self.dexes.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatcherSettings {
    /// Poll interval for backends without native change notification
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl WatcherSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_networks() -> Vec<Network> {
    Network::ALL.to_vec()
}

fn default_families() -> Vec<StrategyFamily> {
    StrategyFamily::ALL.to_vec()
}

fn default_dexes() -> Vec<Dex> {
    Dex::ALL.to_vec()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            networks: default_networks(),
            families: default_families(),
            dexes: default_dexes(),
        }
    }
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn environment(prefix: &str) -> Environment {
    Environment::with_prefix(prefix)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("support.networks")
        .with_list_parse_key("support.families")
        .with_list_parse_key("support.dexes")
}

fn file_format(path: &Path) -> Option<FileFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Some(FileFormat::Toml),
        Some("yaml") | Some("yml") => Some(FileFormat::Yaml),
        Some("json") => Some(FileFormat::Json),
        _ => None,
    }
}

/// Loads [`EngineSettings`] from files and environment variables
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a TOML, YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<EngineSettings> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::Settings("No file extension found".to_string()))?;

        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::FileSystemError::new(crate::FsOperation::Read, path, e)
        })?;

        match extension {
            "toml" => Self::from_toml(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(ConfigError::Settings(format!(
                "Unsupported file extension: {}",
                extension
            ))),
        }
    }

    pub fn from_toml(content: &str) -> Result<EngineSettings> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_yaml(content: &str) -> Result<EngineSettings> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    pub fn from_json(content: &str) -> Result<EngineSettings> {
        serde_json::from_str(content).map_err(ConfigError::from)
    }

    /// Load settings from environment variables with the default prefix
    pub fn from_env() -> Result<EngineSettings> {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Load settings from environment variables with a custom prefix
    ///
    /// Variables take the form `PREFIX_SECTION__KEY`, for example
    /// `STRATEGY_FORGE_LOGGING__LEVEL=debug`. Support lists are comma
    /// separated: `STRATEGY_FORGE_SUPPORT__NETWORKS=optimism,base`.
    pub fn from_env_with_prefix(prefix: &str) -> Result<EngineSettings> {
        let config = Config::builder()
            .add_source(environment(prefix))
            .build()?;

        config.try_deserialize().map_err(ConfigError::from)
    }

    /// Load a settings file, then apply environment overrides on top
    pub fn from_file_with_env(path: &Path, env_prefix: &str) -> Result<EngineSettings> {
        let format = file_format(path).ok_or_else(|| {
            ConfigError::Settings(format!("Unsupported settings file: {}", path.display()))
        })?;

        Self::builder()
            .add_file_with_format(path, format, true)
            .add_env(env_prefix)
            .build()
    }

    pub fn builder() -> SettingsLoaderBuilder {
        SettingsLoaderBuilder {
            builder: Config::builder(),
        }
    }
}

/// Builder for layering several settings sources
pub struct SettingsLoaderBuilder {
    builder: ConfigBuilder<config::builder::DefaultState>,
}

impl SettingsLoaderBuilder {
    /// Add a settings file; the format follows the extension and defaults to TOML
    pub fn add_file(self, path: &Path, required: bool) -> Self {
        let format = file_format(path).unwrap_or(FileFormat::Toml);
        self.add_file_with_format(path, format, required)
    }

    fn add_file_with_format(mut self, path: &Path, format: FileFormat, required: bool) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path).format(format).required(required));
        self
    }

    pub fn add_env(mut self, prefix: &str) -> Self {
        self.builder = self.builder.add_source(environment(prefix));
        self
    }

    /// Set a default value for a dotted key
    pub fn set_default(mut self, key: &str, value: &str) -> Result<Self> {
        self.builder = self.builder.set_default(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<EngineSettings> {
        let config = self.builder.build()?;
        config.try_deserialize().map_err(ConfigError::from)
    }
}

/// Validate engine settings, reporting every problem at once
pub fn validate_settings(settings: &EngineSettings) -> Result<()> {
    let mut errors = Vec::new();

    if let Err(e) = validate_log_level(&settings.logging.level) {
        errors.push(e);
    }

    if settings.watcher.poll_interval_ms == 0 {
        errors.push("watcher.poll_interval_ms: must be greater than 0".to_string());
    }

    if settings.support.networks.is_empty() {
        errors.push("support.networks: at least one network must be enabled".to_string());
    }

    if settings.support.families.is_empty() {
        errors.push("support.families: at least one strategy family must be enabled".to_string());
    }

    if settings.support.dexes.is_empty() {
        errors.push("support.dexes: at least one dex must be enabled".to_string());
    }

    if !errors.is_empty() {
        return Err(ConfigError::Settings(errors.join("; ")));
    }

    Ok(())
}

fn validate_log_level(level: &str) -> std::result::Result<(), String> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(format!(
            "logging.level: invalid log level '{level}', must be one of: trace, debug, info, warn, error"
        )),
    }
}
