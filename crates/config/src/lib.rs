//! Strategy configuration validation and migration
//!
//! This crate turns an untyped, possibly stale strategy config document into
//! a validated, current-schema [`StrategyConfig`], with support for:
//! - Field-attributed validation of addresses, names, family requirements and swap routes
//! - Chained single-step schema migrations
//! - Loading and writing JSON config files through pluggable storage
//! - Engine settings from TOML, YAML, JSON or environment variables
//! - Hot-reload of a strategy config file

mod loader;
mod metadata;
mod migration;
mod path;
mod route;
mod settings;
mod storage;
mod telemetry;
mod validation;
mod watcher;

pub use loader::*;
pub use metadata::*;
pub use migration::*;
pub use path::*;
pub use route::*;
pub use settings::*;
pub use storage::*;
pub use telemetry::*;
pub use validation::*;
pub use watcher::*;

pub use strategy_forge_types::StrategyConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config validation failed: {0}")]
    Validation(#[from] ConfigValidationError),

    #[error("config migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error(transparent)]
    FileSystem(#[from] FileSystemError),

    #[error("invalid engine settings: {0}")]
    Settings(String),

    #[error("Config library error: {0}")]
    ConfigLibError(#[from] ::config::ConfigError),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Tracing init error: {0}")]
    Telemetry(String),

    #[error("Watch error: {0}")]
    WatchError(String),
}

/// Discriminator for [`ConfigError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Migration,
    FileSystem,
    Settings,
    Telemetry,
    Watch,
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Validation(_) => ErrorKind::Validation,
            ConfigError::Migration(_) => ErrorKind::Migration,
            ConfigError::FileSystem(_) => ErrorKind::FileSystem,
            ConfigError::Settings(_)
            | ConfigError::ConfigLibError(_)
            | ConfigError::TomlError(_)
            | ConfigError::YamlError(_)
            | ConfigError::JsonError(_) => ErrorKind::Settings,
            ConfigError::Telemetry(_) => ErrorKind::Telemetry,
            ConfigError::WatchError(_) => ErrorKind::Watch,
        }
    }

    /// The validation error, if this is one
    pub fn as_validation(&self) -> Option<&ConfigValidationError> {
        match self {
            ConfigError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Field the error is attributed to, for validation errors
    pub fn field(&self) -> Option<&FieldPath> {
        self.as_validation().map(|err| &err.field)
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
