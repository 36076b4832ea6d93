//! Strategy configuration validation and migration engine
//!
//! Takes an untyped, possibly stale JSON document describing a yield
//! strategy and produces a validated, current-schema configuration, or
//! rejects it with a field-attributed error.

pub use strategy_forge_config as config;
pub use strategy_forge_types as types;

pub use strategy_forge_config::{
    migrate_config, read_config_file, validate_config, write_config_file, ConfigError,
    ConfigLoader, ConfigValidationError, ConfigValidator, EngineSettings, MigrationEngine,
    MigrationError, MigrationRegistry, Result, ValidatedConfig,
};
pub use strategy_forge_types::{StrategyConfig, SwapRoute, CURRENT_CONFIG_VERSION};

use strategy_forge_config::{init_tracing, validate_settings};
use tracing::info;

/// Validate `settings`, install the tracing subscriber and return a loader
/// restricted to the configured networks, families and DEXes.
///
/// Call once at startup, before any config is loaded.
pub fn bootstrap(settings: &EngineSettings) -> Result<ConfigLoader> {
    validate_settings(settings)?;
    init_tracing(&settings.logging)?;

    let loader = ConfigLoader::from_settings(settings);
    info!(
        current_version = loader.engine().current_version(),
        networks = settings.support.networks.len(),
        "strategy config engine ready"
    );
    Ok(loader)
}
