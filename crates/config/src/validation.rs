//! Strategy configuration validation

use crate::metadata::{ConfigField, FieldRequirement, MetadataProvider, StaticMetadata};
use crate::path::FieldPath;
use crate::route::{validate_route, RouteErrorKind, RouteValidationError};
use serde::Serialize;
use std::ops::Deref;
use strategy_forge_types::{
    is_filesystem_safe_name, is_valid_address, RouteLeg, StrategyConfig, NATIVE_TOKEN_SENTINEL,
};
use tracing::debug;

/// Machine-readable category of a validation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Document text is not JSON
    InvalidJson,
    /// A required key is absent from the document
    MissingField,
    /// Value is not a supported member of its enumeration
    UnsupportedValue,
    InvalidAddress,
    UnsafeName,
    /// A family-conditional field is absent
    RequiredField,
    /// A swap route does not connect the endpoints the strategy needs
    RouteMismatch,
    /// Declared schema version cannot be handled by this engine
    VersionMismatch,
    /// Value has the wrong JSON type
    InvalidSchema,
}

/// Field-attributed validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ConfigValidationError {
    pub kind: ValidationErrorKind,
    pub field: FieldPath,
    pub message: String,
}

impl ConfigValidationError {
    pub fn new(
        kind: ValidationErrorKind,
        field: impl Into<FieldPath>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            field: field.into(),
            message: message.into(),
        }
    }

    fn from_route(leg: RouteLeg, err: RouteValidationError) -> Self {
        let kind = match err.kind {
            RouteErrorKind::InvalidAddress => ValidationErrorKind::InvalidAddress,
            RouteErrorKind::UnexpectedEndpoint | RouteErrorKind::BrokenPath => {
                ValidationErrorKind::RouteMismatch
            }
        };

        Self {
            kind,
            field: FieldPath::new("routes")
                .child(leg.key())
                .child(err.field.as_str()),
            message: err.message,
        }
    }
}

/// A config that has passed validation
///
/// Only read access is offered. Callers wanting a different config take an
/// owned copy with [`ValidatedConfig::into_inner`] and validate it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidatedConfig(StrategyConfig);

impl ValidatedConfig {
    pub fn into_inner(self) -> StrategyConfig {
        self.0
    }
}

impl Deref for ValidatedConfig {
    type Target = StrategyConfig;

    fn deref(&self) -> &StrategyConfig {
        &self.0
    }
}

impl AsRef<StrategyConfig> for ValidatedConfig {
    fn as_ref(&self) -> &StrategyConfig {
        &self.0
    }
}

impl PartialEq<StrategyConfig> for ValidatedConfig {
    fn eq(&self, other: &StrategyConfig) -> bool {
        &self.0 == other
    }
}

type Errors = Vec<ConfigValidationError>;

/// Address fields checked for every family before family-specific rules
const BASE_ADDRESS_FIELDS: [ConfigField; 2] = [ConfigField::LpTokenAddress, ConfigField::RewardToken];

/// Runs the ordered rule set over a config
pub struct ConfigValidator<'a> {
    metadata: &'a dyn MetadataProvider,
}

impl<'a> ConfigValidator<'a> {
    #[allow(clippy::type_complexity)]
    const RULES: [(&'static str, fn(&Self, &StrategyConfig, &mut Errors)); 8] = [
        ("network", Self::check_network),
        ("strategy_family", Self::check_family),
        ("dex", Self::check_dex),
        ("name", Self::check_name),
        ("base_addresses", Self::check_base_addresses),
        ("family_requirements", Self::check_family_requirements),
        ("beefy_core", Self::check_beefy_core),
        ("routes", Self::check_routes),
    ];

    pub fn new(metadata: &'a dyn MetadataProvider) -> Self {
        Self { metadata }
    }

    /// Validate, stopping at the first failing rule
    pub fn validate(&self, config: &StrategyConfig) -> Result<(), ConfigValidationError> {
        for (name, rule) in Self::RULES {
            let mut errors = Vec::new();
            rule(self, config, &mut errors);
            if let Some(err) = errors.into_iter().next() {
                debug!(rule = name, field = %err.field, "validation rule failed");
                return Err(err);
            }
        }
        Ok(())
    }

    /// Run every rule and return all violations in rule order
    pub fn validate_all(&self, config: &StrategyConfig) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        for (_, rule) in Self::RULES {
            rule(self, config, &mut errors);
        }
        errors
    }

    /// Validate and wrap the config as read-only
    pub fn validate_into(
        &self,
        config: StrategyConfig,
    ) -> Result<ValidatedConfig, ConfigValidationError> {
        self.validate(&config)?;
        Ok(ValidatedConfig(config))
    }

    fn check_network(&self, config: &StrategyConfig, errors: &mut Errors) {
        if !self.metadata.is_supported_network(config.network) {
            errors.push(ConfigValidationError::new(
                ValidationErrorKind::UnsupportedValue,
                "network",
                format!("network '{}' is not supported", config.network),
            ));
        }
    }

    fn check_family(&self, config: &StrategyConfig, errors: &mut Errors) {
        if !self.metadata.is_supported_strategy_family(config.strategy_family) {
            errors.push(ConfigValidationError::new(
                ValidationErrorKind::UnsupportedValue,
                "strategyFamily",
                format!("strategy family '{}' is not supported", config.strategy_family),
            ));
        }
    }

    fn check_dex(&self, config: &StrategyConfig, errors: &mut Errors) {
        if !self.metadata.is_supported_dex(config.dex) {
            errors.push(ConfigValidationError::new(
                ValidationErrorKind::UnsupportedValue,
                "dex",
                format!("dex '{}' is not supported", config.dex),
            ));
        }
    }

    fn check_name(&self, config: &StrategyConfig, errors: &mut Errors) {
        if !is_filesystem_safe_name(&config.name) {
            errors.push(ConfigValidationError::new(
                ValidationErrorKind::UnsafeName,
                "name",
                format!(
                    "invalid strategy name '{}': use letters, digits, '_', '-' or spaces, without path separators",
                    config.name
                ),
            ));
        }
    }

    fn check_base_addresses(&self, config: &StrategyConfig, errors: &mut Errors) {
        for field in BASE_ADDRESS_FIELDS {
            let value = field.value(config).unwrap_or_default();
            check_address(field.key(), value, errors);
        }
    }

    fn check_family_requirements(&self, config: &StrategyConfig, errors: &mut Errors) {
        let family = config.strategy_family;

        for requirement in self.metadata.required_fields(family) {
            match *requirement {
                // Already reported by the base address rule
                FieldRequirement::Present(field) if BASE_ADDRESS_FIELDS.contains(&field) => {}
                FieldRequirement::Present(field) => match field.value(config) {
                    None => errors.push(ConfigValidationError::new(
                        ValidationErrorKind::RequiredField,
                        field.key(),
                        format!("{} is required for {family} strategies", field.key()),
                    )),
                    Some(value) => check_address(field.key(), value, errors),
                },
                FieldRequirement::OneOf(a, b) => {
                    let present: Vec<_> = [a, b]
                        .into_iter()
                        .filter_map(|field| field.value(config).map(|value| (field, value)))
                        .collect();

                    if present.is_empty() {
                        errors.push(ConfigValidationError::new(
                            ValidationErrorKind::RequiredField,
                            a.key(),
                            format!(
                                "one of {} or {} is required for {family} strategies",
                                a.key(),
                                b.key()
                            ),
                        ));
                    }

                    // Both present is accepted
                    for (field, value) in present {
                        check_address(field.key(), value, errors);
                    }
                }
            }
        }
    }

    fn check_beefy_core(&self, config: &StrategyConfig, errors: &mut Errors) {
        let base = FieldPath::new("beefyCore");
        for (key, value) in config.beefy_core.fields() {
            check_address(base.child(key), value, errors);
        }
    }

    fn check_routes(&self, config: &StrategyConfig, errors: &mut Errors) {
        for (leg, route) in config.routes.iter() {
            let expected_to = match leg {
                RouteLeg::RewardToNative => Some(NATIVE_TOKEN_SENTINEL),
                RouteLeg::RewardToLp0 | RouteLeg::RewardToLp1 => None,
            };

            if let Err(err) = validate_route(route, &config.reward_token, expected_to) {
                errors.push(ConfigValidationError::from_route(leg, err));
            }
        }
    }
}

fn check_address(field: impl Into<FieldPath>, value: &str, errors: &mut Errors) {
    if !is_valid_address(value) {
        errors.push(ConfigValidationError::new(
            ValidationErrorKind::InvalidAddress,
            field,
            format!("invalid address '{value}', expected 0x followed by 40 hex characters"),
        ));
    }
}

/// Validate against the built-in metadata, stopping at the first failure
pub fn validate_config(config: &StrategyConfig) -> Result<(), ConfigValidationError> {
    ConfigValidator::new(&StaticMetadata::default()).validate(config)
}

/// Validate against the built-in metadata, returning every failure
pub fn validate_config_all(config: &StrategyConfig) -> Vec<ConfigValidationError> {
    ConfigValidator::new(&StaticMetadata::default()).validate_all(config)
}
