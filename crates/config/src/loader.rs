//! Loading and writing strategy config documents

use crate::{
    ConfigError, ConfigValidationError, ConfigValidator, EngineSettings, FileStorage,
    FileSystemError, FsOperation, MetadataProvider, MigrationEngine, RawStorage, Result,
    FieldPath, StaticMetadata, ValidatedConfig, ValidationErrorKind, VERSION_KEY,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use strategy_forge_types::{
    Complexity, Dex, Network, ParseCodeError, RouteLeg, StrategyConfig, StrategyFamily,
    VaultMode,
};
use tracing::{debug, info};

/// Field tag for errors about the document as a whole
const DOCUMENT_FIELD: &str = "json";

/// Parses, migrates and validates strategy config documents
///
/// A loaded config is always current-schema and validated; there is no way
/// to observe an intermediate state.
#[derive(Clone)]
pub struct ConfigLoader {
    engine: Arc<MigrationEngine>,
    metadata: Arc<dyn MetadataProvider>,
    storage: Arc<dyn RawStorage>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader using the built-in migrations, built-in metadata and the local filesystem
    pub fn new() -> Self {
        Self {
            engine: MigrationEngine::builtin(),
            metadata: Arc::new(StaticMetadata::default()),
            storage: Arc::new(FileStorage),
        }
    }

    /// Loader whose supported networks, families and DEXes come from `settings`
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new().with_metadata(Arc::new(settings.support.metadata()))
    }

    pub fn with_engine(mut self, engine: Arc<MigrationEngine>) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataProvider>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn RawStorage>) -> Self {
        self.storage = storage;
        self
    }

    pub fn engine(&self) -> &MigrationEngine {
        &self.engine
    }

    pub fn validator(&self) -> ConfigValidator<'_> {
        ConfigValidator::new(self.metadata.as_ref())
    }

    /// Read, migrate and validate the config stored at `path`
    pub fn read_config_file(&self, path: &Path) -> Result<ValidatedConfig> {
        let bytes = self
            .storage
            .read(path)
            .map_err(|e| FileSystemError::new(FsOperation::Read, path, e))?;

        let document: Value = serde_json::from_slice(&bytes).map_err(invalid_json)?;
        let config = self.load_value(document)?;

        info!(path = %path.display(), name = %config.name, "strategy config loaded");
        Ok(config)
    }

    /// Parse, migrate and validate a config from JSON text
    pub fn load_json(&self, content: &str) -> Result<ValidatedConfig> {
        let document: Value = serde_json::from_str(content).map_err(invalid_json)?;
        self.load_value(document)
    }

    /// Migrate and validate an already parsed document
    pub fn load_value(&self, document: Value) -> Result<ValidatedConfig> {
        let declared = declared_version(&document)?;
        let current = self.engine.current_version();

        if declared > current {
            return Err(ConfigValidationError::new(
                ValidationErrorKind::VersionMismatch,
                VERSION_KEY,
                format!(
                    "config version {declared} is newer than the newest supported version {current}"
                ),
            )
            .into());
        }

        let migrated = self.engine.migrate_to_current(document, declared)?;
        let config = decode_config(migrated)?;
        Ok(self.validator().validate_into(config)?)
    }

    /// Migrate `document` from `from` to `to` and decode it
    pub fn migrate_config(&self, document: Value, from: u32, to: u32) -> Result<StrategyConfig> {
        let migrated = self.engine.migrate(document, from, to)?;
        Ok(decode_config(migrated)?)
    }

    /// Stamp the current version, validate and write pretty-printed JSON to `path`
    pub fn write_config_file(
        &self,
        config: &StrategyConfig,
        path: &Path,
    ) -> Result<ValidatedConfig> {
        let stamped = config.with_version(self.engine.current_version());
        let validated = self.validator().validate_into(stamped)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            self.storage
                .create_dir_all(parent)
                .map_err(|e| FileSystemError::new(FsOperation::CreateDir, parent, e))?;
        }

        let mut contents = serde_json::to_vec_pretty(&validated)?;
        contents.push(b'\n');

        self.storage
            .write(path, &contents)
            .map_err(|e| FileSystemError::new(FsOperation::Write, path, e))?;

        info!(path = %path.display(), name = %validated.name, "strategy config written");
        Ok(validated)
    }
}

fn invalid_json(err: serde_json::Error) -> ConfigError {
    ConfigValidationError::new(
        ValidationErrorKind::InvalidJson,
        DOCUMENT_FIELD,
        format!("invalid JSON: {err}"),
    )
    .into()
}

/// Read the declared `configVersion` of a raw document
fn declared_version(document: &Value) -> std::result::Result<u32, ConfigValidationError> {
    let object = document.as_object().ok_or_else(|| {
        ConfigValidationError::new(
            ValidationErrorKind::InvalidSchema,
            DOCUMENT_FIELD,
            "config document must be a JSON object",
        )
    })?;

    let version = object.get(VERSION_KEY).ok_or_else(|| {
        ConfigValidationError::new(
            ValidationErrorKind::MissingField,
            VERSION_KEY,
            "configVersion is required",
        )
    })?;

    version
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            ConfigValidationError::new(
                ValidationErrorKind::InvalidSchema,
                VERSION_KEY,
                format!("configVersion must be a non-negative integer, got {version}"),
            )
        })
}

/// Decode a current-schema document into a typed config.
///
/// Enumerated fields are checked first so an unknown or missing code is
/// reported against its own key.
fn decode_config(document: Value) -> std::result::Result<StrategyConfig, ConfigValidationError> {
    let object = document.as_object().ok_or_else(|| {
        ConfigValidationError::new(
            ValidationErrorKind::InvalidSchema,
            DOCUMENT_FIELD,
            "config document must be a JSON object",
        )
    })?;

    check_code::<Network>(object, "network", true)?;
    check_code::<StrategyFamily>(object, "strategyFamily", true)?;
    check_code::<Dex>(object, "dex", true)?;
    check_code::<VaultMode>(object, "vaultMode", true)?;
    check_code::<Complexity>(object, "complexity", false)?;
    check_document_shape(object)?;

    serde_json::from_value(document).map_err(|e| {
        debug!(error = %e, "config document does not match schema");
        ConfigValidationError::new(
            ValidationErrorKind::InvalidSchema,
            DOCUMENT_FIELD,
            format!("config document does not match schema: {e}"),
        )
    })
}

fn check_code<T>(
    object: &Map<String, Value>,
    key: &str,
    required: bool,
) -> std::result::Result<(), ConfigValidationError>
where
    T: FromStr<Err = ParseCodeError>,
{
    match object.get(key) {
        None | Some(Value::Null) if required => Err(ConfigValidationError::new(
            ValidationErrorKind::MissingField,
            key,
            format!("{key} is required"),
        )),
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(code)) => T::from_str(code).map(|_| ()).map_err(|e| {
            ConfigValidationError::new(ValidationErrorKind::UnsupportedValue, key, e.to_string())
        }),
        Some(other) => Err(ConfigValidationError::new(
            ValidationErrorKind::InvalidSchema,
            key,
            format!("{key} must be a string, got {other}"),
        )),
    }
}

/// Expected JSON type of a non-enumerated field
#[derive(Debug, Clone, Copy)]
enum Shape {
    Text,
    OptionalText,
    TextList,
    Object,
}

impl Shape {
    fn matches(self, value: &Value) -> bool {
        match self {
            Shape::Text => value.is_string(),
            Shape::OptionalText => value.is_string() || value.is_null(),
            Shape::TextList => value.is_array(),
            Shape::Object => value.is_object(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Shape::Text => "a string",
            Shape::OptionalText => "a string or null",
            Shape::TextList => "an array of strings",
            Shape::Object => "an object",
        }
    }
}

const TOP_LEVEL_SHAPES: [(&str, Shape); 7] = [
    ("name", Shape::Text),
    ("lpTokenAddress", Shape::Text),
    ("rewardToken", Shape::Text),
    ("gaugeAddress", Shape::OptionalText),
    ("stakingAddress", Shape::OptionalText),
    ("routes", Shape::Object),
    ("beefyCore", Shape::Object),
];

const ROUTE_SHAPES: [(&str, Shape); 3] = [
    ("from", Shape::Text),
    ("to", Shape::Text),
    ("path", Shape::TextList),
];

const BEEFY_CORE_SHAPES: [(&str, Shape); 4] = [
    ("keeper", Shape::Text),
    ("vaultFactory", Shape::Text),
    ("feeConfig", Shape::Text),
    ("feeRecipient", Shape::Text),
];

/// Check the JSON type of every known field so a mismatch is reported
/// against its own path instead of the whole document.
fn check_document_shape(
    object: &Map<String, Value>,
) -> std::result::Result<(), ConfigValidationError> {
    check_shapes(object, None, &TOP_LEVEL_SHAPES)?;

    if let Some(Value::Object(routes)) = object.get("routes") {
        let routes_path = FieldPath::new("routes");
        for leg in RouteLeg::ALL {
            let leg_path = routes_path.child(leg.key());
            match routes.get(leg.key()) {
                None => {}
                Some(Value::Object(route)) => {
                    check_shapes(route, Some(&leg_path), &ROUTE_SHAPES)?;
                    if let Some(Value::Array(items)) = route.get("path") {
                        let list_path = leg_path.child("path");
                        for (index, item) in items.iter().enumerate() {
                            if !item.is_string() {
                                return Err(shape_error(
                                    list_path.child(index.to_string()),
                                    Shape::Text,
                                    item,
                                ));
                            }
                        }
                    }
                }
                Some(other) => return Err(shape_error(leg_path, Shape::Object, other)),
            }
        }
    }

    if let Some(Value::Object(core)) = object.get("beefyCore") {
        check_shapes(core, Some(&FieldPath::new("beefyCore")), &BEEFY_CORE_SHAPES)?;
    }

    Ok(())
}

fn check_shapes(
    object: &Map<String, Value>,
    parent: Option<&FieldPath>,
    shapes: &[(&str, Shape)],
) -> std::result::Result<(), ConfigValidationError> {
    for &(key, shape) in shapes {
        if let Some(value) = object.get(key) {
            if !shape.matches(value) {
                let field = match parent {
                    Some(parent) => parent.child(key),
                    None => FieldPath::new(key),
                };
                return Err(shape_error(field, shape, value));
            }
        }
    }
    Ok(())
}

fn shape_error(field: FieldPath, expected: Shape, got: &Value) -> ConfigValidationError {
    let message = format!("{field} must be {}, got {got}", expected.describe());
    ConfigValidationError::new(ValidationErrorKind::InvalidSchema, field, message)
}

/// Read a config file with the default loader
pub fn read_config_file(path: &Path) -> Result<ValidatedConfig> {
    ConfigLoader::new().read_config_file(path)
}

/// Write a config file with the default loader
pub fn write_config_file(config: &StrategyConfig, path: &Path) -> Result<ValidatedConfig> {
    ConfigLoader::new().write_config_file(config, path)
}

/// Migrate a raw document with the built-in migrations
pub fn migrate_config(document: Value, from: u32, to: u32) -> Result<StrategyConfig> {
    ConfigLoader::new().migrate_config(document, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, MemoryStorage, MigrationError, MigrationRegistry};
    use serde_json::json;

    const REWARD: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const NATIVE: &str = "0xEeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE";

    fn document(version: u32) -> Value {
        json!({
            "configVersion": version,
            "name": "Velo WETH-USDC",
            "network": "optimism",
            "strategyFamily": "solidly_lp",
            "dex": "velodrome",
            "lpTokenAddress": "0x3333333333333333333333333333333333333333",
            "rewardToken": REWARD,
            "gaugeAddress": "0x4444444444444444444444444444444444444444",
            "routes": {
                "rewardToNative": { "from": REWARD, "to": NATIVE, "path": [REWARD, NATIVE] },
                "rewardToLp0": {
                    "from": REWARD,
                    "to": "0x1111111111111111111111111111111111111111",
                    "path": [REWARD, "0x1111111111111111111111111111111111111111"]
                },
                "rewardToLp1": {
                    "from": REWARD,
                    "to": "0x2222222222222222222222222222222222222222",
                    "path": [REWARD, "0x2222222222222222222222222222222222222222"]
                }
            },
            "vaultMode": "vault-and-strategy",
            "beefyCore": {
                "keeper": "0x5555555555555555555555555555555555555555",
                "vaultFactory": "0x6666666666666666666666666666666666666666",
                "feeConfig": "0x7777777777777777777777777777777777777777",
                "feeRecipient": "0x8888888888888888888888888888888888888888"
            },
            "complexity": "intermediate"
        })
    }

    fn validation_error(err: ConfigError) -> ConfigValidationError {
        match err {
            ConfigError::Validation(e) => e,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_current_document() {
        let config = ConfigLoader::new().load_value(document(1)).unwrap();
        assert_eq!(config.network, Network::Optimism);
        assert_eq!(config.vault_mode, VaultMode::VaultAndStrategy);
        assert_eq!(config.complexity, Complexity::Intermediate);
    }

    #[test]
    fn test_invalid_json_is_tagged() {
        let err = validation_error(ConfigLoader::new().load_json("{ not json").unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidJson);
        assert_eq!(err.field.to_string(), "json");
    }

    #[test]
    fn test_missing_version() {
        let mut doc = document(1);
        doc.as_object_mut().unwrap().remove("configVersion");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert_eq!(err.field.to_string(), "configVersion");

        let mut doc = document(1);
        doc["configVersion"] = json!("1");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidSchema);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = validation_error(ConfigLoader::new().load_value(document(5)).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::VersionMismatch);
        assert_eq!(err.field.to_string(), "configVersion");
    }

    #[test]
    fn test_unknown_enumeration_values_are_attributed() {
        let mut doc = document(1);
        doc["network"] = json!("polygon");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::UnsupportedValue);
        assert_eq!(err.field.to_string(), "network");

        let mut doc = document(1);
        doc.as_object_mut().unwrap().remove("dex");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::MissingField);
        assert_eq!(err.field.to_string(), "dex");

        let mut doc = document(1);
        doc["vaultMode"] = json!(2);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidSchema);
        assert_eq!(err.field.to_string(), "vaultMode");
    }

    #[test]
    fn test_wrong_json_types_are_attributed() {
        let mut doc = document(1);
        doc["gaugeAddress"] = json!(123);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidSchema);
        assert_eq!(err.field.to_string(), "gaugeAddress");

        let mut doc = document(1);
        doc["name"] = json!(7);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.field.to_string(), "name");

        let mut doc = document(1);
        doc["routes"]["rewardToLp0"]["path"] = json!(REWARD);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidSchema);
        assert_eq!(err.field.to_string(), "routes.rewardToLp0.path");

        let mut doc = document(1);
        doc["routes"]["rewardToNative"]["path"] = json!([REWARD, 5]);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.field.to_string(), "routes.rewardToNative.path.1");

        let mut doc = document(1);
        doc["beefyCore"]["keeper"] = json!(false);
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.field.to_string(), "beefyCore.keeper");
    }

    #[test]
    fn test_null_optional_address_is_absent() {
        let mut doc = document(1);
        doc["stakingAddress"] = Value::Null;
        let config = ConfigLoader::new().load_value(doc).unwrap();
        assert!(config.staking_address.is_none());
    }

    #[test]
    fn test_unknown_strategy_family_is_attributed() {
        let mut doc = document(1);
        doc["strategyFamily"] = json!("curve");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::UnsupportedValue);
        assert_eq!(err.field.to_string(), "strategyFamily");
    }

    #[test]
    fn test_missing_string_field_reported_by_validation() {
        let mut doc = document(1);
        doc.as_object_mut().unwrap().remove("lpTokenAddress");
        let err = validation_error(ConfigLoader::new().load_value(doc).unwrap_err());
        assert_eq!(err.kind, ValidationErrorKind::InvalidAddress);
        assert_eq!(err.field.to_string(), "lpTokenAddress");
    }

    #[test]
    fn test_missing_migration_step() {
        let engine = Arc::new(MigrationEngine::new(MigrationRegistry::new(), 2));
        let loader = ConfigLoader::new().with_engine(engine);
        let err = loader.load_value(document(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Migration);
        assert!(matches!(
            err,
            ConfigError::Migration(MigrationError::MissingStep { from: 1, to: 2 })
        ));
    }

    #[test]
    fn test_write_then_read_memory_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let loader = ConfigLoader::new().with_storage(storage.clone());
        let path = Path::new("out/velo.json");

        let mut config: StrategyConfig = serde_json::from_value(document(1)).unwrap();
        config.config_version = 0;

        let written = loader.write_config_file(&config, path).unwrap();
        assert_eq!(written.config_version, 1);

        let text = String::from_utf8(storage.get(path).unwrap()).unwrap();
        assert!(text.starts_with("{\n  \"configVersion\": 1"));

        let loaded = loader.read_config_file(path).unwrap();
        assert_eq!(loaded, config.with_version(1));
    }

    #[test]
    fn test_write_rejects_invalid_config() {
        let storage = Arc::new(MemoryStorage::new());
        let loader = ConfigLoader::new().with_storage(storage.clone());
        let path = Path::new("bad.json");

        let mut config: StrategyConfig = serde_json::from_value(document(1)).unwrap();
        config.name = "../../etc".to_string();

        let err = loader.write_config_file(&config, path).unwrap_err();
        assert_eq!(err.field().map(ToString::to_string).as_deref(), Some("name"));
        assert!(storage.get(path).is_none());
    }

    #[test]
    fn test_read_missing_file_is_filesystem_error() {
        let loader = ConfigLoader::new().with_storage(Arc::new(MemoryStorage::new()));
        let err = loader.read_config_file(Path::new("nope.json")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FileSystem);
    }

    #[test]
    fn test_migrate_config_from_v0() {
        let mut doc = document(0);
        let object = doc.as_object_mut().unwrap();
        let gauge = object.remove("gaugeAddress").unwrap();
        object.insert("gauge".to_string(), gauge);
        object.remove("vaultMode");

        let config = migrate_config(doc, 0, 1).unwrap();
        assert_eq!(config.config_version, 1);
        assert_eq!(
            config.gauge_address.as_deref(),
            Some("0x4444444444444444444444444444444444444444")
        );
        assert_eq!(config.vault_mode, VaultMode::StrategyOnly);
    }
}
