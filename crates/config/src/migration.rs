//! Schema migrations for persisted strategy configs
//!
//! Every schema change is a single-step transform from version `n` to
//! `n + 1`. Upgrading from any historical version means composing the steps
//! in order. Downgrades are never performed.

use anyhow::Context;
use lazy_static::lazy_static;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use strategy_forge_types::CURRENT_CONFIG_VERSION;
use tracing::{debug, info, warn};

/// Key holding the schema version in a config document
pub const VERSION_KEY: &str = "configVersion";

/// A single-step transform between adjacent schema versions
pub type MigrationFn = dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("cannot downgrade config from version {from} to {to}")]
    Downgrade { from: u32, to: u32 },

    #[error("no migration registered from version {from} to {to}")]
    MissingStep { from: u32, to: u32 },

    #[error("migration from version {from} to {to} failed: {source:#}")]
    StepFailed {
        from: u32,
        to: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("migration steps must advance exactly one version, got {from} -> {to}")]
    InvalidStep { from: u32, to: u32 },

    #[error("migrated document is invalid: {reason}")]
    InvalidDocument { reason: String },
}

impl MigrationError {
    /// The `(from, to)` version pair this error is about, if any
    pub fn versions(&self) -> Option<(u32, u32)> {
        match self {
            MigrationError::Downgrade { from, to }
            | MigrationError::MissingStep { from, to }
            | MigrationError::StepFailed { from, to, .. }
            | MigrationError::InvalidStep { from, to } => Some((*from, *to)),
            MigrationError::InvalidDocument { .. } => None,
        }
    }
}

/// Set of registered single-step transforms, keyed by source version
#[derive(Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<u32, Box<MigrationFn>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the migrations shipped with this crate
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(0, Box::new(v0_to_v1));
        registry
    }

    /// Register the transform from `from` to `to`.
    ///
    /// `to` must be `from + 1`. Registering the same pair again replaces the
    /// earlier transform.
    pub fn register<F>(&mut self, from: u32, to: u32, transform: F) -> Result<(), MigrationError>
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        if from.checked_add(1) != Some(to) {
            return Err(MigrationError::InvalidStep { from, to });
        }

        self.insert(from, Box::new(transform));
        Ok(())
    }

    fn insert(&mut self, from: u32, transform: Box<MigrationFn>) {
        if self.steps.insert(from, transform).is_some() {
            warn!(from, to = from + 1, "replacing previously registered migration");
        }
    }

    /// Transform for the step starting at `from`
    pub fn get(&self, from: u32) -> Option<&MigrationFn> {
        self.steps.get(&from).map(Box::as_ref)
    }

    pub fn contains(&self, from: u32, to: u32) -> bool {
        from.checked_add(1) == Some(to) && self.steps.contains_key(&from)
    }

    /// Registered `(from, to)` pairs in ascending order
    pub fn steps(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.steps.keys().map(|from| (*from, from + 1))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.steps()).finish()
    }
}

lazy_static! {
    static ref BUILTIN_ENGINE: Arc<MigrationEngine> = Arc::new(MigrationEngine::new(
        MigrationRegistry::builtin(),
        CURRENT_CONFIG_VERSION
    ));
}

/// Walks a frozen registry to bring documents up to a target version
#[derive(Debug, Clone)]
pub struct MigrationEngine {
    registry: Arc<MigrationRegistry>,
    current_version: u32,
}

impl MigrationEngine {
    /// Freeze `registry`; no steps can be added afterwards
    pub fn new(registry: MigrationRegistry, current_version: u32) -> Self {
        Self {
            registry: Arc::new(registry),
            current_version,
        }
    }

    /// Process-wide engine with the built-in migrations, targeting
    /// [`CURRENT_CONFIG_VERSION`]
    pub fn builtin() -> Arc<MigrationEngine> {
        Arc::clone(&BUILTIN_ENGINE)
    }

    /// Newest schema version this engine produces
    pub fn current_version(&self) -> u32 {
        self.current_version
    }

    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Steps that would run to go from `from` to `to`
    pub fn path(&self, from: u32, to: u32) -> Result<Vec<(u32, u32)>, MigrationError> {
        if from > to {
            return Err(MigrationError::Downgrade { from, to });
        }

        (from..to)
            .map(|version| {
                if self.registry.contains(version, version + 1) {
                    Ok((version, version + 1))
                } else {
                    Err(MigrationError::MissingStep {
                        from: version,
                        to: version + 1,
                    })
                }
            })
            .collect()
    }

    /// Migrate `document` from `from` to `to`.
    ///
    /// Equal versions return the document untouched. Otherwise each step is
    /// applied in order and the result is stamped with `to`.
    pub fn migrate(&self, document: Value, from: u32, to: u32) -> Result<Value, MigrationError> {
        if from == to {
            return Ok(document);
        }

        if from > to {
            return Err(MigrationError::Downgrade { from, to });
        }

        let mut document = document;
        for version in from..to {
            let next = version + 1;
            let transform = self
                .registry
                .get(version)
                .ok_or(MigrationError::MissingStep { from: version, to: next })?;

            debug!(from = version, to = next, "applying config migration");
            document = transform(document).map_err(|source| MigrationError::StepFailed {
                from: version,
                to: next,
                source,
            })?;
        }

        let object = document
            .as_object_mut()
            .ok_or_else(|| MigrationError::InvalidDocument {
                reason: format!("expected a JSON object after migrating to version {to}"),
            })?;
        object.insert(VERSION_KEY.to_string(), json!(to));

        info!(from, to, "config migrated");
        Ok(document)
    }

    /// Migrate `document` to [`MigrationEngine::current_version`]
    pub fn migrate_to_current(&self, document: Value, from: u32) -> Result<Value, MigrationError> {
        self.migrate(document, from, self.current_version)
    }
}

/// Version 0 used short `gauge` / `staking` keys and had no vault mode or
/// complexity.
fn v0_to_v1(mut document: Value) -> anyhow::Result<Value> {
    let object = document
        .as_object_mut()
        .context("version 0 config must be a JSON object")?;

    for (legacy, current) in [("gauge", "gaugeAddress"), ("staking", "stakingAddress")] {
        if let Some(value) = object.remove(legacy) {
            object.entry(current).or_insert(value);
        }
    }

    object
        .entry("vaultMode")
        .or_insert_with(|| json!("strategy-only"));
    object.entry("complexity").or_insert_with(|| json!("basic"));

    Ok(document)
}
