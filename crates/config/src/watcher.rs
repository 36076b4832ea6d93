//! Hot-reload of a strategy config file

use crate::{ConfigError, ConfigLoader, EngineSettings, Result, ValidatedConfig};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Watches one strategy config file and reloads it on change
///
/// Each reload goes through the full read, migrate and validate pipeline.
/// A successful reload swaps in a new [`ValidatedConfig`]; a failed one
/// keeps the previous config.
pub struct StrategyConfigWatcher {
    config: Arc<RwLock<ValidatedConfig>>,
    path: PathBuf,
    loader: ConfigLoader,
    poll_interval: Duration,
}

impl StrategyConfigWatcher {
    /// Load the initial config from `path`
    pub fn new(path: PathBuf, loader: ConfigLoader) -> Result<Self> {
        let config = loader.read_config_file(&path)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            path,
            loader,
            poll_interval: Duration::from_secs(2),
        })
    }

    /// Load the initial config with a loader and poll interval taken from `settings`
    pub fn from_settings(path: PathBuf, settings: &EngineSettings) -> Result<Self> {
        let watcher = Self::new(path, ConfigLoader::from_settings(settings))?;
        Ok(watcher.with_poll_interval(settings.watcher.poll_interval()))
    }

    /// Poll interval used by backends without native notification
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Snapshot of the current config
    pub fn get_config(&self) -> ValidatedConfig {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Start watching the file for changes.
    ///
    /// The returned task runs until the watcher channel closes.
    pub fn start_watching(&self) -> Result<JoinHandle<()>> {
        let config = Arc::clone(&self.config);
        let path = self.path.clone();
        let loader = self.loader.clone();

        let (tx, mut rx) = mpsc::channel(100);

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(e) = tx.blocking_send(event) {
                        error!("Failed to send file event: {}", e);
                    }
                }
                Err(e) => error!("File watch error: {}", e),
            },
            notify::Config::default().with_poll_interval(self.poll_interval),
        )
        .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        watcher
            .watch(&path, RecursiveMode::NonRecursive)
            .map_err(|e| ConfigError::WatchError(e.to_string()))?;

        info!(path = %path.display(), "watching strategy config");

        let handle = tokio::spawn(async move {
            // Dropping the watcher stops event delivery
            let _watcher = watcher;

            while let Some(event) = rx.recv().await {
                if !matches!(event.kind, EventKind::Modify(_)) {
                    continue;
                }

                debug!(path = %path.display(), "strategy config modified, reloading");

                match loader.read_config_file(&path) {
                    Ok(new_config) => match config.write() {
                        Ok(mut guard) => {
                            *guard = new_config;
                            info!(path = %path.display(), "strategy config reloaded");
                        }
                        Err(e) => {
                            error!("Failed to acquire write lock for config reload: {}", e);
                        }
                    },
                    Err(e) => {
                        warn!(
                            path = %path.display(),
                            error = %e,
                            "rejected strategy config update, keeping previous config"
                        );
                    }
                }
            }

            debug!("strategy config watcher stopped");
        });

        Ok(handle)
    }

    /// Create a watcher and start watching immediately
    pub fn watch(path: PathBuf, loader: ConfigLoader) -> Result<(Self, JoinHandle<()>)> {
        let watcher = Self::new(path, loader)?;
        let handle = watcher.start_watching()?;
        Ok((watcher, handle))
    }
}
