//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml`. A missing file is not an error;
//! the defaults apply.

use std::sync::{Arc, RwLock};

use vogue_core::VogueError;
use vogue_core::config::AppConfig;

use crate::paths::VoguePaths;

/// Configuration service that loads and caches the application configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    paths: VoguePaths,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<AppConfig>>>,
}

impl ConfigService {
    pub fn new(paths: VoguePaths) -> Self {
        Self {
            paths,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<AppConfig, VogueError> {
        if let Ok(read_lock) = self.config.read()
            && let Some(cached) = read_lock.as_ref()
        {
            return Ok(cached.clone());
        }

        let loaded = self.load_config()?;

        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = Some(loaded.clone());
        }

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_config(&self) -> Result<AppConfig, VogueError> {
        let path = self.paths.config_file()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "[Config] no config file, using defaults");
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            VogueError::config(format!(
                "Failed to parse configuration file at {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "[Config] loaded configuration");
        Ok(config)
    }
}
