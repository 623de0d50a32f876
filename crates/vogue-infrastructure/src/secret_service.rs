//! Secret service implementation.
//!
//! The Gemini key comes from the environment (`GEMINI_API_KEY`, then
//! `API_KEY`) or, failing that, from `secret.json` in the config directory.

use std::path::PathBuf;

use vogue_core::VogueError;
use vogue_core::config::{GeminiConfig, SecretConfig};
use vogue_core::secret::SecretService;

use crate::paths::VoguePaths;

/// Environment variables consulted for the API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Service for loading the process-wide API credential.
#[derive(Debug, Clone)]
pub struct SecretServiceImpl {
    paths: VoguePaths,
    read_env: bool,
}

impl SecretServiceImpl {
    pub fn new(paths: VoguePaths) -> Self {
        Self {
            paths,
            read_env: true,
        }
    }

    /// Ignores environment variables; only `secret.json` is read.
    pub fn file_only(paths: VoguePaths) -> Self {
        Self {
            paths,
            read_env: false,
        }
    }

    fn secret_path(&self) -> Result<PathBuf, VogueError> {
        self.paths.secret_file()
    }

    async fn load_file(&self) -> Result<SecretConfig, VogueError> {
        let path = self.secret_path()?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(SecretConfig::default());
        }

        let content = tokio::fs::read_to_string(&path).await?;
        // Only the path is reported; serde errors can quote the key itself.
        serde_json::from_str(&content).map_err(|_| {
            VogueError::security(format!(
                "Failed to parse secret file at {}",
                path.display()
            ))
        })
    }
}

/// Replaces the file-provided key with the first non-blank env var, if any.
fn overlay_env(mut config: SecretConfig, lookup: impl Fn(&str) -> Option<String>) -> SecretConfig {
    let from_env = API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(*name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty());

    if let Some(api_key) = from_env {
        let model_name = config.gemini.take().and_then(|g| g.model_name);
        config.gemini = Some(GeminiConfig {
            api_key,
            model_name,
        });
    }
    config
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> vogue_core::error::Result<SecretConfig> {
        let config = self.load_file().await?;
        if self.read_env {
            Ok(overlay_env(config, |name| std::env::var(name).ok()))
        } else {
            Ok(config)
        }
    }

    async fn secret_file_exists(&self) -> bool {
        match self.secret_path() {
            Ok(path) => tokio::fs::try_exists(path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}
