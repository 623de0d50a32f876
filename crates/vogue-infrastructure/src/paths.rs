//! Unified path management for vogue configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/vogue/             # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API key
//! └── logs/                    # Application logs
//!     └── vogue.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use vogue_core::VogueError;

const APP_DIR: &str = "vogue";

/// Resolves vogue's files, optionally under an explicit base directory.
///
/// With no base the platform config directory is used (XDG on Linux,
/// `~/Library/Application Support` on macOS, `%APPDATA%` on Windows).
#[derive(Debug, Clone)]
pub struct VoguePaths {
    base: Option<PathBuf>,
}

impl VoguePaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the vogue configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf, VogueError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| VogueError::config("Cannot find home directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf, VogueError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, VogueError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, VogueError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

impl Default for VoguePaths {
    fn default() -> Self {
        Self::new(None)
    }
}
