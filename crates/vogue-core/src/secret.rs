//! Secret management service trait.
//!
//! Defines the interface for loading the API credential used to talk to the
//! AI service.

use crate::config::SecretConfig;

/// Service for managing secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secrets are never logged or exposed in error messages
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    ///
    /// # Returns
    ///
    /// - `Ok(SecretConfig)`: Successfully loaded secrets (possibly empty)
    /// - `Err(VogueError)`: Failed to load (error message must not contain secrets)
    async fn load_secrets(&self) -> crate::error::Result<SecretConfig>;

    /// Checks if the secret file exists.
    async fn secret_file_exists(&self) -> bool;
}
