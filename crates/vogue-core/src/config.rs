use serde::{Deserialize, Serialize};

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_OUTPUT_FILE: &str = "vogue-ai-look.png";

/// Application settings read from `config.toml`.
///
/// Every field is optional in the file; missing fields take the defaults.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Model used for the outfit and match critiques.
    pub text_model: String,
    /// Model used for try-on image synthesis.
    pub image_model: String,
    pub base_url: String,
    /// Per-request timeout. Unset means the HTTP client's own behaviour.
    pub request_timeout_secs: Option<u64>,
    /// Where generated images are saved when no path is given.
    pub output_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
        }
    }
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API credentials.
#[derive(Deserialize, Serialize, Clone, Default)]
pub struct GeminiConfig {
    pub api_key: String,
    /// Overrides [`AppConfig::text_model`] when present.
    #[serde(default)]
    pub model_name: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}

impl SecretConfig {
    /// The configured Gemini key, if it is present and not blank.
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini
            .as_ref()
            .map(|g| g.api_key.trim())
            .filter(|key| !key.is_empty())
    }
}
