//! Error types for the Vogue application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the ambient parts of Vogue (config, files, images).
///
/// Failures of the AI service itself are reported through [`StylingError`],
/// which the workflow treats separately from these.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VogueError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Security/authentication error (missing or unreadable credentials)
    #[error("Security error: {0}")]
    Security(String),

    /// Image payload could not be read, decoded or written
    #[error("Image error: {0}")]
    Image(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VogueError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Security error
    pub fn security(message: impl Into<String>) -> Self {
        Self::Security(message.into())
    }

    /// Creates an Image error
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<std::io::Error> for VogueError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for VogueError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VogueError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for VogueError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Image(format!("invalid base64 payload: {err}"))
    }
}

/// A type alias for `Result<T, VogueError>`.
pub type Result<T> = std::result::Result<T, VogueError>;

/// Which gateway operation a [`StylingError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StylingStage {
    Analysis,
    MatchAnalysis,
    Generation,
    ItemGeneration,
}

/// Failure of a single call to the generative AI service.
///
/// Transport failures, non-success HTTP statuses and image responses without
/// an image part all end up here. A well-formed response that merely lacks
/// text is *not* an error for the describe operations; those fall back to a
/// canned message instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StylingError {
    /// The initial outfit critique failed.
    #[error("Fashion analysis failed: {0}")]
    Analysis(String),

    /// The garment compatibility analysis failed.
    #[error("Match analysis failed: {0}")]
    MatchAnalysis(String),

    /// Text-described try-on synthesis failed.
    #[error("Virtual try-on failed: {0}")]
    Generation(String),

    /// Garment-based try-on synthesis failed.
    #[error("Virtual try-on with item failed: {0}")]
    ItemGeneration(String),
}

impl StylingError {
    pub fn new(stage: StylingStage, message: impl Into<String>) -> Self {
        let message = message.into();
        match stage {
            StylingStage::Analysis => Self::Analysis(message),
            StylingStage::MatchAnalysis => Self::MatchAnalysis(message),
            StylingStage::Generation => Self::Generation(message),
            StylingStage::ItemGeneration => Self::ItemGeneration(message),
        }
    }

    pub fn stage(&self) -> StylingStage {
        match self {
            Self::Analysis(_) => StylingStage::Analysis,
            Self::MatchAnalysis(_) => StylingStage::MatchAnalysis,
            Self::Generation(_) => StylingStage::Generation,
            Self::ItemGeneration(_) => StylingStage::ItemGeneration,
        }
    }

    /// The diagnostic message without the stage prefix.
    pub fn detail(&self) -> &str {
        match self {
            Self::Analysis(m)
            | Self::MatchAnalysis(m)
            | Self::Generation(m)
            | Self::ItemGeneration(m) => m,
        }
    }
}
