//! The boundary to the generative AI service.

use async_trait::async_trait;

use crate::error::StylingError;
use crate::image::ImagePayload;

/// Returned by [`StylingGateway::describe_style`] when the service answers
/// without any text.
pub const STYLE_FALLBACK_TEXT: &str = "無法分析圖片，請稍後再試。";

/// Returned by [`StylingGateway::describe_match`] when the service answers
/// without any text.
pub const MATCH_FALLBACK_TEXT: &str = "無法分析搭配，請稍後再試。";

/// Translates styling intents into single requests to the AI service.
///
/// Implementations hold no per-session state. Every call issues exactly one
/// request and is never retried or cached.
#[async_trait]
pub trait StylingGateway: Send + Sync {
    /// Critiques the outfit in `person`.
    ///
    /// Transport or API failures return [`StylingError::Analysis`]; a
    /// well-formed response without text yields [`STYLE_FALLBACK_TEXT`].
    async fn describe_style(&self, person: &ImagePayload) -> Result<String, StylingError>;

    /// Judges how well `garment` suits `person`, including a 1-10 score in
    /// the returned text.
    ///
    /// Failures return [`StylingError::MatchAnalysis`]; an empty response
    /// yields [`MATCH_FALLBACK_TEXT`].
    async fn describe_match(
        &self,
        person: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<String, StylingError>;

    /// Renders `person` wearing the outfit described by `prompt`.
    async fn synthesize_from_text(
        &self,
        person: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, StylingError>;

    /// Renders `person` wearing `garment`.
    async fn synthesize_from_item(
        &self,
        person: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<ImagePayload, StylingError>;
}
