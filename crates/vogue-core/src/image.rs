//! Self-describing image payloads exchanged with the AI service.
//!
//! Images travel as a declared MIME type plus a base64 payload. A data-URL
//! prefix (`data:image/png;base64,...`) is never sent to the service; it is
//! stripped wherever a payload crosses that boundary.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VogueError};

/// MIME type attached to every image the service returns.
pub const GENERATED_IMAGE_MIME: &str = "image/png";

static DATA_URL_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^data:image/(?:png|jpeg|jpg|webp);base64,").expect("static regex is valid")
});

/// Inline image data: MIME type + base64-encoded bytes (no prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Encodes raw image bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self::new(mime_type, BASE64_STANDARD.encode(bytes))
    }

    /// Wraps a payload returned by the service as a PNG.
    pub fn generated(data: impl Into<String>) -> Self {
        Self::new(GENERATED_IMAGE_MIME, strip_data_url_prefix(&data.into()))
    }

    /// Decodes the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let bytes = BASE64_STANDARD.decode(self.data.trim())?;
        if bytes.is_empty() {
            return Err(VogueError::image("image payload is empty"));
        }
        Ok(bytes)
    }

    /// Approximate decoded size, without decoding.
    pub fn byte_len(&self) -> usize {
        let trimmed = self.data.trim_end_matches('=');
        trimmed.len() * 3 / 4
    }
}

/// Removes a leading `data:image/<png|jpeg|jpg|webp>;base64,` marker if present.
pub fn strip_data_url_prefix(data: &str) -> &str {
    match DATA_URL_PREFIX.find(data) {
        Some(m) => &data[m.end()..],
        None => data,
    }
}
