//! GeminiStylingGateway - Direct REST API implementation of the styling gateway.
//!
//! Each gateway operation becomes exactly one `generateContent` call. Text
//! critiques go to the text model, try-on renders go to the image model with
//! an image-only response modality.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use vogue_core::config::{AppConfig, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use vogue_core::gateway::{MATCH_FALLBACK_TEXT, STYLE_FALLBACK_TEXT, StylingGateway};
use vogue_core::image::strip_data_url_prefix;
use vogue_core::{ImagePayload, StylingError, StylingStage, VogueError};

use crate::prompts;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gateway implementation that talks to the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiStylingGateway {
    client: Client,
    api_key: String,
    text_model: String,
    image_model: String,
    base_url: String,
}

impl GeminiStylingGateway {
    /// Creates a gateway with the default models and endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Creates a gateway from application settings.
    pub fn from_config(api_key: impl Into<String>, config: &AppConfig) -> Result<Self, VogueError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| VogueError::internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Overrides the critique model after construction.
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{model}:generateContent", self.base_url)
    }

    async fn send_request(
        &self,
        model: &str,
        body: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, String> {
        tracing::debug!(model, parts = body.part_count(), "[Gemini] generateContent");

        let response = self
            .client
            .post(self.endpoint(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| format!("Gemini API request failed: {err}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|err| format!("Failed to parse Gemini response: {err}"))
    }

    async fn describe(
        &self,
        stage: StylingStage,
        images: &[&ImagePayload],
        instruction: &str,
        fallback: &str,
    ) -> Result<String, StylingError> {
        let request = GenerateContentRequest::new(images, instruction, None);
        let response = self
            .send_request(&self.text_model, &request)
            .await
            .map_err(|message| {
                tracing::error!(?stage, %message, "[Gemini] describe call failed");
                StylingError::new(stage, message)
            })?;

        Ok(extract_text(&response).unwrap_or_else(|| {
            tracing::warn!(?stage, "[Gemini] response carried no text, using fallback");
            fallback.to_string()
        }))
    }

    async fn synthesize(
        &self,
        stage: StylingStage,
        images: &[&ImagePayload],
        instruction: &str,
    ) -> Result<ImagePayload, StylingError> {
        let request =
            GenerateContentRequest::new(images, instruction, Some(vec![Modality::Image]));
        let response = self
            .send_request(&self.image_model, &request)
            .await
            .map_err(|message| {
                tracing::error!(?stage, %message, "[Gemini] synthesis call failed");
                StylingError::new(stage, message)
            })?;

        extract_image(&response).ok_or_else(|| {
            tracing::error!(?stage, "[Gemini] no image part in response");
            StylingError::new(stage, "No image generated.")
        })
    }
}

#[async_trait]
impl StylingGateway for GeminiStylingGateway {
    async fn describe_style(&self, person: &ImagePayload) -> Result<String, StylingError> {
        self.describe(
            StylingStage::Analysis,
            &[person],
            prompts::STYLE_CRITIQUE_INSTRUCTION,
            STYLE_FALLBACK_TEXT,
        )
        .await
    }

    async fn describe_match(
        &self,
        person: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<String, StylingError> {
        self.describe(
            StylingStage::MatchAnalysis,
            &[person, garment],
            prompts::MATCH_CRITIQUE_INSTRUCTION,
            MATCH_FALLBACK_TEXT,
        )
        .await
    }

    async fn synthesize_from_text(
        &self,
        person: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, StylingError> {
        let instruction = prompts::text_try_on_instruction(prompt).map_err(|e| {
            StylingError::Generation(format!("Failed to render try-on instruction: {e}"))
        })?;
        self.synthesize(StylingStage::Generation, &[person], &instruction)
            .await
    }

    async fn synthesize_from_item(
        &self,
        person: &ImagePayload,
        garment: &ImagePayload,
    ) -> Result<ImagePayload, StylingError> {
        self.synthesize(
            StylingStage::ItemGeneration,
            &[person, garment],
            prompts::ITEM_TRY_ON_INSTRUCTION,
        )
        .await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Images first, in order, then the instruction text.
    fn new(images: &[&ImagePayload], instruction: &str, modalities: Option<Vec<Modality>>) -> Self {
        let mut parts: Vec<Part> = images.iter().map(|image| Part::inline(image)).collect();
        parts.push(Part::Text {
            text: instruction.to_string(),
        });

        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: modalities.map(|response_modalities| GenerationConfig {
                response_modalities,
            }),
        }
    }

    fn part_count(&self) -> usize {
        self.contents.iter().map(|c| c.parts.len()).sum()
    }
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl Part {
    fn inline(image: &ImagePayload) -> Self {
        Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: strip_data_url_prefix(&image.data).to_string(),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<Modality>,
}

#[derive(Serialize, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
enum Modality {
    Image,
}

#[derive(Deserialize, Debug, Default)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineDataResponse>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug)]
struct InlineDataResponse {
    data: String,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn first_parts(response: &GenerateContentResponse) -> &[PartResponse] {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| content.parts.as_slice())
        .unwrap_or(&[])
}

/// Concatenates the non-thought text parts of the first candidate.
/// `None` when there is no text at all.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let text: String = first_parts(response)
        .iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// First inline image of the first candidate, re-wrapped as PNG.
fn extract_image(response: &GenerateContentResponse) -> Option<ImagePayload> {
    first_parts(response)
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty())
        .map(|inline| ImagePayload::generated(inline.data.as_str()))
}

fn map_http_error(status: StatusCode, body: String) -> String {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    format!("HTTP {}: {message}", status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_request_puts_images_before_instruction_and_strips_prefix() {
        let person = ImagePayload::new("image/jpeg", "data:image/jpeg;base64,UEVSU09O");
        let garment = ImagePayload::new("image/png", "R0FSTUVOVA==");
        let request = GenerateContentRequest::new(
            &[&person, &garment],
            "compare",
            Some(vec![Modality::Image]),
        );

        let body = serde_json::to_value(&request).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "UEVSU09O");
        assert_eq!(parts[1]["inlineData"]["data"], "R0FSTUVOVA==");
        assert_eq!(parts[2]["text"], "compare");
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["IMAGE"]));
        assert_eq!(request.part_count(), 3);
    }

    #[test]
    fn test_describe_request_has_no_generation_config() {
        let person = ImagePayload::new("image/jpeg", "UEVSU09O");
        let request = GenerateContentRequest::new(&[&person], "critique", None);
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts_and_skips_thoughts() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {"text": "## 風格\n"},
                    {"text": "Casual streetwear."}
                ]}
            }]
        }));
        assert_eq!(
            extract_text(&response).as_deref(),
            Some("## 風格\nCasual streetwear.")
        );
    }

    #[test]
    fn test_extract_text_none_for_empty_response() {
        assert!(extract_text(&parse(json!({}))).is_none());
        assert!(extract_text(&parse(json!({"candidates": [{"content": {"parts": []}}]}))).is_none());
        assert!(extract_text(&parse(json!({"candidates": [{"finishReason": "SAFETY"}]}))).is_none());
    }

    #[test]
    fn test_extract_image_takes_first_inline_part_as_png() {
        let response = parse(json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "Here you go"},
                    {"inlineData": {"mimeType": "image/jpeg", "data": "RklSU1Q="}},
                    {"inlineData": {"mimeType": "image/png", "data": "U0VDT05E"}}
                ]}
            }]
        }));
        let image = extract_image(&response).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, "RklSU1Q=");
    }

    #[test]
    fn test_extract_image_none_when_text_only() {
        let response = parse(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't do that."}]}}]
        }));
        assert!(extract_image(&response).is_none());
    }

    #[test]
    fn test_map_http_error_uses_google_envelope() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid.", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            map_http_error(StatusCode::FORBIDDEN, body.to_string()),
            "HTTP 403: PERMISSION_DENIED: API key not valid."
        );
        assert_eq!(
            map_http_error(StatusCode::BAD_GATEWAY, "upstream down".to_string()),
            "HTTP 502: upstream down"
        );
    }

    #[test]
    fn test_from_config_trims_base_url() {
        let config = AppConfig {
            base_url: "http://localhost:9/v1beta/models/".into(),
            request_timeout_secs: Some(5),
            ..AppConfig::default()
        };
        let gateway = GeminiStylingGateway::from_config("key", &config).unwrap();
        assert_eq!(
            gateway.endpoint(gateway.text_model()),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(gateway.image_model(), DEFAULT_IMAGE_MODEL);
    }

    #[tokio::test]
    async fn test_transport_failure_maps_to_stage_error() {
        // Nothing listens on port 9 (discard) on test machines.
        let gateway = GeminiStylingGateway::new("key").with_base_url("http://127.0.0.1:9");
        let person = ImagePayload::new("image/jpeg", "UEVSU09O");
        let garment = ImagePayload::new("image/jpeg", "R0FSTUVOVA==");

        let err = gateway.describe_style(&person).await.unwrap_err();
        assert_eq!(err.stage(), StylingStage::Analysis);

        let err = gateway.describe_match(&person, &garment).await.unwrap_err();
        assert_eq!(err.stage(), StylingStage::MatchAnalysis);

        let err = gateway
            .synthesize_from_text(&person, "denim jacket")
            .await
            .unwrap_err();
        assert_eq!(err.stage(), StylingStage::Generation);

        let err = gateway
            .synthesize_from_item(&person, &garment)
            .await
            .unwrap_err();
        assert_eq!(err.stage(), StylingStage::ItemGeneration);
    }

    /// Reads one HTTP request (headers plus `content-length` body).
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let content_length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serves a single canned JSON response and yields the raw request.
    async fn serve_once(status: u16, body: serde_json::Value) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let body = body.to_string();
            let response = format!(
                "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });

        (format!("http://{addr}"), handle)
    }

    fn person() -> ImagePayload {
        ImagePayload::new("image/jpeg", "UEVSU09O")
    }

    fn garment() -> ImagePayload {
        ImagePayload::new("image/png", "R0FSTUVOVA==")
    }

    #[tokio::test]
    async fn test_describe_style_empty_reply_falls_back() {
        let (base_url, server) = serve_once(200, json!({})).await;
        let gateway = GeminiStylingGateway::new("test-key").with_base_url(base_url);

        let text = gateway.describe_style(&person()).await.unwrap();
        assert_eq!(text, STYLE_FALLBACK_TEXT);

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!(
            "POST /{}:generateContent ",
            gateway.text_model()
        )));
        assert!(request.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
        assert!(!request.contains("generationConfig"));
    }

    #[tokio::test]
    async fn test_describe_match_textless_candidate_falls_back() {
        let (base_url, server) = serve_once(
            200,
            json!({"candidates": [{"content": {"parts": []}, "finishReason": "SAFETY"}]}),
        )
        .await;
        let gateway = GeminiStylingGateway::new("test-key").with_base_url(base_url);

        let text = gateway.describe_match(&person(), &garment()).await.unwrap();
        assert_eq!(text, MATCH_FALLBACK_TEXT);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_from_item_text_only_reply_is_error() {
        let (base_url, server) = serve_once(
            200,
            json!({"candidates": [{"content": {"parts": [{"text": "I can't edit this photo."}]}}]}),
        )
        .await;
        let gateway = GeminiStylingGateway::new("test-key").with_base_url(base_url);

        let err = gateway
            .synthesize_from_item(&person(), &garment())
            .await
            .unwrap_err();
        assert_eq!(err, StylingError::ItemGeneration("No image generated.".into()));

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!(
            "POST /{}:generateContent ",
            gateway.image_model()
        )));
        assert!(request.contains(r#""responseModalities":["IMAGE"]"#));
    }

    #[tokio::test]
    async fn test_synthesize_from_text_returns_png() {
        let (base_url, server) = serve_once(
            200,
            json!({"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/jpeg", "data": "TE9PSw=="}}
            ]}}]}),
        )
        .await;
        let gateway = GeminiStylingGateway::new("test-key").with_base_url(base_url);

        let image = gateway
            .synthesize_from_text(&person(), "復古丹寧外套")
            .await
            .unwrap();
        assert_eq!(image, ImagePayload::generated("TE9PSw=="));

        let request = server.await.unwrap();
        assert!(request.contains("復古丹寧外套"));
    }

    #[tokio::test]
    async fn test_error_envelope_maps_to_stage_error() {
        let (base_url, server) = serve_once(
            429,
            json!({"error": {"code": 429, "message": "Quota exceeded.", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;
        let gateway = GeminiStylingGateway::new("test-key").with_base_url(base_url);

        let err = gateway.describe_style(&person()).await.unwrap_err();
        assert_eq!(
            err,
            StylingError::Analysis("HTTP 429: RESOURCE_EXHAUSTED: Quota exceeded.".into())
        );
        server.await.unwrap();
    }
}
