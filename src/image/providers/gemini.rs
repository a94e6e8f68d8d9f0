//! Gemini (Google) image editing provider.

use crate::error::{parse_retry_after, sanitize_error_message, RenovizError, Result};
use crate::image::provider::{EditorKind, ImageEditor};
use crate::image::types::{
    decode_base64_lenient, EditedImage, EncodedImage, GenerationMetadata, DEFAULT_RESULT_MIME,
};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Public Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout. Image edits routinely take 10-40 seconds.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const MODEL_NOT_FOUND: &str = "Model not found. Verify the model name is correct.";

/// Gemini image model variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeminiModel {
    /// Nano Banana - Gemini 2.5 Flash Image (fast, economical).
    #[default]
    NanoBanana,
    /// Nano Banana Pro - Gemini 3 Pro Image (highest quality).
    NanoBananaPro,
}

impl GeminiModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NanoBanana => "gemini-2.5-flash-image",
            Self::NanoBananaPro => "gemini-3-pro-image-preview",
        }
    }
}

impl std::fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeminiModel {
    type Err = RenovizError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "gemini-2.5-flash-image" | "nano-banana" | "flash" => Ok(Self::NanoBanana),
            "gemini-3-pro-image-preview" | "nano-banana-pro" | "pro" => Ok(Self::NanoBananaPro),
            other => Err(RenovizError::Config(format!("unknown Gemini model: {other}"))),
        }
    }
}

/// Builder for GeminiProvider.
#[derive(Debug, Clone, Default)]
pub struct GeminiProviderBuilder {
    api_key: Option<String>,
    model: GeminiModel,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `GOOGLE_API_KEY`, then `GEMINI_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the Gemini model variant.
    pub fn model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the API endpoint (proxies, tests).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<GeminiProvider> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                RenovizError::Auth(
                    "GOOGLE_API_KEY (or GEMINI_API_KEY) not set and no API key provided".into(),
                )
            })?;

        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(GeminiProvider {
            client,
            api_key,
            model: self.model,
            base_url,
            timeout,
        })
    }
}

/// Gemini image editing provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: GeminiModel,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl GeminiProvider {
    /// Creates a new `GeminiProviderBuilder`.
    pub fn builder() -> GeminiProviderBuilder {
        GeminiProviderBuilder::new()
    }

    /// Returns the configured model.
    pub fn model(&self) -> GeminiModel {
        self.model
    }

    async fn edit_impl(
        &self,
        instruction: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<EditedImage> {
        let start = Instant::now();

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url,
            self.model.as_str(),
        );

        let body = GeminiRequest::new(instruction, image, mime_type);

        tracing::debug!(
            model = self.model.as_str(),
            image_bytes = image.len(),
            mime_type,
            "sending Gemini generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(self.parse_error(status.as_u16(), &text, &headers));
        }

        let gemini_response: GeminiResponse =
            response.json().await.map_err(|e| self.transport_error(e))?;

        let image = extract_image(gemini_response)?;

        let duration_ms = start.elapsed().as_millis() as u64;

        Ok(EditedImage {
            image,
            metadata: GenerationMetadata {
                model: Some(self.model.as_str().to_string()),
                duration_ms: Some(duration_ms),
            },
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> RenovizError {
        if err.is_timeout() {
            RenovizError::Timeout(self.timeout)
        } else if err.is_decode() {
            RenovizError::UnexpectedResponse(format!("malformed Gemini response: {err}"))
        } else {
            RenovizError::Network(err)
        }
    }

    fn parse_error(
        &self,
        status: u16,
        text: &str,
        headers: &reqwest::header::HeaderMap,
    ) -> RenovizError {
        let text = sanitize_error_message(text);
        if status == 404 {
            let message = if text.is_empty() {
                MODEL_NOT_FOUND.to_string()
            } else {
                format!("{MODEL_NOT_FOUND} {text}")
            };
            return RenovizError::InvalidRequest(message);
        }
        if status == 429 {
            let retry_after = parse_retry_after(headers).map(Duration::from_secs);
            return RenovizError::RateLimited {
                message: text,
                retry_after,
            };
        }
        if status == 401 || status == 403 {
            return RenovizError::Auth(text);
        }
        let lower = text.to_lowercase();
        if lower.contains("safety")
            || lower.contains("blocked")
            || lower.contains("prohibited")
        {
            return RenovizError::ContentBlocked(text);
        }
        RenovizError::Api {
            status,
            message: text,
        }
    }
}

/// Pulls the first inline image out of a successful response.
fn extract_image(response: GeminiResponse) -> Result<EncodedImage> {
    // Blocks on the prompt come back as HTTP 200.
    if let Some(ref feedback) = response.prompt_feedback {
        if let Some(ref reason) = feedback.block_reason {
            let msg = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| format!("Prompt blocked: {}", reason));
            return Err(RenovizError::ContentBlocked(msg));
        }
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        tracing::warn!("Gemini response contained no candidates");
        return Err(RenovizError::NoImageReturned);
    };

    if let Some(ref finish_reason) = candidate.finish_reason {
        match finish_reason.as_str() {
            "SAFETY"
            | "IMAGE_SAFETY"
            | "IMAGE_PROHIBITED_CONTENT"
            | "IMAGE_RECITATION"
            | "RECITATION"
            | "PROHIBITED_CONTENT"
            | "BLOCKLIST" => {
                return Err(RenovizError::ContentBlocked(format!(
                    "Content blocked by Gemini safety filter: {}",
                    finish_reason
                )));
            }
            _ => {} // STOP, MAX_TOKENS, NO_IMAGE etc. fall through to the part scan
        }
    }

    let inline_data = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.inline_data)
        .find(|d| !d.data.is_empty())
        .ok_or_else(|| {
            tracing::warn!(
                finish_reason = candidate.finish_reason.as_deref().unwrap_or("none"),
                "Gemini response contained no inline image data"
            );
            RenovizError::NoImageReturned
        })?;

    let data = decode_base64_lenient(&inline_data.data)
        .map_err(|e| RenovizError::Decode(e.to_string()))?;

    let mime_type = inline_data
        .mime_type
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RESULT_MIME.to_string());

    Ok(EncodedImage::new(data, mime_type))
}

#[async_trait]
impl ImageEditor for GeminiProvider {
    async fn edit(
        &self,
        instruction: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<EditedImage> {
        self.edit_impl(instruction, image, mime_type).await
    }

    fn kind(&self) -> EditorKind {
        EditorKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1beta/models/{}", self.base_url, self.model.as_str());

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        match response.status().as_u16() {
            401 | 403 => Err(RenovizError::Auth("Invalid API key".into())),
            404 => Err(RenovizError::InvalidRequest(MODEL_NOT_FOUND.into())),
            s if !(200..300).contains(&s) => Err(RenovizError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn new(instruction: &str, image: &[u8], mime_type: &str) -> Self {
        // Instruction first, then the photo it refers to.
        let parts = vec![
            GeminiRequestPart::Text {
                text: instruction.to_string(),
            },
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: mime_type.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image),
                },
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
    #[serde(default)]
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}
