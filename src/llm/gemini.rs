// ABOUTME: Google Gemini LLM provider used for food photo identification and nutrition estimates
// ABOUTME: Sends multimodal generateContent requests with inline image data and JSON output mode
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Gemini Provider
//!
//! Implementation of the `LlmProvider` trait for Google's Gemini models.
//!
//! ## Configuration
//!
//! The API key comes from `GEMINI_API_KEY` through the scanner config.
//!
//! ## Supported Models
//!
//! - `gemini-2.5-flash` (default): fast multimodal model
//! - `gemini-2.0-flash`: previous fast model
//! - `gemini-1.5-flash`: balanced performance and cost
//! - `gemini-1.5-pro`: advanced reasoning capabilities

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::{
    ChatMessage, ChatRequest, ChatResponse, LlmCapabilities, LlmProvider, MessageRole, TokenUsage,
};
use crate::errors::{AppError, ErrorCode};

/// Default model to use
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Base URL for the Gemini API
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Gemini API request structure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

/// Content structure for Gemini API
#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

/// Part of content (text or inline binary data)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    /// Text content
    Text { text: String },
    /// Base64 image data
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 payload with its MIME type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Generation configuration
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    candidate_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

/// Gemini API response structure
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
    error: Option<GeminiError>,
}

/// Response candidate
#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// Usage metadata from Gemini API response
#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount")]
    prompt: Option<u32>,
    #[serde(rename = "candidatesTokenCount")]
    candidates: Option<u32>,
    #[serde(rename = "totalTokenCount")]
    total: Option<u32>,
}

/// API error response from Gemini
#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Google Gemini LLM provider
pub struct GeminiProvider {
    api_key: String,
    client: Client,
    default_model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with an API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a provider whose HTTP calls give up after `timeout`
    #[must_use]
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            api_key: api_key.into(),
            client,
            default_model: DEFAULT_MODEL.to_owned(),
        }
    }

    /// Set a custom default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Build the API URL for a model and method
    fn build_url(&self, model: &str, method: &str) -> String {
        format!("{API_BASE_URL}/models/{model}:{method}?key={}", self.api_key)
    }

    fn message_parts(message: &ChatMessage) -> Vec<ContentPart> {
        let mut parts = vec![ContentPart::Text {
            text: message.content.clone(),
        }];
        parts.extend(message.images.iter().map(|image| ContentPart::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type.clone(),
                data: image.to_base64(),
            },
        }));
        parts
    }

    /// Convert chat messages to Gemini format
    fn convert_messages(messages: &[ChatMessage]) -> (Vec<GeminiContent>, Option<GeminiContent>) {
        let mut contents = Vec::new();
        let mut system_instruction = None;

        for message in messages {
            if message.role == MessageRole::System {
                system_instruction = Some(GeminiContent {
                    role: None,
                    parts: vec![ContentPart::Text {
                        text: message.content.clone(),
                    }],
                });
            } else {
                contents.push(GeminiContent {
                    role: Some("user".to_owned()),
                    parts: Self::message_parts(message),
                });
            }
        }

        (contents, system_instruction)
    }

    /// Build a Gemini API request from a `ChatRequest`
    fn build_gemini_request(request: &ChatRequest) -> GeminiRequest {
        let (contents, system_instruction) = Self::convert_messages(&request.messages);

        let generation_config = if request.temperature.is_some() || request.json_output {
            Some(GenerationConfig {
                temperature: request.temperature,
                candidate_count: Some(1),
                response_mime_type: request.json_output.then_some("application/json"),
            })
        } else {
            None
        };

        GeminiRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }

    /// Concatenate the text parts of the first candidate
    fn extract_content(response: &GeminiResponse) -> Result<String, AppError> {
        let parts = response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default();

        let text: String = parts
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                ContentPart::InlineData { .. } => None,
            })
            .collect();

        if text.trim().is_empty() {
            return Err(AppError::new(
                ErrorCode::ExternalServiceError,
                "No content in Gemini response",
            ));
        }
        Ok(text)
    }

    /// Convert usage metadata to our token usage format
    fn convert_usage(metadata: &UsageMetadata) -> TokenUsage {
        TokenUsage {
            prompt_tokens: metadata.prompt.unwrap_or(0),
            completion_tokens: metadata.candidates.unwrap_or(0),
            total_tokens: metadata.total.unwrap_or(0),
        }
    }

    /// Turn a non-success reply into an error, preferring the API's own message
    fn status_error(status: StatusCode, body: &str) -> AppError {
        let detail = serde_json::from_str::<GeminiResponse>(body)
            .ok()
            .and_then(|reply| reply.error)
            .map_or_else(|| body.trim().to_owned(), |e| e.message);

        if status == StatusCode::TOO_MANY_REQUESTS {
            let wait = retry_delay_secs(&detail)
                .map_or_else(|| "shortly".to_owned(), |secs| format!("in {secs}s"));
            return AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("Gemini quota exhausted, retry {wait}"),
            );
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("Gemini unavailable: {detail}"),
            );
        }
        AppError::new(
            ErrorCode::ExternalServiceError,
            format!("Gemini returned {}: {detail}", status.as_u16()),
        )
    }
}

/// Whole seconds from a "retry in 6.4s" hint, rounded up
fn retry_delay_secs(detail: &str) -> Option<u64> {
    let (_, tail) = detail.split_once("retry in ")?;
    let digits: String = tail
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let secs: f64 = digits.parse().ok()?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = secs.max(0.0).ceil() as u64;
    Some(rounded)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn capabilities(&self) -> LlmCapabilities {
        LlmCapabilities::full_featured()
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model), images = request.has_images()))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request.model.as_deref().unwrap_or(&self.default_model);
        let url = self.build_url(model, "generateContent");

        let gemini_request = Self::build_gemini_request(request);

        debug!("Sending request to Gemini API");

        let response = self
            .client
            .post(&url)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| {
                AppError::external_service("Gemini", format!("HTTP request failed: {e}"))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            AppError::external_service("Gemini", format!("Failed to read response: {e}"))
        })?;

        if !status.is_success() {
            error!(status = %status, "Gemini API error");
            return Err(Self::status_error(status, &response_text));
        }

        let gemini_response: GeminiResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = %e, "Failed to parse Gemini response");
                AppError::serialization(format!("Failed to parse Gemini response: {e}"))
            })?;

        if let Some(error) = gemini_response.error {
            return Err(AppError::external_service(
                "Gemini",
                format!("Gemini API error: {}", error.message),
            ));
        }

        let content = Self::extract_content(&gemini_response)?;
        let usage = gemini_response
            .usage_metadata
            .as_ref()
            .map(Self::convert_usage);
        let finish_reason = gemini_response
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.clone());

        debug!("Successfully received Gemini response");

        Ok(ChatResponse {
            content,
            model: model.to_owned(),
            usage,
            finish_reason,
        })
    }
}

impl Debug for GeminiProvider {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("GeminiProvider")
            .field("default_model", &self.default_model)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ImageAttachment;

    #[test]
    fn test_request_carries_inline_image_and_json_mode() {
        let request = ChatRequest::new(vec![
            ChatMessage::system("You are a nutritionist"),
            ChatMessage::user("Identify this food")
                .with_image(ImageAttachment::new("image/jpeg", b"abc".to_vec())),
        ])
        .with_json_output();

        let body = serde_json::to_value(GeminiProvider::build_gemini_request(&request)).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a nutritionist"
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Identify this food");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "image/jpeg"
        );
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "YWJj");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_plain_request_has_no_generation_config() {
        let request = ChatRequest::new(vec![ChatMessage::user("hello")]);
        let body = serde_json::to_value(GeminiProvider::build_gemini_request(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_content_joins_text_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(
            GeminiProvider::extract_content(&response).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_empty_candidates_is_an_error() {
        let response: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(GeminiProvider::extract_content(&response).is_err());
    }

    #[test]
    fn test_status_errors_map_to_codes() {
        let err = GeminiProvider::status_error(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"message":"Quota exceeded. Please retry in 6.4s."}}"#,
        );
        assert_eq!(err.code, ErrorCode::ExternalRateLimited);
        assert!(err.message.contains("retry in 7s"));

        let err = GeminiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(err.message.contains("retry shortly"));

        let err = GeminiProvider::status_error(StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert_eq!(err.code, ErrorCode::ExternalServiceUnavailable);

        let err = GeminiProvider::status_error(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.code, ErrorCode::ExternalServiceError);
        assert!(err.message.contains("500: boom"));
    }

    #[test]
    fn test_retry_delay_rounds_up() {
        assert_eq!(retry_delay_secs("Please retry in 0.2s."), Some(1));
        assert_eq!(retry_delay_secs("retry in 12s"), Some(12));
        assert_eq!(retry_delay_secs("no hint here"), None);
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("secret-key");
        let debug = format!("{provider:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("REDACTED"));
    }
}
