//! Gemini API client implementation
//!
//! Implements the LlmClient trait against the Generative Language
//! `generateContent` endpoint, for both text and inline image output.

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{
    CompletionRequest, CompletionResponse, GeneratedImage, ImageRequest, LlmClient, LlmError, Message, TokenUsage,
};
use crate::config::{FALLBACK_API_KEY_ENV, LlmConfig};

/// Gemini API client
pub struct GeminiClient {
    config: LlmConfig,
    http: Client,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// The API key is not read here; each request looks it up so that a
    /// missing credential fails that request rather than construction.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(provider = %config.provider, text_model = %config.text_model, "from_config: called");
        if config.provider != "gemini" {
            return Err(LlmError::InvalidResponse(format!(
                "Unknown LLM provider: '{}'. Supported: gemini",
                config.provider
            )));
        }

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            config: config.clone(),
            http,
        })
    }

    fn api_key(&self) -> Result<String, LlmError> {
        self.config.api_key().ok_or_else(|| LlmError::MissingCredential {
            env: format!("{} or {}", self.config.api_key_env, FALLBACK_API_KEY_ENV),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        let trimmed = model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!(
            "{}/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model_path
        )
    }

    /// Build the request body for a text completion
    fn build_request_body(messages: &[Message]) -> serde_json::Value {
        debug!(message_count = %messages.len(), "build_request_body: called");
        let contents: Vec<_> = messages
            .iter()
            .map(|m| {
                serde_json::json!({
                    "role": m.role,
                    "parts": [{ "text": m.text }],
                })
            })
            .collect();

        serde_json::json!({ "contents": contents })
    }

    /// Build the request body for an image generation
    fn build_image_body(prompt: &str) -> serde_json::Value {
        debug!(prompt_len = prompt.len(), "build_image_body: called");
        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        })
    }

    async fn post(&self, model: &str, body: &serde_json::Value) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(model);
        debug!(%url, "post: called");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "post: API error");
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(response.json().await?)
    }

    /// Concatenate the first candidate's text parts
    fn parse_text(api_response: GenerateContentResponse) -> CompletionResponse {
        debug!(candidates = api_response.candidates.len(), "parse_text: called");
        let text: String = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let usage = api_response
            .usage_metadata
            .map(|u| TokenUsage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            usage,
        }
    }

    /// Decode the first inline image payload, scanning candidates in order
    fn parse_image(api_response: GenerateContentResponse) -> Result<GeneratedImage, LlmError> {
        debug!(candidates = api_response.candidates.len(), "parse_image: called");
        let inline = api_response
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|content| content.parts)
            .filter_map(|p| p.inline_data)
            .find(|d| !d.data.is_empty())
            .ok_or(LlmError::NoImagePayload)?;

        let bytes = BASE64.decode(inline.data.as_bytes())?;
        Ok(GeneratedImage {
            bytes,
            mime_type: inline.mime_type.unwrap_or_else(|| "image/png".to_string()),
        })
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %self.config.text_model, "complete: called");
        let body = Self::build_request_body(&request.messages);
        let api_response = self.post(&self.config.text_model, &body).await?;
        Ok(Self::parse_text(api_response))
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, LlmError> {
        debug!(model = %self.config.image_model, "generate_image: called");
        let body = Self::build_image_body(&request.prompt);
        let api_response = self.post(&self.config.image_model, &body).await?;
        Self::parse_image(api_response)
    }
}

// Gemini API response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn client() -> GeminiClient {
        GeminiClient::from_config(&LlmConfig::default()).unwrap()
    }

    fn response(json: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_endpoint() {
        let c = client();
        assert_eq!(
            c.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert!(c.endpoint("models/x").ends_with("/models/x:generateContent"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = LlmConfig {
            provider: "openai".into(),
            ..LlmConfig::default()
        };
        assert!(GeminiClient::from_config(&config).is_err());
    }

    #[test]
    fn test_build_request_body_keeps_turn_order() {
        let body = GeminiClient::build_request_body(&[Message::user("system"), Message::user("problem")]);
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "system");
        assert_eq!(body["contents"][1]["parts"][0]["text"], "problem");
    }

    #[test]
    fn test_parse_text_concatenates_first_candidate() {
        let parsed = GeminiClient::parse_text(response(serde_json::json!({
            "candidates": [
                { "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ],
            "usageMetadata": { "promptTokenCount": 10, "candidatesTokenCount": 4 }
        })));
        assert_eq!(parsed.content.as_deref(), Some("Hello world"));
        assert_eq!(parsed.usage.input_tokens, 10);
        assert_eq!(parsed.usage.output_tokens, 4);
    }

    #[test]
    fn test_parse_text_empty_is_none() {
        let parsed = GeminiClient::parse_text(response(serde_json::json!({ "candidates": [] })));
        assert!(parsed.content.is_none());
    }

    #[test]
    fn test_parse_image_first_payload_wins() {
        let first = BASE64.encode(b"first");
        let second = BASE64.encode(b"second");
        let image = GeminiClient::parse_image(response(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here you go" },
                { "inlineData": { "mimeType": "image/png", "data": first } },
                { "inlineData": { "mimeType": "image/png", "data": second } }
            ] } }]
        })))
        .unwrap();
        assert_eq!(image.bytes, b"first");
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn test_parse_image_accepts_snake_case() {
        let data = BASE64.encode(b"img");
        let image = GeminiClient::parse_image(response(serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "inline_data": { "mime_type": "image/jpeg", "data": data } }
            ] } }]
        })))
        .unwrap();
        assert_eq!(image.bytes, b"img");
        assert_eq!(image.extension(), "jpg");
    }

    #[test]
    fn test_parse_image_without_payload_fails() {
        let result = GeminiClient::parse_image(response(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "sorry, no image" }] } }]
        })));
        assert!(matches!(result, Err(LlmError::NoImagePayload)));
    }

    #[tokio::test]
    #[serial]
    async fn test_missing_credential_fails_request() {
        let config = LlmConfig {
            api_key_env: "BP_GEMINI_TEST_KEY".into(),
            base_url: "http://127.0.0.1:9".into(),
            ..LlmConfig::default()
        };
        unsafe {
            std::env::remove_var("BP_GEMINI_TEST_KEY");
            std::env::remove_var(FALLBACK_API_KEY_ENV);
        }
        let client = GeminiClient::from_config(&config).unwrap();
        let result = client.complete(CompletionRequest { messages: vec![] }).await;
        assert!(matches!(result, Err(LlmError::MissingCredential { .. })));
    }
}
