use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::constants;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API rejected the credential ({status})")]
    Unauthorized { status: StatusCode },
    #[error("API request failed with status {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("malformed API response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: constants::DEFAULT_TEMPERATURE,
            top_p: constants::DEFAULT_TOP_P,
        }
    }
}

/// One generation call: a system instruction, the user's raw text, and the
/// sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub system_instruction: String,
    pub content: String,
    pub sampling: SamplingParams,
}

/// A remote text-generation backend.
///
/// `Ok(None)` means the call succeeded but produced no text.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GenerateError>;
}

// Structures matching Gemini's generateContent endpoint
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Debug)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiCandidateContent>,
}

#[derive(Deserialize, Debug)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text parts of the first candidate, or `None` if there is
    /// no text at all.
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// `GenerativeModel` backed by the Gemini REST API.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %request.model, content_len = request.content.len()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, GenerateError> {
        let api_key = self.api_key.as_deref().ok_or(GenerateError::MissingApiKey)?;
        let url = self.endpoint(&request.model);

        let payload = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: &request.system_instruction }],
            },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: &request.content }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
            },
        };

        debug!(%url, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|source| GenerateError::Transport { url: url.clone(), source })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            debug!(%status, "Gemini API rejected the credential");
            return Err(GenerateError::Unauthorized { status });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            debug!(%status, %body, "Gemini API request failed");
            return Err(GenerateError::Api { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(|source| GenerateError::Transport { url: url.clone(), source })?;
        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;

        let text = parsed.text();
        debug!(has_text = text.is_some(), "Received Gemini response");
        Ok(text)
    }
}
