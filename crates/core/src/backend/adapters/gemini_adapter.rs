//! Gemini adapter implementation over the `generateContent` REST endpoint.
//!
//! SECURITY: the API key is only sent to the configured API base, as the
//! `x-goog-api-key` header, never in the URL.

use crate::backend::base::{BackendError, GenerationBackend};
use ap_protocol::config_models::GlobalConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Environment variables checked for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Gemini backend for generating stage outputs.
///
/// Construction never fails: without an API key the backend reports itself
/// unavailable and every invocation is rejected.
pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    api_base: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend.
    ///
    /// # Arguments
    ///
    /// * `api_key` - The API key, if one was found
    /// * `model` - The Gemini model to use (e.g., "gemini-2.5-flash")
    /// * `api_base` - Base URL up to and including `/models`
    pub fn new(api_key: Option<String>, model: String, api_base: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a backend from the global config and the process environment.
    pub fn from_env(config: &GlobalConfig) -> Self {
        let api_key = API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()));

        if api_key.is_none() {
            tracing::error!(
                vars = ?API_KEY_VARS,
                "API key environment variable not found; generation backend unavailable"
            );
        }

        Self::new(api_key, config.model.clone(), config.api_base.clone())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.api_base, self.model)
    }

    async fn send_request(
        &self,
        api_key: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, String> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("API error ({status}): {body}"));
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| format!("failed to parse response: {e}"))
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn invoke(&self, stage_name: &str, prompt: &str) -> Result<String, BackendError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(BackendError::NotAvailable(
                "Gemini AI client is not initialized.".to_string(),
            ));
        };

        let request = GenerateRequest::from_prompt(prompt);
        match self.send_request(api_key, &request).await {
            Ok(response) => Ok(response.text()),
            Err(cause) => {
                tracing::error!(stage = stage_name, model = %self.model, %cause, "generation failed");
                Err(BackendError::Failure(format!(
                    "The AI agent '{stage_name}' failed to generate a response. \
                     Please check your connection or API key."
                )))
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

impl GenerateRequest {
    fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text parts of the first candidate, joined by newlines.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default()
    }
}
