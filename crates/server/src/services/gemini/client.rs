//! Gemini `generateContent` client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::GeminiConfig;

use super::error::{ApiErrorResponse, GeminiError};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
}

impl GeminiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig) -> Result<Self, GeminiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                api_key: config.api_key.clone(),
                model: config.model.clone(),
            }),
        })
    }

    /// Send a single-turn prompt and return the model's text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response carries no text.
    #[instrument(skip(self, prompt), fields(model = %self.inner.model))]
    pub async fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .inner
            .client
            .post(format!(
                "{GEMINI_API_URL}/{}:generateContent",
                self.inner.model
            ))
            .header("x-goog-api-key", self.inner.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map_or(body, |e| e.error.message);
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<GenerateResponse>(&body)
            .map_err(|e| GeminiError::Parse(format!("Failed to parse response: {e}")))?
            .into_text()
            .ok_or(GeminiError::EmptyResponse)
    }

    /// Send a prompt and parse the answer as JSON, tolerating Markdown fences.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::Parse` if the answer is not valid JSON for `T`.
    pub async fn generate_json<T: serde::de::DeserializeOwned>(
        &self,
        prompt: &str,
    ) -> Result<T, GeminiError> {
        let text = self.generate(prompt).await?;
        parse_model_json(&text)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.inner.model)
            .finish_non_exhaustive()
    }
}

/// Remove a surrounding Markdown code fence from model output.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

pub(super) fn parse_model_json<T: serde::de::DeserializeOwned>(
    text: &str,
) -> Result<T, GeminiError> {
    serde_json::from_str(strip_code_fence(text)).map_err(|e| GeminiError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  [\"Rye\"]  "), "[\"Rye\"]");
    }

    #[test]
    fn test_parse_model_json_rejects_prose() {
        let result: Result<Vec<String>, _> = parse_model_json("Here are some ideas!");
        assert!(matches!(result, Err(GeminiError::Parse(_))));
    }

    #[test]
    fn test_response_text_joined() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "[\"Sourdough\","}, {"text": " \"Baguette\"]"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.into_text().unwrap(),
            "[\"Sourdough\", \"Baguette\"]"
        );
    }

    #[test]
    fn test_response_without_candidates() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(response.into_text().is_none());
    }

    #[test]
    fn test_request_shape() {
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }
}
