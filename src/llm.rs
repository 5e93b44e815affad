//! Generative-language integration.
//!
//! This module talks to the Gemini `generateContent` endpoint. Everything above it
//! goes through the [`TextModel`] trait so planners and the chat assistant can be
//! exercised without a network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Settings;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// A single-shot text completion: one prompt in, one text out. No retry, no streaming.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// ---------------------------------------------------------------------------
/// Gemini API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
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
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// ---------------------------------------------------------------------------
/// Gemini Client
/// ---------------------------------------------------------------------------

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        let api_key = settings.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| LlmError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error_resp) = serde_json::from_str::<ErrorResponse>(&body) {
                return Err(LlmError::Api(error_resp.error.message));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::Parse("No text content in response".to_string()));
        }

        Ok(text)
    }
}

/// Stand-in used when no API key is configured; every call fails so callers
/// take their fallback path.
pub struct Unconfigured;

#[async_trait]
impl TextModel for Unconfigured {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::MissingApiKey)
    }
}

/// Builds the model the app runs against, degrading to [`Unconfigured`].
pub fn model_from_settings(settings: &Settings) -> Arc<dyn TextModel> {
    match GeminiClient::new(settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::warn!(error = %e, "model client unavailable, plans will use the fallback");
            Arc::new(Unconfigured)
        }
    }
}

/// Pulls the JSON object out of a model reply (handles markdown code fences).
///
/// Fences are stripped first, then the outermost `{ ... }` span is returned.
pub fn extract_json(text: &str) -> Result<String, LlmError> {
    let cleaned = text.trim().replace("```json", "").replace("```", "");

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if start < end => Ok(cleaned[start..=end].to_string()),
        _ => Err(LlmError::Parse(
            "Could not extract JSON from response".to_string(),
        )),
    }
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings(base: &str) -> Settings {
        Settings {
            api_key: Some("test-key".into()),
            model: "gemini-test".into(),
            api_base: base.into(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_extract_json_direct() {
        let input = r#"{"name": "test", "days": []}"#;
        let result = extract_json(input).unwrap();
        assert!(result.contains("name"));
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = r#"Here's the plan:

```json
{"name": "Good plan", "days": []}
```

Hope that helps!"#;
        let result = extract_json(input).unwrap();
        assert!(result.starts_with('{'));
        assert!(result.contains("Good plan"));
    }

    #[test]
    fn test_extract_json_missing() {
        assert!(matches!(extract_json("no json here"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn missing_key_is_reported() {
        let mut s = settings("http://localhost");
        s.api_key = None;
        assert!(matches!(GeminiClient::new(&s), Err(LlmError::MissingApiKey)));
    }

    #[tokio::test]
    async fn completes_against_generate_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_query(mockito::Matcher::UrlEncoded("key".into(), "test-key".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"Hello "},{"text":"athlete"}]}}]}"#,
            )
            .create_async()
            .await;

        let client = GeminiClient::new(&settings(&server.url())).unwrap();
        let text = client.complete("hi").await.unwrap();

        assert_eq!(text, "Hello athlete");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn surfaces_api_error_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&settings(&server.url())).unwrap();
        let err = client.complete("hi").await.unwrap_err();
        assert_eq!(err, LlmError::Api("API key not valid".into()));
    }

    #[tokio::test]
    async fn empty_candidates_is_a_parse_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/gemini-test:generateContent")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"candidates":[]}"#)
            .create_async()
            .await;

        let client = GeminiClient::new(&settings(&server.url())).unwrap();
        assert!(matches!(client.complete("hi").await, Err(LlmError::Parse(_))));
    }
}
