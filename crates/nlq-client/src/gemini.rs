//! Google Gemini text generator.

use async_trait::async_trait;
use nlq_core::{GenerationError, TextGenerator};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::GeminiConfig;
use crate::error::{ClientError, Result};

/// Gemini API client.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    candidates_token_count: Option<u32>,
}

impl GenerateResponse {
    /// Text of the first candidate, its parts concatenated.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GeminiClient {
    /// Create a new Gemini client.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self
                .config
                .temperature
                .map(|temperature| GenerationConfig { temperature }),
        };

        let url = self.endpoint();
        debug!(url = %url, model = %self.config.model, "Sending generation request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Unreachable(e.to_string()))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %text, "Gemini API error");
            return Err(GenerationError::Api(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text).map_err(|e| {
            error!(error = %e, "Failed to parse Gemini response");
            GenerationError::Api(format!("unexpected response: {}", e))
        })?;

        if let Some(usage) = &parsed.usage_metadata {
            info!(
                prompt_tokens = ?usage.prompt_token_count,
                response_tokens = ?usage.candidates_token_count,
                "Gemini usage"
            );
        }

        parsed.into_text().ok_or(GenerationError::Empty)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GeminiClient {
        GeminiClient::new(GeminiConfig::new("test-key").with_base_url(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let mock_server: MockServer = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": "[{\"source\": " }, { "text": "\"S\"}]" }] }
                }],
                "usageMetadata": { "promptTokenCount": 3, "candidatesTokenCount": 5 }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let text = client(&mock_server).generate("hello").await.unwrap();
        assert_eq!(text, "[{\"source\": \"S\"}]");
    }

    #[tokio::test]
    async fn test_generation_config_sent() {
        let mock_server: MockServer = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "generationConfig": { "temperature": 0.0 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": "[]" }] } }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let generator = GeminiClient::new(
            GeminiConfig::new("k")
                .with_base_url(mock_server.uri())
                .with_temperature(0.0),
        )
        .unwrap();

        assert_eq!(generator.generate("q").await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_api_error() {
        let mock_server: MockServer = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).generate("q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Api(msg) if msg.contains("403")));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty() {
        let mock_server: MockServer = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&mock_server)
            .await;

        let err = client(&mock_server).generate("q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Empty));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let generator = GeminiClient::new(
            GeminiConfig::new("k").with_base_url("http://127.0.0.1:1"),
        )
        .unwrap();

        let err = generator.generate("q").await.unwrap_err();
        assert!(matches!(err, GenerationError::Unreachable(_)));
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            GeminiClient::new(GeminiConfig::new(" ")),
            Err(ClientError::MissingApiKey)
        ));
    }

    #[test]
    fn test_model_name() {
        let generator = GeminiClient::new(GeminiConfig::new("k").with_model("gemini-pro")).unwrap();
        assert_eq!(generator.model_name(), "gemini-pro");
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent"
        );
    }
}
