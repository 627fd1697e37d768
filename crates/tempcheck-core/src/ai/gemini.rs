use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GenerationClient, NO_OUTPUT};
use crate::config::Config;
use crate::credential::Credential;
use crate::error::GenerationError;
use crate::temperature::Temperature;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

/// Sampling settings. `topK` is never sent so the only truncation is the
/// temperature itself; `topP` stays at 1.0.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

impl GeminiResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Build from settings. Without `request_timeout_secs` the transport
    /// default applies.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        prompt: &str,
        temperature: Temperature,
        credential: &Credential,
    ) -> Result<String, GenerationError> {
        if credential.is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let preview: String = prompt.chars().take(30).collect();
        debug!(
            model = %self.model,
            %temperature,
            prompt = %preview,
            "requesting generation"
        );

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: temperature.value(),
                top_p: 1.0,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", credential.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::upstream(format!("Gemini request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<GeminiErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);
            return Err(GenerationError::upstream(format!(
                "Gemini API error {status}: {detail}"
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::upstream(format!("Gemini returned an unreadable response: {e}"))
        })?;

        Ok(gemini_response
            .into_text()
            .unwrap_or_else(|| NO_OUTPUT.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const PATH: &str = "/models/gemini-2.5-flash:generateContent";

    fn client_for(server: &Server) -> GeminiClient {
        GeminiClient::new(&server.url(), DEFAULT_MODEL)
    }

    #[tokio::test]
    async fn sends_temperature_with_open_nucleus_and_no_top_k() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "contents": [{"role": "user", "parts": [{"text": "Write a haiku."}]}],
                    "generationConfig": {"temperature": 1.5, "topP": 1.0}
                })),
                // no topK anywhere in the payload
                Matcher::Regex("^[^K]*$".to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[{"text":"Crystal "},{"text":"wings"}]}}]}"#)
            .create_async()
            .await;

        let text = client_for(&server)
            .generate("Write a haiku.", Temperature::new(1.5), &Credential::new("test-key"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(text, "Crystal wings");
    }

    #[tokio::test]
    async fn empty_credential_never_hits_the_network() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", Matcher::Any).expect(0).create_async().await;

        let err = client_for(&server)
            .generate("hi", Temperature::default(), &Credential::default())
            .await
            .unwrap_err();

        assert_eq!(err, GenerationError::MissingCredential);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_content_is_a_placeholder_success() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body(r#"{"candidates":[{"content":{"parts":[]}}]}"#)
            .create_async()
            .await;

        let text = client_for(&server)
            .generate("hi", Temperature::default(), &Credential::new("k"))
            .await
            .unwrap();
        assert_eq!(text, NO_OUTPUT);
    }

    #[tokio::test]
    async fn no_candidates_is_a_placeholder_success() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let text = client_for(&server)
            .generate("hi", Temperature::default(), &Credential::new("k"))
            .await
            .unwrap();
        assert_eq!(text, NO_OUTPUT);
    }

    #[tokio::test]
    async fn upstream_error_message_is_passed_through() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(400)
            .with_body(r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("hi", Temperature::default(), &Credential::new("bad"))
            .await
            .unwrap_err();

        match err {
            GenerationError::UpstreamFailure { message } => {
                assert!(message.contains("400"));
                assert!(message.contains("API key not valid."));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_an_upstream_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", PATH)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server)
            .generate("hi", Temperature::default(), &Credential::new("k"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::UpstreamFailure { .. }));
    }

    #[test]
    fn from_config_uses_configured_model() {
        let config = Config {
            model: "gemini-2.0-flash".to_string(),
            base_url: "http://localhost:9/".to_string(),
            request_timeout_secs: Some(5),
            ..Config::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-2.0-flash");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9/models/gemini-2.0-flash:generateContent"
        );
    }
}
