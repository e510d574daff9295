//! Chat-completions source using OpenAI-compatible endpoints.
//!
//! DeepSeek is the default provider; any endpoint implementing
//! `POST {base_url}/chat/completions` works.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::map_transport_error;
use super::RelatedTopicsSource;
use crate::error::GraphError;

/// Configuration for the chat-completions source.
#[derive(Debug, Clone)]
pub struct ChatCompletionConfig {
    /// API base URL (e.g., "https://api.deepseek.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "deepseek-chat", "gpt-4o-mini")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,

    /// Sampling temperature
    pub temperature: f32,

    /// Completion token limit
    pub max_tokens: u32,
}

impl ChatCompletionConfig {
    /// Create config for the DeepSeek API.
    pub fn deepseek(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.deepseek.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }

    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            ..Self::deepseek(api_key, model)
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

/// Source that prompts a chat model for related topics.
pub struct ChatCompletionSource {
    client: Client,
    config: ChatCompletionConfig,
}

impl ChatCompletionSource {
    /// Create a new chat-completions source.
    pub fn new(config: ChatCompletionConfig) -> Result<Self, GraphError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GraphError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Build the prompt asking for `count` related topics.
    fn build_prompt(&self, topic: &str, count: usize) -> String {
        format!(
            r#"Lista {count} temas relacionados con "{topic}". Devuelve SOLO un objeto JSON válido con la estructura: {{"relatedTopics": ["tema1", "tema2"]}}"#
        )
    }
}

#[async_trait]
impl RelatedTopicsSource for ChatCompletionSource {
    async fn request(&self, topic: &str, count: usize) -> Result<String, GraphError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: self.build_prompt(topic, count),
            }],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        let url = format!("{}/chat/completions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        debug!(status = %status, model = %self.config.model, "Chat completion response");

        if status.as_u16() == 429 {
            return Err(GraphError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::UpstreamFailure(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GraphError::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GraphError::MalformedResponse("No content in response".to_string()))
    }

    fn name(&self) -> &str {
        "chat-completions"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ChatCompletionConfig {
        let mut config = ChatCompletionConfig::deepseek("test-key", "deepseek-chat");
        config.base_url = server.uri();
        config.timeout = Duration::from_secs(5);
        config
    }

    #[test]
    fn test_deepseek_config() {
        let config = ChatCompletionConfig::deepseek("key", "deepseek-chat");
        assert!(config.base_url.contains("deepseek"));
        assert_eq!(config.max_tokens, 1000);
        assert!((config.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_openai_config() {
        let config = ChatCompletionConfig::openai("key", "gpt-4o-mini");
        assert!(config.base_url.contains("openai"));
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_build_prompt() {
        let source =
            ChatCompletionSource::new(ChatCompletionConfig::deepseek("key", "deepseek-chat"))
                .unwrap();
        let prompt = source.build_prompt("Historia", 5);
        assert!(prompt.contains("Lista 5 temas"));
        assert!(prompt.contains("\"Historia\""));
        assert!(prompt.contains(r#"{"relatedTopics": ["tema1", "tema2"]}"#));
    }

    #[tokio::test]
    async fn test_returns_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": {
                        "content": "```json\n{\"relatedTopics\": [\"Edad Media\"]}\n```"
                    }
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let source = ChatCompletionSource::new(config_for(&server)).unwrap();
        let content = source.request("Historia", 5).await.unwrap();
        assert!(content.contains("Edad Media"));
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let source = ChatCompletionSource::new(config_for(&server)).unwrap();
        assert!(matches!(
            source.request("Historia", 5).await,
            Err(GraphError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unauthorized_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let source = ChatCompletionSource::new(config_for(&server)).unwrap();
        assert!(matches!(
            source.request("Historia", 5).await,
            Err(GraphError::UpstreamFailure(_))
        ));
    }
}
