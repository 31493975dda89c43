//! LLM Client implementations
//!
//! Provides clients for OpenAI-compatible chat-completion APIs (OpenAI and
//! Gemini) and for Ollama, with native structured output for quiz
//! generation.
//!
//! A missing API key is not an error at construction time; the first
//! call made without one fails instead.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use studyai_core::{parse_json_reply, LlmClient, LlmConfig, LlmProvider, Result, StudyError};

fn http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| StudyError::ConfigError(format!("Failed to build HTTP client: {e}")))
}

// ============================================================================
// OpenAI-compatible Client
// ============================================================================

/// Client for OpenAI-compatible chat-completion endpoints
pub struct OpenAiClient {
    client: Client,
    provider: LlmProvider,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    /// Create from config (OpenAI or Gemini)
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            provider: config.provider,
            api_key: config.api_key().map(str::to_string),
            base_url: config.base_url().trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    fn request(&self, prompt: &str, response_format: Option<serde_json::Value>) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            response_format,
        }
    }

    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StudyError::LlmError(format!(
                "API key for provider {:?} is not configured",
                self.provider
            ))
        })?;

        tracing::debug!(model = %self.model, provider = ?self.provider, "Sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| StudyError::LlmError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StudyError::LlmError(format!(
                "{:?} error ({status}): {error_text}",
                self.provider
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| StudyError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| StudyError::LlmError("No response generated".to_string()))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(self.request(prompt, None)).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let response_format = serde_json::json!({
            "type": "json_schema",
            "json_schema": { "name": name, "schema": schema },
        });

        let reply = self
            .complete(self.request(prompt, Some(response_format)))
            .await?;
        parse_json_reply(&reply)
    }
}

// ============================================================================
// Ollama Client
// ============================================================================

/// Ollama API client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<serde_json::Value>,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    /// Create from config
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.ollama_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    fn request(&self, prompt: &str, format: Option<serde_json::Value>) -> OllamaRequest {
        OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            format,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        }
    }

    async fn complete(&self, request: OllamaRequest) -> Result<String> {
        tracing::debug!(model = %self.model, "Sending Ollama generate request");

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| StudyError::LlmError(format!("Ollama request failed: {e}")))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(StudyError::LlmError(format!("Ollama error: {error_text}")));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| StudyError::LlmError(format!("Failed to parse Ollama response: {e}")))?;

        Ok(result.response)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(self.request(prompt, None)).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _name: &str,
        schema: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        let reply = self
            .complete(self.request(prompt, Some(schema.clone())))
            .await?;
        parse_json_reply(&reply)
    }
}

// ============================================================================
// Factory function
// ============================================================================

/// Create an LLM client from config
pub fn create_llm_client(config: &LlmConfig) -> Result<Box<dyn LlmClient>> {
    match config.provider {
        LlmProvider::OpenAI | LlmProvider::Gemini => {
            Ok(Box::new(OpenAiClient::from_config(config)?))
        }
        LlmProvider::Ollama => Ok(Box::new(OllamaClient::from_config(config)?)),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_config() -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::Ollama,
            ollama_url: "http://localhost:11434/".to_string(),
            model: "llama3".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_openai_from_config_trims_base_url() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAI,
            openai_api_key: Some("test-key".to_string()),
            openai_base_url: Some("http://localhost:8080/v1/".to_string()),
            model: "gpt-4o-mini".to_string(),
            ..Default::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.api_key.as_deref(), Some("test-key"));
    }

    #[test]
    fn test_gemini_from_config() {
        let config = LlmConfig {
            google_api_key: Some("g-key".to_string()),
            ..Default::default()
        };
        let client = OpenAiClient::from_config(&config).unwrap();
        assert_eq!(client.provider, LlmProvider::Gemini);
        assert_eq!(client.base_url, studyai_core::config::GEMINI_OPENAI_BASE_URL);
        assert_eq!(client.api_key.as_deref(), Some("g-key"));
    }

    #[test]
    fn test_ollama_from_config() {
        let client = OllamaClient::from_config(&ollama_config()).unwrap();
        assert_eq!(client.model, "llama3");
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_chat_request_omits_absent_response_format() {
        let client = OpenAiClient::from_config(&LlmConfig::default()).unwrap();
        let value = serde_json::to_value(client.request("hi", None)).unwrap();
        assert!(value.get("response_format").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_ollama_request_carries_schema_format() {
        let client = OllamaClient::from_config(&ollama_config()).unwrap();
        let schema = serde_json::json!({"type": "object"});
        let value = serde_json::to_value(client.request("quiz", Some(schema))).unwrap();
        assert_eq!(value["stream"], false);
        assert_eq!(value["format"]["type"], "object");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_at_call_time() {
        let config = LlmConfig::default();
        let client = create_llm_client(&config).expect("construction must not need a key");

        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, StudyError::LlmError(ref msg) if msg.contains("not configured")));
    }
}
