//! HTTP client for external LLM services (vLLM, OpenAI, Fireworks, Ollama, etc.)

use crate::config::LLMServiceConfig;
use crate::error::{DocMetaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Trait for LLM service clients
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generate chat completion, optionally constrained to a response format
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        format: ResponseFormat,
    ) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Chat message for completion requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Shape the model is asked to answer in
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// A JSON object conforming to the given JSON schema
    JsonSchema(serde_json::Value),
}

impl ResponseFormat {
    fn to_request_value(&self) -> serde_json::Value {
        match self {
            Self::JsonSchema(schema) => serde_json::json!({
                "type": "json_object",
                "schema": schema,
            }),
        }
    }
}

/// OpenAI-compatible chat completions client
pub struct OpenAiClient {
    http_client: reqwest::Client,
    config: LLMServiceConfig,
}

impl OpenAiClient {
    /// Create new client from configuration
    pub fn new(config: LLMServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DocMetaError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn completions_url(&self) -> String {
        let base = self.config.url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{}/chat/completions", base)
        } else {
            format!("{}/v1/chat/completions", base)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        format: ResponseFormat,
    ) -> Result<String> {
        let start = Instant::now();

        #[derive(Serialize)]
        struct ChatRequest {
            model: String,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: u32,
            response_format: serde_json::Value,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<ChatChoice>,
        }

        #[derive(Deserialize)]
        struct ChatChoice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            #[serde(default)]
            content: Option<String>,
        }

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: format.to_request_value(),
        };

        let url = self.completions_url();
        tracing::debug!("POST {} (model {})", url, self.config.model);

        let mut req = self.http_client.post(&url).json(&request);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req.send().await.map_err(DocMetaError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DocMetaError::ExternalError(format!(
                "LLM service error (HTTP {}): {}",
                status, body
            )));
        }

        let chat_response: ChatResponse = response.json().await.map_err(DocMetaError::Http)?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| DocMetaError::Llm("No response from LLM".to_string()))?;

        tracing::debug!(
            "LLM answered in {} ms ({} chars)",
            start.elapsed().as_millis(),
            content.len()
        );

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
