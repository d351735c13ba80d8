//! Structured questions against one document

use super::schema::{parse_answer, BooleanAnswer, StructuredAnswer, TextAnswer, YearAnswer};
use super::{ChatClient, ChatMessage, OpenAiClient, ResponseFormat};
use crate::config::LLMServiceConfig;
use crate::error::Result;
use std::sync::Arc;

/// Sends questions about a single document to a language model and coerces
/// every answer through a schema.
pub struct StructuredQueryClient {
    client: Arc<dyn ChatClient>,
    system_prompt: String,
    document_context: String,
}

impl StructuredQueryClient {
    /// Bind a chat client to one document's text
    pub fn new(
        client: Arc<dyn ChatClient>,
        system_prompt: impl Into<String>,
        document_context: impl Into<String>,
    ) -> Self {
        Self {
            client,
            system_prompt: system_prompt.into(),
            document_context: document_context.into(),
        }
    }

    /// Create from configuration with an OpenAI-compatible client
    pub fn from_config(config: &LLMServiceConfig, document_context: impl Into<String>) -> Result<Self> {
        let client = OpenAiClient::new(config.clone())?;
        Ok(Self::new(
            Arc::new(client),
            config.effective_system_prompt(),
            document_context,
        ))
    }

    /// Free-text answer
    pub async fn ask(&self, question: &str) -> Result<String> {
        let answer: TextAnswer = self.ask_typed(question).await?;
        Ok(answer.result.trim().to_string())
    }

    /// Yes/no answer
    pub async fn ask_boolean(&self, question: &str) -> Result<bool> {
        let answer: BooleanAnswer = self.ask_typed(question).await?;
        Ok(answer.result)
    }

    /// Publication year within `[MIN_YEAR, current year]`; `None` when the
    /// model reports that the document states no year.
    pub async fn ask_year(&self, question: &str) -> Result<Option<i32>> {
        let answer: YearAnswer = self.ask_typed(question).await?;
        Ok(answer.result)
    }

    /// Answer coerced to `T`
    ///
    /// Fails with a contract error before contacting the model when `T`'s
    /// schema is not a structured object, and with a schema-validation error
    /// when the reply does not conform.
    pub async fn ask_typed<T: StructuredAnswer>(&self, question: &str) -> Result<T> {
        let schema = T::schema();
        schema.ensure_structured()?;

        tracing::debug!(
            model = self.client.model_name(),
            schema = schema.name(),
            "structured query: {}",
            first_line(question)
        );

        let response = self
            .client
            .chat_completion(
                self.messages(question),
                ResponseFormat::JsonSchema(schema.json().clone()),
            )
            .await?;

        parse_answer(&response)
    }

    fn messages(&self, question: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::system(self.document_context.clone()),
            ChatMessage::user(question.trim()),
        ]
    }
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or("")
}
