//! LLM integration
//!
//! Provides:
//! - A chat completion client for OpenAI-compatible services
//! - Answer schemas and their validation
//! - The structured query client used by the LLM extraction backend

mod client;
pub mod schema;
mod structured;

pub use client::{ChatClient, ChatMessage, OpenAiClient, ResponseFormat};
pub use schema::{
    parse_answer, BooleanAnswer, Choice, ChoiceAnswer, Schema, StructuredAnswer, TextAnswer,
    YearAnswer, MIN_YEAR,
};
pub use structured::StructuredQueryClient;
