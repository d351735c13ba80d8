//! Error types for docmeta

use thiserror::Error;

/// Result type alias using DocMetaError
pub type Result<T> = std::result::Result<T, DocMetaError>;

/// Error type alias for convenience
pub type Error = DocMetaError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
    pub const CONTRACT_VIOLATION: i32 = 4;
}

/// Main error type for docmeta
#[derive(Debug, Error)]
pub enum DocMetaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("LLM error: {0}")]
    Llm(String),

    /// The model answered, but the answer does not conform to the requested schema
    #[error("Schema validation failed for {schema}: {reason}")]
    SchemaValidation { schema: String, reason: String },

    /// A caller asked for something the API cannot express. Never absorbed.
    #[error("Contract violation: {0}")]
    Contract(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl DocMetaError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            Self::Contract(_) => exit_codes::CONTRACT_VIOLATION,
            _ => exit_codes::GENERAL_ERROR,
        }
    }

    /// Programming errors that field getters must let through instead of
    /// turning into an absent value.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::Contract(_))
    }

    pub(crate) fn schema(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            schema: schema.into(),
            reason: reason.into(),
        }
    }
}
