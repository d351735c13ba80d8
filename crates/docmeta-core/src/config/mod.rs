//! Configuration management

use crate::error::{DocMetaError, Result};
use crate::sink::ColumnMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LLM service configuration
    #[serde(default)]
    pub llm: LLMServiceConfig,

    /// CrossRef API configuration
    #[serde(default)]
    pub crossref: CrossRefConfig,

    /// Home institution used to split internal and external authors
    #[serde(default)]
    pub institution: InstitutionConfig,

    /// External table store receiving extracted records
    #[serde(default)]
    pub table_store: Option<TableStoreConfig>,

    /// Ingestion behaviour
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// LLM service configuration for external inference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMServiceConfig {
    /// Base URL of the OpenAI-compatible chat completions service
    pub url: String,

    /// Model name for chat completions
    #[serde(default = "default_chat_model")]
    pub model: String,

    /// API key (optional, for authenticated services)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sampling temperature; extraction wants deterministic answers
    #[serde(default)]
    pub temperature: f32,

    /// Upper bound on tokens per answer
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// System prompt sent ahead of the document context
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Language the model should answer in (e.g. "Spanish")
    #[serde(default)]
    pub answer_language: Option<String>,
}

impl LLMServiceConfig {
    /// System prompt with the answer language instruction appended
    pub fn effective_system_prompt(&self) -> String {
        match self.answer_language.as_deref() {
            Some(lang) if !lang.trim().is_empty() => {
                format!("{} Always answer in {}.", self.system_prompt, lang.trim())
            }
            _ => self.system_prompt.clone(),
        }
    }
}

impl Default for LLMServiceConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DOCMETA_LLM_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            model: default_chat_model(),
            api_key: std::env::var("DOCMETA_LLM_API_KEY").ok(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout(),
            system_prompt: default_system_prompt(),
            answer_language: None,
        }
    }
}

fn default_chat_model() -> String {
    std::env::var("DOCMETA_LLM_MODEL")
        .unwrap_or_else(|_| "meta-llama/Llama-3.1-8B-Instruct".to_string())
}

fn default_max_tokens() -> u32 {
    512
}

fn default_timeout() -> u64 {
    30
}

fn default_system_prompt() -> String {
    "Your mission is to help extract information from the following document. \
     Your only context is this document; never claim that something is missing from it \
     without checking. Respond briefly and always in JSON format."
        .to_string()
}

/// CrossRef REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossRefConfig {
    /// API base URL
    #[serde(default = "default_crossref_url")]
    pub base_url: String,

    /// Contact address for the CrossRef polite pool
    #[serde(default)]
    pub mailto: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for CrossRefConfig {
    fn default() -> Self {
        Self {
            base_url: default_crossref_url(),
            mailto: std::env::var("DOCMETA_CROSSREF_MAILTO").ok(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_crossref_url() -> String {
    std::env::var("DOCMETA_CROSSREF_URL")
        .unwrap_or_else(|_| "https://api.crossref.org".to_string())
}

/// Home institution, matched exactly against affiliation names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstitutionConfig {
    /// Canonical affiliation name
    #[serde(default = "default_institution_name")]
    pub name: String,

    /// Country keyword; affiliation places without it count as international
    #[serde(default = "default_institution_country")]
    pub country: String,
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            name: default_institution_name(),
            country: default_institution_country(),
        }
    }
}

fn default_institution_name() -> String {
    "Universidad de La Habana".to_string()
}

fn default_institution_country() -> String {
    "cuba".to_string()
}

/// Table store (Nextcloud Tables) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableStoreConfig {
    /// Server base URL, e.g. https://cloud.example.org
    pub url: String,

    /// Title of the destination table
    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Column ids for each record field
    #[serde(default)]
    pub columns: ColumnMap,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_table_name() -> String {
    "Publicaciones".to_string()
}

/// Ingestion pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Look a DOI up by title on CrossRef when the document text carries none
    #[serde(default = "default_true")]
    pub resolve_doi_by_title: bool,

    /// Glob for documents picked up by directory scans
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Maximum characters of document text handed to the model
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolve_doi_by_title: true,
            pattern: default_pattern(),
            max_context_chars: default_max_context_chars(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pattern() -> String {
    "**/*.pdf".to_string()
}

fn default_max_context_chars() -> usize {
    60_000
}

impl Config {
    /// Load config from default path, then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from an explicit path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path (`DOCMETA_CONFIG` wins)
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("DOCMETA_CONFIG") {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Environment variables override values read from the file
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("DOCMETA_LLM_URL") {
            self.llm.url = url;
        }
        if let Ok(model) = std::env::var("DOCMETA_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Ok(key) = std::env::var("DOCMETA_LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(url) = std::env::var("DOCMETA_CROSSREF_URL") {
            self.crossref.base_url = url;
        }
        if let Ok(mailto) = std::env::var("DOCMETA_CROSSREF_MAILTO") {
            self.crossref.mailto = Some(mailto);
        }
        if let Ok(url) = std::env::var("DOCMETA_TABLE_URL") {
            let store = self.table_store.get_or_insert_with(|| TableStoreConfig {
                url: url.clone(),
                table_name: default_table_name(),
                username: None,
                password: None,
                columns: ColumnMap::default(),
                timeout_secs: default_timeout(),
            });
            store.url = url;
        }
        if let Some(store) = self.table_store.as_mut() {
            if let Ok(user) = std::env::var("DOCMETA_TABLE_USER") {
                store.username = Some(user);
            }
            if let Ok(password) = std::env::var("DOCMETA_TABLE_PASSWORD") {
                store.password = Some(password);
            }
        }
    }

    /// Table store settings, or a configuration error naming what is missing
    pub fn require_table_store(&self) -> Result<&TableStoreConfig> {
        self.table_store.as_ref().ok_or_else(|| {
            DocMetaError::Config(
                "no table store configured (set table_store.url or DOCMETA_TABLE_URL)"
                    .to_string(),
            )
        })
    }
}
