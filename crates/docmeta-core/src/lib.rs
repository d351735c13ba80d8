//! Docmeta Core Library
//!
//! Bibliographic metadata extraction for scholarly documents.
//!
//! # Features
//! - CrossRef work lookups by DOI, with member and journal follow-ups
//! - Structured language-model queries over the document text
//! - Author affiliation analysis against a home institution
//! - PDF/Markdown conversion and directory scanning
//! - Upload of extracted records to a Nextcloud Tables store

pub mod config;
pub mod convert;
pub mod crossref;
pub mod error;
pub mod extract;
pub mod identifiers;
pub mod llm;
pub mod pipeline;
pub mod sink;

pub use config::{Config, CrossRefConfig, InstitutionConfig, LLMServiceConfig, TableStoreConfig};
pub use crossref::CrossRefClient;
pub use error::{DocMetaError, Error, Result};
pub use extract::{
    CrossRefExtractor, DocumentExtractor, DocumentType, ExtractedRecord, Funder, IdentifierKind,
    IdentifierPair, LlmExtractor, MeansOfDissemination, ReportArea, ResolvedType, UrlEnvelope,
};
pub use llm::{ChatClient, ChatMessage, OpenAiClient, ResponseFormat, StructuredQueryClient};
pub use pipeline::{extract_document, BackendChoice, ScanEvent, ScanResult};
pub use sink::{ColumnMap, TableSink};

/// Crate version, sent in the CrossRef user agent
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "docmeta";
