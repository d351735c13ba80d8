//! Document ingestion: text, DOI discovery, backend choice, extraction

use crate::config::Config;
use crate::convert::{self, PdfInfo};
use crate::crossref::CrossRefClient;
use crate::error::{DocMetaError, Result};
use crate::extract::{CrossRefExtractor, DocumentExtractor, ExtractedRecord, LlmExtractor};
use crate::identifiers;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which backend a caller asks for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendChoice {
    /// CrossRef when a DOI resolves, else the language model
    #[default]
    Auto,
    CrossRef,
    Llm,
}

/// Outcome for one document of a directory scan
#[derive(Debug, Serialize)]
pub struct ScanResult {
    pub path: PathBuf,
    pub record: Option<ExtractedRecord>,
    pub error: Option<String>,
}

/// Scan progress reported to the caller
#[derive(Debug)]
pub enum ScanEvent<'a> {
    /// Matching documents found, before any is extracted
    Found(usize),
    Started(&'a Path),
    Finished(&'a ScanResult),
}

/// DOI from, in order: the explicit argument, the PDF metadata, the text, a
/// CrossRef search by the metadata title (else the guessed title)
pub async fn discover_doi(
    explicit: Option<&str>,
    text: &str,
    info: &PdfInfo,
    path: &Path,
    config: &Config,
) -> Result<Option<String>> {
    if let Some(raw) = explicit {
        return identifiers::normalize_doi(raw)
            .map(Some)
            .ok_or_else(|| DocMetaError::InvalidInput(format!("not a DOI: {}", raw)));
    }

    if let Some(ref doi) = info.doi {
        tracing::debug!("DOI {} found in PDF metadata", doi);
        return Ok(Some(doi.clone()));
    }

    if let Some(doi) = identifiers::find_dois(text).into_iter().next() {
        tracing::debug!("DOI {} found in document text", doi);
        return Ok(Some(doi));
    }

    if !config.pipeline.resolve_doi_by_title {
        return Ok(None);
    }

    let title = info
        .title
        .clone()
        .unwrap_or_else(|| convert::guess_title(text, path));
    let client = CrossRefClient::new(&config.crossref)?;
    match client.search_title(&title).await {
        Ok(found) => {
            let doi = found.as_deref().and_then(identifiers::normalize_doi);
            if let Some(ref doi) = doi {
                tracing::info!("Resolved DOI {} from title {:?}", doi, title);
            }
            Ok(doi)
        }
        Err(e) => {
            tracing::warn!("Title search for {:?} failed: {}", title, e);
            Ok(None)
        }
    }
}

/// Backend for a document: CrossRef when its work record can be fetched
pub async fn build_extractor(
    doi: Option<&str>,
    text: &str,
    choice: BackendChoice,
    config: &Config,
) -> Result<Box<dyn DocumentExtractor>> {
    let llm = |text: &str| -> Result<Box<dyn DocumentExtractor>> {
        let context = convert::truncate_context(text, config.pipeline.max_context_chars);
        Ok(Box::new(LlmExtractor::from_config(config, context)?))
    };

    match (choice, doi) {
        (BackendChoice::Llm, _) => llm(text),
        (BackendChoice::CrossRef, None) => Err(DocMetaError::InvalidInput(
            "the crossref backend needs a DOI".to_string(),
        )),
        (BackendChoice::CrossRef, Some(doi)) => {
            Ok(Box::new(CrossRefExtractor::from_config(doi, config).await?))
        }
        (BackendChoice::Auto, None) => llm(text),
        (BackendChoice::Auto, Some(doi)) => match CrossRefExtractor::from_config(doi, config).await {
            Ok(extractor) => Ok(Box::new(extractor)),
            Err(e) => {
                tracing::warn!("CrossRef lookup for {} failed, using LLM backend: {}", doi, e);
                llm(text)
            }
        },
    }
}

/// Extract one document's record
pub async fn extract_document(
    path: &Path,
    doi: Option<&str>,
    choice: BackendChoice,
    config: &Config,
) -> Result<Option<ExtractedRecord>> {
    tracing::info!("Extracting {}", path.display());
    let text = convert::document_to_text(path)?;

    let doi = match choice {
        BackendChoice::Llm => None,
        _ => {
            let info = convert::pdf_info(path);
            discover_doi(doi, &text, &info, path, config).await?
        }
    };

    let extractor = build_extractor(doi.as_deref(), &text, choice, config).await?;
    extractor.extract().await
}

/// Extract every matching document under `dir`; a failing document is
/// logged and reported, never fatal. Contract violations abort the scan.
pub async fn scan(
    dir: &Path,
    pattern: &str,
    choice: BackendChoice,
    config: &Config,
    on_event: &mut dyn FnMut(ScanEvent<'_>),
) -> Result<Vec<ScanResult>> {
    let documents = convert::scan_directory(dir, pattern)?;
    tracing::info!("Found {} documents in {}", documents.len(), dir.display());
    on_event(ScanEvent::Found(documents.len()));

    let mut results = Vec::with_capacity(documents.len());
    for path in documents {
        on_event(ScanEvent::Started(&path));

        let result = match extract_document(&path, None, choice, config).await {
            Ok(record) => ScanResult {
                path,
                record,
                error: None,
            },
            Err(e) if e.is_contract_violation() => return Err(e),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", path.display(), e);
                ScanResult {
                    path,
                    record: None,
                    error: Some(e.to_string()),
                }
            }
        };

        on_event(ScanEvent::Finished(&result));
        results.push(result);
    }
    Ok(results)
}
