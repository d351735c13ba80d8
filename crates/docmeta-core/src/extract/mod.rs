//! Metadata extraction backends
//!
//! [`DocumentExtractor`] is the one capability both backends satisfy:
//! - [`CrossRefExtractor`] derives fields from a CrossRef work record
//! - [`LlmExtractor`] asks a language model about the document text
//!
//! Getters return `Ok(None)` for anything they cannot determine. `Err` is
//! reserved for contract violations, which signal programming errors.

pub mod authors;
mod crossref;
mod llm;
mod record;
pub mod types;

pub use authors::{Affiliation, Author, AuthorPartition};
pub use crossref::CrossRefExtractor;
pub use llm::LlmExtractor;
pub use record::{ColumnValue, ExtractedRecord};
pub use types::{
    AffiliationOrigin, DocumentType, Funder, IdentifierKind, IdentifierPair,
    MeansOfDissemination, ReportArea, ResolvedType, UrlEnvelope,
};

use crate::error::Result;
use async_trait::async_trait;

/// Field vocabulary every extraction backend answers for
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Backend name for logs and output
    fn backend_name(&self) -> &'static str;

    async fn doi(&self) -> Result<Option<String>>;

    async fn title(&self) -> Result<Option<String>>;

    /// Classification the type-dependent getters branch on
    async fn document_type(&self) -> Result<Option<ResolvedType>>;

    async fn internal_authors(&self) -> Result<Option<Vec<String>>>;

    async fn external_authors(&self) -> Result<Option<Vec<String>>>;

    /// True iff the principal author is not affiliated with the home institution
    async fn is_external_principal_author(&self) -> Result<Option<bool>>;

    /// Publisher name
    async fn editorial(&self) -> Result<Option<String>>;

    /// ISSN pair for articles, ISBN pair for books; electronic first
    async fn issns_or_isbn(&self) -> Result<Option<IdentifierPair>>;

    async fn country_published(&self) -> Result<Option<String>>;

    async fn url(&self) -> Result<Option<UrlEnvelope>>;

    async fn science_network(&self) -> Result<Option<String>>;

    async fn founders(&self) -> Result<Option<Vec<Funder>>>;

    async fn year(&self) -> Result<Option<i32>>;

    async fn publish_type(&self) -> Result<Option<u8>>;

    async fn publish_group(&self) -> Result<Option<u8>>;

    async fn serial_type(&self) -> Result<Option<Vec<u8>>>;

    async fn is_international(&self) -> Result<Option<bool>>;

    async fn origin_external_authors(&self) -> Result<Option<Vec<AffiliationOrigin>>>;

    async fn means_of_dissemination(&self) -> Result<Option<MeansOfDissemination>>;

    async fn quartile(&self) -> Result<Option<u8>>;

    async fn report_area(&self) -> Result<Option<ReportArea>>;

    /// Whole-record extraction, one getter at a time
    async fn extract(&self) -> Result<Option<ExtractedRecord>> {
        tracing::info!("Extracting record with {} backend", self.backend_name());

        let record = ExtractedRecord {
            backend: self.backend_name().to_string(),
            doi: self.doi().await?,
            title: self.title().await?,
            document_type: self.document_type().await?,
            internal_authors: self.internal_authors().await?,
            external_authors: self.external_authors().await?,
            is_external_principal_author: self.is_external_principal_author().await?,
            editorial: self.editorial().await?,
            identifiers: self.issns_or_isbn().await?,
            country_published: self.country_published().await?,
            url: self.url().await?,
            science_network: self.science_network().await?,
            founders: self.founders().await?,
            year: self.year().await?,
            publish_type: self.publish_type().await?,
            publish_group: self.publish_group().await?,
            serial_type: self.serial_type().await?,
            is_international: self.is_international().await?,
            origin_external_authors: self.origin_external_authors().await?,
            means_of_dissemination: self.means_of_dissemination().await?,
            quartile: self.quartile().await?,
            report_area: self.report_area().await?,
        };

        if record.is_empty() {
            tracing::warn!("{} backend produced no fields", self.backend_name());
            return Ok(None);
        }
        Ok(Some(record))
    }
}

/// Turn a getter's failure into an absent value, letting contract
/// violations through.
pub(crate) fn absorb<T>(field: &str, result: Result<Option<T>>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_contract_violation() => Err(e),
        Err(e) => {
            tracing::warn!("Could not extract {}: {}", field, e);
            Ok(None)
        }
    }
}
