//! Extraction by questioning a language model about the document text

use super::authors::{self, Author};
use super::types::{
    AffiliationOrigin, DocumentType, Funder, IdentifierKind, IdentifierPair,
    MeansOfDissemination, ReportArea, ResolvedType, UrlEnvelope,
};
use super::{absorb, DocumentExtractor};
use crate::config::{Config, InstitutionConfig};
use crate::error::Result;
use crate::identifiers;
use crate::llm::{ChoiceAnswer, Schema, StructuredAnswer, StructuredQueryClient};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;

const DOI_QUESTION: &str = "
Extract the DOI (Digital Object Identifier) of this document. A DOI is a
unique alphanumeric string that identifies a digital document persistently.
It always starts with '10.' followed by a prefix and a suffix separated by a
slash. The prefix identifies the registrant (usually the publisher) and is
numeric; the suffix identifies the specific document. In '10.1000/182',
'10.1000' is the prefix and '182' the suffix. Return only the DOI.
";

const TITLE_QUESTION: &str = "Tell me the title of the document.";

const AUTHORS_QUESTION: &str = "
List every author of the document in the order they appear. For each author
give the full name, the institutions they are affiliated with, and the city
or country of each institution when the document states it. Mark the first
(principal) author.
";

const EDITORIAL_QUESTION: &str = "Tell me the name of the publisher (editorial) of this document.";

const COUNTRY_QUESTION: &str = "In which country was this document published?";

const URL_QUESTION: &str =
    "Tell me the URL where this document is published. Answer with the URL only.";

const NETWORK_EXISTS_QUESTION: &str = "
Does the document state that it is indexed in a science network or
bibliographic database (for example Scopus, Web of Science or SciELO)?
";

const NETWORK_QUESTION: &str =
    "Which science network or bibliographic database indexes this document?";

const FUNDING_EXISTS_QUESTION: &str =
    "Does the document acknowledge funding from any institution or grant?";

const FUNDERS_QUESTION: &str =
    "List the funding bodies acknowledged by the document and the grant or award ids of each.";

const YEAR_QUESTION: &str = "
In which year was this document published? Answer null if the document does
not state a publication year.
";

const MEANS_QUESTION: &str = "
Through which means was this document disseminated? Choose press_media,
science_magazine, blog, not_article (the document is not an article) or other.
";

const REPORT_AREA_QUESTION: &str =
    "Which knowledge area and sub-area does this document report on?";

fn type_question() -> String {
    let names: Vec<&str> = DocumentType::ALL
        .iter()
        .filter(|t| **t != DocumentType::NoMatch)
        .map(DocumentType::as_str)
        .collect();
    format!(
        "Classify this document as one of: {}. If it does not clearly match any, answer {}.",
        names.join(", "),
        DocumentType::NoMatch
    )
}

/// Backend answering from the document text through structured queries.
///
/// The classification, the author list and the identifier pair are asked at
/// most once per instance; every field derived from them reads the same answer.
pub struct LlmExtractor {
    query: StructuredQueryClient,
    institution: InstitutionConfig,
    classification: OnceCell<Option<ResolvedType>>,
    authors: OnceCell<Option<Vec<Author>>>,
    identifiers: OnceCell<Option<IdentifierPair>>,
}

impl LlmExtractor {
    pub fn new(query: StructuredQueryClient, institution: InstitutionConfig) -> Self {
        Self {
            query,
            institution,
            classification: OnceCell::new(),
            authors: OnceCell::new(),
            identifiers: OnceCell::new(),
        }
    }

    /// OpenAI-compatible client from configuration, bound to `document_text`
    pub fn from_config(config: &Config, document_text: &str) -> Result<Self> {
        let query = StructuredQueryClient::from_config(&config.llm, document_text)?;
        Ok(Self::new(query, config.institution.clone()))
    }

    /// Trimmed free-text answer; blank answers count as absent
    async fn text(&self, field: &str, question: &str) -> Result<Option<String>> {
        let answer = absorb(field, self.query.ask(question).await.map(Some))?;
        Ok(answer.filter(|a| !a.is_empty()))
    }

    /// Ask `question` only when `check` is answered yes
    async fn text_if(&self, field: &str, check: &str, question: &str) -> Result<Option<String>> {
        match absorb(field, self.query.ask_boolean(check).await.map(Some))? {
            Some(true) => self.text(field, question).await,
            _ => Ok(None),
        }
    }

    async fn classify(&self) -> Result<Option<ResolvedType>> {
        let resolved = self
            .classification
            .get_or_try_init(|| self.ask_classification())
            .await?;
        Ok(*resolved)
    }

    async fn author_list(&self) -> Result<Option<&[Author]>> {
        let list = self.authors.get_or_try_init(|| self.ask_authors()).await?;
        Ok(list.as_deref())
    }

    async fn identifier_pair(&self) -> Result<Option<IdentifierPair>> {
        let pair = self
            .identifiers
            .get_or_try_init(|| self.ask_identifier_pair())
            .await?;
        Ok(pair.clone())
    }

    async fn ask_classification(&self) -> Result<Option<ResolvedType>> {
        let answer = self
            .query
            .ask_typed::<ChoiceAnswer<DocumentType>>(&type_question())
            .await;
        Ok(absorb("document type", answer.map(Some))?.map(|a| ResolvedType::from(a.result)))
    }

    async fn ask_authors(&self) -> Result<Option<Vec<Author>>> {
        let answer = self.query.ask_typed::<AuthorsAnswer>(AUTHORS_QUESTION).await;
        Ok(absorb("authors", answer.map(Some))?
            .map(|a| a.authors)
            .filter(|list| !list.is_empty()))
    }

    async fn ask_identifier_pair(&self) -> Result<Option<IdentifierPair>> {
        let kind = match self.classify().await? {
            Some(ResolvedType::ScienceArticle) => IdentifierKind::Issn,
            Some(ResolvedType::Book | ResolvedType::BookChapter | ResolvedType::Monograph) => {
                IdentifierKind::Isbn
            }
            _ => return Ok(None),
        };

        let electronic = self.identifier_slot(kind, "electronic").await?;
        let print = self.identifier_slot(kind, "print").await?;
        Ok(Some(IdentifierPair {
            kind,
            electronic,
            print,
        }))
    }

    async fn identifier_slot(&self, kind: IdentifierKind, medium: &str) -> Result<Option<String>> {
        let label = kind.label();
        self.text_if(
            label,
            &format!("Does the document state its {} {}?", medium, label),
            &format!("What is the {} {} of the document? Answer with the identifier only.", medium, label),
        )
        .await
    }
}

#[async_trait]
impl DocumentExtractor for LlmExtractor {
    fn backend_name(&self) -> &'static str {
        "llm"
    }

    async fn doi(&self) -> Result<Option<String>> {
        let answer = self.text("doi", DOI_QUESTION).await?;
        Ok(answer.and_then(|raw| {
            let doi = identifiers::normalize_doi(&raw);
            if doi.is_none() {
                tracing::warn!("Discarding DOI answer that is not a DOI: {:?}", raw);
            }
            doi
        }))
    }

    async fn title(&self) -> Result<Option<String>> {
        self.text("title", TITLE_QUESTION).await
    }

    async fn document_type(&self) -> Result<Option<ResolvedType>> {
        self.classify().await
    }

    async fn internal_authors(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .author_list()
            .await?
            .map(|list| authors::partition(list, &self.institution).internal_names()))
    }

    async fn external_authors(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .author_list()
            .await?
            .map(|list| authors::partition(list, &self.institution).external_names()))
    }

    async fn is_external_principal_author(&self) -> Result<Option<bool>> {
        Ok(self
            .author_list()
            .await?
            .and_then(|list| authors::principal_is_external(list, &self.institution)))
    }

    async fn editorial(&self) -> Result<Option<String>> {
        self.text("editorial", EDITORIAL_QUESTION).await
    }

    async fn issns_or_isbn(&self) -> Result<Option<IdentifierPair>> {
        self.identifier_pair().await
    }

    async fn country_published(&self) -> Result<Option<String>> {
        self.text("country", COUNTRY_QUESTION).await
    }

    async fn url(&self) -> Result<Option<UrlEnvelope>> {
        let answer = self.text("url", URL_QUESTION).await?;
        Ok(answer
            .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
            .map(UrlEnvelope::new))
    }

    async fn science_network(&self) -> Result<Option<String>> {
        self.text_if("science network", NETWORK_EXISTS_QUESTION, NETWORK_QUESTION)
            .await
    }

    async fn founders(&self) -> Result<Option<Vec<Funder>>> {
        let acknowledged =
            absorb("funders", self.query.ask_boolean(FUNDING_EXISTS_QUESTION).await.map(Some))?;
        if acknowledged != Some(true) {
            return Ok(None);
        }

        let answer = self.query.ask_typed::<FundersAnswer>(FUNDERS_QUESTION).await;
        Ok(absorb("funders", answer.map(Some))?
            .map(|a| a.funders)
            .filter(|funders| !funders.is_empty()))
    }

    async fn year(&self) -> Result<Option<i32>> {
        absorb("year", self.query.ask_year(YEAR_QUESTION).await)
    }

    async fn publish_type(&self) -> Result<Option<u8>> {
        Ok(self.classify().await?.and_then(ResolvedType::publish_type_code))
    }

    async fn publish_group(&self) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn serial_type(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .identifier_pair()
            .await?
            .map(|pair| pair.serial_types())
            .filter(|codes| !codes.is_empty()))
    }

    async fn is_international(&self) -> Result<Option<bool>> {
        Ok(self
            .author_list()
            .await?
            .map(|list| authors::has_international_affiliation(list, &self.institution)))
    }

    async fn origin_external_authors(&self) -> Result<Option<Vec<AffiliationOrigin>>> {
        Ok(self
            .author_list()
            .await?
            .map(|list| authors::external_origins(list, &self.institution)))
    }

    async fn means_of_dissemination(&self) -> Result<Option<MeansOfDissemination>> {
        let answer = self
            .query
            .ask_typed::<ChoiceAnswer<MeansOfDissemination>>(MEANS_QUESTION)
            .await;
        Ok(absorb("means of dissemination", answer.map(Some))?.map(|a| a.result))
    }

    async fn quartile(&self) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn report_area(&self) -> Result<Option<ReportArea>> {
        let answer = self
            .query
            .ask_typed::<ReportAreaAnswer>(REPORT_AREA_QUESTION)
            .await;
        Ok(absorb("report area", answer.map(Some))?.map(|a| a.result))
    }
}

/// Author list with affiliations
#[derive(Debug, Deserialize)]
struct AuthorsAnswer {
    authors: Vec<Author>,
}

impl StructuredAnswer for AuthorsAnswer {
    fn schema() -> Schema {
        Schema::new(
            "AuthorsAnswer",
            json!({
                "type": "object",
                "properties": {
                    "authors": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "principal": { "type": "boolean" },
                                "affiliations": {
                                    "type": "array",
                                    "items": {
                                        "type": "object",
                                        "properties": {
                                            "name": { "type": "string" },
                                            "places": { "type": "array", "items": { "type": "string" } }
                                        },
                                        "required": ["name"]
                                    }
                                }
                            },
                            "required": ["name"]
                        }
                    }
                },
                "required": ["authors"],
            }),
        )
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.authors.iter().any(|a| a.display_name().is_empty()) {
            return Err("author without a name".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct FundersAnswer {
    funders: Vec<Funder>,
}

impl StructuredAnswer for FundersAnswer {
    fn schema() -> Schema {
        Schema::new(
            "FundersAnswer",
            json!({
                "type": "object",
                "properties": {
                    "funders": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "name": { "type": "string" },
                                "awards": { "type": "array", "items": { "type": "string" } }
                            },
                            "required": ["name"]
                        }
                    }
                },
                "required": ["funders"],
            }),
        )
    }
}

#[derive(Debug, Deserialize)]
struct ReportAreaAnswer {
    result: ReportArea,
}

impl StructuredAnswer for ReportAreaAnswer {
    fn schema() -> Schema {
        Schema::single_result(
            "ReportAreaAnswer",
            json!({
                "type": "object",
                "properties": {
                    "area": { "type": "string" },
                    "subarea": { "type": "string" }
                },
                "required": ["area", "subarea"]
            }),
        )
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.result.area.trim().is_empty() {
            return Err("empty area".to_string());
        }
        Ok(())
    }
}
