//! Extraction from a CrossRef work record

use super::authors::{self, Affiliation, Author};
use super::types::{
    AffiliationOrigin, Funder, IdentifierKind, IdentifierPair, MeansOfDissemination, ReportArea,
    ResolvedType, UrlEnvelope,
};
use super::{absorb, DocumentExtractor};
use crate::config::{Config, InstitutionConfig};
use crate::crossref::{member_id, CrossRefClient};
use crate::error::{DocMetaError, Result};
use crate::identifiers;
use async_trait::async_trait;
use serde_json::Value;

const MEMBER_ID_NOT_FOUND: &str = "member id not found";
const MEMBER_INFO_NOT_FOUND: &str = "member information not found";
const COUNTRY_NOT_AVAILABLE: &str = "country not available";

/// Backend answering from the CrossRef record of a known DOI.
///
/// The work record is fetched once at construction; every getter reads the
/// cached copy, except country and editorial which need one more lookup.
pub struct CrossRefExtractor {
    doi: String,
    client: CrossRefClient,
    institution: InstitutionConfig,
    work: Value,
    resolved_type: ResolvedType,
    authors: Vec<Author>,
}

impl CrossRefExtractor {
    /// Fetch the work record for `doi`; fails only when the fetch fails
    pub async fn new(
        doi: &str,
        client: CrossRefClient,
        institution: InstitutionConfig,
    ) -> Result<Self> {
        let doi = identifiers::normalize_doi(doi)
            .ok_or_else(|| DocMetaError::InvalidInput(format!("not a DOI: {}", doi)))?;

        tracing::info!("Fetching CrossRef work {}", doi);
        let work = client.work(&doi).await?;

        let resolved_type = work["type"]
            .as_str()
            .map(ResolvedType::from_crossref_type)
            .unwrap_or(ResolvedType::Other);
        let authors = parse_authors(&work);
        tracing::debug!(
            "CrossRef work {}: type={}, {} authors",
            doi,
            resolved_type,
            authors.len()
        );

        Ok(Self {
            doi,
            client,
            institution,
            work,
            resolved_type,
            authors,
        })
    }

    pub async fn from_config(doi: &str, config: &Config) -> Result<Self> {
        let client = CrossRefClient::new(&config.crossref)?;
        Self::new(doi, client, config.institution.clone()).await
    }

    fn authors(&self) -> Option<&[Author]> {
        if self.authors.is_empty() {
            None
        } else {
            Some(&self.authors)
        }
    }

    fn identifier_pair(&self) -> IdentifierPair {
        let kind = if self.resolved_type.is_science_article() {
            IdentifierKind::Issn
        } else {
            IdentifierKind::Isbn
        };

        let mut pair = IdentifierPair::empty(kind);
        for entry in self.work[kind.crossref_key()].as_array().into_iter().flatten() {
            let value = entry["value"].as_str().map(str::to_string);
            match entry["type"].as_str() {
                Some("electronic") => pair.electronic = value,
                Some("print") => pair.print = value,
                _ => {}
            }
        }
        pair
    }

    fn first_issn(&self) -> Option<String> {
        self.work["ISSN"]
            .as_array()
            .and_then(|issns| issns.first())
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    async fn lookup_country(&self) -> Result<Option<String>> {
        let Some(id) = member_id(&self.work["member"]) else {
            return Ok(Some(MEMBER_ID_NOT_FOUND.to_string()));
        };

        let member = match self.client.member(&id).await {
            Ok(member) => member,
            Err(DocMetaError::NotFound(_)) | Err(DocMetaError::ExternalError(_)) => {
                return Ok(Some(MEMBER_INFO_NOT_FOUND.to_string()))
            }
            Err(e) => return Err(e),
        };

        Ok(Some(
            non_empty(&member["location"]).unwrap_or_else(|| COUNTRY_NOT_AVAILABLE.to_string()),
        ))
    }

    async fn lookup_editorial(&self) -> Result<Option<String>> {
        if let Some(issn) = self.first_issn() {
            match self.client.journal(&issn).await {
                Ok(journal) => {
                    if let Some(publisher) = non_empty(&journal["publisher"]) {
                        return Ok(Some(publisher));
                    }
                }
                Err(e) => tracing::debug!("Journal lookup for {} failed: {}", issn, e),
            }
        }
        Ok(non_empty(&self.work["publisher"]))
    }
}

#[async_trait]
impl DocumentExtractor for CrossRefExtractor {
    fn backend_name(&self) -> &'static str {
        "crossref"
    }

    async fn doi(&self) -> Result<Option<String>> {
        Ok(Some(self.doi.clone()))
    }

    async fn title(&self) -> Result<Option<String>> {
        let title = match &self.work["title"] {
            Value::Array(titles) => titles.first().and_then(non_empty),
            other => non_empty(other),
        };
        Ok(title)
    }

    async fn document_type(&self) -> Result<Option<ResolvedType>> {
        Ok(Some(self.resolved_type))
    }

    async fn internal_authors(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .authors()
            .map(|list| authors::partition(list, &self.institution).internal_names()))
    }

    async fn external_authors(&self) -> Result<Option<Vec<String>>> {
        Ok(self
            .authors()
            .map(|list| authors::partition(list, &self.institution).external_names()))
    }

    async fn is_external_principal_author(&self) -> Result<Option<bool>> {
        Ok(authors::principal_is_external(&self.authors, &self.institution))
    }

    async fn editorial(&self) -> Result<Option<String>> {
        absorb("editorial", self.lookup_editorial().await)
    }

    async fn issns_or_isbn(&self) -> Result<Option<IdentifierPair>> {
        Ok(Some(self.identifier_pair()))
    }

    async fn country_published(&self) -> Result<Option<String>> {
        absorb("country", self.lookup_country().await)
    }

    async fn url(&self) -> Result<Option<UrlEnvelope>> {
        let url = non_empty(&self.work["URL"]).unwrap_or_else(|| identifiers::doi_url(&self.doi));
        Ok(Some(UrlEnvelope::new(url)))
    }

    async fn science_network(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn founders(&self) -> Result<Option<Vec<Funder>>> {
        let funders: Vec<Funder> = self.work["funder"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|funder| {
                let name = non_empty(&funder["name"])?;
                let awards = funder["award"]
                    .as_array()
                    .into_iter()
                    .flatten()
                    .filter_map(non_empty)
                    .collect();
                Some(Funder { name, awards })
            })
            .collect();

        Ok(if funders.is_empty() { None } else { Some(funders) })
    }

    async fn year(&self) -> Result<Option<i32>> {
        Ok(["issued", "published", "indexed"]
            .iter()
            .find_map(|key| first_date_year(&self.work[*key])))
    }

    async fn publish_type(&self) -> Result<Option<u8>> {
        Ok(self.resolved_type.publish_type_code())
    }

    async fn publish_group(&self) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn serial_type(&self) -> Result<Option<Vec<u8>>> {
        let codes = self.identifier_pair().serial_types();
        Ok(if codes.is_empty() { None } else { Some(codes) })
    }

    async fn is_international(&self) -> Result<Option<bool>> {
        Ok(self
            .authors()
            .map(|list| authors::has_international_affiliation(list, &self.institution)))
    }

    async fn origin_external_authors(&self) -> Result<Option<Vec<AffiliationOrigin>>> {
        Ok(self
            .authors()
            .map(|list| authors::external_origins(list, &self.institution)))
    }

    async fn means_of_dissemination(&self) -> Result<Option<MeansOfDissemination>> {
        if !self.resolved_type.is_science_article() {
            return Ok(Some(MeansOfDissemination::NotArticle));
        }
        let pair = self.identifier_pair();
        Ok(Some(if pair.is_empty() {
            MeansOfDissemination::Other
        } else {
            MeansOfDissemination::ScienceMagazine
        }))
    }

    async fn quartile(&self) -> Result<Option<u8>> {
        Ok(None)
    }

    async fn report_area(&self) -> Result<Option<ReportArea>> {
        Ok(None)
    }
}

/// Authors of a work; `sequence: "first"` marks the principal
fn parse_authors(work: &Value) -> Vec<Author> {
    work["author"]
        .as_array()
        .into_iter()
        .flatten()
        .map(|entry| Author {
            given: non_empty(&entry["given"]),
            family: non_empty(&entry["family"]),
            name: non_empty(&entry["name"]),
            affiliations: entry["affiliation"]
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(|aff| {
                    Some(Affiliation {
                        name: non_empty(&aff["name"])?,
                        places: aff["place"]
                            .as_array()
                            .into_iter()
                            .flatten()
                            .filter_map(non_empty)
                            .collect(),
                    })
                })
                .collect(),
            principal: entry["sequence"].as_str() == Some("first"),
        })
        .collect()
}

/// Year of the first `date-parts` entry
fn first_date_year(date: &Value) -> Option<i32> {
    date["date-parts"]
        .get(0)?
        .get(0)?
        .as_i64()
        .and_then(|year| i32::try_from(year).ok())
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
