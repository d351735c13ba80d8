//! Field value types shared by both extraction backends

use crate::llm::Choice;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document classification a model answer may choose from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    ScienceArticle,
    Book,
    BookChapter,
    Monograph,
    ConferencePaper,
    NoMatch,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::ScienceArticle,
        DocumentType::Book,
        DocumentType::BookChapter,
        DocumentType::Monograph,
        DocumentType::ConferencePaper,
        DocumentType::NoMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScienceArticle => "science_article",
            Self::Book => "book",
            Self::BookChapter => "book_chapter",
            Self::Monograph => "monograph",
            Self::ConferencePaper => "conference_paper",
            Self::NoMatch => "no_match",
        }
    }
}

impl Choice for DocumentType {
    const NAME: &'static str = "DocumentType";

    fn variants() -> &'static [&'static str] {
        &[
            "science_article",
            "book",
            "book_chapter",
            "monograph",
            "conference_paper",
            "no_match",
        ]
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// [`DocumentType`] widened with `Other`, for sources whose type vocabulary
/// is larger than the closed classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedType {
    ScienceArticle,
    Book,
    BookChapter,
    Monograph,
    ConferencePaper,
    NoMatch,
    Other,
}

impl ResolvedType {
    /// Exact match of a CrossRef work `type`
    pub fn from_crossref_type(raw: &str) -> Self {
        match raw {
            "journal-article" => Self::ScienceArticle,
            "book" => Self::Book,
            "book-chapter" => Self::BookChapter,
            "monograph" => Self::Monograph,
            "proceedings-article" => Self::ConferencePaper,
            _ => Self::Other,
        }
    }

    /// Back to the closed classification; `Other` has no counterpart
    pub fn narrow(self) -> Option<DocumentType> {
        match self {
            Self::ScienceArticle => Some(DocumentType::ScienceArticle),
            Self::Book => Some(DocumentType::Book),
            Self::BookChapter => Some(DocumentType::BookChapter),
            Self::Monograph => Some(DocumentType::Monograph),
            Self::ConferencePaper => Some(DocumentType::ConferencePaper),
            Self::NoMatch => Some(DocumentType::NoMatch),
            Self::Other => None,
        }
    }

    pub fn is_science_article(self) -> bool {
        self == Self::ScienceArticle
    }

    pub fn as_str(&self) -> &'static str {
        match self.narrow() {
            Some(t) => t.as_str(),
            None => "other",
        }
    }

    /// Table code for the publication type column
    pub fn publish_type_code(self) -> Option<u8> {
        match self {
            Self::ScienceArticle => Some(0),
            Self::Book => Some(1),
            _ => None,
        }
    }
}

impl From<DocumentType> for ResolvedType {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::ScienceArticle => Self::ScienceArticle,
            DocumentType::Book => Self::Book,
            DocumentType::BookChapter => Self::BookChapter,
            DocumentType::Monograph => Self::Monograph,
            DocumentType::ConferencePaper => Self::ConferencePaper,
            DocumentType::NoMatch => Self::NoMatch,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a document reached its audience
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeansOfDissemination {
    PressMedia,
    ScienceMagazine,
    Blog,
    NotArticle,
    Other,
}

impl MeansOfDissemination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PressMedia => "press_media",
            Self::ScienceMagazine => "science_magazine",
            Self::Blog => "blog",
            Self::NotArticle => "not_article",
            Self::Other => "other",
        }
    }

    /// Table code for the dissemination column
    pub fn code(self) -> u8 {
        match self {
            Self::PressMedia => 0,
            Self::ScienceMagazine => 1,
            Self::Blog => 2,
            Self::NotArticle => 3,
            Self::Other => 4,
        }
    }
}

impl Choice for MeansOfDissemination {
    const NAME: &'static str = "MeansOfDissemination";

    fn variants() -> &'static [&'static str] {
        &["press_media", "science_magazine", "blog", "not_article", "other"]
    }
}

impl fmt::Display for MeansOfDissemination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which serial identifier a document carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Issn,
    Isbn,
}

impl IdentifierKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Issn => "ISSN",
            Self::Isbn => "ISBN",
        }
    }

    /// CrossRef key holding the type-tagged identifier list
    pub fn crossref_key(self) -> &'static str {
        match self {
            Self::Issn => "issn-type",
            Self::Isbn => "isbn-type",
        }
    }
}

/// Electronic and print ISSN (or ISBN) of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierPair {
    pub kind: IdentifierKind,
    pub electronic: Option<String>,
    pub print: Option<String>,
}

impl IdentifierPair {
    pub fn empty(kind: IdentifierKind) -> Self {
        Self {
            kind,
            electronic: None,
            print: None,
        }
    }

    /// `(electronic, print)`; electronic always comes first
    pub fn as_tuple(&self) -> (Option<&str>, Option<&str>) {
        (self.electronic.as_deref(), self.print.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.electronic.is_none() && self.print.is_none()
    }

    /// Serial type codes: print ISSN 0, electronic ISSN 1, print ISBN 2,
    /// electronic ISBN 3.
    pub fn serial_types(&self) -> Vec<u8> {
        let (print_code, electronic_code) = match self.kind {
            IdentifierKind::Issn => (0, 1),
            IdentifierKind::Isbn => (2, 3),
        };
        let mut codes = Vec::new();
        if self.print.is_some() {
            codes.push(print_code);
        }
        if self.electronic.is_some() {
            codes.push(electronic_code);
        }
        codes
    }
}

impl fmt::Display for IdentifierPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            self.electronic.as_deref().unwrap_or("None"),
            self.print.as_deref().unwrap_or("None")
        )
    }
}

/// Funding body and the award ids it granted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Funder {
    pub name: String,
    #[serde(default)]
    pub awards: Vec<String>,
}

impl fmt::Display for Funder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.awards.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}, {}", self.name, self.awards.join(", "))
        }
    }
}

/// Institution and place an author's affiliation points to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AffiliationOrigin {
    pub institution: String,
    pub place: String,
}

/// Reporting area and sub-area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArea {
    pub area: String,
    #[serde(default)]
    pub subarea: String,
}

/// Link column value in the table store's envelope shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlEnvelope {
    pub title: String,
    pub subline: String,
    #[serde(rename = "providerId")]
    pub provider_id: String,
    pub value: String,
}

impl UrlEnvelope {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: url.clone(),
            subline: "URL".to_string(),
            provider_id: "url".to_string(),
            value: url,
        }
    }

    /// Serialized envelope, as stored in the table
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
