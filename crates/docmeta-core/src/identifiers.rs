//! DOI normalization and discovery in free text

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DOI_CANONICAL: Regex = Regex::new(r"^10\.\d{4,9}/\S+$").unwrap();
    static ref DOI_IN_TEXT: Regex = Regex::new(r"(?i)\b10\.\d{4,9}/[^\s\x22<>]+").unwrap();
    static ref DOI_PREFIX: Regex =
        Regex::new(r"(?i)^(?:doi:\s*|https?://(?:dx\.)?doi\.org/)").unwrap();
}

/// Canonical `10.<prefix>/<suffix>` form of a DOI, or `None` when `raw` is
/// not a DOI.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_prefix = DOI_PREFIX.replace(trimmed, "");
    let cleaned = strip_trailing_punctuation(without_prefix.trim()).to_lowercase();

    if DOI_CANONICAL.is_match(&cleaned) {
        Some(cleaned)
    } else {
        None
    }
}

/// Every DOI mentioned in `text`, normalized, first occurrence first
pub fn find_dois(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for m in DOI_IN_TEXT.find_iter(text) {
        if let Some(doi) = normalize_doi(m.as_str()) {
            if !found.contains(&doi) {
                found.push(doi);
            }
        }
    }
    found
}

/// Resolver URL for a DOI
pub fn doi_url(doi: &str) -> String {
    format!("https://doi.org/{}", doi)
}

fn strip_trailing_punctuation(s: &str) -> &str {
    s.trim_end_matches(['.', ',', ';', ':', ')', ']', '\''])
}
