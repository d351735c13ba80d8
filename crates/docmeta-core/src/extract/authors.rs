//! Author affiliation analysis
//!
//! Internal/external partitioning and the international flag derive only
//! from affiliation names and places, never from other record fields.

use super::types::AffiliationOrigin;
use crate::config::InstitutionConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One listed author with their affiliations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    /// Full name when the source does not split given/family
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub affiliations: Vec<Affiliation>,
    /// Marked as the first (principal) author by the source
    #[serde(default)]
    pub principal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub name: String,
    #[serde(default)]
    pub places: Vec<String>,
}

impl Author {
    /// "Family G" when split names are known, else the full name
    pub fn display_name(&self) -> String {
        let family = self.family.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let initial = self
            .given
            .as_deref()
            .and_then(|g| g.trim().chars().next());

        match (family, initial) {
            (Some(family), Some(initial)) => format!("{} {}", family, initial),
            (Some(family), None) => family.to_string(),
            _ => self
                .name
                .clone()
                .or_else(|| self.given.clone())
                .unwrap_or_default()
                .trim()
                .to_string(),
        }
    }

    /// Any affiliation name equals the home institution exactly
    pub fn is_internal(&self, institution: &InstitutionConfig) -> bool {
        self.affiliations.iter().any(|aff| aff.name == institution.name)
    }
}

/// Disjoint split of an author list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorPartition {
    pub internal: Vec<Author>,
    pub external: Vec<Author>,
}

impl AuthorPartition {
    pub fn internal_names(&self) -> Vec<String> {
        self.internal.iter().map(Author::display_name).collect()
    }

    pub fn external_names(&self) -> Vec<String> {
        self.external.iter().map(Author::display_name).collect()
    }
}

/// Split `authors` into internal and external, preserving order
pub fn partition(authors: &[Author], institution: &InstitutionConfig) -> AuthorPartition {
    let (internal, external): (Vec<Author>, Vec<Author>) = authors
        .iter()
        .cloned()
        .partition(|author| author.is_internal(institution));
    AuthorPartition { internal, external }
}

/// The author flagged as principal, else the first listed
pub fn principal(authors: &[Author]) -> Option<&Author> {
    authors
        .iter()
        .find(|author| author.principal)
        .or_else(|| authors.first())
}

/// Whether the principal author is external; `None` without authors
pub fn principal_is_external(authors: &[Author], institution: &InstitutionConfig) -> Option<bool> {
    principal(authors).map(|author| !author.is_internal(institution))
}

/// True when any affiliation place lies outside the home country
pub fn has_international_affiliation(authors: &[Author], institution: &InstitutionConfig) -> bool {
    let country = institution.country.to_lowercase();
    authors
        .iter()
        .flat_map(|author| author.affiliations.iter())
        .flat_map(|aff| aff.places.iter())
        .any(|place| !place.to_lowercase().contains(&country))
}

/// Distinct (institution, place) pairs of the external authors
pub fn external_origins(authors: &[Author], institution: &InstitutionConfig) -> Vec<AffiliationOrigin> {
    let origins: BTreeSet<AffiliationOrigin> = authors
        .iter()
        .filter(|author| !author.is_internal(institution))
        .flat_map(|author| author.affiliations.iter())
        .flat_map(|aff| {
            aff.places.iter().map(move |place| AffiliationOrigin {
                institution: aff.name.clone(),
                place: place.clone(),
            })
        })
        .collect();
    origins.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn home() -> InstitutionConfig {
        InstitutionConfig {
            name: "Universidad de La Habana".to_string(),
            country: "cuba".to_string(),
        }
    }

    fn author(family: &str, affiliation: &str, place: &str, principal: bool) -> Author {
        Author {
            given: Some("Ana".to_string()),
            family: Some(family.to_string()),
            name: None,
            affiliations: vec![Affiliation {
                name: affiliation.to_string(),
                places: if place.is_empty() {
                    vec![]
                } else {
                    vec![place.to_string()]
                },
            }],
            principal,
        }
    }

    #[test]
    fn test_partition_by_exact_affiliation() {
        let authors = vec![
            author("Pérez", "Universidad de La Habana", "La Habana, Cuba", true),
            author("Smith", "MIT", "Cambridge, USA", false),
            author("Díaz", "Universidad de la Habana", "Cuba", false),
        ];
        let split = partition(&authors, &home());
        assert_eq!(split.internal_names(), vec!["Pérez A"]);
        assert_eq!(split.external_names(), vec!["Smith A", "Díaz A"]);
    }

    #[test]
    fn test_principal_flag() {
        let authors = vec![
            author("Smith", "MIT", "USA", false),
            author("Pérez", "Universidad de La Habana", "Cuba", true),
        ];
        assert_eq!(principal_is_external(&authors, &home()), Some(false));

        let authors = vec![author("Smith", "MIT", "USA", false)];
        assert_eq!(principal_is_external(&authors, &home()), Some(true));

        assert_eq!(principal_is_external(&[], &home()), None);
    }

    #[test]
    fn test_international_and_origins() {
        let authors = vec![
            author("Pérez", "Universidad de La Habana", "La Habana, Cuba", true),
            author("Smith", "MIT", "Cambridge, USA", false),
            author("Jones", "MIT", "Cambridge, USA", false),
        ];
        assert!(has_international_affiliation(&authors, &home()));
        assert_eq!(
            external_origins(&authors, &home()),
            vec![AffiliationOrigin {
                institution: "MIT".to_string(),
                place: "Cambridge, USA".to_string(),
            }]
        );

        let local = vec![author("Pérez", "Universidad de La Habana", "Cuba", true)];
        assert!(!has_international_affiliation(&local, &home()));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let full = Author {
            given: None,
            family: None,
            name: Some("Consortium X".to_string()),
            affiliations: vec![],
            principal: false,
        };
        assert_eq!(full.display_name(), "Consortium X");
    }

    fn arb_author() -> impl Strategy<Value = Author> {
        (
            "[A-Z][a-z]{1,8}",
            prop::collection::vec(
                prop_oneof![
                    Just("Universidad de La Habana".to_string()),
                    Just("MIT".to_string()),
                    "[A-Za-z ]{1,12}",
                ],
                0..3,
            ),
            any::<bool>(),
        )
            .prop_map(|(family, affs, principal)| Author {
                given: Some("X".to_string()),
                family: Some(family),
                name: None,
                affiliations: affs
                    .into_iter()
                    .map(|name| Affiliation {
                        name,
                        places: vec![],
                    })
                    .collect(),
                principal,
            })
    }

    proptest! {
        #[test]
        fn prop_partition_is_complete_and_disjoint(authors in prop::collection::vec(arb_author(), 1..12)) {
            let split = partition(&authors, &home());
            prop_assert_eq!(split.internal.len() + split.external.len(), authors.len());
            for a in &split.internal {
                prop_assert!(a.is_internal(&home()));
                prop_assert!(!split.external.contains(a));
            }
            for a in &split.external {
                prop_assert!(!a.is_internal(&home()));
            }
            for a in &authors {
                prop_assert!(split.internal.contains(a) || split.external.contains(a));
            }
        }
    }
}
