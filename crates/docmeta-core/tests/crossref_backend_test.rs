//! CrossRef backend against a mocked CrossRef API
//!
//! Covers:
//! 1. A book with one internal and one external author
//! 2. Means of dissemination for articles with and without ISSNs
//! 3. issn-type vs isbn-type selection by document type
//! 4. Country sentinels and editorial lookup through the journal endpoint
//! 5. Transport failures on the member and journal hops
//! 6. DOIs carrying URL delimiters

use docmeta_core::config::{CrossRefConfig, InstitutionConfig};
use docmeta_core::extract::AffiliationOrigin;
use docmeta_core::{
    CrossRefClient, CrossRefExtractor, DocumentExtractor, IdentifierKind, MeansOfDissemination,
    ResolvedType,
};
use mockito::{Mock, ServerGuard};
use serde_json::{json, Value};

async fn mock_work(server: &mut ServerGuard, doi: &str, work: Value) -> Mock {
    server
        .mock("GET", format!("/works/{}", doi).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "status": "ok", "message": work }).to_string())
        .create_async()
        .await
}

async fn extractor(server: &ServerGuard, doi: &str) -> CrossRefExtractor {
    let client = CrossRefClient::new(&CrossRefConfig {
        base_url: server.url(),
        mailto: None,
        timeout_secs: 5,
    })
    .unwrap();
    CrossRefExtractor::new(doi, client, InstitutionConfig::default())
        .await
        .unwrap()
}

fn book_work() -> Value {
    json!({
        "DOI": "10.1000/book.1",
        "type": "book",
        "title": ["Numerical Methods"],
        "publisher": "Editorial Universitaria",
        "member": "http://id.crossref.org/member/4321",
        "URL": "https://doi.org/10.1000/book.1",
        "issued": { "date-parts": [[2021, 3]] },
        "isbn-type": [
            { "type": "electronic", "value": "978-959-7000-00-1" },
            { "type": "print", "value": "978-959-7000-00-2" }
        ],
        "author": [
            {
                "given": "Ana", "family": "Pérez", "sequence": "first",
                "affiliation": [{ "name": "Universidad de La Habana", "place": ["La Habana, Cuba"] }]
            },
            {
                "given": "John", "family": "Smith", "sequence": "additional",
                "affiliation": [{ "name": "MIT", "place": ["Cambridge, USA"] }]
            }
        ],
        "funder": [{ "name": "CITMA", "award": ["PN-221"] }]
    })
}

#[tokio::test]
async fn test_book_with_internal_and_external_author() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(&mut server, "10.1000/book.1", book_work()).await;
    let _m = server
        .mock("GET", "/members/4321")
        .with_status(200)
        .with_body(r#"{"message": {"location": "Cuba", "primary-name": "EU"}}"#)
        .create_async()
        .await;

    let crossref = extractor(&server, "10.1000/book.1").await;

    assert_eq!(crossref.document_type().await.unwrap(), Some(ResolvedType::Book));
    assert_eq!(
        crossref.internal_authors().await.unwrap(),
        Some(vec!["Pérez A".to_string()])
    );
    assert_eq!(
        crossref.external_authors().await.unwrap(),
        Some(vec!["Smith J".to_string()])
    );
    assert_eq!(crossref.is_external_principal_author().await.unwrap(), Some(false));
    assert_eq!(crossref.is_international().await.unwrap(), Some(true));
    assert_eq!(
        crossref.origin_external_authors().await.unwrap(),
        Some(vec![AffiliationOrigin {
            institution: "MIT".to_string(),
            place: "Cambridge, USA".to_string(),
        }])
    );

    let pair = crossref.issns_or_isbn().await.unwrap().unwrap();
    assert_eq!(pair.kind, IdentifierKind::Isbn);
    assert_eq!(
        pair.as_tuple(),
        (Some("978-959-7000-00-1"), Some("978-959-7000-00-2"))
    );
    assert_eq!(crossref.serial_type().await.unwrap(), Some(vec![2, 3]));

    assert_eq!(
        crossref.means_of_dissemination().await.unwrap(),
        Some(MeansOfDissemination::NotArticle)
    );
    assert_eq!(crossref.year().await.unwrap(), Some(2021));
    assert_eq!(crossref.publish_type().await.unwrap(), Some(1));
    assert_eq!(crossref.country_published().await.unwrap().as_deref(), Some("Cuba"));
    // no ISSN, so the work's own publisher
    assert_eq!(
        crossref.editorial().await.unwrap().as_deref(),
        Some("Editorial Universitaria")
    );
    assert_eq!(crossref.science_network().await.unwrap(), None);
    assert_eq!(crossref.quartile().await.unwrap(), None);
    assert_eq!(crossref.report_area().await.unwrap(), None);

    let record = crossref.extract().await.unwrap().unwrap();
    assert_eq!(record.backend, "crossref");
    assert_eq!(record.doi.as_deref(), Some("10.1000/book.1"));
    assert_eq!(record.title.as_deref(), Some("Numerical Methods"));
    assert_eq!(record.founders.unwrap()[0].awards, vec!["PN-221"]);
    assert_eq!(
        record.url.unwrap().value,
        "https://doi.org/10.1000/book.1"
    );
}

#[tokio::test]
async fn test_article_identifiers_and_dissemination() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(
        &mut server,
        "10.1000/art.1",
        json!({
            "type": "journal-article",
            "ISSN": ["1234-5678"],
            "issn-type": [
                { "type": "print", "value": "1234-5678" },
                { "type": "electronic", "value": "8765-4321" }
            ],
            "isbn-type": [{ "type": "print", "value": "978-0-00-000000-0" }]
        }),
    )
    .await;
    let _m = mock_work(
        &mut server,
        "10.1000/art.2",
        json!({ "type": "journal-article", "issn-type": [{ "type": "online", "value": "x" }] }),
    )
    .await;
    let _m = server
        .mock("GET", "/journals/1234-5678")
        .with_status(200)
        .with_body(r#"{"message": {"publisher": "Elsevier"}}"#)
        .create_async()
        .await;

    let with_issn = extractor(&server, "10.1000/art.1").await;
    let pair = with_issn.issns_or_isbn().await.unwrap().unwrap();
    assert_eq!(pair.kind, IdentifierKind::Issn);
    assert_eq!(pair.as_tuple(), (Some("8765-4321"), Some("1234-5678")));
    assert_eq!(
        with_issn.means_of_dissemination().await.unwrap(),
        Some(MeansOfDissemination::ScienceMagazine)
    );
    assert_eq!(with_issn.editorial().await.unwrap().as_deref(), Some("Elsevier"));
    assert_eq!(with_issn.publish_type().await.unwrap(), Some(0));

    // unmatched type tags leave both slots unset
    let without_issn = extractor(&server, "10.1000/art.2").await;
    assert!(without_issn.issns_or_isbn().await.unwrap().unwrap().is_empty());
    assert_eq!(
        without_issn.means_of_dissemination().await.unwrap(),
        Some(MeansOfDissemination::Other)
    );
    assert_eq!(without_issn.serial_type().await.unwrap(), None);
}

#[tokio::test]
async fn test_country_sentinels() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(&mut server, "10.1000/a", json!({ "type": "other" })).await;
    let _m = mock_work(&mut server, "10.1000/b", json!({ "type": "other", "member": "77" })).await;
    let _m = mock_work(&mut server, "10.1000/c", json!({ "type": "other", "member": "78" })).await;
    let _m = server
        .mock("GET", "/members/77")
        .with_status(404)
        .create_async()
        .await;
    let _m = server
        .mock("GET", "/members/78")
        .with_status(200)
        .with_body(r#"{"message": {"primary-name": "No Location Press"}}"#)
        .create_async()
        .await;

    let no_member = extractor(&server, "10.1000/a").await;
    assert_eq!(
        no_member.country_published().await.unwrap().as_deref(),
        Some("member id not found")
    );
    assert_eq!(no_member.document_type().await.unwrap(), Some(ResolvedType::Other));

    let unknown_member = extractor(&server, "10.1000/b").await;
    assert_eq!(
        unknown_member.country_published().await.unwrap().as_deref(),
        Some("member information not found")
    );

    let no_location = extractor(&server, "10.1000/c").await;
    assert_eq!(
        no_location.country_published().await.unwrap().as_deref(),
        Some("country not available")
    );
}

#[tokio::test]
async fn test_missing_sub_fields_are_absent() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(&mut server, "10.1000/bare", json!({ "type": "book" })).await;

    let bare = extractor(&server, "10.1000/bare").await;
    assert_eq!(bare.title().await.unwrap(), None);
    assert_eq!(bare.internal_authors().await.unwrap(), None);
    assert_eq!(bare.is_external_principal_author().await.unwrap(), None);
    assert_eq!(bare.year().await.unwrap(), None);
    assert_eq!(bare.founders().await.unwrap(), None);
    assert_eq!(
        bare.url().await.unwrap().unwrap().value,
        "https://doi.org/10.1000/bare"
    );
}

#[tokio::test]
async fn test_construction_fails_when_work_unavailable() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/works/10.1000/gone")
        .with_status(404)
        .create_async()
        .await;

    let client = CrossRefClient::new(&CrossRefConfig {
        base_url: server.url(),
        mailto: None,
        timeout_secs: 5,
    })
    .unwrap();
    let result = CrossRefExtractor::new("10.1000/gone", client, InstitutionConfig::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_member_body_not_json_gives_absent_country() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(&mut server, "10.1000/m", json!({ "type": "other", "member": "90" })).await;
    let _m = server
        .mock("GET", "/members/90")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let crossref = extractor(&server, "10.1000/m").await;
    assert_eq!(crossref.country_published().await.unwrap(), None);
}

#[tokio::test]
async fn test_journal_failure_falls_back_to_work_publisher() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(
        &mut server,
        "10.1000/j",
        json!({
            "type": "journal-article",
            "ISSN": ["2222-3333"],
            "publisher": "Work Publisher"
        }),
    )
    .await;
    let _m = server
        .mock("GET", "/journals/2222-3333")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let crossref = extractor(&server, "10.1000/j").await;
    assert_eq!(
        crossref.editorial().await.unwrap().as_deref(),
        Some("Work Publisher")
    );
}

#[tokio::test]
async fn test_doi_with_fragment_delimiter_fetches_its_own_work() {
    let mut server = mockito::Server::new_async().await;
    let _m = mock_work(&mut server, "10.1000/abc", json!({ "title": ["WRONG WORK"] })).await;
    let _m = mock_work(&mut server, "10.1000/abc%23frag", json!({ "title": ["Right Work"] })).await;

    let crossref = extractor(&server, "10.1000/abc#frag").await;
    assert_eq!(crossref.doi().await.unwrap().as_deref(), Some("10.1000/abc#frag"));
    assert_eq!(crossref.title().await.unwrap().as_deref(), Some("Right Work"));
}
