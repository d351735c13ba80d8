//! CrossRef REST API client

use crate::config::CrossRefConfig;
use crate::error::{DocMetaError, Result};
use serde_json::Value;
use std::time::Duration;

/// Thin client over the CrossRef endpoints the extractor needs.
///
/// Every call returns the `message` object of the response envelope.
pub struct CrossRefClient {
    http_client: reqwest::Client,
    base_url: String,
    mailto: Option<String>,
}

impl CrossRefClient {
    /// Create new client from configuration
    pub fn new(config: &CrossRefConfig) -> Result<Self> {
        let user_agent = match &config.mailto {
            Some(email) => format!("docmeta/{} (mailto:{})", crate::VERSION, email),
            None => format!("docmeta/{}", crate::VERSION),
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(DocMetaError::Http)?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            mailto: config.mailto.clone(),
        })
    }

    /// `GET /works/{doi}`
    pub async fn work(&self, doi: &str) -> Result<Value> {
        self.get_message(&format!("works/{}", doi_path(doi))).await
    }

    /// `GET /members/{id}`
    pub async fn member(&self, member_id: &str) -> Result<Value> {
        self.get_message(&format!("members/{}", urlencoding::encode(member_id)))
            .await
    }

    /// `GET /journals/{issn}`
    pub async fn journal(&self, issn: &str) -> Result<Value> {
        self.get_message(&format!("journals/{}", urlencoding::encode(issn)))
            .await
    }

    /// DOI of the best `query.title` match, if any
    pub async fn search_title(&self, title: &str) -> Result<Option<String>> {
        let url = format!("{}/works", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("query.title", title), ("rows", "1")];
        if let Some(ref mailto) = self.mailto {
            query.push(("mailto", mailto));
        }

        let message = self.send(self.http_client.get(&url).query(&query), &url).await?;
        Ok(message["items"]
            .as_array()
            .and_then(|items| items.first())
            .and_then(|item| item["DOI"].as_str())
            .map(|doi| doi.to_string()))
    }

    async fn get_message(&self, path: &str) -> Result<Value> {
        let url = format!("{}/{}", self.base_url, path);
        self.send(self.http_client.get(&url), &url).await
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DocMetaError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocMetaError::ExternalError(format!(
                "CrossRef error (HTTP {}) for {}: {}",
                status, url, body
            )));
        }

        let mut body: Value = response.json().await?;
        match body.get_mut("message") {
            Some(message) => Ok(message.take()),
            None => Err(DocMetaError::Parse(format!(
                "CrossRef response for {} has no message",
                url
            ))),
        }
    }
}

/// DOI as URL path segments; the prefix/suffix slash stays, anything that
/// would end the path (`#`, `?`, `%`, spaces) is percent-encoded
fn doi_path(doi: &str) -> String {
    doi.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Member id from a CrossRef `member` value, which may be a bare id or a URL
pub fn member_id(member: &Value) -> Option<String> {
    let raw = match member {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    raw.trim_end_matches('/')
        .rsplit('/')
        .next()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(url: &str) -> CrossRefClient {
        CrossRefClient::new(&CrossRefConfig {
            base_url: url.to_string(),
            mailto: Some("lib@example.org".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_doi_path_keeps_slashes_and_encodes_delimiters() {
        assert_eq!(doi_path("10.1000/182"), "10.1000/182");
        assert_eq!(doi_path("10.1000/abc#frag"), "10.1000/abc%23frag");
        assert_eq!(doi_path("10.1002/(sici)1097?x"), "10.1002/%28sici%291097%3Fx");
        assert_eq!(doi_path("10.1000/a/b c"), "10.1000/a/b%20c");
    }

    #[tokio::test]
    async fn test_work_fetches_the_whole_doi() {
        let mut server = mockito::Server::new_async().await;
        let _truncated = server
            .mock("GET", "/works/10.1000/abc")
            .with_status(200)
            .with_body(r#"{"message": {"title": ["WRONG WORK"]}}"#)
            .create_async()
            .await;
        let _full = server
            .mock("GET", "/works/10.1000/abc%23frag")
            .with_status(200)
            .with_body(r#"{"message": {"title": ["Right Work"]}}"#)
            .create_async()
            .await;

        let work = client(&server.url()).work("10.1000/abc#frag").await.unwrap();
        assert_eq!(work["title"][0], "Right Work");
    }

    #[test]
    fn test_member_id_forms() {
        assert_eq!(member_id(&json!("78")), Some("78".to_string()));
        assert_eq!(
            member_id(&json!("http://id.crossref.org/member/78")),
            Some("78".to_string())
        );
        assert_eq!(member_id(&json!(311)), Some("311".to_string()));
        assert_eq!(member_id(&json!("")), None);
        assert_eq!(member_id(&Value::Null), None);
    }

    #[tokio::test]
    async fn test_work_returns_message() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/works/10.1000/182")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"ok","message":{"DOI":"10.1000/182","type":"book"}}"#)
            .create_async()
            .await;

        let work = client(&server.url()).work("10.1000/182").await.unwrap();
        assert_eq!(work["type"], "book");
    }

    #[tokio::test]
    async fn test_missing_work_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/works/10.1000/missing")
            .with_status(404)
            .with_body("Resource not found.")
            .create_async()
            .await;

        let err = client(&server.url())
            .work("10.1000/missing")
            .await
            .unwrap_err();
        assert!(matches!(err, DocMetaError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_title_first_hit() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/works")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query.title".into(), "Deep learning".into()),
                mockito::Matcher::UrlEncoded("rows".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"message":{"items":[{"DOI":"10.1038/nature14539"}]}}"#)
            .create_async()
            .await;

        let doi = client(&server.url())
            .search_title("Deep learning")
            .await
            .unwrap();
        assert_eq!(doi.as_deref(), Some("10.1038/nature14539"));
    }
}
