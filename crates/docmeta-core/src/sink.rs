//! Nextcloud Tables record sink

use crate::config::TableStoreConfig;
use crate::error::{DocMetaError, Result};
use crate::extract::ExtractedRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Column ids of the publications table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// The stock table has no DOI column
    pub doi: Option<u32>,
    pub title: u32,
    pub publish_type: u32,
    pub publish_group: u32,
    pub year: u32,
    pub external_authors: u32,
    pub editorial: u32,
    pub serial_type: u32,
    pub identifiers: u32,
    pub country_published: u32,
    pub url: u32,
    pub is_international: u32,
    pub origin_external_authors: u32,
    pub is_external_principal_author: u32,
    pub means_of_dissemination: u32,
    pub report_area: u32,
    pub internal_authors: u32,
    pub quartile: u32,
    pub science_network: u32,
    pub founders: u32,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            doi: None,
            title: 145,
            publish_type: 146,
            publish_group: 147,
            year: 148,
            external_authors: 150,
            editorial: 151,
            serial_type: 152,
            identifiers: 153,
            country_published: 154,
            url: 155,
            is_international: 156,
            origin_external_authors: 157,
            is_external_principal_author: 158,
            means_of_dissemination: 159,
            report_area: 160,
            internal_authors: 175,
            quartile: 534,
            science_network: 535,
            founders: 536,
        }
    }
}

/// Appends extracted records as rows of one table
pub struct TableSink {
    http_client: reqwest::Client,
    base_url: String,
    table_name: String,
    username: Option<String>,
    password: Option<String>,
    columns: ColumnMap,
}

impl TableSink {
    pub fn from_config(config: &TableStoreConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(DocMetaError::Http)?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            table_name: config.table_name.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            columns: config.columns,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/index.php/apps/tables/api/1/{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .http_client
            .request(method, url)
            .header("OCS-APIRequest", "true")
            .header("Accept", "application/json");
        if let Some(ref user) = self.username {
            request = request.basic_auth(user, self.password.as_ref());
        }
        request
    }

    /// Id of the table whose title matches the configured name
    pub async fn table_id(&self) -> Result<u64> {
        let url = self.api_url("tables");
        let response = self.request(reqwest::Method::GET, &url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocMetaError::ExternalError(format!(
                "table listing failed (HTTP {}): {}",
                status, body
            )));
        }

        let tables: Vec<Value> = response.json().await?;
        tables
            .iter()
            .find(|table| table["title"].as_str() == Some(self.table_name.as_str()))
            .and_then(|table| table["id"].as_u64())
            .ok_or_else(|| DocMetaError::NotFound(format!("table '{}'", self.table_name)))
    }

    /// Post `record` as a new row and return the created row
    pub async fn upload(&self, record: &ExtractedRecord) -> Result<Value> {
        let table_id = self.table_id().await?;

        let data: Map<String, Value> = record
            .to_columns(&self.columns)
            .into_iter()
            .map(|cell| (cell.column_id.to_string(), cell.value))
            .collect();
        tracing::info!("Uploading {} cells to table {}", data.len(), table_id);

        let url = self.api_url(&format!("tables/{}/rows", table_id));
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(&serde_json::json!({ "data": data }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DocMetaError::ExternalError(format!(
                "row upload failed (HTTP {}): {}",
                status, body
            )));
        }
        Ok(response.json().await?)
    }
}
