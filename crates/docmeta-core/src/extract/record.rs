//! Normalized extraction record

use super::types::{
    AffiliationOrigin, Funder, IdentifierPair, MeansOfDissemination, ReportArea, ResolvedType,
    UrlEnvelope,
};
use crate::sink::ColumnMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Every field a backend can produce; `None` means unknown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Backend that produced the record
    pub backend: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub document_type: Option<ResolvedType>,
    pub internal_authors: Option<Vec<String>>,
    pub external_authors: Option<Vec<String>>,
    pub is_external_principal_author: Option<bool>,
    pub editorial: Option<String>,
    pub identifiers: Option<IdentifierPair>,
    pub country_published: Option<String>,
    pub url: Option<UrlEnvelope>,
    pub science_network: Option<String>,
    pub founders: Option<Vec<Funder>>,
    pub year: Option<i32>,
    pub publish_type: Option<u8>,
    pub publish_group: Option<u8>,
    pub serial_type: Option<Vec<u8>>,
    pub is_international: Option<bool>,
    pub origin_external_authors: Option<Vec<AffiliationOrigin>>,
    pub means_of_dissemination: Option<MeansOfDissemination>,
    pub quartile: Option<u8>,
    pub report_area: Option<ReportArea>,
}

/// One cell of a table row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    #[serde(rename = "columnId")]
    pub column_id: u32,
    pub value: Value,
}

impl ExtractedRecord {
    /// No field was determined
    pub fn is_empty(&self) -> bool {
        let without_backend = ExtractedRecord {
            backend: String::new(),
            ..self.clone()
        };
        without_backend == ExtractedRecord::default()
    }

    /// Column-tagged values for the table store; unknown fields are skipped
    pub fn to_columns(&self, columns: &ColumnMap) -> Vec<ColumnValue> {
        let mut cells = Vec::new();
        let mut push = |column_id: Option<u32>, value: Option<Value>| {
            if let (Some(column_id), Some(value)) = (column_id, value) {
                cells.push(ColumnValue { column_id, value });
            }
        };

        push(columns.doi, self.doi.as_ref().map(|d| json!(d)));
        push(Some(columns.title), self.title.as_ref().map(|t| json!(t)));
        push(
            Some(columns.external_authors),
            self.external_authors.as_ref().map(|a| json!(a.join(", "))),
        );
        push(Some(columns.editorial), self.editorial.as_ref().map(|e| json!(e)));
        push(
            Some(columns.identifiers),
            self.identifiers
                .as_ref()
                .filter(|pair| !pair.is_empty())
                .map(|pair| json!(pair.to_string())),
        );
        push(
            Some(columns.country_published),
            self.country_published.as_ref().map(|c| json!(c)),
        );
        push(
            Some(columns.url),
            self.url.as_ref().map(|u| json!(u.to_json_string())),
        );
        push(
            Some(columns.internal_authors),
            self.internal_authors.as_ref().map(|a| json!(a.join(", "))),
        );
        push(
            Some(columns.science_network),
            self.science_network.as_ref().map(|s| json!(s)),
        );
        push(
            Some(columns.founders),
            self.founders.as_ref().map(|funders| {
                json!(funders
                    .iter()
                    .map(Funder::to_string)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }),
        );
        push(Some(columns.year), self.year.map(|y| json!(y)));
        push(Some(columns.publish_type), self.publish_type.map(|t| json!(t)));
        push(Some(columns.publish_group), self.publish_group.map(|g| json!(g)));
        push(
            Some(columns.serial_type),
            self.serial_type.as_ref().map(|codes| json!(codes)),
        );
        push(
            Some(columns.is_international),
            self.is_international.map(|b| json!(u8::from(b))),
        );
        push(
            Some(columns.origin_external_authors),
            self.origin_external_authors.as_ref().map(|origins| {
                json!(origins
                    .iter()
                    .map(|o| format!("{} ({})", o.institution, o.place))
                    .collect::<Vec<_>>()
                    .join("; "))
            }),
        );
        push(
            Some(columns.is_external_principal_author),
            self.is_external_principal_author.map(|b| json!(u8::from(b))),
        );
        push(
            Some(columns.means_of_dissemination),
            self.means_of_dissemination.map(|m| json!(m.code())),
        );
        push(Some(columns.quartile), self.quartile.map(|q| json!(q)));
        push(
            Some(columns.report_area),
            self.report_area.as_ref().map(|area| {
                let display = if area.subarea.is_empty() {
                    area.area.clone()
                } else {
                    format!("{} / {}", area.area, area.subarea)
                };
                json!([{ "id": area.area, "type": 1, "displayName": display }])
            }),
        );

        cells
    }
}
