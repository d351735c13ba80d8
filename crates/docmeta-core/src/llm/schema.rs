//! Answer schemas for structured model queries
//!
//! A structured query pairs a question with a [`Schema`] descriptor. The
//! model's reply is parsed into the matching [`StructuredAnswer`] type and
//! validated; a reply that fails either step is a
//! [`DocMetaError::SchemaValidation`], never a silently coerced value.

use crate::error::{DocMetaError, Result};
use chrono::Datelike;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};

/// Earliest publication year accepted from a model answer
pub const MIN_YEAR: i32 = 1990;

/// JSON schema descriptor sent along with a question
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    json: Value,
}

impl Schema {
    pub fn new(name: impl Into<String>, json: Value) -> Self {
        Self {
            name: name.into(),
            json,
        }
    }

    /// Object schema with a single required `result` property
    pub fn single_result(name: impl Into<String>, result: Value) -> Self {
        Self::new(
            name,
            json!({
                "type": "object",
                "properties": { "result": result },
                "required": ["result"],
            }),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn json(&self) -> &Value {
        &self.json
    }

    /// Only object schemas with declared properties describe a structured value.
    pub fn ensure_structured(&self) -> Result<()> {
        let is_object = self.json.get("type").and_then(Value::as_str) == Some("object");
        let has_properties = self
            .json
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|props| !props.is_empty());

        if is_object && has_properties {
            Ok(())
        } else {
            Err(DocMetaError::Contract(format!(
                "schema {} is not a structured object definition",
                self.name
            )))
        }
    }
}

/// A typed answer the model can be asked for
pub trait StructuredAnswer: DeserializeOwned + Send + 'static {
    /// Schema sent with the question
    fn schema() -> Schema;

    /// Semantic checks beyond what deserialization enforces
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Parse and validate a raw model reply against `T`
pub fn parse_answer<T: StructuredAnswer>(response: &str) -> Result<T> {
    let schema = T::schema();

    // Models sometimes wrap JSON in code fences or chatter
    let json_str = match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => {
            return Err(DocMetaError::schema(
                schema.name(),
                format!("no JSON object in response: {:?}", truncate(response, 120)),
            ))
        }
    };

    let answer: T = serde_json::from_str(json_str)
        .map_err(|e| DocMetaError::schema(schema.name(), e.to_string()))?;

    answer
        .validate()
        .map_err(|reason| DocMetaError::schema(schema.name(), reason))?;

    Ok(answer)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Free-text answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnswer {
    pub result: String,
}

impl StructuredAnswer for TextAnswer {
    fn schema() -> Schema {
        Schema::single_result("TextAnswer", json!({ "type": "string" }))
    }
}

/// Two-valued answer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BooleanAnswer {
    pub result: bool,
}

impl StructuredAnswer for BooleanAnswer {
    fn schema() -> Schema {
        Schema::single_result("BooleanAnswer", json!({ "type": "boolean" }))
    }
}

/// Publication year, `null` when the document states none
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearAnswer {
    /// Required; only an explicit `null` means no year
    #[serde(deserialize_with = "required_nullable")]
    pub result: Option<i32>,
}

/// `Option` field that must be present. With `deserialize_with` serde stops
/// defaulting a missing field to `None`.
fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i32>::deserialize(deserializer)
}

impl YearAnswer {
    /// Range check against an explicit upper bound
    pub fn check_range(&self, current_year: i32) -> std::result::Result<(), String> {
        match self.result {
            Some(year) if !(MIN_YEAR..=current_year).contains(&year) => Err(format!(
                "year {} outside [{}, {}]",
                year, MIN_YEAR, current_year
            )),
            _ => Ok(()),
        }
    }
}

impl StructuredAnswer for YearAnswer {
    fn schema() -> Schema {
        Schema::single_result(
            "YearAnswer",
            json!({
                "type": ["integer", "null"],
                "minimum": MIN_YEAR,
                "maximum": current_year(),
            }),
        )
    }

    fn validate(&self) -> std::result::Result<(), String> {
        self.check_range(current_year())
    }
}

pub(crate) fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// Closed enumeration a model answer must pick exactly one member of
pub trait Choice: DeserializeOwned + Send + Copy + 'static {
    /// Schema name
    const NAME: &'static str;

    /// Wire names of every member, as serde spells them
    fn variants() -> &'static [&'static str];
}

/// Answer restricted to one member of `E`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ChoiceAnswer<E> {
    pub result: E,
}

impl<E: Choice> StructuredAnswer for ChoiceAnswer<E> {
    fn schema() -> Schema {
        Schema::single_result(E::NAME, json!({ "type": "string", "enum": E::variants() }))
    }
}
