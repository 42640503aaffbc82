//! LLM-backed field extraction.
//!
//! Sends recognized text to an OpenAI-compatible chat-completions endpoint
//! and maps the reply JSON into a record through the same date and weight
//! normalization the rule parser uses. One best-effort attempt; quota
//! exhaustion is surfaced as its own error so the caller can fall back to
//! rules.

use reqwest::Client;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BolcrError, RecognitionError};
use crate::models::config::{DateFormat, ExtractionConfig, LlmConfig};
use crate::models::record::{BolRecord, FreightLine, Weight, WeightUnit};
use crate::source::remote::classify_api_error;

use super::rules::dates::parse_date_token;
use super::validate::validate;

const SYSTEM_PROMPT: &str = "Extract Bill of Lading fields from OCR text. Return ONLY valid \
JSON with keys: bol_number, pro_number, ship_date, delivery_date, carrier {name, scac}, \
freight_lines [{description, quantity, package_type, weight, weight_unit}], total_weight, \
weight_unit, total_packages. Use null when unsure.";

/// LLM field extractor.
pub struct LlmParser {
    client: Client,
    config: LlmConfig,
    formats: Vec<DateFormat>,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Field schema the model is asked to fill.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmFields {
    bol_number: Option<String>,
    pro_number: Option<String>,
    ship_date: Option<String>,
    delivery_date: Option<String>,
    carrier: Option<LlmCarrier>,
    freight_lines: Vec<LlmFreightLine>,
    total_weight: Option<f64>,
    weight_unit: Option<String>,
    total_packages: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmCarrier {
    name: Option<String>,
    scac: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmFreightLine {
    description: Option<String>,
    quantity: Option<f64>,
    package_type: Option<String>,
    weight: Option<f64>,
    weight_unit: Option<String>,
}

impl LlmParser {
    pub fn new(extraction: &ExtractionConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: std::env::var(&extraction.llm.api_key_env).ok(),
            config: extraction.llm.clone(),
            formats: extraction.date_formats.clone(),
        }
    }

    /// Extract a record by asking the configured model for structured JSON.
    pub async fn parse(&self, text: &str) -> Result<BolRecord, BolcrError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            RecognitionError::Unavailable(format!(
                "set the {} environment variable",
                self.config.api_key_env
            ))
        })?;

        // Trimming long OCR blobs keeps the request small; BOL headers sit
        // on the first page anyway.
        let trimmed: String = text.chars().take(self.config.max_text_chars).collect();

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: trimmed,
                },
            ],
            temperature: 0.0,
        };

        debug!(model = %self.config.model, "requesting LLM field extraction");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(RecognitionError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(RecognitionError::Http)?;

        if !status.is_success() {
            return Err(classify_api_error(status, &body).into());
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RecognitionError::Response(e.to_string()))?;
        let content = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content)
            .ok_or_else(|| RecognitionError::Response("no choices in engine reply".to_string()))?;

        let value = coerce_json(&content)?;
        let fields: LlmFields = serde_json::from_value(value)
            .map_err(|e| RecognitionError::Response(e.to_string()))?;

        let record = map_fields(fields, text, &self.formats)?;
        Ok(record)
    }
}

/// Pull a JSON object out of a reply that may wrap it in prose or fences.
fn coerce_json(s: &str) -> Result<serde_json::Value, RecognitionError> {
    if let Ok(value) = serde_json::from_str(s) {
        return Ok(value);
    }
    let (Some(start), Some(end)) = (s.find('{'), s.rfind('}')) else {
        return Err(RecognitionError::Response(
            "no JSON object in engine reply".to_string(),
        ));
    };
    if end <= start {
        return Err(RecognitionError::Response(
            "no JSON object in engine reply".to_string(),
        ));
    }
    serde_json::from_str(&s[start..=end]).map_err(|e| RecognitionError::Response(e.to_string()))
}

/// Map the model's schema into a validated record.
fn map_fields(
    fields: LlmFields,
    raw_text: &str,
    formats: &[DateFormat],
) -> Result<BolRecord, BolcrError> {
    let mut record = BolRecord {
        raw_text: raw_text.to_string(),
        ..Default::default()
    };

    record.document_number = non_empty(fields.bol_number);
    record.pro_number = non_empty(fields.pro_number);

    if let Some(raw) = non_empty(fields.ship_date) {
        match parse_date_token(&raw, formats) {
            Some(date) => record.ship_date = Some(date),
            None => record
                .warnings
                .push(format!("unparseable ship date '{}'", raw)),
        }
    }
    if let Some(raw) = non_empty(fields.delivery_date) {
        match parse_date_token(&raw, formats) {
            Some(date) => record.delivery_date = Some(date),
            None => record
                .warnings
                .push(format!("unparseable delivery date '{}'", raw)),
        }
    }

    if let Some(carrier) = fields.carrier {
        record.carrier = non_empty(carrier.name);
        record.carrier_scac = non_empty(carrier.scac).map(|s| s.to_uppercase());
    }

    if let Some(value) = fields.total_weight.and_then(Decimal::from_f64) {
        let unit = unit_or_unknown(fields.weight_unit.as_deref(), &mut record.warnings);
        record.weight = Some(Weight { value, unit });
    }

    record.freight_lines = fields
        .freight_lines
        .into_iter()
        .filter_map(|line| {
            let weight = line.weight.and_then(Decimal::from_f64).map(|value| Weight {
                value,
                unit: line
                    .weight_unit
                    .as_deref()
                    .and_then(WeightUnit::from_token)
                    .unwrap_or(WeightUnit::Unknown),
            });
            let description = non_empty(line.description)?;
            Some(FreightLine {
                quantity: line.quantity.map(|q| q.round() as u32),
                package_type: non_empty(line.package_type),
                description,
                weight,
            })
        })
        .collect();

    record.total_packages = fields.total_packages;

    let validation = validate(&record)?;
    record.warnings.extend(validation);

    Ok(record)
}

fn unit_or_unknown(token: Option<&str>, warnings: &mut Vec<String>) -> WeightUnit {
    match token.and_then(WeightUnit::from_token) {
        Some(unit) => unit,
        None => {
            warnings.push("missing weight unit".to_string());
            WeightUnit::Unknown
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use crate::models::config::ExtractionConfig;

    use super::*;

    fn formats() -> Vec<DateFormat> {
        ExtractionConfig::default().date_formats
    }

    #[test]
    fn test_coerce_json_plain() {
        let value = coerce_json(r#"{"bol_number":"A12345"}"#).unwrap();
        assert_eq!(value["bol_number"], "A12345");
    }

    #[test]
    fn test_coerce_json_wrapped_in_prose() {
        let reply = "Here is the extracted data:\n```json\n{\"bol_number\":\"A12345\"}\n```\nDone.";
        let value = coerce_json(reply).unwrap();
        assert_eq!(value["bol_number"], "A12345");
    }

    #[test]
    fn test_coerce_json_without_object_fails() {
        assert!(coerce_json("sorry, I cannot read this document").is_err());
    }

    #[test]
    fn test_map_fields_full() {
        let fields: LlmFields = serde_json::from_str(
            r#"{
                "bol_number": "A12345",
                "pro_number": "98765432",
                "ship_date": "2024-02-01",
                "delivery_date": "05/02/2024",
                "carrier": {"name": "Acme Freight", "scac": "acfr"},
                "freight_lines": [
                    {"description": "Machine parts", "quantity": 2,
                     "package_type": "pallet", "weight": 450, "weight_unit": "kg"}
                ],
                "total_weight": 1200,
                "weight_unit": "kg",
                "total_packages": 2
            }"#,
        )
        .unwrap();

        let record = map_fields(fields, "raw", &formats()).unwrap();
        assert_eq!(record.document_number.as_deref(), Some("A12345"));
        assert_eq!(record.ship_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(record.delivery_date, NaiveDate::from_ymd_opt(2024, 2, 5));
        assert_eq!(record.carrier_scac.as_deref(), Some("ACFR"));
        assert_eq!(record.freight_lines.len(), 1);
        assert_eq!(record.total_packages, Some(2));
        assert_eq!(
            record.weight.as_ref().map(|w| w.unit),
            Some(WeightUnit::Kilograms)
        );
        assert!(record.warnings.is_empty());
        assert_eq!(record.raw_text, "raw");
    }

    #[test]
    fn test_map_fields_weight_without_unit_warns() {
        let fields: LlmFields =
            serde_json::from_str(r#"{"bol_number":"A1","total_weight": 900}"#).unwrap();

        let record = map_fields(fields, "raw", &formats()).unwrap();
        assert_eq!(
            record.weight.as_ref().map(|w| w.unit),
            Some(WeightUnit::Unknown)
        );
        assert!(record.warnings.contains(&"missing weight unit".to_string()));
    }

    #[test]
    fn test_map_fields_all_null_is_fatal() {
        let fields: LlmFields = serde_json::from_str("{}").unwrap();
        let err = map_fields(fields, "raw", &formats()).unwrap_err();
        assert!(matches!(
            err,
            BolcrError::Extract(crate::error::ExtractError::EmptyRecord)
        ));
    }

    #[test]
    fn test_unparseable_date_degrades_to_warning() {
        let fields: LlmFields = serde_json::from_str(
            r#"{"bol_number":"A1","ship_date":"sometime last week"}"#,
        )
        .unwrap();

        let record = map_fields(fields, "raw", &formats()).unwrap();
        assert!(record.ship_date.is_none());
        assert!(
            record
                .warnings
                .iter()
                .any(|w| w.contains("unparseable ship date"))
        );
    }
}
