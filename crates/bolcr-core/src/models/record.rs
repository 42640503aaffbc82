//! Bill of Lading record model.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A structured Bill of Lading record.
///
/// One record is built per input document: populated field-by-field by the
/// extractor, checked by the validator (which appends warnings but never
/// mutates set fields), then serialized and discarded. Field order here fixes
/// the key order of the output JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BolRecord {
    /// Bill of Lading number as it appears on the document.
    pub document_number: Option<String>,

    /// Carrier PRO (tracking) number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pro_number: Option<String>,

    /// Date the shipment left the origin.
    pub ship_date: Option<NaiveDate>,

    /// Date the shipment was (or is to be) delivered.
    pub delivery_date: Option<NaiveDate>,

    /// Total shipment weight.
    pub weight: Option<Weight>,

    /// Carrier name, free text.
    pub carrier: Option<String>,

    /// Standard Carrier Alpha Code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_scac: Option<String>,

    /// Individual freight lines, when the document lists them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub freight_lines: Vec<FreightLine>,

    /// Total package count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_packages: Option<u32>,

    /// Unmodified recognized text, kept in memory for traceability.
    #[serde(skip)]
    pub raw_text: String,

    /// Fields that could not be confidently parsed, in extraction order.
    pub warnings: Vec<String>,
}

impl BolRecord {
    /// True when not a single field carries a value.
    pub fn is_empty(&self) -> bool {
        self.document_number.is_none()
            && self.pro_number.is_none()
            && self.ship_date.is_none()
            && self.delivery_date.is_none()
            && self.weight.is_none()
            && self.carrier.is_none()
            && self.carrier_scac.is_none()
            && self.freight_lines.is_empty()
            && self.total_packages.is_none()
    }
}

/// A weight figure with its unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight {
    /// Numeric value, serialized as a JSON number.
    #[serde(with = "decimal_number")]
    pub value: Decimal,

    /// Unit the document stated, or `unknown` when none was adjacent.
    pub unit: WeightUnit,
}

/// Weight units seen on shipping documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    /// Kilograms.
    #[serde(rename = "kg")]
    Kilograms,

    /// Pounds.
    #[serde(rename = "lb")]
    Pounds,

    /// Metric tonnes.
    #[serde(rename = "t")]
    Tonnes,

    /// No unit token was found next to the figure.
    Unknown,
}

impl WeightUnit {
    /// Parse a unit token as it appears next to a weight figure.
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().trim_end_matches('.').to_lowercase().as_str() {
            "kg" | "kgs" | "kilo" | "kilos" | "kilogram" | "kilograms" => Some(Self::Kilograms),
            "lb" | "lbs" | "pound" | "pounds" => Some(Self::Pounds),
            "t" | "ton" | "tons" | "tonne" | "tonnes" | "mt" => Some(Self::Tonnes),
            _ => None,
        }
    }

    /// Canonical token used in output.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Kilograms => "kg",
            Self::Pounds => "lb",
            Self::Tonnes => "t",
            Self::Unknown => "unknown",
        }
    }
}

/// One freight line from the body of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreightLine {
    /// Piece count for this line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,

    /// Package type (pallet, carton, drum, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_type: Option<String>,

    /// Goods description.
    pub description: String,

    /// Line weight, when stated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

/// Serialize weight values as JSON numbers, integer form when fractionless.
pub(crate) mod decimal_number {
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use rust_decimal::prelude::ToPrimitive;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        if value.fract().is_zero() {
            if let Some(n) = value.to_i64() {
                return serializer.serialize_i64(n);
            }
        }
        serializer.serialize_f64(value.to_f64().unwrap_or(0.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => {
                Decimal::from_str(&n.to_string()).map_err(D::Error::custom)
            }
            serde_json::Value::String(s) => Decimal::from_str(&s).map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected a number, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_serializes_with_fixed_keys() {
        let record = BolRecord {
            document_number: Some("A12345".to_string()),
            ship_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            weight: Some(Weight {
                value: Decimal::new(1200, 0),
                unit: WeightUnit::Kilograms,
            }),
            carrier: Some("Acme Freight".to_string()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"document_number":"A12345","ship_date":"2024-02-01","delivery_date":null,"weight":{"value":1200,"unit":"kg"},"carrier":"Acme Freight","warnings":[]}"#
        );
    }

    #[test]
    fn test_absent_fields_serialize_as_null() {
        let record = BolRecord {
            warnings: vec!["missing document number".to_string()],
            ..Default::default()
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(json["document_number"], serde_json::Value::Null);
        assert_eq!(json["weight"], serde_json::Value::Null);
        assert_eq!(json["warnings"][0], "missing document number");
        // Supplemental fields stay out of the output entirely when absent.
        assert!(json.get("pro_number").is_none());
        assert!(json.get("freight_lines").is_none());
    }

    #[test]
    fn test_raw_text_never_serialized() {
        let record = BolRecord {
            document_number: Some("X99999".to_string()),
            raw_text: "BOL X99999".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("raw_text"));
        assert!(!json.contains("BOL X99999"));
    }

    #[test]
    fn test_fractional_weight_serializes_as_float() {
        let weight = Weight {
            value: Decimal::new(12345, 1),
            unit: WeightUnit::Pounds,
        };
        assert_eq!(
            serde_json::to_string(&weight).unwrap(),
            r#"{"value":1234.5,"unit":"lb"}"#
        );
    }

    #[test]
    fn test_weight_roundtrip() {
        let weight = Weight {
            value: Decimal::new(1200, 0),
            unit: WeightUnit::Unknown,
        };
        let json = serde_json::to_string(&weight).unwrap();
        assert_eq!(json, r#"{"value":1200,"unit":"unknown"}"#);

        let back: Weight = serde_json::from_str(&json).unwrap();
        assert_eq!(back, weight);
    }

    #[test]
    fn test_unit_from_token() {
        assert_eq!(WeightUnit::from_token("kg"), Some(WeightUnit::Kilograms));
        assert_eq!(WeightUnit::from_token("KGS"), Some(WeightUnit::Kilograms));
        assert_eq!(WeightUnit::from_token("lbs"), Some(WeightUnit::Pounds));
        assert_eq!(WeightUnit::from_token("Tonnes"), Some(WeightUnit::Tonnes));
        assert_eq!(WeightUnit::from_token("crates"), None);
    }

    #[test]
    fn test_is_empty() {
        assert!(BolRecord::default().is_empty());

        let record = BolRecord {
            carrier: Some("Acme".to_string()),
            ..Default::default()
        };
        assert!(!record.is_empty());
    }
}
