//! Rule-based record parser.

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::models::config::ExtractionConfig;
use crate::models::record::BolRecord;

use super::rules::{
    extract_carrier, extract_dates, extract_document_number, extract_freight, extract_pro_number,
    extract_weight,
};
use super::validate::validate;

/// Trait for record parsers.
pub trait RecordParser {
    /// Parse a record from recognized text.
    fn parse(&self, text: &str) -> Result<BolRecord, ExtractError>;
}

/// Deterministic rule-based parser.
///
/// Each field is extracted independently; a field that cannot be found is
/// absent, never an error, so noisy scans still yield partial records.
pub struct RuleParser {
    config: ExtractionConfig,
}

impl RuleParser {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }
}

impl Default for RuleParser {
    fn default() -> Self {
        Self::new(ExtractionConfig::default())
    }
}

impl RecordParser for RuleParser {
    fn parse(&self, text: &str) -> Result<BolRecord, ExtractError> {
        info!("parsing record from {} characters of text", text.len());

        let mut record = BolRecord {
            raw_text: text.to_string(),
            ..Default::default()
        };

        if let Some(m) = extract_document_number(text) {
            record.document_number = Some(m.value);
        }
        if let Some(m) = extract_pro_number(text) {
            record.pro_number = Some(m.value);
        }

        let dates = extract_dates(text, &self.config.date_formats);
        record.ship_date = dates.ship_date;
        record.delivery_date = dates.delivery_date;
        record.warnings.extend(dates.warnings);

        let weight = extract_weight(text);
        record.weight = weight.weight;
        record.warnings.extend(weight.warnings);

        let carrier = extract_carrier(text);
        record.carrier = carrier.name;
        record.carrier_scac = carrier.scac;

        let freight = extract_freight(text);
        record.freight_lines = freight.lines;
        record.total_packages = freight.total_packages;

        let validation = validate(&record)?;
        record.warnings.extend(validation);

        debug!(
            document_number = ?record.document_number,
            warnings = record.warnings.len(),
            "record extracted"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::models::record::{Weight, WeightUnit};

    use super::*;

    fn parse(text: &str) -> Result<BolRecord, ExtractError> {
        RuleParser::default().parse(text)
    }

    #[test]
    fn test_well_formed_document() {
        let text = "BOL#: A12345\nShip Date: 01/02/2024\nWeight: 1200 kg\nCarrier: Acme Freight";
        let record = parse(text).unwrap();

        assert_eq!(record.document_number.as_deref(), Some("A12345"));
        assert_eq!(record.ship_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(record.delivery_date, None);
        assert_eq!(
            record.weight,
            Some(Weight {
                value: Decimal::new(1200, 0),
                unit: WeightUnit::Kilograms,
            })
        );
        assert_eq!(record.carrier.as_deref(), Some("Acme Freight"));
        assert_eq!(record.warnings, Vec::<String>::new());
        assert_eq!(record.raw_text, text);
    }

    #[test]
    fn test_well_formed_document_serializes_exactly() {
        let text = "BOL#: A12345\nShip Date: 01/02/2024\nWeight: 1200 kg\nCarrier: Acme Freight";
        let record = parse(text).unwrap();

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"document_number":"A12345","ship_date":"2024-02-01","delivery_date":null,"weight":{"value":1200,"unit":"kg"},"carrier":"Acme Freight","warnings":[]}"#
        );
    }

    #[test]
    fn test_missing_document_number_degrades_to_warning() {
        let text = "Ship Date: 01/02/2024\nWeight: 1200 kg\nCarrier: Acme Freight";
        let record = parse(text).unwrap();

        assert_eq!(record.document_number, None);
        assert!(
            record
                .warnings
                .contains(&"missing document number".to_string())
        );
        // Everything else still extracted.
        assert!(record.ship_date.is_some());
        assert!(record.weight.is_some());
    }

    #[test]
    fn test_empty_text_is_fatal() {
        assert!(matches!(parse(""), Err(ExtractError::EmptyRecord)));
    }

    #[test]
    fn test_unrelated_text_is_fatal() {
        let err = parse("lorem ipsum dolor sit amet").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyRecord));
    }

    #[test]
    fn test_unitless_weight_warns_but_keeps_other_fields() {
        let text = "BOL#: A12345\nWeight: 1200\nCarrier: Acme Freight";
        let record = parse(text).unwrap();

        assert_eq!(
            record.weight,
            Some(Weight {
                value: Decimal::new(1200, 0),
                unit: WeightUnit::Unknown,
            })
        );
        assert!(record.warnings.contains(&"missing weight unit".to_string()));
        // No dates on the document at all.
        assert!(
            record
                .warnings
                .contains(&"missing ship and delivery dates".to_string())
        );
    }

    #[test]
    fn test_full_document_with_supplemental_fields() {
        let text = "Bill of Lading No. BL-2024-00042\n\
                    PRO#: 12093475\n\
                    Ship Date: 26/01/2024\n\
                    Delivery Date: 29-JAN-2024\n\
                    Carrier: Blue Line Transport\n\
                    SCAC: BLTR\n\
                    2 pallets machine parts 450 kg\n\
                    1 crate spare bearings 120 kg\n\
                    Total Packages: 3\n\
                    Gross Weight: 570 kg\n";
        let record = parse(text).unwrap();

        assert_eq!(record.document_number.as_deref(), Some("BL-2024-00042"));
        assert_eq!(record.pro_number.as_deref(), Some("12093475"));
        assert_eq!(record.ship_date, NaiveDate::from_ymd_opt(2024, 1, 26));
        assert_eq!(record.delivery_date, NaiveDate::from_ymd_opt(2024, 1, 29));
        assert_eq!(record.carrier.as_deref(), Some("Blue Line Transport"));
        assert_eq!(record.carrier_scac.as_deref(), Some("BLTR"));
        assert_eq!(record.freight_lines.len(), 2);
        assert_eq!(record.total_packages, Some(3));
        assert_eq!(
            record.weight,
            Some(Weight {
                value: Decimal::new(570, 0),
                unit: WeightUnit::Kilograms,
            })
        );
        assert_eq!(record.warnings, Vec::<String>::new());
    }

    #[test]
    fn test_weight_tie_break_prefers_label_proximity() {
        let text = "BOL#: A12345\nCarrier: Acme\n300 kg tare noted\nTotal Weight: 950 kg";
        let record = parse(text).unwrap();
        assert_eq!(
            record.weight.map(|w| w.value),
            Some(Decimal::new(950, 0))
        );
    }
}
