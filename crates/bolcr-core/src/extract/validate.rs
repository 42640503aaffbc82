//! Record validation.

use rust_decimal::Decimal;

use crate::error::ExtractError;
use crate::models::record::BolRecord;

/// Check a populated record against basic structural expectations.
///
/// Individual missing fields degrade to warnings so a partially-readable
/// document still produces output; the only hard failure is a record with no
/// usable fields at all.
pub fn validate(record: &BolRecord) -> Result<Vec<String>, ExtractError> {
    if record.is_empty() {
        return Err(ExtractError::EmptyRecord);
    }

    let mut warnings = Vec::new();

    if record
        .document_number
        .as_deref()
        .is_none_or(|s| s.trim().is_empty())
    {
        warnings.push("missing document number".to_string());
    }

    if record.ship_date.is_none() && record.delivery_date.is_none() {
        warnings.push("missing ship and delivery dates".to_string());
    }

    if let Some(weight) = &record.weight {
        if weight.value <= Decimal::ZERO {
            warnings.push("invalid weight".to_string());
        }
    }

    if record
        .carrier
        .as_deref()
        .is_none_or(|s| s.trim().is_empty())
    {
        warnings.push("missing carrier".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::models::record::{Weight, WeightUnit};

    use super::*;

    fn full_record() -> BolRecord {
        BolRecord {
            document_number: Some("A12345".to_string()),
            ship_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            weight: Some(Weight {
                value: Decimal::new(1200, 0),
                unit: WeightUnit::Kilograms,
            }),
            carrier: Some("Acme Freight".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_record_has_no_warnings() {
        assert_eq!(validate(&full_record()).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_single_missing_field_is_a_warning_not_an_error() {
        let mut record = full_record();
        record.document_number = None;

        let warnings = validate(&record).unwrap();
        assert_eq!(warnings, vec!["missing document number".to_string()]);
    }

    #[test]
    fn test_one_date_is_enough() {
        let mut record = full_record();
        record.ship_date = None;
        record.delivery_date = NaiveDate::from_ymd_opt(2024, 2, 5);

        assert!(validate(&record).unwrap().is_empty());
    }

    #[test]
    fn test_both_dates_missing_warns() {
        let mut record = full_record();
        record.ship_date = None;

        let warnings = validate(&record).unwrap();
        assert_eq!(warnings, vec!["missing ship and delivery dates".to_string()]);
    }

    #[test]
    fn test_nonpositive_weight_warns() {
        let mut record = full_record();
        record.weight = Some(Weight {
            value: Decimal::ZERO,
            unit: WeightUnit::Kilograms,
        });

        let warnings = validate(&record).unwrap();
        assert_eq!(warnings, vec!["invalid weight".to_string()]);
    }

    #[test]
    fn test_absent_weight_is_not_invalid() {
        let mut record = full_record();
        record.weight = None;

        assert!(validate(&record).unwrap().is_empty());
    }

    #[test]
    fn test_missing_carrier_warns() {
        let mut record = full_record();
        record.carrier = Some("   ".to_string());

        let warnings = validate(&record).unwrap();
        assert_eq!(warnings, vec!["missing carrier".to_string()]);
    }

    #[test]
    fn test_empty_record_is_fatal() {
        let record = BolRecord {
            raw_text: "noise only".to_string(),
            ..Default::default()
        };
        assert!(matches!(validate(&record), Err(ExtractError::EmptyRecord)));
    }

    #[test]
    fn test_one_supplemental_field_keeps_record_alive() {
        let record = BolRecord {
            pro_number: Some("98765432".to_string()),
            ..Default::default()
        };

        let warnings = validate(&record).unwrap();
        assert!(warnings.contains(&"missing document number".to_string()));
        assert!(warnings.contains(&"missing carrier".to_string()));
    }
}
