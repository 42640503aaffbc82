//! Carrier name and SCAC extraction.

use super::patterns::{CARRIER_LABEL, SCAC_INLINE, SCAC_LABEL};

/// Extracted carrier identity.
#[derive(Debug, Clone, Default)]
pub struct CarrierExtraction {
    pub name: Option<String>,
    pub scac: Option<String>,
}

/// Extract carrier name and SCAC code from text.
pub fn extract_carrier(text: &str) -> CarrierExtraction {
    let name = CARRIER_LABEL.captures(text).and_then(|caps| {
        let raw = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let cleaned = clean_name(raw);
        (!cleaned.is_empty()).then_some(cleaned)
    });

    let scac = SCAC_LABEL
        .captures(text)
        .map(|caps| caps[1].to_uppercase());

    CarrierExtraction { name, scac }
}

fn clean_name(raw: &str) -> String {
    // A SCAC clause often shares the carrier line; it is its own field.
    let cleaned = SCAC_INLINE.replace(raw, "");
    let cleaned = cleaned
        .trim()
        .trim_end_matches([',', ';', '|', '-'])
        .trim();

    // Lines of digits are OCR noise, not a carrier name.
    if !cleaned.chars().any(|c| c.is_alphabetic()) {
        return String::new();
    }
    cleaned.to_string()
}
