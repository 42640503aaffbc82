//! Document (BOL) and PRO number extraction.

use super::patterns::{BOL_NUMBER, PRO_NUMBER};
use super::{ExtractionMatch, FieldExtractor};

/// Bill of Lading number extractor.
pub struct DocumentNumberExtractor;

impl DocumentNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocumentNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DocumentNumberExtractor {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        collect_identifiers(&BOL_NUMBER, text)
    }
}

/// First labeled BOL number in the text, exactly as it appears.
pub fn extract_document_number(text: &str) -> Option<ExtractionMatch<String>> {
    DocumentNumberExtractor::new().extract(text)
}

/// First labeled PRO number in the text.
pub fn extract_pro_number(text: &str) -> Option<ExtractionMatch<String>> {
    collect_identifiers(&PRO_NUMBER, text).into_iter().next()
}

fn collect_identifiers(pattern: &regex::Regex, text: &str) -> Vec<ExtractionMatch<String>> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let value = caps[1].to_string();
            // A word following the label ("ORIGINAL", "Number") is not an
            // identifier; require at least one digit.
            if !value.bytes().any(|b| b.is_ascii_digit()) {
                return None;
            }
            let full = caps.get(0).expect("capture 0 always present");
            Some(ExtractionMatch::new(value, full.as_str()).with_position(full.start(), full.end()))
        })
        .collect()
}
