//! Rule-based field extractors for Bill of Lading text.

pub mod carrier;
pub mod dates;
pub mod document;
pub mod freight;
pub mod patterns;
pub mod weights;

pub use carrier::{CarrierExtraction, extract_carrier};
pub use dates::{BolDates, extract_dates, find_dates, parse_date_token};
pub use document::{extract_document_number, extract_pro_number};
pub use freight::{FreightExtraction, extract_freight};
pub use weights::{WeightExtraction, extract_weight};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field value with its location in the source text.
#[derive(Debug, Clone)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte span of the match in the source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}
