//! Weight extraction.
//!
//! OCR text is noisy and several numbers can look like a weight, so the
//! tie-break is positional: the candidate closest by byte offset to a weight
//! label wins; without any label, the first unit-bearing candidate in
//! document order wins.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::record::{Weight, WeightUnit};

use super::patterns::{WEIGHT_LABEL, WEIGHT_TOKEN};

/// A weight-shaped token found in text.
#[derive(Debug, Clone)]
struct WeightCandidate {
    value: Decimal,
    unit: Option<WeightUnit>,
    start: usize,
    end: usize,
}

/// Result of weight extraction.
#[derive(Debug, Clone, Default)]
pub struct WeightExtraction {
    pub weight: Option<Weight>,
    pub warnings: Vec<String>,
}

/// Extract the shipment weight from text.
pub fn extract_weight(text: &str) -> WeightExtraction {
    let labels: Vec<(usize, usize)> = WEIGHT_LABEL
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let candidates = collect_candidates(text);

    let chosen = if labels.is_empty() {
        // Without a label only unit-bearing numbers qualify as weights.
        candidates.iter().find(|c| c.unit.is_some()).cloned()
    } else {
        candidates
            .iter()
            .min_by_key(|c| {
                labels
                    .iter()
                    .map(|&label| span_distance((c.start, c.end), label))
                    .min()
                    .unwrap_or(usize::MAX)
            })
            .cloned()
    };

    let mut result = WeightExtraction::default();
    if let Some(candidate) = chosen {
        let unit = match candidate.unit {
            Some(unit) => unit,
            None => {
                result.warnings.push("missing weight unit".to_string());
                WeightUnit::Unknown
            }
        };
        result.weight = Some(Weight {
            value: candidate.value,
            unit,
        });
    }

    result
}

/// First unit-bearing weight token in `text`, with its byte span.
pub(crate) fn first_unit_weight(text: &str) -> Option<(Weight, (usize, usize))> {
    collect_candidates(text).into_iter().find_map(|c| {
        c.unit.map(|unit| {
            (
                Weight {
                    value: c.value,
                    unit,
                },
                (c.start, c.end),
            )
        })
    })
}

fn collect_candidates(text: &str) -> Vec<WeightCandidate> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();

    for caps in WEIGHT_TOKEN.captures_iter(text) {
        let full = caps.get(0).expect("capture 0 always present");
        let number = caps.get(1).expect("number group is mandatory");

        // Numbers glued to identifiers ("A12345") or date separators
        // ("01/02/2024") are not weights.
        if number.start() > 0 {
            let prev = bytes[number.start() - 1];
            if prev.is_ascii_alphanumeric() || matches!(prev, b'/' | b'-' | b'.' | b',') {
                continue;
            }
        }
        if full.end() < bytes.len() && matches!(bytes[full.end()], b'/' | b'-') {
            continue;
        }

        let cleaned = number.as_str().replace(',', "");
        let Ok(value) = Decimal::from_str(&cleaned) else {
            continue;
        };
        let unit = caps.get(2).and_then(|u| WeightUnit::from_token(u.as_str()));

        out.push(WeightCandidate {
            value,
            unit,
            start: full.start(),
            end: full.end(),
        });
    }

    out
}

/// Gap in bytes between two half-open spans; zero when they touch or overlap.
fn span_distance(a: (usize, usize), b: (usize, usize)) -> usize {
    if a.0 >= b.1 {
        a.0 - b.1
    } else if b.0 >= a.1 {
        b.0 - a.1
    } else {
        0
    }
}
