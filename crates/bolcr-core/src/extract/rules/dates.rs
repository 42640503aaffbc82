//! Date extraction and normalization.
//!
//! Numeric dates are interpreted under the configured format order; the
//! first format that yields a valid calendar date wins. Output is always a
//! `NaiveDate`, so serialization is canonical ISO regardless of the input
//! shape.

use chrono::NaiveDate;

use crate::models::config::DateFormat;

use super::patterns::{
    DATE_ISO, DATE_MONTH_NAME, DATE_NUMERIC, DELIVERY_DATE_LABEL, SHIP_DATE_LABEL,
};

/// A date parsed out of text.
#[derive(Debug, Clone)]
pub struct ParsedDate {
    pub value: NaiveDate,
    /// Both numeric orders were plausible; the configured order decided.
    pub ambiguous: bool,
    /// Byte span in the scanned text.
    pub position: (usize, usize),
    pub source: String,
}

/// Extracted dates from BOL text.
#[derive(Debug, Clone, Default)]
pub struct BolDates {
    pub ship_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub warnings: Vec<String>,
}

/// All date-shaped tokens in `text`, in document order.
pub fn find_dates(text: &str, formats: &[DateFormat]) -> Vec<ParsedDate> {
    let mut results: Vec<ParsedDate> = Vec::new();

    for caps in DATE_ISO.captures_iter(text) {
        let year: i32 = caps[1].parse().unwrap_or(0);
        let month: u32 = caps[2].parse().unwrap_or(0);
        let day: u32 = caps[3].parse().unwrap_or(0);

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            let m = caps.get(0).expect("capture 0 always present");
            results.push(ParsedDate {
                value: date,
                ambiguous: false,
                position: (m.start(), m.end()),
                source: m.as_str().to_string(),
            });
        }
    }

    for caps in DATE_NUMERIC.captures_iter(text) {
        let first: u32 = caps[1].parse().unwrap_or(0);
        let second: u32 = caps[2].parse().unwrap_or(0);
        let year = parse_year(&caps[3]);

        if let Some((date, ambiguous)) = parse_numeric(first, second, year, formats) {
            let m = caps.get(0).expect("capture 0 always present");
            if overlaps_any(&results, m.start(), m.end()) {
                continue;
            }
            results.push(ParsedDate {
                value: date,
                ambiguous,
                position: (m.start(), m.end()),
                source: m.as_str().to_string(),
            });
        }
    }

    if formats.contains(&DateFormat::DayMonthNameYear) {
        for caps in DATE_MONTH_NAME.captures_iter(text) {
            let day: u32 = caps[1].parse().unwrap_or(0);
            let Some(month) = month_from_name(&caps[2]) else {
                continue;
            };
            let year = parse_year(&caps[3]);

            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                let m = caps.get(0).expect("capture 0 always present");
                if overlaps_any(&results, m.start(), m.end()) {
                    continue;
                }
                results.push(ParsedDate {
                    value: date,
                    ambiguous: false,
                    position: (m.start(), m.end()),
                    source: m.as_str().to_string(),
                });
            }
        }
    }

    results.sort_by_key(|r| r.position.0);
    results
}

/// Parse a single date token, e.g. a value handed back by an LLM.
pub fn parse_date_token(s: &str, formats: &[DateFormat]) -> Option<NaiveDate> {
    find_dates(s, formats).into_iter().next().map(|d| d.value)
}

/// Extract labeled ship/delivery dates; fall back to the first date in
/// document order when nothing is labeled.
pub fn extract_dates(text: &str, formats: &[DateFormat]) -> BolDates {
    let mut result = BolDates::default();

    if let Some(caps) = SHIP_DATE_LABEL.captures(text) {
        if let Some(m) = caps.get(1) {
            if let Some(parsed) = find_dates(m.as_str(), formats).into_iter().next() {
                result.ship_date = Some(parsed.value);
            }
        }
    }

    if let Some(caps) = DELIVERY_DATE_LABEL.captures(text) {
        if let Some(m) = caps.get(1) {
            if let Some(parsed) = find_dates(m.as_str(), formats).into_iter().next() {
                result.delivery_date = Some(parsed.value);
            }
        }
    }

    // No labeled date anywhere: take the first date on the document as the
    // ship date, flagged since nothing pins it to a field.
    if result.ship_date.is_none() && result.delivery_date.is_none() {
        if let Some(first) = find_dates(text, formats).into_iter().next() {
            result
                .warnings
                .push(format!("ship date taken from unlabeled date '{}'", first.source));
            if first.ambiguous {
                result.warnings.push(format!(
                    "ambiguous date '{}' read as {}",
                    first.source, first.value
                ));
            }
            result.ship_date = Some(first.value);
        }
    }

    result
}

fn overlaps_any(results: &[ParsedDate], start: usize, end: usize) -> bool {
    results
        .iter()
        .any(|r| r.position.0 < end && start < r.position.1)
}

fn parse_numeric(
    first: u32,
    second: u32,
    year: i32,
    formats: &[DateFormat],
) -> Option<(NaiveDate, bool)> {
    let mut parsed = None;
    for format in formats {
        let candidate = match format {
            DateFormat::DayMonthYear => NaiveDate::from_ymd_opt(year, second, first),
            DateFormat::MonthDayYear => NaiveDate::from_ymd_opt(year, first, second),
            DateFormat::DayMonthNameYear => None,
        };
        if let Some(date) = candidate {
            parsed = Some(date);
            break;
        }
    }

    let date = parsed?;
    let ambiguous = first != second
        && (1..=12).contains(&first)
        && (1..=12).contains(&second)
        && formats.contains(&DateFormat::DayMonthYear)
        && formats.contains(&DateFormat::MonthDayYear);

    Some((date, ambiguous))
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 are 2000s, 51-99 are 1900s.
        if year <= 50 { 2000 + year } else { 1900 + year }
    } else {
        year
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| name.starts_with(m))
        .map(|i| i as u32 + 1)
}
