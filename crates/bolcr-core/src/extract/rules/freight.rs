//! Freight line and package count extraction.

use crate::models::record::FreightLine;

use super::patterns::{FREIGHT_LINE, TOTAL_PACKAGES};
use super::weights::first_unit_weight;

/// Extracted freight body.
#[derive(Debug, Clone, Default)]
pub struct FreightExtraction {
    pub lines: Vec<FreightLine>,
    pub total_packages: Option<u32>,
}

/// Extract freight lines and the total package count.
pub fn extract_freight(text: &str) -> FreightExtraction {
    let mut lines = Vec::new();

    for caps in FREIGHT_LINE.captures_iter(text) {
        let quantity = caps[1].parse::<u32>().ok().filter(|&q| q > 0 && q < 10_000);
        let package_type = normalize_package_type(&caps[2]);
        let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        let (description, weight) = split_trailing_weight(rest);
        lines.push(FreightLine {
            quantity,
            package_type: Some(package_type),
            description,
            weight,
        });
    }

    let total_packages = TOTAL_PACKAGES
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .or_else(|| {
            let sum: u32 = lines.iter().filter_map(|l| l.quantity).sum();
            (sum > 0).then_some(sum)
        });

    FreightExtraction {
        lines,
        total_packages,
    }
}

/// Split a line remainder into description and an optional trailing weight.
fn split_trailing_weight(rest: &str) -> (String, Option<crate::models::record::Weight>) {
    match first_unit_weight(rest) {
        Some((weight, (start, end))) => {
            let mut description = String::new();
            description.push_str(&rest[..start]);
            description.push_str(&rest[end..]);
            let description = description
                .trim()
                .trim_end_matches(['-', ',', '|'])
                .trim()
                .to_string();
            let description = if description.is_empty() {
                "Freight".to_string()
            } else {
                description
            };
            (description, Some(weight))
        }
        None => {
            let description = rest.trim().to_string();
            let description = if description.is_empty() {
                "Freight".to_string()
            } else {
                description
            };
            (description, None)
        }
    }
}

fn normalize_package_type(token: &str) -> String {
    let token = token.to_lowercase();
    match token.as_str() {
        "plt" | "plts" | "pallet" | "pallets" => "pallet",
        "pkg" | "pkgs" | "package" | "packages" => "package",
        "pc" | "pcs" | "piece" | "pieces" => "piece",
        "ctn" | "ctns" | "carton" | "cartons" => "carton",
        "box" | "boxes" => "box",
        "crate" | "crates" => "crate",
        "drum" | "drums" => "drum",
        "skid" | "skids" => "skid",
        "bdl" | "bdls" | "bundle" | "bundles" => "bundle",
        other => return other.to_string(),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    use crate::models::record::{Weight, WeightUnit};

    use super::*;

    #[test]
    fn test_line_with_weight() {
        let result = extract_freight("2 Pallets Machine parts 450 kg\n");
        assert_eq!(result.lines.len(), 1);

        let line = &result.lines[0];
        assert_eq!(line.quantity, Some(2));
        assert_eq!(line.package_type.as_deref(), Some("pallet"));
        assert_eq!(line.description, "Machine parts");
        assert_eq!(
            line.weight,
            Some(Weight {
                value: Decimal::new(450, 0),
                unit: WeightUnit::Kilograms,
            })
        );
    }

    #[test]
    fn test_line_without_weight() {
        let result = extract_freight("12 cartons office supplies\n");
        let line = &result.lines[0];
        assert_eq!(line.quantity, Some(12));
        assert_eq!(line.package_type.as_deref(), Some("carton"));
        assert_eq!(line.description, "office supplies");
        assert!(line.weight.is_none());
    }

    #[test]
    fn test_bare_line_gets_default_description() {
        let result = extract_freight("3 drums\n");
        assert_eq!(result.lines[0].description, "Freight");
    }

    #[test]
    fn test_labeled_total_packages_wins_over_sum() {
        let text = "2 pallets bricks\n3 pallets tiles\nTotal Packages: 6\n";
        let result = extract_freight(text);
        assert_eq!(result.lines.len(), 2);
        assert_eq!(result.total_packages, Some(6));
    }

    #[test]
    fn test_total_packages_falls_back_to_line_sum() {
        let text = "2 pallets bricks\n3 pallets tiles\n";
        let result = extract_freight(text);
        assert_eq!(result.total_packages, Some(5));
    }

    #[test]
    fn test_prose_is_not_a_freight_line() {
        let result = extract_freight("Weight: 1200 kg\nCarrier: Acme Freight\n");
        assert!(result.lines.is_empty());
        assert!(result.total_packages.is_none());
    }
}
