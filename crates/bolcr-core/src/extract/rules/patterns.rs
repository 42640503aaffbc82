//! Regex patterns for Bill of Lading field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Document number labels
    pub static ref BOL_NUMBER: Regex = Regex::new(
        r"(?i)\b(?:BOL|B/L|B\.O\.L\.?|Bill\s+of\s+Lading)(?:\s*(?:No\.?|Number|Nr\.?|#))?\s*[:#-]?\s*([A-Z0-9][A-Z0-9/-]{4,})"
    ).unwrap();

    pub static ref PRO_NUMBER: Regex = Regex::new(
        r"(?i)\bPRO(?:\s*(?:No\.?|Number|#))?\s*[:#-]?\s*([A-Z0-9][A-Z0-9-]{3,})"
    ).unwrap();

    // Date shapes
    pub static ref DATE_NUMERIC: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"\b(\d{4})-(\d{2})-(\d{2})\b"
    ).unwrap();

    pub static ref DATE_MONTH_NAME: Regex = Regex::new(
        r"(?i)\b(\d{1,2})[ \t-]([A-Z]{3,9})[ \t,-]+(\d{4}|\d{2})\b"
    ).unwrap();

    // Labeled dates capture the remainder of the line
    pub static ref SHIP_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:ship(?:ment|ped)?[ \t]*date|date[ \t]+shipped|ship[ \t]*dt\.?)[ \t.:#-]*([^\n]*)"
    ).unwrap();

    pub static ref DELIVERY_DATE_LABEL: Regex = Regex::new(
        r"(?i)\b(?:delivery[ \t]*date|date[ \t]+delivered|delivered[ \t]+on|del\.?[ \t]*date)[ \t.:#-]*([^\n]*)"
    ).unwrap();

    // Weight labels and weight-shaped tokens
    pub static ref WEIGHT_LABEL: Regex = Regex::new(
        r"(?i)\b(?:gross[ \t]+weight|net[ \t]+weight|total[ \t]+weight|weight|wt\.?)\b"
    ).unwrap();

    pub static ref WEIGHT_TOKEN: Regex = Regex::new(
        r"(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)[ \t]*(kilograms?|kilos?|kgs|kg|pounds?|lbs|lb|tonnes?|tons?|mt|t)?\b"
    ).unwrap();

    // Carrier identity
    pub static ref CARRIER_LABEL: Regex = Regex::new(
        r"(?i)\b(?:motor[ \t]+)?carrier(?:[ \t]+name)?\b[ \t.:#-]*([^\n]*)"
    ).unwrap();

    pub static ref SCAC_LABEL: Regex = Regex::new(
        r"(?i)\bSCAC\b[ \t.:#-]*([A-Za-z]{2,4})\b"
    ).unwrap();

    // Trailing SCAC clause sharing the carrier line
    pub static ref SCAC_INLINE: Regex = Regex::new(
        r"(?i)[ \t,;|-]*\bSCAC\b.*$"
    ).unwrap();

    // Freight lines: "<qty> <package type> <description...>"
    pub static ref FREIGHT_LINE: Regex = Regex::new(
        r"(?im)^[ \t]*(\d{1,4})[ \t]+(pallets?|plts?|pkgs?|packages?|pieces?|pcs|cartons?|ctns?|box(?:es)?|crates?|drums?|skids?|bundles?|bdls?)\b[ \t]*([^\n]*)$"
    ).unwrap();

    pub static ref TOTAL_PACKAGES: Regex = Regex::new(
        r"(?i)\b(?:total[ \t]+(?:packages|pkgs|pieces|pallets|units)|(?:no\.?|number)[ \t]+of[ \t]+(?:packages|pkgs|pieces))\b[ \t.:#-]*(\d{1,5})\b"
    ).unwrap();
}
