//! Configuration structures for the extraction pipeline.
//!
//! Configuration is passed explicitly into each component rather than read
//! from ambient global state, so the pipeline stays testable and individual
//! runs cannot interfere with each other.

use serde::{Deserialize, Serialize};

/// Main configuration for the bolcr pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BolcrConfig {
    /// Text source / recognition engine configuration.
    pub source: SourceConfig,

    /// PDF handling configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Which external engine recognizes text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// OpenAI-compatible vision endpoint over HTTP.
    Remote,
    /// Local `tesseract` binary.
    Tesseract,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Remote => "remote",
            EngineKind::Tesseract => "tesseract",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "remote" | "api" => Some(EngineKind::Remote),
            "tesseract" => Some(EngineKind::Tesseract),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Text source adapter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Recognition engine to use.
    pub engine: EngineKind,

    /// Chat-completions endpoint of the remote engine.
    pub endpoint: String,

    /// Environment variable holding the remote engine API key.
    pub api_key_env: String,

    /// Vision model requested from the remote engine.
    pub model: String,

    /// Tesseract language code.
    pub language: String,

    /// Timeout for a single recognition call, in seconds.
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Tesseract,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "gpt-4o".to_string(),
            language: "eng".to_string(),
            timeout_secs: 30,
        }
    }
}

/// PDF handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use embedded text before reaching for the recognition engine.
    pub prefer_embedded_text: bool,

    /// Minimum embedded text length to accept without OCR.
    pub min_text_length: usize,

    /// Allow falling back to the engine when embedded text is insufficient.
    pub ocr_fallback: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
            ocr_fallback: true,
        }
    }
}

/// How fields are extracted from recognized text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorMode {
    /// Deterministic regex/heuristic rules.
    Rules,
    /// LLM field extraction with rule fallback on quota exhaustion.
    Llm,
}

/// Accepted date layouts, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `DD/MM/YYYY` and separator variants.
    DayMonthYear,
    /// `MM/DD/YYYY` and separator variants.
    MonthDayYear,
    /// `DD-MON-YYYY` / `15 January 2024`.
    DayMonthNameYear,
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Extraction mode.
    pub mode: ExtractorMode,

    /// Date formats to attempt, in order. The first format that produces a
    /// valid calendar date wins.
    pub date_formats: Vec<DateFormat>,

    /// LLM extraction settings (used when `mode` is `llm`).
    pub llm: LlmConfig,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Rules,
            date_formats: vec![
                DateFormat::DayMonthYear,
                DateFormat::MonthDayYear,
                DateFormat::DayMonthNameYear,
            ],
            llm: LlmConfig::default(),
        }
    }
}

/// LLM field-extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat-completions endpoint.
    pub endpoint: String,

    /// Model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Recognized text is trimmed to this many characters before sending.
    pub max_text_chars: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_text_chars: 6000,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the output JSON.
    pub pretty: bool,
}

impl BolcrConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_date_format_order() {
        let config = ExtractionConfig::default();
        assert_eq!(
            config.date_formats,
            vec![
                DateFormat::DayMonthYear,
                DateFormat::MonthDayYear,
                DateFormat::DayMonthNameYear,
            ]
        );
    }

    #[test]
    fn test_config_roundtrip() {
        let config = BolcrConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: BolcrConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.source.engine, EngineKind::Tesseract);
        assert_eq!(back.source.timeout_secs, 30);
        assert_eq!(back.extraction.mode, ExtractorMode::Rules);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BolcrConfig =
            serde_json::from_str(r#"{"source":{"engine":"remote"}}"#).unwrap();
        assert_eq!(config.source.engine, EngineKind::Remote);
        assert_eq!(config.source.language, "eng");
        assert!(config.pdf.prefer_embedded_text);
    }
}
