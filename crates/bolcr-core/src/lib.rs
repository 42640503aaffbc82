//! Core library for Bill of Lading OCR processing.
//!
//! This crate provides:
//! - Text sourcing from images and PDFs via external OCR/AI engines
//! - Rule-based and LLM-assisted BOL field extraction
//! - Record validation and atomic JSON output
//!
//! Extraction and validation are pure functions of `text -> record`, so they
//! can be driven from any batch or service wrapper without modification; the
//! I/O-bound pieces (source adapter, writer) sit behind their own seams.

pub mod error;
pub mod extract;
pub mod models;
pub mod output;
pub mod pdf;
pub mod source;

pub use error::{
    BolcrError, ExtractError, PdfError, RecognitionError, Result, SourceError, WriteError,
};
pub use extract::validate::validate;
pub use extract::{LlmParser, RecordParser, RuleParser};
pub use models::config::{BolcrConfig, DateFormat, EngineKind, ExtractorMode};
pub use models::record::{BolRecord, FreightLine, Weight, WeightUnit};
pub use output::{JsonWriter, write_atomic};
pub use pdf::{PdfExtractor, PdfProcessor, PdfType};
pub use source::{RecognizeOptions, RemoteSource, TesseractSource, TextSource, recognize_file};
