//! Error types for the bolcr-core library.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for the bolcr library.
#[derive(Error, Debug)]
pub enum BolcrError {
    /// The source file could not be read or recognized.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The external recognition engine failed.
    #[error("recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// Record extraction error.
    #[error("extraction error: {0}")]
    Extract(#[from] ExtractError),

    /// Output writing error.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors from the text source adapter.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The input file is missing or cannot be read.
    #[error("cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The input file extension is not a supported document type.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The input PDF could not be processed.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// The external recognition engine failed.
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to recover page images from the PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The PDF has neither embedded text nor recoverable images.
    #[error("PDF has no extractable content")]
    NoContent,
}

/// Errors from external OCR/AI engines.
#[derive(Error, Debug)]
pub enum RecognitionError {
    /// The engine is not usable in this environment.
    #[error("engine not available: {0}")]
    Unavailable(String),

    /// The engine reported a failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// The engine's API quota is exhausted.
    #[error("engine quota exhausted")]
    QuotaExhausted,

    /// The recognition call exceeded the configured timeout.
    #[error("recognition timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the recognition call.
    #[error("recognition cancelled")]
    Cancelled,

    /// HTTP transport failure talking to a remote engine.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The engine replied with something we cannot interpret.
    #[error("malformed engine response: {0}")]
    Response(String),

    /// I/O error while preparing engine input.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from record extraction and validation.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Not a single usable field could be extracted from the text.
    #[error("no usable fields found in recognized text")]
    EmptyRecord,
}

/// Errors from the JSON writer.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Could not create the output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Record serialization failed.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Writing the temporary output file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Renaming the temporary file into place failed.
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for the bolcr library.
pub type Result<T> = std::result::Result<T, BolcrError>;
