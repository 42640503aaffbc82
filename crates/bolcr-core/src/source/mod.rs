//! Text source adapter.
//!
//! Turns an input file (image, PDF, or pre-recognized plain text) into raw
//! newline-preserving text. Recognition itself is delegated to an external
//! engine behind the [`TextSource`] trait; this module only decides which
//! bytes reach the engine and bounds the call with the caller's timeout and
//! cancellation signal.

pub(crate) mod remote;
mod tesseract;

pub use remote::RemoteSource;
pub use tesseract::TesseractSource;

use std::fs;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{PdfError, RecognitionError, SourceError};
use crate::models::config::{BolcrConfig, EngineKind, SourceConfig};
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

/// Result type for source operations.
pub type Result<T> = std::result::Result<T, SourceError>;

/// An external engine that turns a document image into text.
#[async_trait]
pub trait TextSource: Send + Sync {
    /// Short engine name for logs and messages.
    fn name(&self) -> &'static str;

    /// Whether the engine can run in this environment.
    fn is_available(&self) -> bool;

    /// What is needed to make the engine available.
    fn availability_hint(&self) -> String;

    /// Recognize the text in one image file.
    async fn recognize(&self, image_path: &Path)
    -> std::result::Result<String, RecognitionError>;
}

/// Supported input kinds, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Image,
    /// Already-recognized text, passed through unchanged.
    PlainText,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Some(Self::Image),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }
}

/// Limits applied to a recognition call.
pub struct RecognizeOptions {
    /// Upper bound on the whole recognition call.
    pub timeout: Duration,

    /// Caller-supplied cancellation signal; dropping the sender does not
    /// cancel, sending does.
    pub cancel: Option<oneshot::Receiver<()>>,
}

impl RecognizeOptions {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: oneshot::Receiver<()>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Build the configured recognition engine, checking availability.
pub fn build_source(config: &SourceConfig) -> Result<Box<dyn TextSource>> {
    let engine: Box<dyn TextSource> = match config.engine {
        EngineKind::Remote => Box::new(RemoteSource::from_config(config)),
        EngineKind::Tesseract => Box::new(TesseractSource::new(&config.language)),
    };

    if !engine.is_available() {
        return Err(SourceError::Recognition(RecognitionError::Unavailable(
            engine.availability_hint(),
        )));
    }

    Ok(engine)
}

/// Produce raw text for one input file.
///
/// Text-type PDFs short-circuit to their embedded text; everything else goes
/// through the configured engine, bounded by `opts`.
pub async fn recognize_file(
    path: &Path,
    config: &BolcrConfig,
    opts: RecognizeOptions,
) -> Result<String> {
    if !path.exists() {
        return Err(SourceError::Unreadable {
            path: path.to_path_buf(),
            reason: "file not found".to_string(),
        });
    }

    let kind = SourceKind::from_path(path).ok_or_else(|| {
        SourceError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_string(),
        )
    })?;

    debug!("recognizing {} as {:?}", path.display(), kind);

    if kind == SourceKind::PlainText {
        return fs::read_to_string(path).map_err(|e| SourceError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    let fut: Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> = match kind {
        SourceKind::Image => {
            let engine = build_source(&config.source)?;
            let image_path = path.to_path_buf();
            Box::pin(async move {
                engine
                    .recognize(&image_path)
                    .await
                    .map_err(SourceError::Recognition)
            })
        }
        SourceKind::Pdf => Box::pin(recognize_pdf(path, config)),
        SourceKind::PlainText => unreachable!("handled above"),
    };

    bounded(fut, opts).await
}

/// PDF flow: embedded text first, engine over recovered page images second.
async fn recognize_pdf(path: &Path, config: &BolcrConfig) -> Result<String> {
    let data = fs::read(path).map_err(|e| SourceError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    let pdf_type = extractor.analyze();

    if config.pdf.prefer_embedded_text && matches!(pdf_type, PdfType::Text | PdfType::Hybrid) {
        let text = extractor.extract_text()?;
        if text.trim().len() >= config.pdf.min_text_length {
            debug!("using {} chars of embedded PDF text", text.trim().len());
            return Ok(text);
        }
        warn!("embedded PDF text too short, falling back to OCR");
    }

    if !config.pdf.ocr_fallback {
        // Caller asked for embedded text only.
        let text = extractor.extract_text().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(SourceError::Pdf(PdfError::NoContent));
        }
        return Ok(text);
    }

    if pdf_type == PdfType::Empty {
        return Err(SourceError::Pdf(PdfError::NoContent));
    }

    let images = extractor.extract_images()?;
    if images.is_empty() {
        let text = extractor.extract_text().unwrap_or_default();
        if !text.trim().is_empty() {
            return Ok(text);
        }
        return Err(SourceError::Pdf(PdfError::ImageExtraction(
            "no recoverable page images".to_string(),
        )));
    }
    drop(extractor);

    let engine = build_source(&config.source)?;
    let workdir = tempfile::tempdir()
        .map_err(|e| SourceError::Recognition(RecognitionError::Io(e)))?;

    let mut pieces = Vec::new();
    for (i, image) in images.iter().enumerate() {
        let image_path = workdir.path().join(format!("page-{:03}.png", i + 1));
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|e| SourceError::Pdf(PdfError::ImageExtraction(e.to_string())))?;

        let text = engine
            .recognize(&image_path)
            .await
            .map_err(SourceError::Recognition)?;
        if !text.trim().is_empty() {
            pieces.push(text);
        } else {
            debug!("no text detected on page image {}", i + 1);
        }
    }

    Ok(pieces.join("\n\n"))
}

/// Run `fut` under the caller's timeout and cancellation signal.
async fn bounded<F>(fut: F, opts: RecognizeOptions) -> Result<String>
where
    F: Future<Output = Result<String>>,
{
    let RecognizeOptions { timeout, cancel } = opts;
    let timed = tokio::time::timeout(timeout, fut);

    match cancel {
        Some(mut rx) => tokio::select! {
            _ = &mut rx => Err(SourceError::Recognition(RecognitionError::Cancelled)),
            res = timed => flatten_timeout(res, timeout),
        },
        None => flatten_timeout(timed.await, timeout),
    }
}

fn flatten_timeout(
    res: std::result::Result<Result<String>, tokio::time::error::Elapsed>,
    timeout: Duration,
) -> Result<String> {
    match res {
        Ok(inner) => inner,
        Err(_) => Err(SourceError::Recognition(RecognitionError::Timeout(timeout))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(
            SourceKind::from_path(Path::new("bol.pdf")),
            Some(SourceKind::Pdf)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("scan.JPG")),
            Some(SourceKind::Image)
        );
        assert_eq!(
            SourceKind::from_path(Path::new("ocr.txt")),
            Some(SourceKind::PlainText)
        );
        assert_eq!(SourceKind::from_path(Path::new("notes.docx")), None);
        assert_eq!(SourceKind::from_path(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let config = BolcrConfig::default();
        let opts = RecognizeOptions::from_config(&config.source);
        let err = recognize_file(Path::new("/nonexistent/bol.pdf"), &config, opts)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_plain_text_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bol.txt");
        fs::write(&path, "BOL#: A12345\nCarrier: Acme\n").unwrap();

        let config = BolcrConfig::default();
        let opts = RecognizeOptions::from_config(&config.source);
        let text = recognize_file(&path, &config, opts).await.unwrap();
        assert_eq!(text, "BOL#: A12345\nCarrier: Acme\n");
    }

    #[tokio::test]
    async fn test_cancellation_wins() {
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();

        let config = BolcrConfig::default();
        let opts = RecognizeOptions::from_config(&config.source).with_cancel(rx);
        let err = bounded(std::future::pending(), opts).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Recognition(RecognitionError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_recognition_error() {
        let opts = RecognizeOptions {
            timeout: Duration::from_millis(5),
            cancel: None,
        };
        let err = bounded(std::future::pending(), opts).await.unwrap_err();
        assert!(matches!(
            err,
            SourceError::Recognition(RecognitionError::Timeout(_))
        ));
    }
}
