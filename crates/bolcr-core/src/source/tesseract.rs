//! Tesseract text source using the system binary.

use std::path::Path;
use std::process::Command;

use async_trait::async_trait;
use tracing::debug;

use super::TextSource;
use crate::error::RecognitionError;

/// Tesseract OCR backend.
pub struct TesseractSource {
    language: String,
}

impl TesseractSource {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    fn run_tesseract(&self, image_path: &Path) -> Result<String, RecognitionError> {
        let output = Command::new("tesseract")
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(RecognitionError::Engine(format!(
                    "tesseract failed: {}",
                    stderr.trim()
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(
                RecognitionError::Unavailable(
                    "tesseract not found (install tesseract-ocr)".to_string(),
                ),
            ),
            Err(e) => Err(RecognitionError::Io(e)),
        }
    }
}

impl Default for TesseractSource {
    fn default() -> Self {
        Self::new("eng")
    }
}

#[async_trait]
impl TextSource for TesseractSource {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn is_available(&self) -> bool {
        Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn availability_hint(&self) -> String {
        if self.is_available() {
            "tesseract is available".to_string()
        } else {
            "tesseract not installed; install with: apt install tesseract-ocr".to_string()
        }
    }

    async fn recognize(
        &self,
        image_path: &Path,
    ) -> std::result::Result<String, RecognitionError> {
        debug!(language = %self.language, "running tesseract on {}", image_path.display());
        self.run_tesseract(image_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_language() {
        let source = TesseractSource::default();
        assert_eq!(source.language, "eng");
        assert_eq!(source.name(), "tesseract");
    }
}
