//! Remote OCR/AI engine over an OpenAI-compatible vision endpoint.
//!
//! The image is sent as a base64 data URL in a single chat-completions
//! request; the reply content is the transcribed text. One best-effort
//! attempt per call, no retries.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextSource;
use crate::error::RecognitionError;
use crate::models::config::SourceConfig;

const TRANSCRIBE_PROMPT: &str = "Transcribe all text in this document image. \
Preserve line breaks and reading order. Return only the transcribed text.";

/// Remote vision-model text source.
pub struct RemoteSource {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl RemoteSource {
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: std::env::var(&config.api_key_env).ok(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Override the API key (mainly for tests).
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiError>,
}

/// Map an unsuccessful API reply to a recognition error, failing fast on
/// quota exhaustion.
pub(crate) fn classify_api_error(status: StatusCode, body: &str) -> RecognitionError {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(err) = parsed.error {
            if is_quota_error(status, &err.kind, &err.message) {
                return RecognitionError::QuotaExhausted;
            }
            return RecognitionError::Engine(format!("{}: {}", status, err.message));
        }
    }
    let snippet: String = body.chars().take(300).collect();
    RecognitionError::Engine(format!("{}: {}", status, snippet))
}

fn is_quota_error(status: StatusCode, kind: &Option<String>, message: &str) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_REQUEST
    ) && (kind.as_deref() == Some("insufficient_quota")
        || message.to_lowercase().contains("quota"))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
        .as_str()
    {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[async_trait]
impl TextSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn availability_hint(&self) -> String {
        if self.api_key.is_none() {
            format!("set the {} environment variable", self.api_key_env)
        } else {
            "remote engine is available".to_string()
        }
    }

    async fn recognize(
        &self,
        image_path: &Path,
    ) -> std::result::Result<String, RecognitionError> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            RecognitionError::Unavailable(format!(
                "set the {} environment variable",
                self.api_key_env
            ))
        })?;

        let bytes = fs::read(image_path)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&bytes);
        let data_url = format!("data:{};base64,{}", mime_for(image_path), encoded);

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: TRANSCRIBE_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 4096,
            temperature: 0.0,
        };

        debug!(model = %self.model, "sending image to remote engine");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_api_error(status, &body));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| RecognitionError::Response(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(RecognitionError::Engine(err.message));
        }

        parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .map(|choice| choice.message.content)
            .ok_or_else(|| RecognitionError::Response("no choices in engine reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_exhaustion_fails_fast() {
        let body = r#"{"error":{"message":"You exceeded your current quota","type":"insufficient_quota"}}"#;
        let err = classify_api_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, RecognitionError::QuotaExhausted));
    }

    #[test]
    fn test_quota_detected_from_message() {
        let body = r#"{"error":{"message":"monthly quota reached"}}"#;
        let err = classify_api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, RecognitionError::QuotaExhausted));
    }

    #[test]
    fn test_plain_throttle_is_engine_error() {
        let body = r#"{"error":{"message":"rate limit, slow down","type":"rate_limit_exceeded"}}"#;
        let err = classify_api_error(StatusCode::TOO_MANY_REQUESTS, body);
        assert!(matches!(err, RecognitionError::Engine(_)));
    }

    #[test]
    fn test_unparseable_error_body_keeps_snippet() {
        let err = classify_api_error(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>");
        match err {
            RecognitionError::Engine(msg) => assert!(msg.contains("oops")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_mime_for_extensions() {
        assert_eq!(mime_for(Path::new("a.png")), "image/png");
        assert_eq!(mime_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_for(Path::new("a.bin")), "application/octet-stream");
    }
}
