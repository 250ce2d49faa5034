use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::error::ApiError;

pub const GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Uploaded pantry photos are always sent to the model as JPEG.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

const FINISH_REASON_SAFETY: &str = "SAFETY";

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("unexpected response: {0}")]
    Response(String),
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let base_url =
            std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(api_key, base_url)
    }

    /// Point the client at a non-default endpoint, e.g. a proxy or a mock
    /// server in tests.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Text-only generation request.
    pub async fn generate_text(&self, prompt: &str) -> Result<GenerateResponse, GeminiError> {
        let body = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": 0.7,
                "topP": 0.95,
                "topK": 40,
                "candidateCount": 1
            }
        });
        self.generate(body).await
    }

    /// Vision request: an instruction part plus an inline JPEG part.
    pub async fn generate_vision(
        &self,
        prompt: &str,
        image_b64: &str,
    ) -> Result<GenerateResponse, GeminiError> {
        let body = json!({
            "contents": [{
                "parts": [
                    {"text": prompt},
                    {"inlineData": {"data": image_b64, "mimeType": IMAGE_MIME_TYPE}}
                ]
            }],
            "generationConfig": {
                "temperature": 0.4,
                "candidateCount": 1
            }
        });
        self.generate(body).await
    }

    async fn generate(&self, body: Value) -> Result<GenerateResponse, GeminiError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, GEMINI_MODEL, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GeminiError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(%status, body = %error_body, "Gemini API call failed");
            return Err(GeminiError::Http(format!(
                "status={status} body={error_body}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GeminiError::Http(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| GeminiError::Response(format!("parse error: {e}")))
    }
}

// --- Response envelope ---
//
// Everything is defaulted so that a structurally surprising envelope becomes
// an empty one instead of a deserialization failure; emptiness is then
// handled explicitly by `extract_text`.

#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

/// Pulls the first textual completion out of a response envelope.
///
/// A safety-blocked candidate may arrive with or without content parts, so
/// the finish reason is inspected before emptiness of the parts: no
/// candidates at all is `EmptyResponse`, a first candidate blocked for
/// safety is `SafetyBlocked` (carrying the ratings), and anything else
/// without a text part is `EmptyResponse`. The text is returned verbatim,
/// untrimmed.
pub fn extract_text(response: &GenerateResponse) -> Result<String, ApiError> {
    let candidate = response.candidates.first().ok_or(ApiError::EmptyResponse)?;

    if candidate.finish_reason.as_deref() == Some(FINISH_REASON_SAFETY) {
        warn!(ratings = ?candidate.safety_ratings, "model response blocked for safety reasons");
        return Err(ApiError::SafetyBlocked {
            ratings: candidate.safety_ratings.clone().unwrap_or(Value::Null),
        });
    }

    candidate
        .content
        .parts
        .iter()
        .find_map(|p| p.text.clone())
        .ok_or(ApiError::EmptyResponse)
}
