//! HTTP client for the generative vision endpoint.
//!
//! Wraps `reqwest` with typed error handling, API key management, and
//! parsing of the structured JSON verdict out of the model's candidate
//! text. The base URL is overridable so tests can point at a mock server.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};

use crate::error::VisionError;
use crate::types::{
    Content, GenerateRequest, GenerateResponse, GenerationConfig, Part, ScanVerdict,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
const MODEL: &str = "gemini-3-flash-preview";

const INSTRUCTION: &str = "You are a shopping assistant for a \"Boycott Thailand\" campaign in \
Cambodia. Identify the brand or product in the image. Determine if it is Thai-owned, based in \
Thailand, has a Thai CEO, or is a Thai franchise. Be very concise. Return ONLY a JSON object: \
{\"brandName\": \"...\", \"isThai\": boolean, \"recommendation\": \"Boycott\" | \"Support Local\" \
| \"Check further\", \"reasonEn\": \"Short explanation in English (max 15 words).\", \
\"reasonKm\": \"Short explanation in Khmer (max 15 words).\"}";

/// Client for the generative vision classification API.
pub struct VisionClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl VisionClient {
    /// Creates a new client pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::MissingApiKey`] for a blank key, or
    /// [`VisionError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, VisionError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with
    /// wiremock, or a proxy deployment).
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::MissingApiKey`] for a blank key,
    /// [`VisionError::Http`] if the underlying `reqwest::Client` cannot be
    /// constructed, or [`VisionError::Api`] if `base_url` is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, VisionError> {
        if api_key.trim().is_empty() {
            return Err(VisionError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("blcdb/0.1 (brand-scan)")
            .build()?;

        // Normalise: exactly one trailing slash so Url::join keeps the full
        // base path instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| VisionError::Api(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Classify a base64-encoded JPEG: is the pictured brand Thai-owned,
    /// and what should the shopper do?
    ///
    /// # Errors
    ///
    /// - [`VisionError::Http`] on network failure.
    /// - [`VisionError::Api`] on a non-2xx response or an empty candidate
    ///   set.
    /// - [`VisionError::Deserialize`] if the candidate text is not the
    ///   documented verdict shape.
    pub async fn classify_brand(&self, jpeg_base64: &str) -> Result<ScanVerdict, VisionError> {
        let url = self.build_url()?;
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::InlineData {
                        mime_type: "image/jpeg",
                        data: jpeg_base64.to_owned(),
                    },
                    Part::Text(INSTRUCTION.to_owned()),
                ],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self.client.post(url).json(&request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status != StatusCode::OK {
            return Err(VisionError::Api(extract_error_message(status, &body)));
        }

        let envelope: GenerateResponse =
            serde_json::from_str(&body).map_err(|source| VisionError::Deserialize {
                context: "generateContent envelope".to_owned(),
                source,
            })?;

        let text = envelope
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| VisionError::Api("response contained no candidates".to_owned()))?;

        serde_json::from_str(&text).map_err(|source| VisionError::Deserialize {
            context: "scan verdict".to_owned(),
            source,
        })
    }

    fn build_url(&self) -> Result<Url, VisionError> {
        let mut url = self
            .base_url
            .join(&format!("v1beta/models/{MODEL}:generateContent"))
            .map_err(|e| VisionError::Api(format!("invalid endpoint path: {e}")))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

/// Pull the human-readable message out of the API error envelope, falling
/// back to the raw status line.
fn extract_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(ToOwned::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_is_rejected() {
        assert!(matches!(
            VisionClient::new("  ", 30),
            Err(VisionError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_url_carries_model_and_key() {
        let client =
            VisionClient::with_base_url("test-key", 30, "http://localhost:9999").expect("client");
        let url = client.build_url().expect("url");
        assert!(url.path().ends_with(&format!("models/{MODEL}:generateContent")));
        assert_eq!(url.query(), Some("key=test-key"));
    }

    #[test]
    fn error_message_extraction_prefers_the_envelope() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(
            extract_error_message(StatusCode::BAD_REQUEST, body),
            "API key not valid"
        );
        assert_eq!(
            extract_error_message(StatusCode::BAD_GATEWAY, "not json"),
            "HTTP 502 Bad Gateway"
        );
    }
}
