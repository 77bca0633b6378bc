use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::TranslateConfig;
use crate::error::{Result, MangaBatchError};
use super::TranslationBackend;

/// Client for the public Google translate endpoint
pub struct GoogleBackend {
    client: Client,
    config: TranslateConfig,
}

impl GoogleBackend {
    pub fn new(config: TranslateConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    async fn request(&self, source: &str, target: &str, text: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending translation request to: {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("client", "gtx"), ("sl", source), ("tl", target), ("dt", "t"), ("q", text)])
            .send()
            .await
            .map_err(|e| MangaBatchError::TranslationBackendFailed {
                detail: format!("HTTP request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MangaBatchError::TranslationBackendFailed {
                detail: format!("API error {}: {}", status, error_text),
            });
        }

        let body: Value = response.json().await.map_err(|e| MangaBatchError::TranslationBackendFailed {
            detail: format!("Failed to parse response: {}", e),
        })?;

        parse_response(&body)
    }
}

/// Join the translated sentence chunks of a `translate_a/single` response
fn parse_response(body: &Value) -> Result<String> {
    let chunks = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| MangaBatchError::TranslationBackendFailed {
            detail: format!("Unexpected response shape: {}", body),
        })?;

    let translated: String = chunks
        .iter()
        .filter_map(|chunk| chunk.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(MangaBatchError::TranslationBackendFailed {
            detail: "Empty translation received".to_string(),
        });
    }
    Ok(translated)
}

#[async_trait]
impl TranslationBackend for GoogleBackend {
    async fn translate(&self, source: &str, target: &str, text: &str) -> Result<String> {
        if text.trim().is_empty() || source == target {
            return Ok(text.to_string());
        }

        let mut attempt = 0;
        loop {
            match self.request(source, target, text).await {
                Ok(translated) => return Ok(translated),
                Err(e) if attempt < self.config.max_retries => {
                    attempt += 1;
                    warn!("Translation attempt {} failed: {}; retrying", attempt, e);
                    tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_joins_sentence_chunks() {
        let body = json!([
            [["Bonjour. ", "Hello. ", null, null, 10], ["Comment vas-tu ?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);
        assert_eq!(parse_response(&body).unwrap(), "Bonjour. Comment vas-tu ?");
    }

    #[test]
    fn test_parse_rejects_unexpected_shapes() {
        assert!(parse_response(&json!({"error": "nope"})).is_err());
        assert!(parse_response(&json!([[]])).is_err());
    }

    #[tokio::test]
    async fn test_blank_or_same_language_short_circuits() {
        // Unroutable endpoint: any request would fail
        let config = TranslateConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            max_retries: 0,
            ..TranslateConfig::default()
        };
        let backend = GoogleBackend::new(config).unwrap();

        assert_eq!(backend.translate("en", "fr", "   ").await.unwrap(), "   ");
        assert_eq!(backend.translate("fr", "fr", "Salut").await.unwrap(), "Salut");
        assert!(matches!(
            backend.translate("en", "fr", "Hello").await,
            Err(MangaBatchError::TranslationBackendFailed { .. })
        ));
    }
}
