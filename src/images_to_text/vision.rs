use super::{EngineLauncher, OcrEngine, Recognition};
use crate::config::OcrConfig;
use crate::error::OcrError;
use crate::model::ImageInput;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

/// Launches a Google Cloud Vision client
pub struct VisionLauncher {
    api_key: Option<String>,
    endpoint: String,
}

impl VisionLauncher {
    pub fn new(config: &OcrConfig) -> Self {
        VisionLauncher {
            api_key: config.api_key.clone(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Configured key first, then the key found in the environment
    fn resolve_api_key(&self, env_key: Option<String>) -> Result<String, OcrError> {
        self.api_key
            .clone()
            .or(env_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                OcrError::Launch("GOOGLE_API_KEY not found in config or environment".to_string())
            })
    }
}

#[async_trait]
impl EngineLauncher for VisionLauncher {
    async fn launch(&self) -> Result<Box<dyn OcrEngine>, OcrError> {
        let api_key = self.resolve_api_key(std::env::var("GOOGLE_API_KEY").ok())?;

        Ok(Box::new(VisionEngine::with_base_url(
            api_key,
            self.endpoint.clone(),
        )))
    }
}

/// OCR through the Google Cloud Vision `TEXT_DETECTION` feature
pub struct VisionEngine {
    client: Client,
    api_key: String,
    base_url: String,
}

impl VisionEngine {
    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        VisionEngine {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl OcrEngine for VisionEngine {
    fn engine_name(&self) -> &str {
        "vision"
    }

    async fn recognize(&self, image: &ImageInput) -> Result<Recognition, OcrError> {
        let url = format!(
            "{}/v1/images:annotate?key={}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        );

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": STANDARD.encode(image.data())
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }]
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(&url)
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OcrError::Recognize(format!("Google Vision request failed: {}", e)))?;

        // Check for HTTP errors
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(OcrError::Recognize(format!(
                "Google Vision API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| OcrError::Recognize(format!("Unreadable Google Vision response: {}", e)))?;

        parse_annotation(&response_body)
    }
}

fn parse_annotation(body: &Value) -> Result<Recognition, OcrError> {
    let first = &body["responses"][0];

    if let Some(message) = first["error"]["message"].as_str() {
        return Err(OcrError::Recognize(format!(
            "Google Vision could not read the image: {}",
            message
        )));
    }

    // No annotation means no text was detected; the pipeline reports that as
    // insufficient text rather than an engine failure.
    let annotation = &first["fullTextAnnotation"];
    let text = annotation["text"].as_str().unwrap_or_default().to_string();
    let confidence = annotation["pages"][0]["confidence"]
        .as_f64()
        .map(|c| c as f32);

    debug!("Extracted text from image: {} characters", text.len());

    Ok(Recognition { text, confidence })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn image() -> ImageInput {
        ImageInput::new(b"test data".to_vec(), "image/jpeg").unwrap()
    }

    #[tokio::test]
    async fn test_recognize() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/images:annotate")
            .match_query(Matcher::UrlEncoded("key".into(), "fake_key".into()))
            .match_body(Matcher::PartialJson(json!({
                "requests": [{"image": {"content": STANDARD.encode(b"test data")}}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "responses": [{
                        "fullTextAnnotation": {
                            "text": "BURGERS\nDouble Smash 18.00\n",
                            "pages": [{"confidence": 0.93}]
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let engine = VisionEngine::with_base_url("fake_key".to_string(), server.url());
        let recognition = engine.recognize(&image()).await.unwrap();
        assert!(recognition.text.contains("Double Smash"));
        assert!(recognition.confidence.is_some());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_recognize_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/images:annotate")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body(r#"{"error": {"message": "API key not valid"}}"#)
            .create_async()
            .await;

        let engine = VisionEngine::with_base_url("bad_key".to_string(), server.url());
        match engine.recognize(&image()).await {
            Err(OcrError::Recognize(msg)) => assert!(msg.contains("403")),
            other => panic!("expected recognize error, got {:?}", other.map(|r| r.text)),
        }
        mock.assert_async().await;
    }

    #[test]
    fn test_parse_annotation_without_text() {
        let recognition = parse_annotation(&json!({"responses": [{}]})).unwrap();
        assert!(recognition.text.is_empty());
        assert!(recognition.confidence.is_none());
    }

    #[test]
    fn test_parse_annotation_per_image_error() {
        let body = json!({"responses": [{"error": {"message": "Bad image data."}}]});
        assert!(matches!(
            parse_annotation(&body),
            Err(OcrError::Recognize(msg)) if msg.contains("Bad image data")
        ));
    }

    #[test]
    fn test_missing_api_key_is_launch_error() {
        let launcher = VisionLauncher::new(&OcrConfig::default());
        match launcher.resolve_api_key(None) {
            Err(OcrError::Launch(msg)) => assert!(msg.contains("GOOGLE_API_KEY")),
            _ => panic!("expected launch error"),
        }
    }

    #[test]
    fn test_blank_env_key_is_launch_error() {
        let launcher = VisionLauncher::new(&OcrConfig::default());
        assert!(launcher.resolve_api_key(Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_configured_key_wins_over_env() {
        let launcher = VisionLauncher::new(&OcrConfig {
            api_key: Some("configured".to_string()),
            ..OcrConfig::default()
        });
        let key = launcher
            .resolve_api_key(Some("from-env".to_string()))
            .unwrap();
        assert_eq!(key, "configured");
    }

    #[tokio::test]
    async fn test_launch_with_configured_key() {
        let launcher = VisionLauncher::new(&OcrConfig {
            api_key: Some("configured".to_string()),
            ..OcrConfig::default()
        });
        let engine = launcher.launch().await.map_err(|e| e.to_string()).unwrap();
        assert_eq!(engine.engine_name(), "vision");
    }
}
