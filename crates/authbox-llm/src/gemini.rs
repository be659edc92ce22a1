use std::fmt;

use serde::Serialize;

use crate::provider::CodeProvider;

const API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Primary adapter: Google Gemini `generateContent`.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: API_BASE.into(),
        }
    }

    /// Override the API base URL (tests point this at a mock server).
    #[must_use]
    pub fn with_base_url(mut self, mut base_url: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        self.base_url = base_url;
        self
    }
}

impl CodeProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn build_request(&self, client: &reqwest::Client, prompt: &str) -> reqwest::RequestBuilder {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
    }

    // candidates[0].content.parts[0].text
    fn extract_text(&self, payload: &serde_json::Value) -> Option<String> {
        payload
            .get("candidates")?
            .get(0)?
            .get("content")?
            .get("parts")?
            .get(0)?
            .get("text")?
            .as_str()
            .map(ToOwned::to_owned)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn provider() -> GeminiProvider {
        GeminiProvider::new("k".into(), "gemini-1.5-flash-latest".into())
    }

    #[test]
    fn name_returns_gemini() {
        assert_eq!(provider().name(), "gemini");
    }

    #[test]
    fn debug_redacts_api_key() {
        let p = GeminiProvider::new("top-secret".into(), "m".into());
        let debug = format!("{p:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let p = provider().with_base_url("http://localhost:9999///".into());
        assert_eq!(p.base_url, "http://localhost:9999");
    }

    #[test]
    fn request_body_serializes_contents_parts() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"hello"}]}]}"#);
    }

    #[test]
    fn extract_text_happy_path() {
        let payload = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "{\"codeExist\":0}"}]
                }
            }]
        });
        assert_eq!(
            provider().extract_text(&payload).unwrap(),
            "{\"codeExist\":0}"
        );
    }

    #[test]
    fn extract_text_missing_candidates() {
        assert!(provider().extract_text(&json!({})).is_none());
        assert!(provider().extract_text(&json!({"candidates": []})).is_none());
    }

    #[test]
    fn extract_text_missing_parts() {
        let payload = json!({"candidates": [{"content": {}}]});
        assert!(provider().extract_text(&payload).is_none());
        let payload = json!({"candidates": [{"content": {"parts": []}}]});
        assert!(provider().extract_text(&payload).is_none());
    }

    #[test]
    fn extract_text_non_string_text() {
        let payload = json!({
            "candidates": [{"content": {"parts": [{"text": 42}]}}]
        });
        assert!(provider().extract_text(&payload).is_none());
    }

    #[test]
    fn extract_text_non_object_payload() {
        assert!(provider().extract_text(&json!(null)).is_none());
        assert!(provider().extract_text(&json!("text")).is_none());
        assert!(provider().extract_text(&json!([1, 2])).is_none());
    }
}
