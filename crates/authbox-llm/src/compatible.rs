use std::fmt;

use serde::Serialize;

use crate::provider::CodeProvider;

/// Fallback adapter: any OpenAI-compatible `chat/completions` endpoint.
pub struct CompatibleProvider {
    api_key: String,
    base_url: String,
    model: String,
}

impl fmt::Debug for CompatibleProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibleProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl CompatibleProvider {
    #[must_use]
    pub fn new(api_key: String, mut base_url: String, model: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            api_key,
            base_url,
            model,
        }
    }
}

impl CodeProvider for CompatibleProvider {
    fn name(&self) -> &'static str {
        "compatible"
    }

    fn build_request(&self, client: &reqwest::Client, prompt: &str) -> reqwest::RequestBuilder {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
    }

    // choices[0].message.content, where content is a plain string or an
    // array of {type: "text", text} parts depending on the backend
    fn extract_text(&self, payload: &serde_json::Value) -> Option<String> {
        let content = payload
            .get("choices")?
            .get(0)?
            .get("message")?
            .get("content")?;

        if let Some(text) = content.as_str() {
            return Some(text.to_owned());
        }

        content
            .as_array()?
            .iter()
            .find_map(|part| part.get("text")?.as_str().map(ToOwned::to_owned))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}
