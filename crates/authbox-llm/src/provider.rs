use crate::envelope::ProviderEnvelope;

/// One LLM backend able to answer the extraction prompt.
///
/// Each implementation supplies its own request shape and knows where its
/// backend nests the generated text. The shared [`call`] drives the HTTP
/// round trip and envelope normalization so the adapters stay declarative.
pub trait CodeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build the provider-specific POST request for one prompt.
    fn build_request(&self, client: &reqwest::Client, prompt: &str) -> reqwest::RequestBuilder;

    /// Pull the generated text out of a decoded response payload.
    ///
    /// Returns `None` on any missing or unexpected level of nesting; never
    /// panics on malformed structure.
    fn extract_text(&self, payload: &serde_json::Value) -> Option<String>;
}

/// Issue one provider call and collapse every outcome into an envelope.
///
/// Transport failures become `{ok: false, status: 0, status_text:
/// "FETCH_ERROR", payload: None}` and are never propagated. A completed
/// round trip preserves the observed HTTP status; an undecodable body
/// yields `payload: None` without touching `ok`.
pub async fn call<P: CodeProvider>(
    provider: &P,
    client: &reqwest::Client,
    prompt: &str,
) -> ProviderEnvelope {
    let response = match provider.build_request(client, prompt).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(provider = provider.name(), error = %e, "provider transport failure");
            return ProviderEnvelope::fetch_error();
        }
    };

    let status = response.status();
    let ok = status.is_success();
    let status_text = status.canonical_reason().unwrap_or_default().to_owned();

    let payload = match response.json::<serde_json::Value>().await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(provider = provider.name(), error = %e, "response body not decodable");
            None
        }
    };

    ProviderEnvelope {
        ok,
        status: status.as_u16(),
        status_text,
        payload,
    }
}
