use crate::compatible::CompatibleProvider;
use crate::gemini::GeminiProvider;
use crate::provider::CodeProvider;

/// Generates a match over all `AnyCodeProvider` variants, binding the inner
/// provider and evaluating the given closure for each arm.
macro_rules! delegate_provider {
    ($self:expr, |$p:ident| $expr:expr) => {
        match $self {
            AnyCodeProvider::Gemini($p) => $expr,
            AnyCodeProvider::Compatible($p) => $expr,
        }
    };
}

/// Config-driven provider selection for the two supported backends.
#[derive(Debug)]
pub enum AnyCodeProvider {
    Gemini(GeminiProvider),
    Compatible(CompatibleProvider),
}

impl CodeProvider for AnyCodeProvider {
    fn name(&self) -> &'static str {
        delegate_provider!(self, |p| p.name())
    }

    fn build_request(&self, client: &reqwest::Client, prompt: &str) -> reqwest::RequestBuilder {
        delegate_provider!(self, |p| p.build_request(client, prompt))
    }

    fn extract_text(&self, payload: &serde_json::Value) -> Option<String> {
        delegate_provider!(self, |p| p.extract_text(payload))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn gemini_variant_delegates() {
        let any = AnyCodeProvider::Gemini(GeminiProvider::new("k".into(), "m".into()));
        assert_eq!(any.name(), "gemini");
        let payload = json!({
            "candidates": [{"content": {"parts": [{"text": "t"}]}}]
        });
        assert_eq!(any.extract_text(&payload).unwrap(), "t");
    }

    #[test]
    fn compatible_variant_delegates() {
        let any = AnyCodeProvider::Compatible(CompatibleProvider::new(
            "k".into(),
            "http://x".into(),
            "m".into(),
        ));
        assert_eq!(any.name(), "compatible");
        let payload = json!({"choices": [{"message": {"content": "t"}}]});
        assert_eq!(any.extract_text(&payload).unwrap(), "t");
    }
}
