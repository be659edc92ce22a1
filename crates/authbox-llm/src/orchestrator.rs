use serde::Deserialize;

use crate::any::AnyCodeProvider;
use crate::envelope::ProviderEnvelope;
use crate::normalize::json_candidate;
use crate::provider::{self, CodeProvider};

const MAX_PRIMARY_ATTEMPTS: u32 = 3;

const DEFAULT_TITLE: &str = "Unknown Organization";
const DEFAULT_CODE: &str = "No Code Found";
const DEFAULT_TOPIC: &str = "No Topic Found";

/// Structured model output for one email.
///
/// `code_exist != 1` means no code-bearing content was found and no other
/// field is consulted. The accessors fill in display defaults for absent or
/// empty fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Extraction {
    #[serde(rename = "codeExist", default)]
    pub code_exist: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
}

impl Extraction {
    #[must_use]
    pub fn code_found(&self) -> bool {
        self.code_exist == 1
    }

    #[must_use]
    pub fn title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or(DEFAULT_TITLE)
    }

    #[must_use]
    pub fn code(&self) -> &str {
        non_empty(self.code.as_deref()).unwrap_or(DEFAULT_CODE)
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        non_empty(self.topic.as_deref()).unwrap_or(DEFAULT_TOPIC)
    }
}

fn non_empty(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

/// Retry/fallback state for one extraction invocation.
///
/// An HTTP-level failure on the primary (non-2xx or transport error) moves
/// straight to `FallbackCheck`: an outage or quota condition is unlikely to
/// clear on immediate retry. A 2xx response whose body cannot be turned into
/// an `Extraction` stays in `RetryPrimary` until the attempt bound, since a
/// malformed generation is transient.
#[derive(Debug)]
enum Step {
    RetryPrimary { attempt: u32 },
    FallbackCheck,
    Done(Extraction),
    Failed,
}

/// Drives the bounded-retry primary call and the single-shot fallback.
pub struct ExtractOrchestrator {
    client: reqwest::Client,
    primary: AnyCodeProvider,
    fallback: Option<AnyCodeProvider>,
    max_attempts: u32,
}

impl ExtractOrchestrator {
    #[must_use]
    pub fn new(primary: AnyCodeProvider) -> Self {
        Self {
            client: crate::http::default_client(),
            primary,
            fallback: None,
            max_attempts: MAX_PRIMARY_ATTEMPTS,
        }
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: AnyCodeProvider) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Run one extraction to a terminal state.
    ///
    /// `None` means "no extraction available" — never a fault. All provider
    /// and parse failures are absorbed and logged along the way.
    pub async fn extract(&self, prompt: &str) -> Option<Extraction> {
        let mut step = Step::RetryPrimary { attempt: 0 };
        loop {
            step = match step {
                Step::RetryPrimary { attempt } => self.primary_step(attempt, prompt).await,
                Step::FallbackCheck => self.fallback_step(prompt).await,
                Step::Done(extraction) => return Some(extraction),
                Step::Failed => return None,
            };
        }
    }

    async fn primary_step(&self, attempt: u32, prompt: &str) -> Step {
        if attempt >= self.max_attempts {
            tracing::warn!(
                provider = self.primary.name(),
                attempts = attempt,
                "primary attempts exhausted"
            );
            return Step::FallbackCheck;
        }

        let envelope = provider::call(&self.primary, &self.client, prompt).await;
        if !envelope.ok {
            tracing::warn!(
                provider = self.primary.name(),
                status = envelope.status,
                status_text = %envelope.status_text,
                "primary call failed at HTTP level"
            );
            return Step::FallbackCheck;
        }

        match decode(&self.primary, &envelope) {
            Some(extraction) => Step::Done(extraction),
            None => {
                tracing::debug!(
                    provider = self.primary.name(),
                    attempt = attempt + 1,
                    max = self.max_attempts,
                    "response not decodable, retrying"
                );
                Step::RetryPrimary {
                    attempt: attempt + 1,
                }
            }
        }
    }

    async fn fallback_step(&self, prompt: &str) -> Step {
        let Some(ref fallback) = self.fallback else {
            return Step::Failed;
        };

        let envelope = provider::call(fallback, &self.client, prompt).await;
        if !envelope.ok {
            tracing::warn!(
                provider = fallback.name(),
                status = envelope.status,
                status_text = %envelope.status_text,
                "fallback call failed at HTTP level"
            );
            return Step::Failed;
        }

        // one shot at this tier, decodable or not
        match decode(fallback, &envelope) {
            Some(extraction) => Step::Done(extraction),
            None => {
                tracing::warn!(provider = fallback.name(), "fallback response not decodable");
                Step::Failed
            }
        }
    }
}

fn decode<P: CodeProvider>(provider: &P, envelope: &ProviderEnvelope) -> Option<Extraction> {
    let payload = envelope.payload.as_ref()?;
    let text = provider.extract_text(payload)?;
    let candidate = json_candidate(&text);
    match serde_json::from_str(candidate) {
        Ok(extraction) => Some(extraction),
        Err(e) => {
            tracing::debug!(provider = provider.name(), error = %e, "model output is not valid JSON");
            None
        }
    }
}
