//! Push-notification fan-out: one GET per subscriber token.

mod error;

use std::time::Duration;

use url::Url;

pub use error::NotifyError;

/// Fan-out client for a Bark-style push endpoint.
///
/// Delivery shape is `GET {base}/{token}/{title}/{code}` with title and code
/// percent-encoded as path segments. Tokens are independent: one failed
/// delivery is logged and the remaining tokens are still attempted. No
/// retries at this tier.
#[derive(Debug, Clone)]
pub struct BarkNotifier {
    client: reqwest::Client,
    base_url: Url,
    tokens: Vec<String>,
}

impl BarkNotifier {
    #[must_use]
    pub fn new(base_url: Url, tokens: Vec<String>) -> Self {
        Self {
            client: default_client(),
            base_url,
            tokens,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Deliver one notification to every configured token, sequentially.
    ///
    /// Returns the number of successful deliveries. Failures are logged per
    /// token and never escalated.
    pub async fn notify_all(&self, title: &str, code: &str) -> usize {
        let mut delivered = 0;
        for token in &self.tokens {
            match self.send_one(token, title, code).await {
                Ok(()) => {
                    tracing::info!(token = %token, "notification delivered");
                    delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(token = %token, error = %e, "notification delivery failed");
                }
            }
        }
        delivered
    }

    async fn send_one(&self, token: &str, title: &str, code: &str) -> Result<(), NotifyError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| NotifyError::BadBase)?
            .pop_if_empty()
            .extend([token, title, code]);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }

        if let Ok(body) = response.text().await {
            tracing::debug!(token = %token, body = %body, "push endpoint response");
        }
        Ok(())
    }
}

fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .timeout(Duration::from_secs(60))
        .user_agent(concat!("authbox/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("default HTTP client construction must not fail")
}
