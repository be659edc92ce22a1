use std::sync::Arc;

use authbox_llm::ExtractOrchestrator;
use authbox_llm::prompt::extraction_prompt;
use authbox_notify::BarkNotifier;
use authbox_store::SqliteStore;

use crate::email::{Disposition, EmailRecord};

/// One invocation of the extraction pipeline per inbound message.
///
/// The sequence is fixed: raw-mail audit insert, then extraction, then the
/// persistence gate, then (when configured) notification fan-out. Every
/// failure along the way is absorbed and logged — `process` never faults,
/// it only reports a rejection reason on the returned [`Disposition`].
pub struct Pipeline {
    store: Arc<SqliteStore>,
    orchestrator: ExtractOrchestrator,
    notifier: Option<BarkNotifier>,
}

impl Pipeline {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, orchestrator: ExtractOrchestrator) -> Self {
        Self {
            store,
            orchestrator,
            notifier: None,
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: BarkNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Process one inbound message to completion.
    pub async fn process(&self, email: &EmailRecord) -> Disposition {
        let mut disposition = Disposition::default();

        // Audit trail first, whatever extraction does later.
        if let Err(e) = self
            .store
            .insert_raw_mail(
                &email.from,
                &email.to,
                &email.raw_body,
                email.message_id.as_deref(),
            )
            .await
        {
            tracing::error!(from = %email.from, to = %email.to, error = %e, "failed to save raw mail");
            disposition.set_reject(format!(
                "Failed to save message from {} to {}",
                email.from, email.to
            ));
        }

        let prompt = extraction_prompt(&email.raw_body);
        let Some(extraction) = self.orchestrator.extract(&prompt).await else {
            tracing::warn!(from = %email.from, "no extraction available for message");
            return disposition;
        };

        if !extraction.code_found() {
            tracing::info!(from = %email.from, "no code in message, skipping persistence and fan-out");
            return disposition;
        }

        let title = extraction.title();
        let code = extraction.code();
        let topic = extraction.topic();

        if let Err(e) = self
            .store
            .insert_code_mail(
                &email.from,
                title,
                &email.to,
                code,
                topic,
                email.message_id.as_deref(),
            )
            .await
        {
            tracing::error!(from = %email.from, error = %e, "failed to save extracted code");
            disposition.set_reject(format!(
                "Failed to save extracted code for message from {} to {}",
                email.from, email.to
            ));
        }

        if let Some(ref notifier) = self.notifier {
            let delivered = notifier.notify_all(title, code).await;
            tracing::info!(
                delivered,
                tokens = notifier.token_count(),
                "notification fan-out complete"
            );
        }

        disposition
    }
}
