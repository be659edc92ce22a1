use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use authbox_core::{Config, Pipeline};
use authbox_gateway::{AdminCredentials, GatewayServer};
use authbox_llm::compatible::CompatibleProvider;
use authbox_llm::gemini::GeminiProvider;
use authbox_llm::{AnyCodeProvider, ExtractOrchestrator};
use authbox_notify::BarkNotifier;
use authbox_store::SqliteStore;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "authbox",
    version,
    about = "Inbound-mail verification-code extraction service"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "authbox.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if config.llm.gemini_api_key.is_empty() {
        tracing::warn!("no Gemini API key configured, extraction will fail until one is set");
    }

    let store = Arc::new(
        SqliteStore::new(&config.store.sqlite_path)
            .await
            .context("failed to open mail store")?,
    );

    let primary = AnyCodeProvider::Gemini(GeminiProvider::new(
        config.llm.gemini_api_key.clone(),
        config.llm.gemini_model.clone(),
    ));
    let mut orchestrator = ExtractOrchestrator::new(primary);
    if let Some(ref fallback) = config.llm.fallback {
        tracing::info!(model = %fallback.model, "fallback provider configured");
        orchestrator = orchestrator.with_fallback(AnyCodeProvider::Compatible(
            CompatibleProvider::new(
                fallback.api_key.clone(),
                fallback.base_url.clone(),
                fallback.model.clone(),
            ),
        ));
    }

    let mut pipeline = Pipeline::new(Arc::clone(&store), orchestrator);
    if config.notify.enabled {
        let base = url::Url::parse(&config.notify.base_url)
            .context("invalid notification base URL")?;
        tracing::info!(tokens = config.notify.tokens.len(), "notifications enabled");
        pipeline = pipeline.with_notifier(BarkNotifier::new(base, config.notify.tokens.clone()));
    }

    let (email_tx, mut email_rx) = tokio::sync::mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let admin = AdminCredentials {
        id: config.gateway.admin_id.clone(),
        password: config.gateway.admin_password.clone(),
    };
    let gateway = GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        admin,
        email_tx,
        Arc::clone(&store),
        shutdown_rx,
    )
    .with_ingest_auth(config.gateway.ingest_token.clone());
    let gateway_handle = tokio::spawn(gateway.serve());

    // One message is fully processed before the next is picked up; the
    // channel absorbs ingestion bursts in the meantime.
    loop {
        tokio::select! {
            maybe_email = email_rx.recv() => {
                let Some(email) = maybe_email else {
                    tracing::info!("ingestion channel closed, stopping");
                    break;
                };
                let disposition = pipeline.process(&email).await;
                if let Some(reason) = disposition.rejected() {
                    tracing::warn!(from = %email.from, to = %email.to, reason, "message flagged for rejection");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    let _ = shutdown_tx.send(true);
    match gateway_handle.await {
        Ok(result) => result.context("gateway terminated with error")?,
        Err(e) => tracing::error!(error = %e, "gateway task panicked"),
    }

    Ok(())
}
