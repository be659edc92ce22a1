use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use authbox_core::EmailRecord;
use authbox_store::SqliteStore;
use tokio::sync::{mpsc, watch};

use crate::error::GatewayError;
use crate::router::build_router;

#[derive(Clone)]
pub(crate) struct AppState {
    pub email_tx: mpsc::Sender<EmailRecord>,
    pub store: Arc<SqliteStore>,
    pub started_at: Instant,
}

/// Credentials for the Basic-auth admin view.
#[derive(Clone)]
pub struct AdminCredentials {
    pub id: String,
    pub password: String,
}

pub struct GatewayServer {
    addr: SocketAddr,
    admin: AdminCredentials,
    ingest_token: Option<String>,
    max_body_size: usize,
    email_tx: mpsc::Sender<EmailRecord>,
    store: Arc<SqliteStore>,
    shutdown_rx: watch::Receiver<bool>,
}

impl GatewayServer {
    #[must_use]
    pub fn new(
        bind: &str,
        port: u16,
        admin: AdminCredentials,
        email_tx: mpsc::Sender<EmailRecord>,
        store: Arc<SqliteStore>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let addr: SocketAddr = format!("{bind}:{port}").parse().unwrap_or_else(|e| {
            tracing::warn!("invalid bind '{bind}': {e}, falling back to 127.0.0.1:{port}");
            SocketAddr::from(([127, 0, 0, 1], port))
        });

        if bind == "0.0.0.0" {
            tracing::warn!("gateway binding to 0.0.0.0 — ensure this is intended for production");
        }

        Self {
            addr,
            admin,
            ingest_token: None,
            max_body_size: 1_048_576,
            email_tx,
            store,
            shutdown_rx,
        }
    }

    /// Require a bearer token on the ingestion endpoint.
    #[must_use]
    pub fn with_ingest_auth(mut self, token: Option<String>) -> Self {
        self.ingest_token = token;
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Start the HTTP gateway server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or encounters a fatal I/O error.
    pub async fn serve(self) -> Result<(), GatewayError> {
        let state = AppState {
            email_tx: self.email_tx,
            store: self.store,
            started_at: Instant::now(),
        };

        let router = build_router(state, self.admin, self.ingest_token, self.max_body_size);

        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(|e| GatewayError::Bind(self.addr.to_string(), e))?;
        tracing::info!("gateway listening on {}", self.addr);

        let mut shutdown_rx = self.shutdown_rx;
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown_rx.borrow_and_update() {
                    if shutdown_rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                tracing::info!("gateway shutting down");
            })
            .await
            .map_err(|e| GatewayError::Server(format!("{e}")))?;

        Ok(())
    }
}
