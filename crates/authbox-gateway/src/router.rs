use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use subtle::ConstantTimeEq;
use tower_http::limit::RequestBodyLimitLayer;

use super::handlers::{admin_handler, health_handler, ingest_handler};
use super::server::{AdminCredentials, AppState};

#[derive(Clone)]
struct IngestAuth {
    token: Option<String>,
}

pub(crate) fn build_router(
    state: AppState,
    admin: AdminCredentials,
    ingest_token: Option<String>,
    max_body_size: usize,
) -> Router {
    let ingest = Router::new()
        .route("/email", post(ingest_handler))
        .layer(middleware::from_fn_with_state(
            IngestAuth {
                token: ingest_token,
            },
            ingest_auth_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(max_body_size));

    let admin_view = Router::new()
        .route("/", get(admin_handler))
        .layer(middleware::from_fn_with_state(admin, admin_auth_middleware));

    Router::new()
        .route("/health", get(health_handler))
        .merge(ingest)
        .merge(admin_view)
        .with_state(state)
}

async fn ingest_auth_middleware(
    axum::extract::State(cfg): axum::extract::State<IngestAuth>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(ref expected) = cfg.token {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or("");

        if !ct_eq(token, expected) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    next.run(req).await
}

async fn admin_auth_middleware(
    axum::extract::State(cfg): axum::extract::State<AdminCredentials>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(credentials) = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
        .and_then(|b64| BASE64.decode(b64).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
    else {
        return basic_challenge();
    };

    let Some((id, password)) = credentials.split_once(':') else {
        return basic_challenge();
    };

    // bitwise and so both comparisons always run
    if !(ct_eq(id, &cfg.id) & ct_eq(password, &cfg.password)) {
        return basic_challenge();
    }

    next.run(req).await
}

/// Hash both values to fixed-length digests to avoid leaking length.
fn ct_eq(given: &str, expected: &str) -> bool {
    let given_hash = blake3::hash(given.as_bytes());
    let expected_hash = blake3::hash(expected.as_bytes());
    bool::from(given_hash.as_bytes().ct_eq(expected_hash.as_bytes()))
}

fn basic_challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"authbox admin\"")],
        "Unauthorized",
    )
        .into_response()
}
