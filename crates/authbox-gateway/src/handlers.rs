use authbox_core::EmailRecord;
use authbox_store::CodeMail;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use super::server::AppState;

const INDEX_HTML: &str = include_str!("../templates/index.html");

#[derive(serde::Deserialize)]
pub(crate) struct IngestPayload {
    pub from: String,
    pub to: String,
    pub raw: String,
    #[serde(default)]
    pub message_id: Option<String>,
}

#[derive(serde::Serialize)]
struct IngestResponse {
    status: &'static str,
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

pub(crate) async fn ingest_handler(
    State(state): State<AppState>,
    Json(payload): Json<IngestPayload>,
) -> impl IntoResponse {
    let email = EmailRecord {
        from: payload.from,
        to: payload.to,
        raw_body: payload.raw,
        message_id: payload.message_id,
    };
    match state.email_tx.send(email).await {
        Ok(()) => Json(IngestResponse { status: "accepted" }).into_response(),
        Err(_) => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub(crate) async fn admin_handler(State(state): State<AppState>) -> Response {
    match state.store.list_code_mails().await {
        Ok(rows) => Html(render_code_mails(&rows)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to query code mails");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn render_code_mails(rows: &[CodeMail]) -> String {
    let headers = "<tr>\
         <th>From</th>\
         <th>To</th>\
         <th>Topic</th>\
         <th>Code/Link</th>\
         <th>Receive Time</th>\
       </tr>";

    let mut data = String::new();
    for row in rows {
        data.push_str(&format!(
            "<tr>\
               <td>{}</td>\
               <td>{}</td>\
               <td>{}</td>\
               <td>{}</td>\
               <td>{}</td>\
             </tr>",
            escape(&row.from_org),
            escape(&row.to_addr),
            escape(&row.topic),
            escape(&row.code),
            row.created_at,
        ));
    }

    INDEX_HTML
        .replace("{{TABLE_HEADERS}}", headers)
        .replace("{{DATA}}", &data)
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok",
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn ingest_payload_deserializes() {
        let json = r#"{"from":"a@x.com","to":"b@y.com","raw":"body","message_id":"<m1>"}"#;
        let payload: IngestPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.from, "a@x.com");
        assert_eq!(payload.message_id.as_deref(), Some("<m1>"));
    }

    #[test]
    fn ingest_payload_message_id_optional() {
        let json = r#"{"from":"a","to":"b","raw":"c"}"#;
        let payload: IngestPayload = serde_json::from_str(json).unwrap();
        assert!(payload.message_id.is_none());
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn render_replaces_placeholders() {
        let html = render_code_mails(&[]);
        assert!(!html.contains("{{TABLE_HEADERS}}"));
        assert!(!html.contains("{{DATA}}"));
        assert!(html.contains("<th>Code/Link</th>"));
    }
}
