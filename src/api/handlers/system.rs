use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

const NO_STORE: (header::HeaderName, &str) = (header::CACHE_CONTROL, "no-store");

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub ok: bool,
    pub now: String,
}

/// Liveness check.
/// Route: GET /api/ping
pub async fn ping() -> impl IntoResponse {
    (
        [NO_STORE],
        Json(PingResponse {
            ok: true,
            now: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }),
    )
}

/// Echo the raw request body back as JSON.
/// Route: POST /api/echo
pub async fn echo(body: Bytes) -> impl IntoResponse {
    let body = if body.is_empty() {
        Bytes::from_static(b"{}")
    } else {
        body
    };
    (
        [(header::CONTENT_TYPE, "application/json"), NO_STORE],
        body,
    )
}
