use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::load_catalog;
use crate::api::response::{ApiError, AppJson};
use crate::catalog::{Collection, SubmitFormOptions};
use crate::submission::{self, SubmissionRequest};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub ok: bool,
    pub id: String,
    pub image_path: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Route: POST /api/submit
pub async fn submit(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SubmissionRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let receipt = submission::submit(state.store.as_ref(), req, Utc::now()).await?;
    Ok(Json(SubmitResponse {
        ok: true,
        id: receipt.id,
        image_path: receipt.image_path,
    }))
}

/// Route: OPTIONS /api/submit
pub async fn submit_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Route: GET /api/submit/options
///
/// Falls back to static lists when the games catalog cannot be read, so the
/// form stays usable.
pub async fn submit_options(State(state): State<Arc<AppState>>) -> Json<SubmitFormOptions> {
    let options = match load_catalog(&state, Collection::Games).await {
        Ok(catalog) => SubmitFormOptions::from_rows(catalog.rows()),
        Err(e) => {
            tracing::warn!(error = ?e, "Populating submit options failed, using fallback");
            SubmitFormOptions::fallback()
        }
    };
    Json(options)
}

/// Permissive CORS headers for the submission endpoint.
pub async fn cors_headers(mut response: Response) -> impl IntoResponse {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}
