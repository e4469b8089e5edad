use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::content::ContentStoreError;
use crate::AppState;

/// Serve a raw data asset (CSV, JSON) from the content store.
/// Route: GET /data/*path
pub async fn serve_data(
    State(state): State<Arc<AppState>>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let repo_path = format!("data/{}", path.trim_start_matches('/'));

    let file = state.store.get(&repo_path).await.map_err(|e| match e {
        ContentStoreError::NotFound(_) | ContentStoreError::InvalidPath(_) => {
            ApiError::not_found("File not found")
        }
        _ => ApiError::internal(format!("Failed to retrieve file: {e}")),
    })?;

    let mime = mime_guess::from_path(&repo_path).first_or_octet_stream();
    let mut response = (StatusCode::OK, file.data).into_response();
    let headers = response.headers_mut();

    if let Ok(value) = mime.essence_str().parse() {
        headers.insert(header::CONTENT_TYPE, value);
    }

    // Catalog files change with every accepted submission
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-cache"),
    );

    Ok(response)
}
