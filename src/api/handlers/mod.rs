mod catalog;
mod static_files;
mod submit;
mod system;

use chrono::Local;

use crate::api::response::ApiError;
use crate::catalog::{Catalog, Collection};
use crate::content::ContentStoreError;
use crate::AppState;

pub use catalog::{catalog_filters, game_detail, list_catalog, spotlight};
pub use static_files::serve_data;
pub use submit::{cors_headers, submit, submit_options, submit_preflight};
pub use system::{echo, ping};

/// Read a repository file as text, mapping a missing file to 404 with `what`.
async fn load_text(state: &AppState, path: &str, what: &str) -> Result<String, ApiError> {
    match state.store.get(path).await {
        Ok(file) => Ok(file.text()),
        Err(ContentStoreError::NotFound(_)) => Err(ApiError::not_found(format!("{what} not found"))),
        Err(e) => Err(ApiError::internal(format!("Failed to load {path}: {e}"))),
    }
}

/// Load and parse a collection's CSV. Crowdfunding status is computed at local time.
async fn load_catalog(state: &AppState, collection: Collection) -> Result<Catalog, ApiError> {
    let schema = collection.schema();
    let text = load_text(state, schema.path, &format!("{collection} data")).await?;
    Ok(Catalog::from_csv(collection, &text, Local::now().naive_local())?)
}
