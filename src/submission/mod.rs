//! User submissions: validation, image upload and CSV append.
//!
//! Each accepted submission becomes up to two commits on the content store:
//! the image (if any) and the updated collection CSV. The CSV update is a
//! read-modify-write guarded only by the blob sha, so two concurrent
//! submissions to the same collection can conflict; the loser gets an error.

pub mod models;
pub mod validate;

use std::collections::HashMap;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::catalog::table::{self, TableError};
use crate::catalog::Collection;
use crate::content::{self, ContentStore, ContentStoreError};

pub use models::{ImagePayload, SubmissionReceipt, SubmissionRequest};
pub use validate::{guess_ext, make_id, validate, ValidSubmission};

/// Contact used when a game submission leaves "Report Dead Link" blank.
pub const DEFAULT_REPORT_CONTACT: &str = "help@pnpfinder.com";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] ContentStoreError),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// Validate `req`, commit its image and append its row to the collection CSV.
pub async fn submit(
    store: &dyn ContentStore,
    req: SubmissionRequest,
    now: DateTime<Utc>,
) -> Result<SubmissionReceipt, SubmissionError> {
    let submission = validate(req)?;
    let collection = submission.collection;
    let title = match submission.field("Game Title") {
        "" => submission.field("Title"),
        t => t,
    };
    let id = make_id(title, now);

    let image_path = match &submission.image {
        Some(image) => {
            let path = format!("uploads/{collection}/{id}{}", image.ext);
            content::put_file(
                store,
                &path,
                image.data.clone(),
                &format!("Add image for {collection}:{id}"),
            )
            .await?;
            format!("/{path}")
        }
        None => String::new(),
    };

    let row = build_row(&submission, &image_path);
    append_row(store, collection, &row, &format!("Add {collection} entry: {id}")).await?;

    tracing::info!(%collection, %id, image = !image_path.is_empty(), "Accepted submission");
    Ok(SubmissionReceipt { id, image_path })
}

/// Column values for the new CSV row.
pub fn build_row(submission: &ValidSubmission, image_path: &str) -> HashMap<String, String> {
    let schema = submission.collection.schema();
    let mut row: HashMap<String, String> = schema
        .columns
        .iter()
        .map(|c| (c.to_string(), String::new()))
        .collect();

    match submission.collection {
        Collection::Games => {
            row.extend(submission.fields.clone());
            if !image_path.is_empty() {
                row.insert(schema.image_column.to_string(), image_path.to_string());
            }
            let contact = row.entry("Report Dead Link".to_string()).or_default();
            if contact.is_empty() {
                *contact = DEFAULT_REPORT_CONTACT.to_string();
            }
        }
        _ => {
            for column in schema.columns {
                if *column != schema.image_column {
                    row.insert(column.to_string(), submission.field(column).to_string());
                }
            }
            if !image_path.is_empty() {
                row.insert(schema.image_column.to_string(), image_path.to_string());
            }
        }
    }
    row
}

/// Append `row` to the collection CSV, ordering values by the file's own header
/// line. A missing or empty file is created with the canonical header.
pub async fn append_row(
    store: &dyn ContentStore,
    collection: Collection,
    row: &HashMap<String, String>,
    message: &str,
) -> Result<String, SubmissionError> {
    let schema = collection.schema();
    let current = match store.get(schema.path).await {
        Ok(file) => Some(file),
        Err(ContentStoreError::NotFound(_)) => None,
        Err(e) => return Err(e.into()),
    };
    let existing = current
        .as_ref()
        .map(|f| f.text())
        .filter(|text| !text.trim().is_empty());

    let headers: Vec<String> = existing
        .as_deref()
        .and_then(table::header_line)
        .unwrap_or_else(|| schema.columns.iter().map(|c| c.to_string()).collect());

    let line = table::write_record(
        headers
            .iter()
            .map(|h| row.get(h).map_or("", String::as_str)),
    )?;

    let text = match existing {
        Some(mut text) => {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&line);
            text
        }
        None => format!("{}{line}", table::write_record(schema.columns)?),
    };

    let sha = current.as_ref().map(|f| f.sha.as_str());
    let new_sha = store
        .put(schema.path, Bytes::from(text), message, sha)
        .await?;
    tracing::debug!(path = schema.path, sha = %new_sha, "Appended CSV row");
    Ok(new_sha)
}
