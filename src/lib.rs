//! pnp-finder - catalog and submission API for print-and-play board games
//!
//! This crate serves CSV-backed catalogs with:
//! - Header canonicalization and per-column filter matching (ranges, multi-value, numeric)
//! - Search, natural-order sorting and pagination
//! - Crowdfunding campaign status and weekly spotlight selections
//! - A submission endpoint that commits images and CSV rows through the GitHub contents API

pub mod api;
pub mod catalog;
pub mod config;
pub mod content;
pub mod submission;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use config::Config;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn content::ContentStore>,
}
