use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::{load_catalog, load_text};
use crate::api::response::{ApiError, AppQuery};
use crate::catalog::spotlight::{self, SpotlightDefinition, SPOTLIGHT_PATH};
use crate::catalog::table::read_raw;
use crate::catalog::{CatalogQuery, Collection, FilterOptions, QueryResult, Row};
use crate::submission::DEFAULT_REPORT_CONTACT;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct FiltersResponse {
    pub collection: Collection,
    pub filters: Vec<FilterOptions>,
    pub sorts: Vec<crate::catalog::SortOrder>,
}

#[derive(Debug, Serialize)]
pub struct GameDetailResponse {
    pub idx: usize,
    pub title: String,
    /// `"Designer • Publisher"`, skipping blanks
    pub byline: String,
    pub fields: BTreeMap<&'static str, String>,
    pub image_url: Option<String>,
    pub report: ReportLink,
}

/// Where and how to report a dead download link.
#[derive(Debug, Serialize)]
pub struct ReportLink {
    pub email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct SpotlightParams {
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SpotlightSummary {
    pub key: String,
    pub title: String,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct SpotlightResponse {
    pub spotlight: SpotlightDefinition,
    pub available: Vec<SpotlightSummary>,
    pub games: Vec<Row>,
    pub summary: String,
}

fn parse_collection(name: &str) -> Result<Collection, ApiError> {
    Ok(name.parse::<Collection>()?)
}

// ============================================================================
// Handlers
// ============================================================================

/// Route: GET /api/catalog/:collection
pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    AppQuery(params): AppQuery<HashMap<String, String>>,
) -> Result<Json<QueryResult>, ApiError> {
    let collection = parse_collection(&collection)?;
    let query = CatalogQuery::from_params(collection.schema(), &params)?;
    let catalog = load_catalog(&state, collection).await?;
    Ok(Json(catalog.query(&query)))
}

/// Route: GET /api/catalog/:collection/filters
pub async fn catalog_filters(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
) -> Result<Json<FiltersResponse>, ApiError> {
    let collection = parse_collection(&collection)?;
    let catalog = load_catalog(&state, collection).await?;
    Ok(Json(FiltersResponse {
        collection,
        filters: catalog.filter_options(),
        sorts: catalog.schema().sorts.to_vec(),
    }))
}

/// Route: GET /api/games/:idx
pub async fn game_detail(
    State(state): State<Arc<AppState>>,
    Path(idx): Path<String>,
) -> Result<Json<GameDetailResponse>, ApiError> {
    let not_found = || ApiError::not_found("Game not found");
    let idx: usize = idx.trim().parse().map_err(|_| not_found())?;
    let catalog = load_catalog(&state, Collection::Games).await?;
    let row = catalog.get(idx).ok_or_else(not_found)?;

    let title = match row.get("Game Title").trim() {
        "" => "Unknown Game",
        t => t,
    };
    let byline = [row.get("Designer").trim(), row.get("Publisher").trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" • ");
    let or_none = |s: &str| match s.trim() {
        "" => "(none)".to_string(),
        s => s.to_string(),
    };

    let report = ReportLink {
        email: DEFAULT_REPORT_CONTACT.to_string(),
        subject: format!("Dead link report: {title}"),
        body: format!(
            "Hello PnPFinder team,\n\nOne or more download links appear broken.\n\n\
             Game: {title}\nID: {idx}\nLink 1: {}\nLink 2: {}\n\n(Please include any details here.)",
            or_none(row.get("Download Link")),
            or_none(row.get("Secondary Download Link")),
        ),
    };

    Ok(Json(GameDetailResponse {
        idx,
        title: title.to_string(),
        byline,
        fields: row.fields.clone(),
        image_url: row.image_url.clone(),
        report,
    }))
}

/// Route: GET /api/spotlight
pub async fn spotlight(
    State(state): State<Arc<AppState>>,
    AppQuery(params): AppQuery<SpotlightParams>,
) -> Result<Json<SpotlightResponse>, ApiError> {
    let defs_text = load_text(&state, SPOTLIGHT_PATH, "Spotlight definitions").await?;
    let games_text = load_text(&state, Collection::Games.schema().path, "games data").await?;

    let defs = spotlight::parse_definitions(&defs_text)?;
    let today = Local::now().date_naive();
    let current = spotlight::choose_definition(&defs, params.key.as_deref(), today)
        .ok_or_else(|| ApiError::not_found("No spotlight definitions"))?;

    let raw = read_raw(&games_text)?;
    let picks = spotlight::select_games(current, &raw)?;
    let catalog = crate::catalog::Catalog::from_csv(
        Collection::Games,
        &games_text,
        Local::now().naive_local(),
    )?;
    let games: Vec<Row> = picks
        .into_iter()
        .filter_map(|idx| catalog.get(idx).cloned())
        .collect();

    let available = defs
        .iter()
        .map(|d| SpotlightSummary {
            key: d.key.clone(),
            title: d.title.clone(),
            current: d.key == current.key,
        })
        .collect();

    Ok(Json(SpotlightResponse {
        summary: format!("{} featured games", games.len()),
        spotlight: current.clone(),
        available,
        games,
    }))
}
