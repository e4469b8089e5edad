//! CSV-backed catalogs: parsing, filtering, searching, sorting and paging.

pub mod campaign;
pub mod images;
pub mod matching;
pub mod options;
pub mod page;
pub mod schema;
pub mod sort;
pub mod spotlight;
pub mod table;

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

pub use campaign::{Campaign, CampaignStatus};
pub use options::{FilterOptions, SubmitFormOptions};
pub use page::{Page, PagerItem};
pub use schema::{Collection, MatchKind, Schema};
pub use sort::SortOrder;
pub use table::TableError;

/// One catalog entry with every canonical column filled in.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    /// Position in the CSV file, used as a stable id
    pub idx: usize,
    pub fields: BTreeMap<&'static str, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
}

impl Row {
    /// Cell value, or `""` for columns the row does not have.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map_or("", String::as_str)
    }

    fn matches(&self, column: &str, kind: MatchKind, needle: &str) -> bool {
        let value = self.get(column);
        match kind {
            MatchKind::CampaignStatus => self
                .campaign
                .as_ref()
                .is_some_and(|c| c.status.as_str().eq_ignore_ascii_case(needle.trim())),
            MatchKind::Contains => matching::contains(value, needle),
            MatchKind::Exact => matching::exact(value, needle),
            MatchKind::FreePaid => matching::free_paid(value, needle),
            MatchKind::MultiValue => matching::multi_value_contains(value, needle),
            MatchKind::Numeric => matching::number_equals(value, needle),
            MatchKind::Range => matching::range_overlaps(value, needle),
        }
    }

    fn matches_search(&self, fields: &[&str], needle: &str) -> bool {
        fields
            .iter()
            .any(|f| self.get(f).to_lowercase().contains(needle))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid page: {0}")]
    InvalidPage(String),
}

/// Parameters of one catalog listing request.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    pub search: String,
    pub sort: SortOrder,
    pub page: usize,
    pub filters: Vec<(&'static str, MatchKind, String)>,
}

impl Default for CatalogQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: SortOrder::Relevance,
            page: 1,
            filters: Vec::new(),
        }
    }
}

impl CatalogQuery {
    /// Build a query from request parameters. `q`, `sort` and `page` are
    /// reserved; every other key names a filter column.
    pub fn from_params(schema: &Schema, params: &HashMap<String, String>) -> Result<Self, QueryError> {
        let mut query = CatalogQuery::default();

        for (name, value) in params {
            match name.as_str() {
                "q" => query.search = value.trim().to_string(),
                "sort" => query.sort = schema.sort_order(value),
                "page" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        query.page = value
                            .parse()
                            .map_err(|_| QueryError::InvalidPage(value.to_string()))?;
                    }
                }
                _ => {
                    let (column, kind) = schema
                        .filter(name)
                        .ok_or_else(|| QueryError::UnknownFilter(name.clone()))?;
                    let value = value.trim();
                    if !value.is_empty() {
                        query.filters.push((column, kind, value.to_string()));
                    }
                }
            }
        }

        query.filters.sort_by_key(|(column, _, _)| *column);
        Ok(query)
    }
}

/// A page of results plus the pager and summary line shown with it.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub collection: Collection,
    #[serde(flatten)]
    pub page: Page<Row>,
    pub pager: Vec<PagerItem>,
    pub summary: String,
    pub sort: SortOrder,
}

/// All rows of one collection, parsed and ready to query.
#[derive(Debug)]
pub struct Catalog {
    schema: &'static Schema,
    rows: Vec<Row>,
}

impl Catalog {
    pub fn from_csv(collection: Collection, text: &str, now: NaiveDateTime) -> Result<Self, TableError> {
        let schema = collection.schema();
        let rows = table::parse_rows(schema, text, now)?;
        tracing::debug!(%collection, rows = rows.len(), "Parsed catalog");
        Ok(Self { schema, rows })
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    /// Filter, search, sort and paginate.
    pub fn query(&self, query: &CatalogQuery) -> QueryResult {
        let needle = query.search.to_lowercase();
        let mut matched: Vec<&Row> = self
            .rows
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, kind, value)| row.matches(column, *kind, value))
            })
            .filter(|row| needle.is_empty() || row.matches_search(self.schema.search_fields, &needle))
            .collect();

        sort::sort_rows(&mut matched, query.sort, self.schema);

        let page = Page::paginate(matched, query.page);
        let pager = page::pager_window(page.page, page.total_pages);
        let summary =
            page::results_summary(page.total, self.schema.noun, page.page, page.total_pages);

        QueryResult {
            collection: self.schema.collection,
            page: Page {
                items: page.items.into_iter().cloned().collect(),
                total: page.total,
                page: page.page,
                total_pages: page.total_pages,
                page_size: page.page_size,
            },
            pager,
            summary,
            sort: query.sort,
        }
    }

    pub fn filter_options(&self) -> Vec<FilterOptions> {
        options::filter_options(self.schema, &self.rows)
    }
}
