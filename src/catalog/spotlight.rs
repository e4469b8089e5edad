//! Featured game selections described by `data/spotlight.json`.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::campaign::parse_date_flexible;
use super::matching::parse_number;
use super::table::RawTable;

pub const SPOTLIGHT_PATH: &str = "data/spotlight.json";

const DEFAULT_LIMIT: usize = 16;

#[derive(Debug, Error)]
pub enum SpotlightError {
    #[error("Invalid spotlight definitions: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No spotlight definitions")]
    Empty,

    #[error("Invalid spotlight pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotlightDefinition {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub hero: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Rotates weekly when no key is requested
    #[serde(default)]
    pub cycle: bool,
    #[serde(default)]
    pub curated: Vec<CuratedPick>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Selection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedPick {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub designer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub mode: String,
    #[serde(rename = "where", default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// `[column, op, value]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition(pub String, pub String, pub Value);

pub fn parse_definitions(text: &str) -> Result<Vec<SpotlightDefinition>, SpotlightError> {
    let defs: Vec<SpotlightDefinition> = serde_json::from_str(text)?;
    if defs.is_empty() {
        return Err(SpotlightError::Empty);
    }
    Ok(defs)
}

/// The requested definition, else this week's cycling definition, else the first.
pub fn choose_definition<'a>(
    defs: &'a [SpotlightDefinition],
    key: Option<&str>,
    today: NaiveDate,
) -> Option<&'a SpotlightDefinition> {
    let first = defs.first()?;
    if let Some(key) = key.filter(|k| !k.is_empty()) {
        return Some(defs.iter().find(|d| d.key == key).unwrap_or(first));
    }

    let cycling: Vec<&SpotlightDefinition> = defs.iter().filter(|d| d.cycle).collect();
    if cycling.is_empty() {
        return Some(first);
    }
    let week = today.iso_week().week() as usize;
    Some(cycling[week % cycling.len()])
}

/// Pick games for `def` from the raw games table. Returns record indices,
/// curated picks first, without duplicates.
pub fn select_games(def: &SpotlightDefinition, table: &RawTable) -> Result<Vec<usize>, SpotlightError> {
    let mut picks = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |idx: usize| {
        if seen.insert(game_key(table, &table.records[idx])) {
            picks.push(idx);
        }
    };

    for pick in &def.curated {
        let title = pick.title.trim().to_lowercase();
        let designer = pick.designer.trim().to_lowercase();
        let found = table.records.iter().position(|r| {
            table.cell(r, "Game Title").trim().to_lowercase() == title
                && table.cell(r, "Designer").trim().to_lowercase() == designer
        });
        if let Some(idx) = found {
            push(idx);
        }
    }

    if let Some(select) = def.select.as_ref().filter(|s| s.mode == "query") {
        let mut pool: Vec<usize> = (0..table.records.len()).collect();
        for Condition(column, op, value) in &select.conditions {
            let value = value_text(value);
            let needle = value.to_lowercase();
            let cell = |idx: &usize| table.cell(&table.records[*idx], column);
            match op.as_str() {
                "includes" => pool.retain(|i| cell(i).to_lowercase().contains(&needle)),
                "equals" => pool.retain(|i| cell(i).trim().to_lowercase() == needle),
                "regex" => {
                    let re = RegexBuilder::new(&value).case_insensitive(true).build()?;
                    pool.retain(|i| re.is_match(cell(i)));
                }
                other => tracing::warn!(op = other, "Ignoring unknown spotlight operator"),
            }
        }

        let number = |idx: usize, column: &str| {
            parse_number(table.cell(&table.records[idx], column)).unwrap_or(0.0)
        };
        let added = |idx: usize| {
            parse_date_flexible(table.cell(&table.records[idx], "Date Added"))
                .map_or(i64::MIN, |d| i64::from(d.num_days_from_ce()))
        };
        let desc = |a: f64, b: f64| b.total_cmp(&a);

        match select.sort.as_deref().unwrap_or("") {
            "downloads_desc" => {
                pool.sort_by(|&a, &b| desc(number(a, "Downloads"), number(b, "Downloads")))
            }
            "rating_desc" => pool.sort_by(|&a, &b| {
                desc(number(a, "RatingAvg"), number(b, "RatingAvg"))
                    .then_with(|| desc(number(a, "RatingCount"), number(b, "RatingCount")))
            }),
            "recent_desc" => pool.sort_by(|&a, &b| added(b).cmp(&added(a))),
            _ => {}
        }

        pool.into_iter().for_each(&mut push);
    }

    let limit = def
        .select
        .as_ref()
        .and_then(|s| s.limit)
        .filter(|l| *l > 0)
        .unwrap_or(DEFAULT_LIMIT);
    picks.truncate(limit);
    Ok(picks)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn game_key(table: &RawTable, record: &[String]) -> String {
    let title = match table.cell(record, "Game Title") {
        "" => table.cell(record, "Title"),
        t => t,
    };
    format!(
        "game_{}__{}",
        slugify(title),
        slugify(table.cell(record, "Designer"))
    )
}

/// Lowercase ASCII slug with accents folded: `"Café Noir!"` becomes `cafe-noir`.
pub fn slugify(s: &str) -> String {
    let folded: String = s
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let mut out = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
