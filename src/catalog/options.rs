use std::collections::HashSet;

use serde::Serialize;

use super::campaign::CampaignStatus;
use super::matching::{parse_number, split_multi};
use super::schema::{to_key, MatchKind, Schema};
use super::sort::natural_cmp;
use super::Row;

/// Distinct values offered for one filter.
#[derive(Debug, Clone, Serialize)]
pub struct FilterOptions {
    /// Canonical column name
    pub name: &'static str,
    /// Query parameter accepted for this filter
    pub key: String,
    pub kind: MatchKind,
    pub values: Vec<String>,
}

pub fn filter_options(schema: &Schema, rows: &[Row]) -> Vec<FilterOptions> {
    schema
        .filters
        .iter()
        .map(|&(name, kind)| FilterOptions {
            name,
            key: to_key(name),
            kind,
            values: column_values(rows, name, kind),
        })
        .collect()
}

fn column_values(rows: &[Row], column: &str, kind: MatchKind) -> Vec<String> {
    match kind {
        MatchKind::FreePaid => vec!["Free".to_string(), "Paid".to_string()],
        MatchKind::CampaignStatus => CampaignStatus::ALL
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        MatchKind::Numeric => {
            let mut numbers: Vec<f64> = rows
                .iter()
                .filter_map(|r| parse_number(r.get(column)))
                .collect();
            numbers.sort_by(f64::total_cmp);
            numbers.dedup();
            numbers.into_iter().map(|n| n.to_string()).collect()
        }
        MatchKind::MultiValue => {
            distinct_sorted(rows.iter().flat_map(|r| split_multi(r.get(column))))
        }
        MatchKind::Contains | MatchKind::Exact | MatchKind::Range => {
            distinct_sorted(rows.iter().map(|r| r.get(column).trim()))
        }
    }
}

/// Distinct non-empty values in natural order.
fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out: Vec<String> = values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect();
    out.sort_by(|a, b| natural_cmp(a, b));
    out
}

/// Dropdown values for the game submission form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFormOptions {
    pub free_paid: Vec<String>,
    pub players: Vec<String>,
    pub age_range: Vec<String>,
    pub theme: Vec<String>,
    pub main_mechanism: Vec<String>,
    pub secondary_mechanism: Vec<String>,
    pub complexity: Vec<String>,
    pub mode: Vec<String>,
    pub category: Vec<String>,
    pub craft: Vec<String>,
}

impl SubmitFormOptions {
    pub fn from_rows(rows: &[Row]) -> Self {
        let column = |name: &str| distinct_sorted(rows.iter().map(|r| r.get(name).trim()));

        let free_paid = rows.iter().filter_map(|r| {
            let v = r.get("Free or Paid").trim().to_lowercase();
            match v.as_str() {
                "" => None,
                v if v.contains("free") => Some("Free"),
                _ => Some("Paid"),
            }
        });
        let modes: Vec<String> = rows
            .iter()
            .map(|r| normalize_mode(r.get("Gameplay Mode")))
            .collect();

        Self {
            free_paid: distinct_sorted(free_paid),
            players: column("Number of Players"),
            age_range: column("Age Range"),
            theme: column("Theme"),
            main_mechanism: column("Main Mechanism"),
            secondary_mechanism: distinct_sorted(
                rows.iter()
                    .flat_map(|r| split_multi(r.get("Secondary Mechanism"))),
            ),
            complexity: column("Gameplay Complexity"),
            mode: distinct_sorted(modes.iter().map(String::as_str)),
            category: column("Game Category"),
            craft: column("PnP Crafting Challenge Level"),
        }
    }

    /// Static lists used when the games catalog cannot be loaded.
    pub fn fallback() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let modes = ["Solo", "Cooperative", "Competitive"];

        Self {
            free_paid: list(&["Free", "Paid"]),
            players: list(&["1", "1–2", "1–4", "2", "2–4", "3–6", "4+"]),
            age_range: list(&["8+", "10+", "12+", "14+"]),
            theme: Vec::new(),
            main_mechanism: Vec::new(),
            secondary_mechanism: Vec::new(),
            complexity: list(&["Light", "Medium", "Heavy"]),
            mode: list(&modes),
            category: list(&modes),
            craft: list(&["Low", "Medium", "High"]),
        }
    }
}

/// Fold free-form play modes onto Solo / Cooperative / Competitive.
pub fn normalize_mode(value: &str) -> String {
    let s = value.trim().to_lowercase();
    if s.is_empty() {
        String::new()
    } else if s.contains("solo") {
        "Solo".to_string()
    } else if s.contains("coop") || s.contains("co-op") || s.contains("cooperative") {
        "Cooperative".to_string()
    } else if s.contains("compet") {
        "Competitive".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::GAMES;
    use crate::catalog::table::parse_rows;
    use chrono::NaiveDate;

    fn rows() -> Vec<Row> {
        let text = "Game Title,Free or Paid,Release Year,Languages,Theme,Gameplay Mode,Secondary Mechanism\n\
                    A,Free,2021,English; French,Horror,solo only,Dice|Cards\n\
                    B,$5,2019.0,French,fantasy,Co-op,Cards\n\
                    C,free (PWYW),n/a,English,Horror,Versus,\n\
                    D,,2021,,Sci-Fi 10,Competitive team,\n\
                    E,,2020,,Sci-Fi 2,,\n";
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        parse_rows(&GAMES, text, now).unwrap()
    }

    fn values<'a>(options: &'a [FilterOptions], name: &str) -> &'a [String] {
        &options.iter().find(|o| o.name == name).unwrap().values
    }

    #[test]
    fn test_filter_options_per_kind() {
        let options = filter_options(&GAMES, &rows());
        assert_eq!(options.len(), GAMES.filters.len());
        assert_eq!(values(&options, "Free or Paid"), ["Free", "Paid"]);
        assert_eq!(values(&options, "Release Year"), ["2019", "2020", "2021"]);
        assert_eq!(values(&options, "Languages"), ["English", "French"]);
        assert_eq!(
            values(&options, "Theme"),
            ["fantasy", "Horror", "Sci-Fi 2", "Sci-Fi 10"]
        );
        let languages = options.iter().find(|o| o.name == "Languages").unwrap();
        assert_eq!(languages.key, "languages");
    }

    #[test]
    fn test_submit_form_options() {
        let form = SubmitFormOptions::from_rows(&rows());
        assert_eq!(form.free_paid, ["Free", "Paid"]);
        assert_eq!(form.mode, ["Competitive", "Cooperative", "Solo", "Versus"]);
        assert_eq!(form.secondary_mechanism, ["Cards", "Dice"]);
    }

    #[test]
    fn test_fallback_options() {
        let form = SubmitFormOptions::fallback();
        assert_eq!(form.players.len(), 7);
        assert_eq!(form.category, ["Solo", "Cooperative", "Competitive"]);
        assert!(form.theme.is_empty());
    }
}
