use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use super::sort::SortOrder;

/// Canonicalize a header or filter name for fuzzy matching.
///
/// Strips a leading BOM, applies NFKC, lowercases, and keeps only `[a-z0-9]`,
/// so `"Free or Paid"`, `"free_or_paid"` and `"\u{feff}FREE-OR-PAID "` agree.
pub fn to_key(s: &str) -> String {
    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    let normalized: String = s.nfkc().collect();
    normalized
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Crowdfunding,
    Games,
    Resources,
    Tutorials,
}

#[derive(Debug, Error)]
#[error("Unknown collection: {0}")]
pub struct UnknownCollection(pub String);

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Games,
        Collection::Tutorials,
        Collection::Resources,
        Collection::Crowdfunding,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Crowdfunding => "crowdfunding",
            Collection::Games => "games",
            Collection::Resources => "resources",
            Collection::Tutorials => "tutorials",
        }
    }

    pub fn schema(self) -> &'static Schema {
        match self {
            Collection::Crowdfunding => &CROWDFUNDING,
            Collection::Games => &GAMES,
            Collection::Resources => &RESOURCES,
            Collection::Tutorials => &TUTORIALS,
        }
    }

    /// Collections that accept entries through the submission endpoint.
    pub fn accepts_submissions(self) -> bool {
        !matches!(self, Collection::Crowdfunding)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCollection(s.to_string()))
    }
}

/// How a filter value is compared against a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Derived crowdfunding status (Upcoming / Live / Ended)
    CampaignStatus,
    /// Case-insensitive substring
    Contains,
    /// Trimmed, case-insensitive equality
    Exact,
    /// "Free" / "Paid" buckets over a free-form price cell
    FreePaid,
    /// Cell is a `;`, `,` or `|` separated list; one item must equal the value
    MultiValue,
    /// Numeric equality, substring fallback
    Numeric,
    /// Overlap of `N`, `N+`, `N-M` ranges, substring fallback
    Range,
}

/// Static description of one catalog collection: its CSV file, canonical
/// columns, header aliases and which columns search, filter and sort use.
#[derive(Debug)]
pub struct Schema {
    pub collection: Collection,
    pub path: &'static str,
    pub columns: &'static [&'static str],
    aliases: &'static [(&'static str, &'static str)],
    /// Ignore spreadsheet placeholder headers (empty, `unnamed`, `column3`)
    skip_placeholders: bool,
    pub title_column: &'static str,
    pub image_column: &'static str,
    pub search_fields: &'static [&'static str],
    pub filters: &'static [(&'static str, MatchKind)],
    pub sorts: &'static [SortOrder],
    /// Singular noun used in result summaries
    pub noun: &'static str,
}

impl Schema {
    /// Resolve a raw CSV header to its canonical column, if any.
    pub fn canonical_column(&self, header: &str) -> Option<&'static str> {
        let key = to_key(header);
        if let Some(column) = self.columns.iter().find(|c| to_key(c) == key).copied() {
            return Some(column);
        }
        if self.skip_placeholders && is_placeholder(&key) {
            return None;
        }
        self.aliases
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, column)| *column)
    }

    /// Resolve a client-supplied filter name (any spelling `to_key` accepts).
    pub fn filter(&self, name: &str) -> Option<(&'static str, MatchKind)> {
        let key = to_key(name);
        self.filters
            .iter()
            .find(|(column, _)| to_key(column) == key)
            .copied()
    }

    /// Parse a sort name, falling back to relevance for unknown or unsupported orders.
    pub fn sort_order(&self, name: &str) -> SortOrder {
        SortOrder::parse(name)
            .filter(|order| self.sorts.contains(order))
            .unwrap_or(SortOrder::Relevance)
    }
}

fn is_placeholder(key: &str) -> bool {
    key.is_empty()
        || key == "unnamed"
        || key
            .strip_prefix("column")
            .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

pub static GAMES: Schema = Schema {
    collection: Collection::Games,
    path: "data/games.csv",
    columns: &[
        "Game Title",
        "Designer",
        "Publisher",
        "Free or Paid",
        "Price",
        "Number of Players",
        "Playtime",
        "Age Range",
        "Theme",
        "Main Mechanism",
        "Secondary Mechanism",
        "Gameplay Complexity",
        "Gameplay Mode",
        "Game Category",
        "PnP Crafting Challenge Level",
        "One-Sentence Short Description",
        "Long Description",
        "Download Link",
        "Secondary Download Link",
        "Print Components",
        "Other Components",
        "Languages",
        "Release Year",
        "Game Image",
        "Curated Lists",
        "Report Dead Link",
    ],
    aliases: &[
        ("title", "Game Title"),
        ("players", "Number of Players"),
        ("numberofplayers", "Number of Players"),
        ("playtime", "Playtime"),
        ("playduration", "Playtime"),
        ("agerange", "Age Range"),
        ("age", "Age Range"),
        ("category", "Game Category"),
        ("mode", "Game Category"),
        ("gameplaymode", "Game Category"),
        ("image", "Game Image"),
        ("img", "Game Image"),
        ("thumbnail", "Game Image"),
        ("thumb", "Game Image"),
        ("cover", "Game Image"),
        ("gameimage", "Game Image"),
        ("imageurl", "Game Image"),
        ("imgurl", "Game Image"),
        ("gamedescription", "Long Description"),
        ("description", "Long Description"),
        ("longdesc", "Long Description"),
        ("longdescription", "Long Description"),
    ],
    skip_placeholders: false,
    title_column: "Game Title",
    image_column: "Game Image",
    search_fields: &[
        "Game Title",
        "Designer",
        "Publisher",
        "One-Sentence Short Description",
        "Long Description",
        "Theme",
        "Main Mechanism",
        "Secondary Mechanism",
        "Curated Lists",
    ],
    filters: &[
        ("Curated Lists", MatchKind::MultiValue),
        ("PnP Crafting Challenge Level", MatchKind::Contains),
        ("Number of Players", MatchKind::Range),
        ("Playtime", MatchKind::Range),
        ("Age Range", MatchKind::Range),
        ("Main Mechanism", MatchKind::Contains),
        ("Gameplay Complexity", MatchKind::Contains),
        ("Theme", MatchKind::Contains),
        ("Free or Paid", MatchKind::FreePaid),
        ("Release Year", MatchKind::Numeric),
        ("Languages", MatchKind::MultiValue),
    ],
    sorts: &[
        SortOrder::Relevance,
        SortOrder::Az,
        SortOrder::Newest,
        SortOrder::ReleaseAsc,
    ],
    noun: "game",
};

pub static TUTORIALS: Schema = Schema {
    collection: Collection::Tutorials,
    path: "data/tutorials.csv",
    columns: &["Component", "Title", "Creator", "Description", "Link", "Image"],
    aliases: &[
        ("img", "Image"),
        ("imageurl", "Image"),
        ("thumbnail", "Image"),
        ("thumb", "Image"),
    ],
    skip_placeholders: true,
    title_column: "Title",
    image_column: "Image",
    search_fields: &["Component", "Title", "Creator", "Description"],
    filters: &[("Component", MatchKind::Exact)],
    sorts: &[SortOrder::Relevance, SortOrder::Az, SortOrder::Creator],
    noun: "tutorial",
};

pub static RESOURCES: Schema = Schema {
    collection: Collection::Resources,
    path: "data/resources.csv",
    columns: &["Category", "Title", "Description", "Link", "Image", "Creator"],
    aliases: &[
        ("img", "Image"),
        ("imageurl", "Image"),
        ("thumbnail", "Image"),
        ("thumb", "Image"),
    ],
    skip_placeholders: true,
    title_column: "Title",
    image_column: "Image",
    search_fields: &["Category", "Title", "Creator", "Description"],
    filters: &[("Category", MatchKind::Exact)],
    sorts: &[SortOrder::Relevance, SortOrder::Az, SortOrder::Creator],
    noun: "resource",
};

pub static CROWDFUNDING: Schema = Schema {
    collection: Collection::Crowdfunding,
    path: "data/crowdfunding.csv",
    columns: &[
        "Title",
        "Designer/Publisher",
        "Platform",
        "Short Description",
        "Long Description",
        "Campaign Link",
        "Late Pledge Link",
        "Image",
        "Launch Date (YYYY-MM-DD)",
        "End Date (YYYY-MM-DD)",
        "Tags",
    ],
    aliases: &[
        ("creator", "Designer/Publisher"),
        ("designer", "Designer/Publisher"),
        ("publisher", "Designer/Publisher"),
        ("designerpublisher", "Designer/Publisher"),
        ("campaign", "Campaign Link"),
        ("link", "Campaign Link"),
        ("projectlink", "Campaign Link"),
        ("projecturl", "Campaign Link"),
        ("latepledge", "Late Pledge Link"),
        ("latepledgelink", "Late Pledge Link"),
        ("pledgemanager", "Late Pledge Link"),
        ("launchdate", "Launch Date (YYYY-MM-DD)"),
        ("launch", "Launch Date (YYYY-MM-DD)"),
        ("enddate", "End Date (YYYY-MM-DD)"),
        ("deadline", "End Date (YYYY-MM-DD)"),
        ("end", "End Date (YYYY-MM-DD)"),
    ],
    skip_placeholders: false,
    title_column: "Title",
    image_column: "Image",
    search_fields: &[
        "Title",
        "Designer/Publisher",
        "Platform",
        "Short Description",
        "Long Description",
        "Tags",
    ],
    filters: &[
        ("Platform", MatchKind::Exact),
        ("Status", MatchKind::CampaignStatus),
    ],
    sorts: &[
        SortOrder::Relevance,
        SortOrder::Az,
        SortOrder::Launch,
        SortOrder::End,
    ],
    noun: "campaign",
};

pub const LAUNCH_COLUMN: &str = "Launch Date (YYYY-MM-DD)";
pub const END_COLUMN: &str = "End Date (YYYY-MM-DD)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_key_strips_noise() {
        assert_eq!(to_key("\u{feff} Game Title "), "gametitle");
        assert_eq!(to_key("One-Sentence Short Description"), "onesentenceshortdescription");
        assert_eq!(to_key("free_or_paid"), "freeorpaid");
        assert_eq!(to_key("Designer’s Notes"), "designersnotes");
        // NFKC folds full-width letters before filtering
        assert_eq!(to_key("ＡＧＥ"), "age");
    }

    #[test]
    fn test_canonical_column_prefers_official_names() {
        assert_eq!(GAMES.canonical_column("GAME TITLE"), Some("Game Title"));
        assert_eq!(GAMES.canonical_column("Title"), Some("Game Title"));
        // "Gameplay Mode" is official, so the `gameplaymode` alias never applies
        assert_eq!(GAMES.canonical_column("Gameplay Mode"), Some("Gameplay Mode"));
        assert_eq!(GAMES.canonical_column("mode"), Some("Game Category"));
        assert_eq!(GAMES.canonical_column("Thumbnail"), Some("Game Image"));
        assert_eq!(GAMES.canonical_column("Description"), Some("Long Description"));
        assert_eq!(GAMES.canonical_column("Timestamp"), None);
    }

    #[test]
    fn test_placeholder_headers_are_ignored() {
        assert_eq!(TUTORIALS.canonical_column(""), None);
        assert_eq!(TUTORIALS.canonical_column("Unnamed"), None);
        assert_eq!(TUTORIALS.canonical_column("Column 7"), None);
        assert_eq!(TUTORIALS.canonical_column("thumb"), Some("Image"));
    }

    #[test]
    fn test_crowdfunding_aliases() {
        assert_eq!(CROWDFUNDING.canonical_column("Deadline"), Some(END_COLUMN));
        assert_eq!(CROWDFUNDING.canonical_column("Launch Date"), Some(LAUNCH_COLUMN));
        assert_eq!(
            CROWDFUNDING.canonical_column("Pledge Manager"),
            Some("Late Pledge Link")
        );
        assert_eq!(CROWDFUNDING.canonical_column("Creator"), Some("Designer/Publisher"));
    }

    #[test]
    fn test_filter_lookup_and_sort_fallback() {
        assert_eq!(
            GAMES.filter("free_or_paid"),
            Some(("Free or Paid", MatchKind::FreePaid))
        );
        assert_eq!(GAMES.filter("Designer"), None);
        assert_eq!(GAMES.sort_order("newest"), SortOrder::Newest);
        // tutorials have no release year
        assert_eq!(TUTORIALS.sort_order("newest"), SortOrder::Relevance);
        assert_eq!(TUTORIALS.sort_order("creator"), SortOrder::Creator);
        assert_eq!(CROWDFUNDING.sort_order("bogus"), SortOrder::Relevance);
    }

    #[test]
    fn test_collection_parsing() {
        assert_eq!("games".parse::<Collection>().unwrap(), Collection::Games);
        assert!("Games".parse::<Collection>().is_err());
        assert!(!Collection::Crowdfunding.accepts_submissions());
        assert!(Collection::Resources.accepts_submissions());
    }
}
