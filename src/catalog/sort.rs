use std::cmp::Ordering;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use super::matching::parse_number;
use super::schema::Schema;
use super::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Original CSV order
    Relevance,
    /// Title, natural order
    Az,
    /// Release year descending, then title
    Newest,
    /// Release year ascending, then title
    ReleaseAsc,
    /// Creator, natural order
    Creator,
    /// Crowdfunding launch date ascending
    Launch,
    /// Crowdfunding end date ascending
    End,
}

impl SortOrder {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "relevance" => Some(SortOrder::Relevance),
            "az" => Some(SortOrder::Az),
            "newest" => Some(SortOrder::Newest),
            "release-asc" => Some(SortOrder::ReleaseAsc),
            "creator" => Some(SortOrder::Creator),
            "launch" => Some(SortOrder::Launch),
            "end" => Some(SortOrder::End),
            _ => None,
        }
    }
}

/// Sort rows in place. The sort is stable, so equal keys keep CSV order.
pub fn sort_rows(rows: &mut [&Row], order: SortOrder, schema: &Schema) {
    let title = schema.title_column;
    match order {
        SortOrder::Relevance => rows.sort_by_key(|r| r.idx),
        SortOrder::Az => rows.sort_by(|a, b| natural_cmp(a.get(title), b.get(title))),
        SortOrder::Creator => {
            rows.sort_by(|a, b| natural_cmp(a.get("Creator"), b.get("Creator")))
        }
        // Rows without a release year go last, ordered by title rather than CSV position
        SortOrder::Newest => rows.sort_by(|a, b| {
            missing_last(release_year(a), release_year(b), |x, y| y.total_cmp(&x))
                .then_with(|| natural_cmp(a.get(title), b.get(title)))
        }),
        SortOrder::ReleaseAsc => rows.sort_by(|a, b| {
            missing_last(release_year(a), release_year(b), |x, y| x.total_cmp(&y))
                .then_with(|| natural_cmp(a.get(title), b.get(title)))
        }),
        SortOrder::Launch => rows.sort_by_key(|r| r.campaign.as_ref().map_or(i64::MAX, |c| c.launch_key)),
        SortOrder::End => rows.sort_by_key(|r| r.campaign.as_ref().map_or(i64::MAX, |c| c.end_key)),
    }
}

fn release_year(row: &Row) -> Option<f64> {
    parse_number(row.get("Release Year"))
}

fn missing_last(
    a: Option<f64>,
    b: Option<f64>,
    cmp: impl Fn(f64, f64) -> Ordering,
) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Human ordering for titles: case- and accent-insensitive, with digit runs
/// compared by value (`"Game 2" < "Game 10"`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let a = fold(a);
    let b = fold(b);
    let (mut i, mut j) = (0, 0);

    while i < a.len() && j < b.len() {
        if a[i].is_ascii_digit() && b[j].is_ascii_digit() {
            let start_a = i;
            while i < a.len() && a[i].is_ascii_digit() {
                i += 1;
            }
            let start_b = j;
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            let da = strip_leading_zeros(&a[start_a..i]);
            let db = strip_leading_zeros(&b[start_b..j]);
            let ord = da.len().cmp(&db.len()).then_with(|| da.cmp(db));
            if ord != Ordering::Equal {
                return ord;
            }
        } else {
            let ord = a[i].cmp(&b[j]);
            if ord != Ordering::Equal {
                return ord;
            }
            i += 1;
            j += 1;
        }
    }

    (a.len() - i).cmp(&(b.len() - j))
}

fn fold(s: &str) -> Vec<char> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

fn strip_leading_zeros(digits: &[char]) -> &[char] {
    let zeros = digits.iter().take_while(|c| **c == '0').count();
    &digits[zeros..]
}
