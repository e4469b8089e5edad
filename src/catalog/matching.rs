//! Cell matchers used by catalog filters. An empty needle always matches;
//! values that cannot be parsed fall back to case-insensitive substring matching.

use std::sync::LazyLock;

use regex::Regex;

/// Separators for multi-value cells (`English; French`, `Solo|Co-op`).
pub const MULTI_VALUE_SEPARATORS: [char; 3] = [';', ',', '|'];

static RANGE_PLUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*\+$").expect("valid regex"));
static RANGE_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*(?:[-–]|to)\s*(\d+)$").expect("valid regex"));
static RANGE_SINGLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Split a multi-value cell into trimmed, non-empty parts.
pub fn split_multi(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(MULTI_VALUE_SEPARATORS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Parse a loosely formatted number (`"$4.99"`, `"2021 "`). Characters other
/// than digits, `.` and `-` are ignored.
pub fn parse_number(value: &str) -> Option<f64> {
    let cleaned: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse `N`, `N+`, `N-M`, `N–M` or `N to M` into an inclusive range.
pub fn parse_range(value: &str) -> Option<(f64, f64)> {
    let s = value.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }
    let num = |m: Option<regex::Match<'_>>| m.and_then(|m| m.as_str().parse::<f64>().ok());

    if let Some(caps) = RANGE_PLUS.captures(&s) {
        return Some((num(caps.get(1))?, f64::INFINITY));
    }
    if let Some(caps) = RANGE_SPAN.captures(&s) {
        return Some((num(caps.get(1))?, num(caps.get(2))?));
    }
    if let Some(caps) = RANGE_SINGLE.captures(&s) {
        let n = num(caps.get(1))?;
        return Some((n, n));
    }
    None
}

pub fn contains(value: &str, needle: &str) -> bool {
    if is_blank(needle) {
        return true;
    }
    value.to_lowercase().contains(&needle.to_lowercase())
}

pub fn exact(value: &str, needle: &str) -> bool {
    if is_blank(needle) {
        return true;
    }
    value.trim().to_lowercase() == needle.trim().to_lowercase()
}

/// Ranges match when they overlap: `"2-4"` players matches a `"3+"` query.
pub fn range_overlaps(value: &str, query: &str) -> bool {
    if is_blank(query) {
        return true;
    }
    match (parse_range(value), parse_range(query)) {
        (Some((a1, a2)), Some((b1, b2))) => a1.max(b1) <= a2.min(b2),
        _ => contains(value, query),
    }
}

pub fn multi_value_contains(value: &str, needle: &str) -> bool {
    if is_blank(needle) {
        return true;
    }
    let needle = needle.to_lowercase();
    split_multi(value).any(|part| part.to_lowercase() == needle)
}

pub fn number_equals(value: &str, needle: &str) -> bool {
    if is_blank(needle) {
        return true;
    }
    match (parse_number(value), parse_number(needle)) {
        (Some(v), Some(n)) => v == n,
        _ => contains(value, needle),
    }
}

/// "Free" matches any cell mentioning free; "Paid" matches everything else.
pub fn free_paid(value: &str, needle: &str) -> bool {
    if is_blank(needle) {
        return true;
    }
    let mentions_free = value.to_lowercase().contains("free");
    if needle.eq_ignore_ascii_case("free") {
        mentions_free
    } else if needle.eq_ignore_ascii_case("paid") {
        !mentions_free
    } else {
        contains(value, needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_forms() {
        assert_eq!(parse_range("3"), Some((3.0, 3.0)));
        assert_eq!(parse_range("2-4"), Some((2.0, 4.0)));
        assert_eq!(parse_range("1–2"), Some((1.0, 2.0)));
        assert_eq!(parse_range("1 to 6"), Some((1.0, 6.0)));
        assert_eq!(parse_range("14 +"), Some((14.0, f64::INFINITY)));
        assert_eq!(parse_range("30-60 min"), None);
        assert_eq!(parse_range(""), None);
    }

    #[test]
    fn test_range_overlaps() {
        assert!(range_overlaps("2-4", "3"));
        assert!(range_overlaps("1-2", "2+"));
        assert!(!range_overlaps("1-2", "3+"));
        assert!(range_overlaps("anything", ""));
        // unparseable cells fall back to substring matching
        assert!(range_overlaps("30-60 min", "60 min"));
        assert!(!range_overlaps("30-60 min", "90"));
    }

    #[test]
    fn test_multi_value_contains() {
        assert!(multi_value_contains("English; French|German", "french"));
        assert!(!multi_value_contains("English; French", "Fren"));
        assert!(!multi_value_contains("", "English"));
    }

    #[test]
    fn test_number_equals() {
        assert_eq!(parse_number("$4.99"), Some(4.99));
        assert_eq!(parse_number("n/a"), None);
        assert!(number_equals("2021", "2021.0"));
        assert!(!number_equals("2020", "2021"));
        assert!(number_equals("TBD soon", "tbd"));
    }

    #[test]
    fn test_free_paid() {
        assert!(free_paid("Free", "Free"));
        assert!(free_paid("Free (donations welcome)", "Free"));
        assert!(!free_paid("Free", "Paid"));
        assert!(free_paid("$5", "Paid"));
        assert!(free_paid("Pay what you want", "what"));
    }

    #[test]
    fn test_exact_and_contains() {
        assert!(exact("  Cards ", "cards"));
        assert!(!exact("Card stock", "cards"));
        assert!(contains("Deck Building", "deck"));
        assert!(contains("", " "));
    }
}
