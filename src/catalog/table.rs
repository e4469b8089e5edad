use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use thiserror::Error;

use super::campaign;
use super::images::image_url;
use super::schema::{Collection, Schema, END_COLUMN, LAUNCH_COLUMN};
use super::Row;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV writer error: {0}")]
    Io(#[from] std::io::Error),
}

/// A CSV file as written, before header canonicalization.
#[derive(Debug, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Look up a cell by its header as written in the file.
    pub fn cell<'a>(&'a self, record: &'a [String], header: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == header)
            .and_then(|i| record.get(i))
            .map_or("", String::as_str)
    }
}

/// Parse CSV text with a header row. Headers are trimmed and BOM-stripped,
/// blank lines are skipped and records may have any number of fields.
pub fn read_raw(text: &str) -> Result<RawTable, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, records })
}

/// Parse CSV text into canonical rows for `schema`. Every canonical column is
/// present on every row; unknown columns are dropped.
pub fn parse_rows(schema: &Schema, text: &str, now: NaiveDateTime) -> Result<Vec<Row>, TableError> {
    let raw = read_raw(text)?;
    let mapping: Vec<Option<&'static str>> = raw
        .headers
        .iter()
        .map(|h| schema.canonical_column(h))
        .collect();

    let rows = raw
        .records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let mut fields: BTreeMap<&'static str, String> =
                schema.columns.iter().map(|c| (*c, String::new())).collect();
            for (column, value) in mapping.iter().zip(record) {
                if let Some(column) = *column {
                    fields.insert(column, value);
                }
            }

            let image_url = fields.get(schema.image_column).and_then(|v| image_url(v));
            let campaign = (schema.collection == Collection::Crowdfunding).then(|| {
                campaign::compute(&fields[LAUNCH_COLUMN], &fields[END_COLUMN], now)
            });

            Row {
                idx,
                fields,
                image_url,
                campaign,
            }
        })
        .collect();

    Ok(rows)
}

/// Header names from the first line of `text`, split naively on commas with
/// surrounding quotes removed. Returns `None` unless there is more than one.
pub fn header_line(text: &str) -> Option<Vec<String>> {
    let first = text
        .strip_prefix('\u{feff}')
        .unwrap_or(text)
        .lines()
        .next()
        .unwrap_or("");
    let headers: Vec<String> = first
        .split(',')
        .map(|h| {
            let h = h.trim();
            let h = h.strip_prefix('"').unwrap_or(h);
            h.strip_suffix('"').unwrap_or(h).to_string()
        })
        .collect();

    (headers.len() > 1).then_some(headers)
}

/// Encode one CSV record, newline-terminated. Fields are quoted only when
/// they contain a delimiter, quote or line break.
pub fn write_record<I, S>(values: I) -> Result<String, TableError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    writer.write_record(values)?;
    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::{CROWDFUNDING, GAMES, TUTORIALS};
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 10, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_write_record_escapes_only_when_needed() {
        let line = write_record(["plain", "a,b", "say \"hi\"", "two\nlines", ""]).unwrap();
        assert_eq!(line, "plain,\"a,b\",\"say \"\"hi\"\"\",\"two\nlines\",\n");
    }

    #[test]
    fn test_round_trip_preserves_awkward_values() {
        let values = ["Cards, Dice", "He said \"go\"", "line one\nline two", "Ünïcødé"];
        let mut text = write_record(["A", "B", "C", "D"]).unwrap();
        text.push_str(&write_record(values).unwrap());

        let raw = read_raw(&text).unwrap();
        assert_eq!(raw.headers, vec!["A", "B", "C", "D"]);
        assert_eq!(raw.records, vec![values.map(String::from).to_vec()]);
    }

    #[test]
    fn test_parse_rows_remaps_headers_and_pads() {
        let text = "\u{feff} Title ,Players,Timestamp,Thumbnail\n\
                    Alpha,2-4,yesterday,http://example.com/a.png\n\
                    \n\
                    Beta\n";
        let rows = parse_rows(&GAMES, text, now()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].idx, 0);
        assert_eq!(rows[0].get("Game Title"), "Alpha");
        assert_eq!(rows[0].get("Number of Players"), "2-4");
        assert_eq!(rows[0].image_url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(rows[0].fields.len(), GAMES.columns.len());
        assert!(!rows[0].fields.contains_key("Timestamp"));

        assert_eq!(rows[1].idx, 1);
        assert_eq!(rows[1].get("Game Title"), "Beta");
        assert_eq!(rows[1].get("Number of Players"), "");
        assert!(rows[1].campaign.is_none());
    }

    #[test]
    fn test_parse_rows_ignores_placeholder_columns() {
        let text = "Component,Title,Unnamed,Column 5\nCards,Sleeving 101,x,y\n";
        let rows = parse_rows(&TUTORIALS, text, now()).unwrap();
        assert_eq!(rows[0].get("Component"), "Cards");
        assert_eq!(rows[0].get("Title"), "Sleeving 101");
        assert_eq!(rows[0].fields.len(), TUTORIALS.columns.len());
    }

    #[test]
    fn test_crowdfunding_rows_get_campaign_state() {
        let text = "Title,Launch,Deadline\nBig Box,2025-09-01,2025-10-05\n";
        let rows = parse_rows(&CROWDFUNDING, text, now()).unwrap();
        let campaign = rows[0].campaign.as_ref().unwrap();
        assert_eq!(campaign.label, "Ends in 4 days");
    }

    #[test]
    fn test_header_line() {
        assert_eq!(
            header_line("\"Title\", Creator ,Link\nrow"),
            Some(vec!["Title".to_string(), "Creator".to_string(), "Link".to_string()])
        );
        assert_eq!(header_line("Title\nrow"), None);
        assert_eq!(header_line(""), None);
    }
}
