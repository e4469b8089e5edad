use std::collections::HashMap;

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;

use super::models::{field_text, is_truthy, SubmissionRequest};
use super::SubmissionError;
use crate::catalog::Collection;

pub const REQUIRED_GAME_FIELDS: [&str; 13] = [
    "Game Title",
    "Free or Paid",
    "Number of Players",
    "Playtime",
    "Age Range",
    "Theme",
    "Main Mechanism",
    "Gameplay Complexity",
    "PnP Crafting Challenge Level",
    "One-Sentence Short Description",
    "Long Description",
    "Download Link",
    "Release Year",
];

pub const SHORT_DESCRIPTION_MAX: usize = 125;
pub const LONG_DESCRIPTION_MAX: usize = 400;

/// A decoded image ready to commit.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Bytes,
    pub ext: &'static str,
}

/// A submission that passed validation.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub collection: Collection,
    pub fields: HashMap<String, String>,
    pub image: Option<ImageUpload>,
}

impl ValidSubmission {
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }
}

fn invalid(message: impl Into<String>) -> SubmissionError {
    SubmissionError::Invalid(message.into())
}

/// Check a submission and normalize its fields to strings.
pub fn validate(req: SubmissionRequest) -> Result<ValidSubmission, SubmissionError> {
    let raw_fields = req.fields.unwrap_or_default();

    if raw_fields.get("website").is_some_and(is_truthy) {
        return Err(invalid("Spam detected"));
    }

    let collection = req
        .collection
        .as_deref()
        .and_then(|c| c.parse::<Collection>().ok())
        .filter(|c| c.accepts_submissions())
        .ok_or_else(|| invalid("Invalid collection"))?;

    let fields: HashMap<String, String> = raw_fields
        .iter()
        .map(|(k, v)| (k.clone(), field_text(v)))
        .collect();
    let get = |name: &str| fields.get(name).map_or("", String::as_str);
    let image_data = req.image.as_ref().and_then(|i| i.data());

    if collection == Collection::Games {
        if let Some(missing) = REQUIRED_GAME_FIELDS
            .iter()
            .find(|name| get(name).trim().is_empty())
        {
            return Err(invalid(format!("Missing required field: {missing}")));
        }
        if utf16_len(get("One-Sentence Short Description")) > SHORT_DESCRIPTION_MAX {
            return Err(invalid(format!(
                "Short description must be ≤ {SHORT_DESCRIPTION_MAX} characters."
            )));
        }
        if utf16_len(get("Long Description")) > LONG_DESCRIPTION_MAX {
            return Err(invalid(format!(
                "Long description must be ≤ {LONG_DESCRIPTION_MAX} characters."
            )));
        }
        if !is_valid_year(get("Release Year")) {
            return Err(invalid(
                "Release Year must be a 4-digit year between 1900 and 2100.",
            ));
        }
        if !is_http_url(get("Download Link")) {
            return Err(invalid("Main Download Link must be a valid http(s) URL."));
        }
        if image_data.is_none() {
            return Err(invalid("Image is required for game submissions."));
        }
    } else if get("Title").trim().is_empty() {
        return Err(invalid("Title is required."));
    }

    let image = match (image_data, req.image.as_ref()) {
        (Some(data), Some(payload)) => Some(ImageUpload {
            data: decode_image(data)?,
            ext: guess_ext(
                payload.filename.as_deref().unwrap_or(""),
                payload.content_type.as_deref().unwrap_or(""),
            ),
        }),
        _ => None,
    };

    Ok(ValidSubmission {
        collection,
        fields,
        image,
    })
}

/// Length as the submission form counts it (UTF-16 code units).
fn utf16_len(s: &str) -> usize {
    s.encode_utf16().count()
}

fn is_valid_year(value: &str) -> bool {
    let value = value.trim();
    value.len() == 4
        && value.bytes().all(|b| b.is_ascii_digit())
        && value
            .parse::<u32>()
            .is_ok_and(|y| (1900..=2100).contains(&y))
}

fn is_http_url(value: &str) -> bool {
    let lower = value.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn decode_image(data: &str) -> Result<Bytes, SubmissionError> {
    // Tolerate a data URL prefix and line-wrapped payloads
    let data = data.split_once(";base64,").map_or(data, |(_, rest)| rest);
    let cleaned: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map(Bytes::from)
        .map_err(|_| invalid("Image data is not valid base64."))
}

/// File extension for an uploaded image: `.png` or `.webp` when the name or
/// MIME type says so, `.jpg` otherwise.
pub fn guess_ext(filename: &str, content_type: &str) -> &'static str {
    let name = filename.to_lowercase();
    if name.ends_with(".png") || content_type.contains("png") {
        ".png"
    } else if name.ends_with(".webp") || content_type.contains("webp") {
        ".webp"
    } else {
        ".jpg"
    }
}

/// Entry id: slug of the title plus a UTC `YYYYMMDDHHMMSS` stamp.
pub fn make_id(title: &str, now: DateTime<Utc>) -> String {
    let lowered: String = title.to_lowercase().nfkd().collect();
    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    let base = if slug.is_empty() { "entry" } else { slug };
    format!("{base}-{}", now.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::models::ImagePayload;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn game_fields() -> Value {
        json!({
            "Game Title": "Foo",
            "Free or Paid": "Free",
            "Number of Players": "1-2",
            "Playtime": "30 min",
            "Age Range": "10+",
            "Theme": "Space",
            "Main Mechanism": "Dice",
            "Gameplay Complexity": "Light",
            "PnP Crafting Challenge Level": "Low",
            "One-Sentence Short Description": "A short game.",
            "Long Description": "A longer description.",
            "Download Link": "https://example.com/foo.pdf",
            "Release Year": "2024",
            "website": ""
        })
    }

    fn request(collection: &str, fields: Value, with_image: bool) -> SubmissionRequest {
        SubmissionRequest {
            collection: Some(collection.to_string()),
            fields: fields.as_object().cloned(),
            image: with_image.then(|| ImagePayload {
                data_base64: Some("iVBORw0KGgo=".to_string()),
                filename: Some("cover.png".to_string()),
                content_type: Some("image/png".to_string()),
            }),
        }
    }

    fn error_of(req: SubmissionRequest) -> String {
        match validate(req) {
            Err(SubmissionError::Invalid(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_game() {
        let valid = validate(request("games", game_fields(), true)).unwrap();
        assert_eq!(valid.collection, Collection::Games);
        assert_eq!(valid.field("Game Title"), "Foo");
        let image = valid.image.unwrap();
        assert_eq!(image.ext, ".png");
        assert_eq!(&image.data[..4], b"\x89PNG");
    }

    #[test]
    fn test_honeypot_wins_over_everything() {
        let mut fields = game_fields();
        fields["website"] = json!("http://spam.example");
        assert_eq!(error_of(request("bogus", fields, false)), "Spam detected");
    }

    #[test]
    fn test_collection_must_accept_submissions() {
        assert_eq!(
            error_of(request("crowdfunding", json!({"Title": "x"}), false)),
            "Invalid collection"
        );
        assert_eq!(
            error_of(SubmissionRequest::default()),
            "Invalid collection"
        );
    }

    #[test]
    fn test_every_required_game_field_is_checked() {
        for name in REQUIRED_GAME_FIELDS {
            let mut fields = game_fields();
            fields[name] = json!("   ");
            assert_eq!(
                error_of(request("games", fields, true)),
                format!("Missing required field: {name}")
            );
        }
    }

    #[test]
    fn test_description_limits() {
        let mut fields = game_fields();
        fields["One-Sentence Short Description"] = json!("x".repeat(126));
        assert_eq!(
            error_of(request("games", fields, true)),
            "Short description must be ≤ 125 characters."
        );

        let mut fields = game_fields();
        fields["One-Sentence Short Description"] = json!("é".repeat(125));
        fields["Long Description"] = json!("x".repeat(401));
        assert_eq!(
            error_of(request("games", fields, true)),
            "Long description must be ≤ 400 characters."
        );
    }

    #[test]
    fn test_year_and_link() {
        for year in ["1899", "2101", "24", "20245", "year"] {
            let mut fields = game_fields();
            fields["Release Year"] = json!(year);
            assert_eq!(
                error_of(request("games", fields, true)),
                "Release Year must be a 4-digit year between 1900 and 2100."
            );
        }
        let mut fields = game_fields();
        fields["Download Link"] = json!("ftp://example.com/foo.pdf");
        assert_eq!(
            error_of(request("games", fields, true)),
            "Main Download Link must be a valid http(s) URL."
        );
    }

    #[test]
    fn test_game_requires_image() {
        assert_eq!(
            error_of(request("games", game_fields(), false)),
            "Image is required for game submissions."
        );
    }

    #[test]
    fn test_other_collections_require_title() {
        assert_eq!(
            error_of(request("tutorials", json!({"Creator": "me"}), false)),
            "Title is required."
        );
        let valid = validate(request("resources", json!({"Title": "Sleeves"}), false)).unwrap();
        assert!(valid.image.is_none());
    }

    #[test]
    fn test_bad_base64_is_rejected() {
        let mut req = request("tutorials", json!({"Title": "x"}), true);
        if let Some(image) = req.image.as_mut() {
            image.data_base64 = Some("not base64!".to_string());
        }
        assert_eq!(error_of(req), "Image data is not valid base64.");
    }

    #[test]
    fn test_guess_ext() {
        assert_eq!(guess_ext("COVER.PNG", ""), ".png");
        assert_eq!(guess_ext("", "image/webp"), ".webp");
        assert_eq!(guess_ext("cover.jpeg", "image/jpeg"), ".jpg");
        assert_eq!(guess_ext("", ""), ".jpg");
    }

    #[test]
    fn test_make_id() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(make_id("Foo", now), "foo-20250307090501");
        assert_eq!(make_id("  Café: The Game!! ", now), "cafe-the-game-20250307090501");
        assert_eq!(make_id("snake_case", now), "snake_case-20250307090501");
        assert_eq!(make_id("???", now), "entry-20250307090501");
    }
}
