use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /api/submit`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SubmissionRequest {
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub fields: Option<Map<String, Value>>,
    #[serde(default)]
    pub image: Option<ImagePayload>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[serde(default)]
    pub data_base64: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ImagePayload {
    /// Base64 payload, if one was sent.
    pub fn data(&self) -> Option<&str> {
        self.data_base64.as_deref().filter(|d| !d.is_empty())
    }
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub id: String,
    /// Site-relative path of the committed image (`/uploads/...`), empty when none
    pub image_path: String,
}

/// Render a JSON field value as CSV cell text. `null` and `false` become empty.
pub fn field_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a field counts as filled in (a non-empty string, `true`, a
/// non-zero number, or any array or object).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text() {
        assert_eq!(field_text(&json!(null)), "");
        assert_eq!(field_text(&json!("Dice")), "Dice");
        assert_eq!(field_text(&json!(2021)), "2021");
        assert_eq!(field_text(&json!(true)), "true");
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(is_truthy(&json!("http://spam.example")));
        assert!(is_truthy(&json!(1)));
    }

    #[test]
    fn test_request_uses_camel_case_image_fields() {
        let req: SubmissionRequest = serde_json::from_value(json!({
            "collection": "games",
            "fields": {"Game Title": "Foo"},
            "image": {"dataBase64": "aGk=", "filename": "cover.PNG", "contentType": "image/png"}
        }))
        .unwrap();
        let image = req.image.unwrap();
        assert_eq!(image.data(), Some("aGk="));
        assert_eq!(image.content_type.as_deref(), Some("image/png"));
    }
}
