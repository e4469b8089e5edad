use std::sync::LazyLock;

use regex::Regex;

use super::matching::MULTI_VALUE_SEPARATORS;

static DRIVE_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"drive\.google\.com/file/d/([^/]+)/").expect("valid regex"));
static DROPBOX_DL_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[?&]dl=\d").expect("valid regex"));

/// Resolve an image cell to a directly loadable URL, if it holds one.
pub fn image_url(raw: &str) -> Option<String> {
    first_url_like(raw.trim()).map(|url| normalize_image_host(&url))
}

/// Pick the first usable URL from a possibly multi-valued cell: absolute
/// `http(s)` first, then protocol-relative `//host/...`, then site-relative `/path`.
fn first_url_like(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let parts: Vec<&str> = raw
        .split(MULTI_VALUE_SEPARATORS)
        .map(|p| unquote(p.trim()))
        .collect();

    if let Some(p) = parts.iter().find(|p| has_http_scheme(p)) {
        return Some(p.to_string());
    }
    if let Some(p) = parts.iter().find(|p| p.starts_with("//")) {
        return Some(format!("https:{p}"));
    }
    parts
        .iter()
        .find(|p| p.len() > 1 && p.starts_with('/'))
        .map(|p| p.to_string())
}

fn unquote(s: &str) -> &str {
    let s = s.strip_prefix(['\'', '"']).unwrap_or(s);
    s.strip_suffix(['\'', '"']).unwrap_or(s)
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Rewrite share links from common hosts into direct image links.
fn normalize_image_host(url: &str) -> String {
    let mut url = match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    };

    if let Some(id) = DRIVE_FILE.captures(&url).and_then(|c| c.get(1)) {
        return format!("https://drive.google.com/uc?export=view&id={}", id.as_str());
    }

    if url.to_ascii_lowercase().starts_with("https://www.dropbox.com/") {
        url = url.replacen("www.dropbox.com", "dl.dropboxusercontent.com", 1);
        url = DROPBOX_DL_PARAM.replace(&url, "").into_owned();
    }

    url
}
