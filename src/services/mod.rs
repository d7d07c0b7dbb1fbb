use serde::Serialize;

pub mod admin_service;
pub mod auth_service;
pub mod cart_service;
pub mod content_service;
pub mod enquiry_service;
pub mod notification_service;
pub mod order_service;
pub mod payment_service;
pub mod product_service;
pub mod settings_service;
pub mod upload_service;

/// Renders `?k=v&...` with form encoding, or an empty string when there is
/// nothing to send.
pub fn query_string(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let mut url = match reqwest::Url::parse("http://query.invalid/") {
        Ok(url) => url,
        Err(_) => return String::new(),
    };
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (*k, v.as_str())));
    url.query().map(|q| format!("?{q}")).unwrap_or_default()
}

/// Percent-encodes a value for use as a single path segment.
pub fn path_segment(segment: &str) -> String {
    let mut url = match reqwest::Url::parse("http://path.invalid/") {
        Ok(url) => url,
        Err(_) => return String::new(),
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().push(segment);
    }
    url.path().trim_start_matches('/').to_string()
}

/// Wire spelling of a unit enum (its serde rename).
pub fn enum_value<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}
