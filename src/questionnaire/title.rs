//! Best-effort title extraction for listing entries

use serde_json::Value;

/// Extract the `title` string of a questionnaire document.
///
/// Never fails: unparsable bytes, a non-object root, a missing key or a
/// non-string value all yield `None`.
pub fn extract_title(raw: &[u8]) -> Option<String> {
    match serde_json::from_slice::<Value>(raw).ok()? {
        Value::Object(mut map) => match map.remove("title")? {
            Value::String(title) => Some(title),
            _ => None,
        },
        _ => None,
    }
}
