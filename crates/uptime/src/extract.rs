//! Response content extraction.

use std::fmt::Write;

use serde_json::{Map, Value};

/// Flatten a response body into `key="value"` lines for substring checks.
///
/// Only JSON objects are understood. Anything else (plain text, arrays,
/// malformed JSON) yields an empty string, so a content rule can never match
/// an unparseable body.
pub fn extract_content(body: &[u8]) -> String {
    let map: Map<String, Value> = match serde_json::from_slice(body) {
        Ok(map) => map,
        Err(e) => {
            tracing::debug!("Response body is not a JSON object: {}", e);
            return String::new();
        }
    };

    let mut content = String::new();
    for (key, value) in &map {
        // Writing into a String cannot fail
        let _ = match value {
            Value::String(s) => writeln!(content, "{key}=\"{s}\""),
            other => writeln!(content, "{key}=\"{other}\""),
        };
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flattens_object() {
        let content = extract_content(br#"{"status": "ok", "uptime": 42, "ready": true}"#);

        let mut lines: Vec<&str> = content.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, ["ready=\"true\"", "status=\"ok\"", "uptime=\"42\""]);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_nested_values_are_json_text() {
        let content = extract_content(br#"{"db": {"status": "ok"}}"#);

        assert_eq!(content, "db=\"{\"status\":\"ok\"}\"\n");
        assert!(content.contains("ok"));
    }

    #[test]
    fn test_malformed_body_is_empty() {
        assert_eq!(extract_content(b"<html>down</html>"), "");
        assert_eq!(extract_content(br#"{"status": "#), "");
        assert_eq!(extract_content(b""), "");
    }

    #[test]
    fn test_non_object_json_is_empty() {
        assert_eq!(extract_content(br#"["ok"]"#), "");
        assert_eq!(extract_content(br#""ok""#), "");
    }

    #[test]
    fn test_empty_object() {
        assert_eq!(extract_content(b"{}"), "");
    }
}
