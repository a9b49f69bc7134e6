use crate::utils::text::truncate_utf8_prefix;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashSet;

const DEFAULT_REDACTION: &str = "[REDACTED]";
const INLINE_REDACTION: &str = "***REDACTED***";

static SENSITIVE_KEYS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "password",
        "secret",
        "token",
        "access_token",
        "client_secret",
        "authorization",
        "secrets",
    ]
    .into_iter()
    .collect()
});

static INLINE_REDACTION_PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"\beyJ[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\.[a-zA-Z0-9_-]{10,}\b")
                .expect("inline redaction regex"),
            INLINE_REDACTION,
        ),
        (
            Regex::new(r"\b(Bearer|Basic)\s+([A-Za-z0-9._~+/=-]{8,})").expect("inline redaction regex"),
            "$1 ***REDACTED***",
        ),
        (
            Regex::new(r#""(access_token|refresh_token|id_token)"\s*:\s*"[^"]*""#)
                .expect("inline redaction regex"),
            r#""$1":"***REDACTED***""#,
        ),
        (
            Regex::new(r#"\b(password|token|secret|access[_-]?token|client[_-]?secret)\b\s*([:=])\s*([^\s"'&]+)"#)
                .expect("inline redaction regex"),
            "$1$2***REDACTED***",
        ),
    ]
});

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

pub fn is_sensitive_key(key: &str) -> bool {
    let normalized = normalize_key(key);
    if normalized.is_empty() {
        return false;
    }
    if SENSITIVE_KEYS.contains(normalized.as_str()) {
        return true;
    }
    normalized.contains("secret") || normalized.contains("token") || normalized.contains("password")
}

fn truncate_string(value: &str, max_length: usize) -> String {
    if max_length == usize::MAX || value.len() <= max_length {
        return value.to_string();
    }
    format!("{}...", truncate_utf8_prefix(value, max_length))
}

pub fn redact_text(value: &str, max_string: usize) -> String {
    let mut out = value.to_string();
    for (re, replacement) in INLINE_REDACTION_PATTERNS.iter() {
        if re.is_match(&out) {
            out = re.replace_all(&out, *replacement).to_string();
        }
    }
    truncate_string(&out, max_string)
}

/// Redacts sensitive keys and inline credentials anywhere in a JSON value.
pub fn redact_object(value: &Value, max_string: usize) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::String(text) => Value::String(redact_text(text, max_string)),
        Value::Bool(_) | Value::Number(_) => value.clone(),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_object(item, max_string))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, entry) in map.iter() {
                if normalize_key(key) == "secrets" && entry.is_object() {
                    let masked = entry
                        .as_object()
                        .map(|m| {
                            m.keys()
                                .map(|k| (k.clone(), Value::String(DEFAULT_REDACTION.to_string())))
                                .collect::<serde_json::Map<_, _>>()
                        })
                        .unwrap_or_default();
                    out.insert(key.clone(), Value::Object(masked));
                    continue;
                }
                if is_sensitive_key(key) {
                    out.insert(key.clone(), Value::String(DEFAULT_REDACTION.to_string()));
                    continue;
                }
                out.insert(key.clone(), redact_object(entry, max_string));
            }
            Value::Object(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{redact_object, redact_text};
    use serde_json::Value;

    #[test]
    fn redact_object_masks_secret_map_values_but_keeps_keys() {
        let input = serde_json::json!({
            "secrets": {"BEARER_AUTH_TOKEN": "abc", "BASIC_PASSWORD": "pw"},
            "environment": {"ADDRESS": "https://acct.example.com"}
        });
        let out = redact_object(&input, usize::MAX);
        assert_eq!(
            out["secrets"]["BEARER_AUTH_TOKEN"],
            Value::String("[REDACTED]".to_string())
        );
        assert_eq!(
            out["secrets"]["BASIC_PASSWORD"],
            Value::String("[REDACTED]".to_string())
        );
        assert_eq!(
            out["environment"]["ADDRESS"],
            Value::String("https://acct.example.com".to_string())
        );
    }

    #[test]
    fn redact_text_masks_authorization_values() {
        let out = redact_text("sent Bearer abcdefghijklmnop upstream", usize::MAX);
        assert_eq!(out, "sent Bearer ***REDACTED*** upstream");
    }

    #[test]
    fn redact_text_masks_token_fields_in_json_bodies() {
        let out = redact_text(r#"{"access_token": "zzz", "expires_in": 60}"#, usize::MAX);
        assert!(!out.contains("zzz"));
        assert!(out.contains("expires_in"));
    }

    #[test]
    fn redact_text_truncates_long_values() {
        let out = redact_text("abcdefghij", 4);
        assert_eq!(out, "abcd...");
    }
}
