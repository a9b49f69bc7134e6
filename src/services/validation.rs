use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::ActionError;
use serde_json::Value;
use url::Url;

#[derive(Clone, Default)]
pub struct Validation;

impl Validation {
    pub fn new() -> Self {
        Self
    }

    pub fn ensure_string(
        &self,
        value: &Value,
        label: &str,
        trim: bool,
    ) -> Result<String, ActionError> {
        let text = value.as_str().ok_or_else(|| {
            ActionError::invalid_params(format!("{} must be a non-empty string", label))
        })?;
        let normalized = text.trim();
        if normalized.is_empty() {
            return Err(ActionError::invalid_params(format!(
                "{} must be a non-empty string",
                label
            )));
        }
        Ok(if trim {
            normalized.to_string()
        } else {
            text.to_string()
        })
    }

    /// Missing, null and blank values are all treated as absent.
    pub fn ensure_optional_string(
        &self,
        value: Option<&Value>,
        label: &str,
    ) -> Result<Option<String>, ActionError> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(val) => self.ensure_string(val, label, true).map(Some),
        }
    }

    pub fn ensure_base_url(&self, raw: &str, label: &str) -> Result<String, ActionError> {
        let trimmed = raw.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|err| {
            ActionError::config(format!("{} is not a valid URL: {}", label, err))
        })?;
        if !ALLOWED_HTTP.contains(&parsed.scheme()) {
            return Err(ActionError::config(format!(
                "{} must use http or https (got {})",
                label,
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(ActionError::config(format!("{} must include a host", label)));
        }
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_string_rejects_blank() {
        let validation = Validation::new();
        let err = validation
            .ensure_string(&Value::String("   ".to_string()), "username", true)
            .unwrap_err();
        assert_eq!(err.message, "username must be a non-empty string");
        assert!(err.is_fatal());
    }

    #[test]
    fn ensure_optional_string_treats_blank_as_missing() {
        let validation = Validation::new();
        let value = Value::String(" ".to_string());
        assert_eq!(
            validation.ensure_optional_string(Some(&value), "delay").unwrap(),
            None
        );
        assert!(validation
            .ensure_optional_string(Some(&serde_json::json!(5)), "delay")
            .is_err());
    }

    #[test]
    fn ensure_base_url_strips_trailing_slashes() {
        let validation = Validation::new();
        assert_eq!(
            validation
                .ensure_base_url("https://acct.example.com//", "address")
                .unwrap(),
            "https://acct.example.com"
        );
    }

    #[test]
    fn ensure_base_url_rejects_other_schemes() {
        let validation = Validation::new();
        let err = validation
            .ensure_base_url("ftp://acct.example.com", "address")
            .unwrap_err();
        assert_eq!(err.code, "CONFIG");
    }
}
