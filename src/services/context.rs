use crate::constants::environment::ADDRESS;
use crate::errors::ActionError;
use crate::services::validation::Validation;
use crate::utils::text::non_blank;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-invocation environment and secrets handed over by the host framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub secrets: HashMap<String, String>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.environment.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_secret(mut self, key: &str, value: &str) -> Self {
        self.secrets.insert(key.to_string(), value.to_string());
        self
    }

    /// Trimmed environment value, `None` when missing or blank.
    pub fn env(&self, key: &str) -> Option<&str> {
        non_blank(self.environment.get(key).map(String::as_str))
    }

    /// Trimmed secret value, `None` when missing or blank.
    pub fn secret(&self, key: &str) -> Option<&str> {
        non_blank(self.secrets.get(key).map(String::as_str))
    }

    /// Picks `address` over `environment.ADDRESS` and normalizes it.
    pub fn resolve_base_url(
        &self,
        address: Option<&str>,
        validation: &Validation,
    ) -> Result<String, ActionError> {
        if let Some(address) = non_blank(address) {
            return validation.ensure_base_url(address, "address");
        }
        if let Some(address) = self.env(ADDRESS) {
            return validation.ensure_base_url(address, ADDRESS);
        }
        Err(ActionError::config(
            "No URL specified. Provide either the address parameter or the ADDRESS environment variable",
        ))
    }
}
