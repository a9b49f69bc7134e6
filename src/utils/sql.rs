use crate::errors::ActionError;
use once_cell::sync::Lazy;
use regex::Regex;

static BARE_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier regex"));

/// Renders a user name as a warehouse identifier. Plain names stay bare so
/// the warehouse resolves them case-insensitively; anything else is quoted.
pub fn user_identifier(value: &str) -> Result<String, ActionError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ActionError::invalid_params(
            "Identifier must be a non-empty string",
        ));
    }
    if trimmed.contains('\0') {
        return Err(ActionError::invalid_params(
            "Identifier must not contain null bytes",
        ));
    }
    if BARE_IDENTIFIER_RE.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }
    Ok(format!("\"{}\"", trimmed.replace('"', "\"\"")))
}

pub fn disable_user_statement(username: &str) -> Result<String, ActionError> {
    Ok(format!(
        "ALTER USER {} SET DISABLED = TRUE",
        user_identifier(username)?
    ))
}

pub fn enable_user_statement(username: &str) -> Result<String, ActionError> {
    Ok(format!(
        "ALTER USER {} SET DISABLED = FALSE",
        user_identifier(username)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_stay_bare() {
        assert_eq!(
            disable_user_statement("alice").unwrap(),
            "ALTER USER alice SET DISABLED = TRUE"
        );
        assert_eq!(
            enable_user_statement("SVC_ETL$1").unwrap(),
            "ALTER USER SVC_ETL$1 SET DISABLED = FALSE"
        );
    }

    #[test]
    fn other_names_are_quoted_and_escaped() {
        assert_eq!(
            user_identifier("jane.doe@example.com").unwrap(),
            "\"jane.doe@example.com\""
        );
        assert_eq!(
            user_identifier("x\"; DROP USER admin; --").unwrap(),
            "\"x\"\"; DROP USER admin; --\""
        );
    }

    #[test]
    fn rejects_null_bytes() {
        assert!(user_identifier("a\0b").is_err());
    }
}
