use crate::constants::limits::{ERROR_BODY_MAX_BYTES, LOG_BODY_MAX_BYTES};
use crate::constants::warehouse::{STATEMENTS_PATH, TOKEN_TYPE_HEADER};
use crate::errors::ActionError;
use crate::services::logger::Logger;
use crate::utils::redact::redact_text;
use crate::utils::token_type::{bearer_token, detect_token_type};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

#[derive(Clone)]
pub struct StatementExecutor {
    client: Client,
    logger: Logger,
}

pub fn statements_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), STATEMENTS_PATH)
}

/// Maps a non-2xx statement response to a classified error. Checked in
/// order: 429, 401, 403, 422, 5xx, everything else.
pub fn classify_failure(status: StatusCode, body: &str) -> ActionError {
    let code = status.as_u16();
    let body = redact_text(body, ERROR_BODY_MAX_BYTES);
    let error = match code {
        429 => ActionError::rate_limited(format!(
            "Warehouse API rate limit exceeded (429): {}",
            body
        )),
        401 => ActionError::unauthorized(
            "Authentication failed (401): the credential is invalid or expired",
        ),
        403 => ActionError::forbidden(
            "Insufficient permissions (403): the authenticated role cannot alter this user",
        ),
        422 => ActionError::invalid_statement(format!("Invalid SQL statement (422): {}", body)),
        500.. => ActionError::server_error(format!(
            "Warehouse API server error ({}): {}",
            code, body
        )),
        _ => ActionError::request_failed(format!(
            "Statement request failed: {} {} - {}",
            code,
            status.canonical_reason().unwrap_or(""),
            body
        )),
    };
    error.with_details(serde_json::json!({ "status": code }))
}

impl StatementExecutor {
    pub fn new(client: Client, logger: Logger) -> Self {
        Self {
            client,
            logger: logger.child("statement"),
        }
    }

    /// Submits one statement and returns the decoded response body.
    pub async fn execute(
        &self,
        statement: &str,
        auth_header: &str,
        base_url: &str,
    ) -> Result<Value, ActionError> {
        let url = statements_url(base_url);
        let mut request = self
            .client
            .post(&url)
            .header(AUTHORIZATION, auth_header)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .json(&serde_json::json!({ "statement": statement }));
        if let Some(token) = bearer_token(auth_header) {
            request = request.header(TOKEN_TYPE_HEADER, detect_token_type(token).as_str());
        }

        self.logger.debug(
            "Submitting statement",
            Some(&serde_json::json!({ "url": url, "statement": statement })),
        );
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let error = classify_failure(status, &text);
            self.logger.error(
                "Statement request failed",
                Some(&serde_json::json!({
                    "status": status.as_u16(),
                    "retryable": error.retryable,
                    "body": redact_text(&text, LOG_BODY_MAX_BYTES),
                })),
            );
            return Err(error);
        }

        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(value),
            Err(_) => {
                self.logger.warn(
                    "Statement response is not JSON",
                    Some(&serde_json::json!({
                        "status": status.as_u16(),
                        "body": redact_text(&text, LOG_BODY_MAX_BYTES),
                    })),
                );
                Ok(Value::Object(Default::default()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ActionErrorKind;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test]
    fn statements_url_joins_path() {
        assert_eq!(
            statements_url("https://acct.example.com/"),
            "https://acct.example.com/api/v2/statements"
        );
    }

    #[test]
    fn classify_failure_table() {
        let cases = [
            (429, ActionErrorKind::RateLimited, true),
            (401, ActionErrorKind::Unauthorized, false),
            (403, ActionErrorKind::Forbidden, false),
            (422, ActionErrorKind::InvalidStatement, false),
            (500, ActionErrorKind::ServerError, true),
            (503, ActionErrorKind::ServerError, true),
            (400, ActionErrorKind::RequestFailed, false),
            (404, ActionErrorKind::RequestFailed, false),
            (302, ActionErrorKind::RequestFailed, false),
        ];
        for (code, kind, retryable) in cases {
            let err = classify_failure(status(code), "body");
            assert_eq!(err.kind, kind, "status {}", code);
            assert_eq!(err.retryable, retryable, "status {}", code);
            assert_eq!(err.details.as_ref().unwrap()["status"], code);
        }
    }

    #[test]
    fn invalid_statement_includes_body() {
        let err = classify_failure(status(422), "SQL compilation error: unexpected 'USR'");
        assert!(err.message.contains("SQL compilation error"));
    }

    #[test]
    fn generic_failure_includes_status_reason_and_body() {
        let err = classify_failure(status(418), "short and stout");
        assert_eq!(
            err.message,
            "Statement request failed: 418 I'm a teapot - short and stout"
        );
    }
}
