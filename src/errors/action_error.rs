use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorKind {
    InvalidParams,
    Config,
    Unauthorized,
    Forbidden,
    InvalidStatement,
    RateLimited,
    ServerError,
    RequestFailed,
    Internal,
}

impl ActionErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ActionErrorKind::InvalidParams => "INVALID_PARAMS",
            ActionErrorKind::Config => "CONFIG",
            ActionErrorKind::Unauthorized => "UNAUTHORIZED",
            ActionErrorKind::Forbidden => "FORBIDDEN",
            ActionErrorKind::InvalidStatement => "INVALID_STATEMENT",
            ActionErrorKind::RateLimited => "RATE_LIMITED",
            ActionErrorKind::ServerError => "SERVER_ERROR",
            ActionErrorKind::RequestFailed => "REQUEST_FAILED",
            ActionErrorKind::Internal => "INTERNAL",
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, ActionErrorKind::RateLimited | ActionErrorKind::ServerError)
    }
}

/// Classified failure raised out of an action handler.
///
/// `retryable` is derived from the kind and is the only signal the host
/// framework uses to decide whether to run the action again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionError {
    pub kind: ActionErrorKind,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub retryable: bool,
}

impl ActionError {
    pub fn new(
        kind: ActionErrorKind,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
            hint: None,
            details: None,
            retryable: kind.is_retryable(),
        }
    }

    pub fn from_kind(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, kind.code(), message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::InvalidParams, "INVALID_PARAMS", message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::Config, "CONFIG", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::Unauthorized, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::Forbidden, "FORBIDDEN", message)
    }

    pub fn invalid_statement(message: impl Into<String>) -> Self {
        Self::new(
            ActionErrorKind::InvalidStatement,
            "INVALID_STATEMENT",
            message,
        )
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::RateLimited, "RATE_LIMITED", message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::ServerError, "SERVER_ERROR", message)
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::RequestFailed, "REQUEST_FAILED", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ActionErrorKind::Internal, "INTERNAL", message)
    }

    pub fn is_fatal(&self) -> bool {
        !self.retryable
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ActionError {}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        ActionError::internal(err.to_string())
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(err: serde_json::Error) -> Self {
        ActionError::internal(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for ActionError {
    fn from(err: reqwest::Error) -> Self {
        ActionError::internal(format!("HTTP transport error: {}", err))
    }
}
