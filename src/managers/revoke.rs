use crate::constants::delay::DEFAULT_DELAY_MS;
use crate::constants::warehouse::STATEMENT_HANDLE_FIELD;
use crate::errors::{ActionError, ActionErrorKind};
use crate::managers::statement::StatementExecutor;
use crate::services::action::ActionHandler;
use crate::services::auth::AuthResolver;
use crate::services::context::ExecutionContext;
use crate::services::logger::Logger;
use crate::services::validation::Validation;
use crate::utils::duration::parse_duration_ms;
use crate::utils::sql::{disable_user_statement, enable_user_statement};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RevokeRequest {
    pub username: String,
    pub delay: Option<String>,
    pub address: Option<String>,
}

impl RevokeRequest {
    /// `delay` is read leniently: a non-string value is logged and replaced by
    /// the default delay instead of failing the request.
    pub fn from_params(
        params: &Value,
        validation: &Validation,
        logger: &Logger,
    ) -> Result<Self, ActionError> {
        let username = validation.ensure_string(
            params.get("username").unwrap_or(&Value::Null),
            "username",
            true,
        )?;
        let delay = match params.get("delay") {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                logger.warn(
                    "Invalid delay format, using default",
                    Some(&serde_json::json!({
                        "delay": other,
                        "default_ms": DEFAULT_DELAY_MS,
                    })),
                );
                None
            }
        };
        let address = validation.ensure_optional_string(params.get("address"), "address")?;
        Ok(Self {
            username,
            delay,
            address,
        })
    }
}

/// What a statement call produced: the warehouse handle when one came back,
/// otherwise `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatementOutcome {
    Handle(String),
    Completed(bool),
}

impl StatementOutcome {
    fn from_response(response: &Value) -> Self {
        response
            .get(STATEMENT_HANDLE_FIELD)
            .and_then(|v| v.as_str())
            .filter(|v| !v.is_empty())
            .map(|v| StatementOutcome::Handle(v.to_string()))
            .unwrap_or(StatementOutcome::Completed(true))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResult {
    pub username: String,
    pub sessions_revoked: bool,
    pub user_disabled: StatementOutcome,
    pub user_re_enabled: StatementOutcome,
    pub revoked_at: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HaltRequest {
    pub reason: Option<String>,
    pub username: Option<String>,
}

impl HaltRequest {
    /// Halt only reports, so fields of the wrong type are ignored rather than
    /// rejected.
    pub fn from_params(params: &Value) -> Self {
        let text = |key: &str| {
            params
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            reason: text("reason"),
            username: text("username"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HaltResult {
    pub username: String,
    pub reason: String,
    pub halted_at: String,
    pub cleanup_completed: bool,
}

/// The error the host hands back to the `error` handler. Partial errors keep
/// whatever kind, code and `retryable` flag they carry; an error with neither
/// a kind nor a flag is wrapped as a fatal internal one.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RaisedError {
    Classified(ActionError),
    Partial {
        message: String,
        #[serde(default)]
        kind: Option<ActionErrorKind>,
        #[serde(default)]
        code: Option<String>,
        #[serde(default)]
        hint: Option<String>,
        #[serde(default)]
        details: Option<Value>,
        #[serde(default)]
        retryable: Option<bool>,
    },
    Text(String),
}

impl RaisedError {
    fn into_error(self) -> ActionError {
        match self {
            RaisedError::Classified(err) => err,
            RaisedError::Partial {
                message,
                kind,
                code,
                hint,
                details,
                retryable,
            } => {
                let mut err =
                    ActionError::from_kind(kind.unwrap_or(ActionErrorKind::Internal), message);
                if let Some(code) = code {
                    err.code = code;
                }
                err.hint = hint;
                err.details = details;
                if let Some(retryable) = retryable {
                    err.retryable = retryable;
                }
                err
            }
            RaisedError::Text(message) => ActionError::internal(message),
        }
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Disables then re-enables a warehouse user, which drops its sessions.
pub struct RevokeSessionsAction {
    logger: Logger,
    validation: Validation,
    auth: Arc<AuthResolver>,
    executor: StatementExecutor,
}

impl RevokeSessionsAction {
    pub fn new(
        logger: Logger,
        validation: Validation,
        auth: Arc<AuthResolver>,
        executor: StatementExecutor,
    ) -> Self {
        Self {
            logger: logger.child("revoke"),
            validation,
            auth,
            executor,
        }
    }

    pub async fn revoke(
        &self,
        request: &RevokeRequest,
        ctx: &ExecutionContext,
    ) -> Result<RevokeResult, ActionError> {
        let username = request.username.as_str();
        self.logger.info(
            "Revoking sessions",
            Some(&serde_json::json!({ "username": username })),
        );

        let disable = disable_user_statement(username)?;
        let enable = enable_user_statement(username)?;
        let auth_header = self.auth.resolve(ctx).await?;
        let base_url = ctx.resolve_base_url(request.address.as_deref(), &self.validation)?;
        let delay_ms = parse_duration_ms(request.delay.as_deref(), &self.logger);

        let disabled = self
            .executor
            .execute(&disable, &auth_header, &base_url)
            .await?;
        let user_disabled = StatementOutcome::from_response(&disabled);
        self.logger.info(
            "User disabled",
            Some(&serde_json::json!({
                "username": username,
                "handle": user_disabled,
                "delay_ms": delay_ms,
            })),
        );

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;

        let enabled = self
            .executor
            .execute(&enable, &auth_header, &base_url)
            .await
            .map_err(|err| {
                self.logger.error(
                    "Re-enable failed, user remains disabled",
                    Some(&serde_json::json!({
                        "username": username,
                        "retryable": err.retryable,
                        "error": err.message,
                    })),
                );
                err
            })?;
        let user_re_enabled = StatementOutcome::from_response(&enabled);
        self.logger.info(
            "User re-enabled",
            Some(&serde_json::json!({ "username": username, "handle": user_re_enabled })),
        );

        Ok(RevokeResult {
            username: username.to_string(),
            sessions_revoked: true,
            user_disabled,
            user_re_enabled,
            revoked_at: timestamp(),
        })
    }

    pub fn reraise(&self, error: ActionError) -> ActionError {
        self.logger.error(
            "Session revocation failed",
            Some(&serde_json::json!({
                "kind": error.kind,
                "code": error.code,
                "retryable": error.retryable,
                "message": error.message,
            })),
        );
        error
    }

    pub fn halt_now(&self, request: HaltRequest) -> HaltResult {
        let result = HaltResult {
            username: request.username.unwrap_or_else(|| "unknown".to_string()),
            reason: request.reason.unwrap_or_else(|| "unknown".to_string()),
            halted_at: timestamp(),
            cleanup_completed: true,
        };
        self.logger.info(
            "Session revocation halted",
            Some(&serde_json::json!({
                "username": result.username,
                "reason": result.reason,
            })),
        );
        result
    }
}

#[async_trait]
impl ActionHandler for RevokeSessionsAction {
    async fn invoke(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, ActionError> {
        let request = RevokeRequest::from_params(&params, &self.validation, &self.logger)?;
        let result = self.revoke(&request, ctx).await?;
        Ok(serde_json::to_value(result)?)
    }

    async fn error(&self, params: Value, _ctx: &ExecutionContext) -> Result<Value, ActionError> {
        let raised = params
            .get("error")
            .cloned()
            .ok_or_else(|| ActionError::invalid_params("error handler requires an error"))?;
        let error = serde_json::from_value::<RaisedError>(raised)
            .map(RaisedError::into_error)
            .unwrap_or_else(|err| ActionError::internal(format!("Unreadable error: {}", err)));
        Err(self.reraise(error))
    }

    async fn halt(&self, params: Value, _ctx: &ExecutionContext) -> Result<Value, ActionError> {
        let request = HaltRequest::from_params(&params);
        Ok(serde_json::to_value(self.halt_now(request))?)
    }
}
