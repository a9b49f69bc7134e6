use crate::constants::auth_style::{IN_HEADER, IN_PARAMS};
use crate::constants::environment::{
    CLIENT_CREDENTIALS_AUDIENCE, CLIENT_CREDENTIALS_AUTH_STYLE, CLIENT_CREDENTIALS_CLIENT_ID,
    CLIENT_CREDENTIALS_SCOPE, CLIENT_CREDENTIALS_TOKEN_URL,
};
use crate::constants::limits::{ERROR_BODY_MAX_BYTES, LOG_BODY_MAX_BYTES};
use crate::constants::secrets::{
    AUTHORIZATION_CODE_ACCESS_TOKEN, BASIC_PASSWORD, BASIC_USERNAME, BEARER_AUTH_TOKEN,
    CLIENT_CREDENTIALS_CLIENT_SECRET,
};
use crate::errors::ActionError;
use crate::services::context::ExecutionContext;
use crate::services::logger::Logger;
use crate::utils::redact::redact_text;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::Value;

/// One way of turning the execution context into an `Authorization` value.
///
/// `Ok(None)` means the strategy's credentials are absent and the next
/// strategy should be tried; an `Err` aborts resolution.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn resolve(&self, ctx: &ExecutionContext) -> Result<Option<String>, ActionError>;
}

pub fn bearer_header(token: &str) -> String {
    let token = token.trim();
    if token
        .get(..7)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("bearer "))
    {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

pub fn basic_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}

pub struct BearerTokenStrategy;

#[async_trait]
impl AuthStrategy for BearerTokenStrategy {
    fn name(&self) -> &'static str {
        "bearer"
    }

    async fn resolve(&self, ctx: &ExecutionContext) -> Result<Option<String>, ActionError> {
        Ok(ctx.secret(BEARER_AUTH_TOKEN).map(bearer_header))
    }
}

pub struct BasicAuthStrategy;

#[async_trait]
impl AuthStrategy for BasicAuthStrategy {
    fn name(&self) -> &'static str {
        "basic"
    }

    async fn resolve(&self, ctx: &ExecutionContext) -> Result<Option<String>, ActionError> {
        match (ctx.secret(BASIC_USERNAME), ctx.secret(BASIC_PASSWORD)) {
            (Some(username), Some(password)) => Ok(Some(basic_header(username, password))),
            _ => Ok(None),
        }
    }
}

pub struct AuthorizationCodeStrategy;

#[async_trait]
impl AuthStrategy for AuthorizationCodeStrategy {
    fn name(&self) -> &'static str {
        "oauth2_authorization_code"
    }

    async fn resolve(&self, ctx: &ExecutionContext) -> Result<Option<String>, ActionError> {
        Ok(ctx
            .secret(AUTHORIZATION_CODE_ACCESS_TOKEN)
            .map(bearer_header))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthStyle {
    InHeader,
    InParams,
}

impl ClientAuthStyle {
    /// Unknown values fall back to `InHeader`; the second field reports whether
    /// the raw value was recognized.
    pub fn parse(raw: Option<&str>) -> (Self, bool) {
        let Some(raw) = raw else {
            return (ClientAuthStyle::InHeader, true);
        };
        let normalized: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "inheader" | "header" | "basic" => (ClientAuthStyle::InHeader, true),
            "inparams" | "params" | "body" | "form" => (ClientAuthStyle::InParams, true),
            _ => (ClientAuthStyle::InHeader, false),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClientAuthStyle::InHeader => IN_HEADER,
            ClientAuthStyle::InParams => IN_PARAMS,
        }
    }
}

/// Fetches a fresh access token from the configured token endpoint.
pub struct ClientCredentialsStrategy {
    client: Client,
    logger: Logger,
}

impl ClientCredentialsStrategy {
    pub fn new(client: Client, logger: Logger) -> Self {
        Self {
            client,
            logger: logger.child("client_credentials"),
        }
    }

    async fn fetch_token(
        &self,
        ctx: &ExecutionContext,
        client_secret: &str,
    ) -> Result<String, ActionError> {
        let token_url = ctx.env(CLIENT_CREDENTIALS_TOKEN_URL).ok_or_else(|| {
            ActionError::config(format!(
                "{} is required for the OAuth2 client credentials flow",
                CLIENT_CREDENTIALS_TOKEN_URL
            ))
        })?;
        let client_id = ctx.env(CLIENT_CREDENTIALS_CLIENT_ID).ok_or_else(|| {
            ActionError::config(format!(
                "{} is required for the OAuth2 client credentials flow",
                CLIENT_CREDENTIALS_CLIENT_ID
            ))
        })?;

        let (style, recognized) = ClientAuthStyle::parse(ctx.env(CLIENT_CREDENTIALS_AUTH_STYLE));
        if !recognized {
            self.logger.warn(
                "Unknown OAuth2 auth style, sending credentials in header",
                Some(&serde_json::json!({
                    "auth_style": ctx.env(CLIENT_CREDENTIALS_AUTH_STYLE),
                })),
            );
        }

        let mut form: Vec<(&str, &str)> = vec![("grant_type", "client_credentials")];
        if let Some(scope) = ctx.env(CLIENT_CREDENTIALS_SCOPE) {
            form.push(("scope", scope));
        }
        if let Some(audience) = ctx.env(CLIENT_CREDENTIALS_AUDIENCE) {
            form.push(("audience", audience));
        }

        let mut request = self
            .client
            .post(token_url)
            .header(reqwest::header::ACCEPT, "application/json");
        match style {
            ClientAuthStyle::InParams => {
                form.push(("client_id", client_id));
                form.push(("client_secret", client_secret));
            }
            ClientAuthStyle::InHeader => {
                request = request.header(
                    reqwest::header::AUTHORIZATION,
                    basic_header(client_id, client_secret),
                );
            }
        }

        self.logger.debug(
            "Requesting OAuth2 token",
            Some(&serde_json::json!({
                "token_url": token_url,
                "auth_style": style.as_str(),
            })),
        );

        let response = request.form(&form).send().await.map_err(|err| {
            ActionError::config(format!("OAuth2 token request failed: {}", err))
        })?;
        let status = response.status();
        let text = response.text().await.map_err(|err| {
            ActionError::config(format!("OAuth2 token response could not be read: {}", err))
        })?;
        if !status.is_success() {
            self.logger.error(
                "OAuth2 token request rejected",
                Some(&serde_json::json!({
                    "status": status.as_u16(),
                    "body": redact_text(&text, LOG_BODY_MAX_BYTES),
                })),
            );
            return Err(ActionError::config(format!(
                "OAuth2 token request failed: {} {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                redact_text(&text, ERROR_BODY_MAX_BYTES)
            ))
            .with_details(serde_json::json!({ "status": status.as_u16() })));
        }

        let payload: Value = serde_json::from_str(&text).map_err(|_| {
            ActionError::config("OAuth2 token response is not valid JSON")
        })?;
        payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ActionError::config("OAuth2 token response missing access_token"))
    }
}

#[async_trait]
impl AuthStrategy for ClientCredentialsStrategy {
    fn name(&self) -> &'static str {
        "oauth2_client_credentials"
    }

    async fn resolve(&self, ctx: &ExecutionContext) -> Result<Option<String>, ActionError> {
        let Some(client_secret) = ctx.secret(CLIENT_CREDENTIALS_CLIENT_SECRET) else {
            return Ok(None);
        };
        let token = self.fetch_token(ctx, client_secret).await?;
        Ok(Some(bearer_header(&token)))
    }
}

/// Tries each strategy in order and returns the first header produced.
pub struct AuthResolver {
    logger: Logger,
    strategies: Vec<Box<dyn AuthStrategy>>,
}

impl AuthResolver {
    pub fn new(client: Client, logger: Logger) -> Self {
        let logger = logger.child("auth");
        let strategies: Vec<Box<dyn AuthStrategy>> = vec![
            Box::new(BearerTokenStrategy),
            Box::new(BasicAuthStrategy),
            Box::new(AuthorizationCodeStrategy),
            Box::new(ClientCredentialsStrategy::new(client, logger.clone())),
        ];
        Self { logger, strategies }
    }

    pub fn with_strategies(logger: Logger, strategies: Vec<Box<dyn AuthStrategy>>) -> Self {
        Self {
            logger: logger.child("auth"),
            strategies,
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn resolve(&self, ctx: &ExecutionContext) -> Result<String, ActionError> {
        for strategy in &self.strategies {
            if let Some(header) = strategy.resolve(ctx).await? {
                self.logger.debug(
                    "Resolved authorization",
                    Some(&serde_json::json!({ "strategy": strategy.name() })),
                );
                return Ok(header);
            }
        }
        Err(ActionError::config(
            "No authentication configured. Provide a bearer token, basic credentials, or OAuth2 credentials",
        )
        .with_details(serde_json::json!({ "tried": self.strategy_names() })))
    }
}
