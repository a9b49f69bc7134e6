use crate::app::App;
use crate::constants::limits::LOG_BODY_MAX_BYTES;
use crate::errors::ActionError;
use crate::host::protocol::{HostRequest, HostResponse};
use crate::services::action::ActionHandler;
use crate::services::logger::Logger;
use crate::utils::redact::redact_object;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};

pub struct HostServer {
    logger: Logger,
    handler: Arc<dyn ActionHandler>,
    default_handler: String,
}

impl HostServer {
    pub fn new(logger: Logger, handler: Arc<dyn ActionHandler>, default_handler: &str) -> Self {
        Self {
            logger: logger.child("host"),
            handler,
            default_handler: default_handler.to_string(),
        }
    }

    /// Handles one request line. Blank lines yield no response.
    pub async fn handle_line(&self, line: &str) -> Option<HostResponse> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let request: HostRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(err) => {
                return Some(HostResponse::failure(
                    Value::Null,
                    ActionError::invalid_params(format!("Invalid request: {}", err)),
                ));
            }
        };
        Some(self.handle_request(request).await)
    }

    pub async fn handle_request(&self, request: HostRequest) -> HostResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        let handler = request
            .handler
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .unwrap_or(self.default_handler.as_str())
            .to_string();
        self.logger.debug(
            "Dispatching request",
            Some(&serde_json::json!({
                "id": id,
                "handler": handler,
                "params": redact_object(&request.params, LOG_BODY_MAX_BYTES),
                "context": redact_object(
                    &serde_json::to_value(&request.context).unwrap_or(Value::Null),
                    LOG_BODY_MAX_BYTES,
                ),
            })),
        );
        match self
            .handler
            .dispatch(&handler, request.params, &request.context)
            .await
        {
            Ok(result) => HostResponse::success(id, result),
            Err(err) => HostResponse::failure(id, err),
        }
    }

    pub async fn run_stdio(&self) -> Result<(), ActionError> {
        let stdin = tokio::io::stdin();
        let stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin).lines();
        let mut writer = BufWriter::new(stdout);

        while let Some(line) = reader.next_line().await? {
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let payload = serde_json::to_string(&response)?;
            writer.write_all(payload.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
        }
        Ok(())
    }

    /// Reads a single request from stdin and answers it.
    pub async fn run_once(&self) -> Result<HostResponse, ActionError> {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await?;
        let response = match self.handle_line(&input).await {
            Some(response) => response,
            None => HostResponse::failure(
                Value::Null,
                ActionError::invalid_params("Empty request on stdin"),
            ),
        };
        let payload = serde_json::to_string(&response)?;
        let mut stdout = tokio::io::stdout();
        stdout.write_all(payload.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(response)
    }
}

pub async fn run_stdio(default_handler: &str) -> Result<(), ActionError> {
    let app = App::initialize()?;
    let server = HostServer::new(app.logger.clone(), app.action, default_handler);
    server.run_stdio().await
}

pub async fn run_once(default_handler: &str) -> Result<HostResponse, ActionError> {
    let app = App::initialize()?;
    let server = HostServer::new(app.logger.clone(), app.action, default_handler);
    server.run_once().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::context::ExecutionContext;
    use async_trait::async_trait;

    struct EchoHandler;

    #[async_trait]
    impl ActionHandler for EchoHandler {
        async fn invoke(&self, params: Value, _ctx: &ExecutionContext) -> Result<Value, ActionError> {
            Ok(serde_json::json!({ "invoked": params }))
        }

        async fn error(&self, _params: Value, _ctx: &ExecutionContext) -> Result<Value, ActionError> {
            Err(ActionError::rate_limited("again"))
        }

        async fn halt(&self, _params: Value, ctx: &ExecutionContext) -> Result<Value, ActionError> {
            Ok(serde_json::json!({ "secrets": ctx.secrets.len() }))
        }
    }

    fn server(default_handler: &str) -> HostServer {
        HostServer::new(Logger::capturing("test"), Arc::new(EchoHandler), default_handler)
    }

    #[tokio::test]
    async fn blank_lines_are_skipped() {
        assert!(server("invoke").handle_line("   ").await.is_none());
    }

    #[tokio::test]
    async fn unparseable_line_is_invalid_params() {
        let response = server("invoke").handle_line("{nope").await.unwrap();
        assert!(!response.ok);
        assert_eq!(response.id, Value::Null);
        assert_eq!(response.error.unwrap().code, "INVALID_PARAMS");
    }

    #[tokio::test]
    async fn missing_handler_uses_default() {
        let response = server("invoke")
            .handle_line(r#"{"id":"a","params":{"username":"alice"}}"#)
            .await
            .unwrap();
        assert!(response.ok);
        assert_eq!(response.id, serde_json::json!("a"));
        assert_eq!(response.result.unwrap()["invoked"]["username"], "alice");
    }

    #[tokio::test]
    async fn unknown_handler_lists_known_ones() {
        let response = server("invoke")
            .handle_line(r#"{"id":1,"handler":"rollback"}"#)
            .await
            .unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.message, "Unknown handler: rollback");
        assert_eq!(error.hint.as_deref(), Some("Expected one of: invoke, error, halt"));
    }

    #[tokio::test]
    async fn errors_keep_their_classification() {
        let response = server("invoke")
            .handle_line(r#"{"id":2,"handler":"error","params":{}}"#)
            .await
            .unwrap();
        assert!(response.error.unwrap().retryable);
    }

    #[tokio::test]
    async fn context_is_forwarded() {
        let response = server("halt")
            .handle_line(r#"{"context":{"secrets":{"BEARER_AUTH_TOKEN":"t"}}}"#)
            .await
            .unwrap();
        assert_eq!(response.result.unwrap()["secrets"], 1);
    }
}
