use crate::errors::ActionError;
use crate::services::context::ExecutionContext;
use async_trait::async_trait;
use serde_json::Value;

pub const HANDLERS: &[&str] = &["invoke", "error", "halt"];

/// Contract between the host job framework and an action plugin.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn invoke(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, ActionError>;

    /// Receives a previously raised error. Implementations must re-raise it.
    async fn error(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, ActionError>;

    async fn halt(&self, params: Value, ctx: &ExecutionContext) -> Result<Value, ActionError>;

    async fn dispatch(
        &self,
        handler: &str,
        params: Value,
        ctx: &ExecutionContext,
    ) -> Result<Value, ActionError> {
        match handler {
            "invoke" => self.invoke(params, ctx).await,
            "error" => self.error(params, ctx).await,
            "halt" => self.halt(params, ctx).await,
            other => Err(ActionError::invalid_params(format!(
                "Unknown handler: {}",
                other
            ))
            .with_hint(format!("Expected one of: {}", HANDLERS.join(", ")))),
        }
    }
}
