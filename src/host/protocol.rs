use crate::errors::ActionError;
use crate::services::context::ExecutionContext;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct HostRequest {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub handler: Option<String>,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub context: ExecutionContext,
}

#[derive(Debug, Serialize)]
pub struct HostResponse {
    pub id: Value,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl HostResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: ActionError) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_request_defaults_optional_sections() {
        let raw = r#"{"handler":"halt"}"#;
        let parsed: HostRequest = serde_json::from_str(raw).expect("must parse");
        assert!(parsed.id.is_none());
        assert_eq!(parsed.handler.as_deref(), Some("halt"));
        assert!(parsed.params.is_null());
        assert_eq!(parsed.context, ExecutionContext::default());
    }

    #[test]
    fn host_request_parses_context() {
        let raw = r#"{"id":7,"handler":"invoke","params":{"username":"alice"},
            "context":{"environment":{"ADDRESS":"https://a.example.com"},"secrets":{"BEARER_AUTH_TOKEN":"t"}}}"#;
        let parsed: HostRequest = serde_json::from_str(raw).expect("must parse");
        assert_eq!(parsed.id, Some(serde_json::json!(7)));
        assert_eq!(parsed.context.env("ADDRESS"), Some("https://a.example.com"));
        assert_eq!(parsed.context.secret("BEARER_AUTH_TOKEN"), Some("t"));
    }

    #[test]
    fn failure_response_carries_retryable_flag() {
        let response =
            HostResponse::failure(Value::Null, ActionError::server_error("upstream 503"));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["retryable"], true);
        assert!(value.get("result").is_none());
    }
}
