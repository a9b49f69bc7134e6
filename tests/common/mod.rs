#![allow(dead_code)]

use revoke_sessions::app::App;
use revoke_sessions::services::context::ExecutionContext;
use revoke_sessions::services::logger::Logger;
use wiremock::MockServer;

pub const STATEMENTS_PATH: &str = "/api/v2/statements";

pub fn test_app() -> (App, Logger) {
    let logger = Logger::capturing("test");
    let app = App::with_client(logger.clone(), reqwest::Client::new());
    (app, logger)
}

pub fn bearer_context(server: &MockServer, token: &str) -> ExecutionContext {
    ExecutionContext::new()
        .with_env("ADDRESS", &server.uri())
        .with_secret("BEARER_AUTH_TOKEN", token)
}

pub async fn recorded_statements(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == STATEMENTS_PATH)
        .filter_map(|req| serde_json::from_slice::<serde_json::Value>(&req.body).ok())
        .filter_map(|body| body["statement"].as_str().map(str::to_string))
        .collect()
}

/// Serves one request, then answers with a `Content-Length` longer than the
/// body it sends and closes the connection, so reading the body fails.
pub async fn truncated_body_server(status: u16) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let (mut socket, _) = match listener.accept().await {
            Ok(conn) => conn,
            Err(_) => return,
        };
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if received.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        let head = format!(
            "HTTP/1.1 {} OK\r\nContent-Type: application/json\r\nContent-Length: 64\r\n\r\n{{\"partial\":",
            status
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.flush().await;
    });
    format!("http://{}", addr)
}
