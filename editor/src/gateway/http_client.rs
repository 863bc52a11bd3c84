//! HTTP gateway over `reqwest`
//!
//! Builds the URL from the configured base and the request path, sends the
//! JSON body and folds every result, including transport errors, into a
//! [`RequestOutcome`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::{GatewayRequest, RequestGateway, RequestOutcome};
use crate::config::EditorConfig;
use crate::constants::{POOL_IDLE_TIMEOUT, POOL_MAX_IDLE_PER_HOST};

/// Gateway that talks to the assignments backend over HTTP
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client:     Client,
    base_url:   String,
    auth_token: Option<String>,
}

impl HttpGateway {
    /// Create a gateway with a pooled client configured from `config`
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(POOL_IDLE_TIMEOUT))
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self::with_client(config, client)
    }

    /// Create a gateway around an existing client
    #[must_use]
    pub fn with_client(config: &EditorConfig, client: Client) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    /// Absolute URL for a backend path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Turn a non-2xx response into a failure, preferring the server's own message
    async fn failure_from_response(response: reqwest::Response) -> RequestOutcome {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        warn!(
            "Assignment save rejected - status={}, body_len={}",
            status,
            body.len()
        );

        let server_message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| extract_error_message(&json));

        RequestOutcome::failure(server_message.unwrap_or_else(|| status_failure_message(status)))
    }
}

/// Message used when the server gives no usable error text
pub(crate) fn status_failure_message(status: impl Into<u16>) -> String {
    format!("Request failed with status code {}", status.into())
}

/// Pull an error string out of a JSON error body (`error` wins over `message`)
fn extract_error_message(json: &Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| json.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(ToString::to_string)
}

/// Short description of what went wrong below HTTP
fn describe_transport_error(e: &reqwest::Error) -> &'static str {
    if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "Connection failed"
    } else if e.is_request() {
        "Request error"
    } else if e.is_body() {
        "Body error"
    } else if e.is_decode() {
        "Decode error"
    } else {
        "Network error"
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn send(&self, request: GatewayRequest) -> RequestOutcome {
        let url = self.build_url(&request.path);
        debug!("Sending {} {}", request.method, url);

        let mut builder = self
            .client
            .request(request.method.into(), &url)
            .json(&request.body);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let kind = describe_transport_error(&e);
                warn!(
                    "Assignment save failed - method={}, url={}, error={:?}",
                    request.method, url, e
                );
                return RequestOutcome::failure(format!("{kind} while contacting {url}"));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("{} {} answered {}", request.method, url, status);
            RequestOutcome::Success {
                status_code: status.as_u16(),
            }
        } else {
            Self::failure_from_response(response).await
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;
    use crate::gateway::HttpMethod;

    /// Serve exactly one canned response and hand back the raw request text
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut chunk = [0_u8; 4096];
            loop {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                raw.extend_from_slice(&chunk[..read]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&raw).to_string());
        });

        (format!("http://{addr}/api/v1"), rx)
    }

    fn gateway_for(base_url: &str) -> HttpGateway {
        let config = EditorConfig {
            base_url: base_url.to_string(),
            auth_token: Some("token-123".to_string()),
            ..EditorConfig::default()
        };
        let client = Client::builder().no_proxy().build().unwrap();
        HttpGateway::with_client(&config, client)
    }

    #[tokio::test]
    async fn test_created_response_is_success() {
        let (base_url, request_rx) = serve_once("201 Created", r#"{"id":12}"#).await;
        let gateway = gateway_for(&base_url);

        let outcome = gateway
            .send(GatewayRequest {
                method: HttpMethod::Post,
                path:   "/assignments".to_string(),
                body:   json!({"assignment": {"name": "HW1"}}),
            })
            .await;

        assert_eq!(outcome, RequestOutcome::Success { status_code: 201 });

        let raw = request_rx.await.unwrap();
        assert!(raw.starts_with("POST /api/v1/assignments HTTP/1.1"), "{raw}");
        assert!(raw.to_lowercase().contains("authorization: bearer token-123"));
        assert!(raw.contains(r#""name":"HW1""#));
    }

    #[tokio::test]
    async fn test_patch_targets_record_path() {
        let (base_url, request_rx) = serve_once("200 OK", "{}").await;
        let gateway = gateway_for(&base_url);

        let outcome = gateway
            .send(GatewayRequest {
                method: HttpMethod::Patch,
                path:   "/assignments/7".to_string(),
                body:   json!({}),
            })
            .await;

        assert_eq!(outcome, RequestOutcome::Success { status_code: 200 });
        let raw = request_rx.await.unwrap();
        assert!(raw.starts_with("PATCH /api/v1/assignments/7 HTTP/1.1"), "{raw}");
    }

    #[tokio::test]
    async fn test_error_body_message_is_surfaced() {
        let (base_url, _request_rx) =
            serve_once("422 Unprocessable Entity", r#"{"error":"Name already taken"}"#).await;
        let gateway = gateway_for(&base_url);

        let outcome = gateway
            .send(GatewayRequest {
                method: HttpMethod::Post,
                path:   "/assignments".to_string(),
                body:   json!({}),
            })
            .await;

        assert_eq!(outcome, RequestOutcome::failure("Name already taken"));
    }

    #[tokio::test]
    async fn test_error_without_message_uses_status() {
        let (base_url, _request_rx) = serve_once("500 Internal Server Error", "oops").await;
        let gateway = gateway_for(&base_url);

        let outcome = gateway
            .send(GatewayRequest {
                method: HttpMethod::Post,
                path:   "/assignments".to_string(),
                body:   json!({}),
            })
            .await;

        assert_eq!(
            outcome,
            RequestOutcome::failure("Request failed with status code 500")
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_a_failure() {
        // Bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let gateway = gateway_for(&format!("http://{addr}"));
        let outcome = gateway
            .send(GatewayRequest {
                method: HttpMethod::Post,
                path:   "/assignments".to_string(),
                body:   json!({}),
            })
            .await;

        assert!(
            matches!(outcome, RequestOutcome::Failure { ref message } if message.contains("/assignments")),
            "unexpected outcome: {outcome:?}"
        );
    }

    #[test]
    fn test_extract_error_message_prefers_error_key() {
        assert_eq!(
            extract_error_message(&json!({"error": "bad", "message": "worse"})).as_deref(),
            Some("bad")
        );
        assert_eq!(
            extract_error_message(&json!({"message": "only message"})).as_deref(),
            Some("only message")
        );
        assert_eq!(extract_error_message(&json!({"errors": {"name": ["taken"]}})), None);
    }

    #[test]
    fn test_build_url_joins_paths() {
        let gateway = gateway_for("http://localhost:3002/api/v1/");
        assert_eq!(
            gateway.build_url("/assignments"),
            "http://localhost:3002/api/v1/assignments"
        );
        assert_eq!(
            gateway.build_url("assignments/3"),
            "http://localhost:3002/api/v1/assignments/3"
        );
    }
}
