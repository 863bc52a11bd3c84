//! Request gateway: the collaborator that performs the HTTP call for a save
//!
//! The reconciler depends on the [`RequestGateway`] trait only. The crate's
//! production implementation is [`HttpGateway`].

mod http_client;

use async_trait::async_trait;
use serde_json::Value;
use strum::Display;

pub use http_client::HttpGateway;
pub(crate) use http_client::status_failure_message;

/// HTTP verbs the editor issues
#[derive(Display, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[strum(serialize_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Create a record
    Post,
    /// Partially update a record
    Patch,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Post => Self::POST,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// One request handed to the gateway
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayRequest {
    /// Verb to send
    pub method: HttpMethod,
    /// Path relative to the backend base URL, e.g. `/assignments/7`
    pub path:   String,
    /// JSON body
    pub body:   Value,
}

/// State of the latest request as seen by the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Request dispatched, no answer yet
    Pending,
    /// The server answered; `status_code` is the HTTP status
    Success {
        /// HTTP status code of the response
        status_code: u16,
    },
    /// The request failed; `message` is shown to the user verbatim
    Failure {
        /// Human readable failure description
        message: String,
    },
}

impl RequestOutcome {
    /// Build a failure outcome
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Whether this outcome ends the request cycle
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Performs HTTP calls on behalf of the editor
///
/// `#[async_trait]` keeps the trait usable as `Arc<dyn RequestGateway>`.
/// Implementations never error: every problem becomes
/// [`RequestOutcome::Failure`].
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Send `request` and resolve once the server answered or the call failed
    async fn send(&self, request: GatewayRequest) -> RequestOutcome;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "tests fail by panicking"
)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_map_to_http_verbs() {
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Patch.to_string(), "PATCH");
        assert_eq!(reqwest::Method::from(HttpMethod::Patch), reqwest::Method::PATCH);
    }

    #[test]
    fn test_only_pending_is_not_terminal() {
        assert!(!RequestOutcome::Pending.is_terminal());
        assert!(RequestOutcome::Success { status_code: 201 }.is_terminal());
        assert!(RequestOutcome::failure("boom").is_terminal());
    }
}
