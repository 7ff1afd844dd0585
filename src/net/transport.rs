//! HTTP transport for the attendance API.
//!
//! ARCHITECTURE
//! ============
//! [`Transport`] is the seam the session store and API helpers talk to.
//! [`HttpTransport`] is the `reqwest` implementation: it attaches the bearer
//! token found in durable storage and unwraps the JSON payload.
//!
//! ERROR HANDLING
//! ==============
//! HTTP 401 is reported as [`TransportError::Unauthenticated`] and nothing
//! else. The transport never touches session state; whoever owns the session
//! decides what an expired credential means.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use crate::session::storage::{Storage, TOKEN_KEY};

/// Fields checked, in order, for a human-readable error message.
const MESSAGE_FIELDS: [&str; 3] = ["message", "error", "msg"];

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server rejected the credential (HTTP 401).
    #[error("session rejected by server (HTTP 401)")]
    Unauthenticated { body: Value },

    /// Any other non-success status, passed through untouched.
    #[error("server returned HTTP {status}")]
    Status { status: u16, body: Value },

    /// The request never produced a response (connect failure, timeout).
    #[error("network request failed: {0}")]
    Network(String),

    /// A success response whose body was not JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl TransportError {
    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }

    /// HTTP status carried by the error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthenticated { .. } => Some(401),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Error message supplied by the server in the response body.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthenticated { body } | Self::Status { body, .. } => message_from_body(body),
            _ => None,
        }
    }
}

pub(crate) fn message_from_body(body: &Value) -> Option<&str> {
    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .map(str::trim)
        .find(|message| !message.is_empty())
}

// =============================================================================
// REQUEST
// =============================================================================

/// A request relative to the API base URL.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), query: Vec::new(), body: None }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { method: Method::POST, path: path.into(), query: Vec::new(), body: Some(body) }
    }

    #[must_use]
    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }
}

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// Sends API requests and returns the decoded JSON payload.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Unauthenticated`] on HTTP 401,
    /// [`TransportError::Status`] on other non-success statuses and
    /// [`TransportError::Network`] when no response arrived.
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    storage: Arc<dyn Storage>,
}

impl HttpTransport {
    /// Build a transport for `base_url` with a fixed per-request `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: &str, timeout: Duration, storage: Arc<dyn Storage>) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned(), storage })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let url = self.url(&request.path);
        tracing::debug!(method = %request.method, %url, "api request");

        let mut builder = self.http.request(request.method, &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer_token(self.storage.as_ref()) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        classify_response(status, &text)
    }
}

/// Non-empty token from storage, if any.
fn bearer_token(storage: &dyn Storage) -> Option<String> {
    storage.get_item(TOKEN_KEY).filter(|token| !token.is_empty())
}

/// Map a raw status + body onto the payload or a [`TransportError`].
pub(crate) fn classify_response(status: u16, text: &str) -> Result<Value, TransportError> {
    let parsed = if text.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str::<Value>(text)
    };

    if (200..300).contains(&status) {
        return parsed.map_err(|e| TransportError::Decode(e.to_string()));
    }

    let body = parsed.unwrap_or_else(|_| Value::String(text.to_owned()));
    if status == 401 {
        tracing::debug!("api responded 401");
        return Err(TransportError::Unauthenticated { body });
    }
    Err(TransportError::Status { status, body })
}
