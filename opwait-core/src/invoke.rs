//! The collaborator boundary between the waiter engine and a remote API.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// A successful invocation of the remote check operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    /// Transport-level status code, e.g. an HTTP status. Matched by
    /// [`Matcher::Status`](crate::Matcher::Status).
    pub status: u16,
    /// Structured response body that path matchers project into.
    pub body: Value,
}

impl Response {
    /// A `200` response with the given body.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Response { status: 200, body }
    }
}

/// A failed invocation, carried through to `error` acceptors.
///
/// The engine never interprets the error beyond its `code`: either an
/// [`Matcher::Error`](crate::Matcher::Error) acceptor absorbs it, or the
/// attempt is retried.
#[derive(Clone, Debug, Deserialize, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ErrorResponse {
    /// Machine-readable error identifier, e.g. `"ValidationError"`.
    pub code: String,
    /// A human-readable description of the failure.
    #[serde(default)]
    pub message: String,
}

impl ErrorResponse {
    /// An error response with the given identifier and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorResponse {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Sends one status-check request to the remote system.
///
/// The engine forwards the configured operation name and the caller's request
/// value unchanged on every attempt; everything behind the call (transport,
/// auth, per-request timeouts, serialization of the concrete API) is the
/// implementer's business.
#[async_trait]
pub trait Invoke {
    /// Invokes `operation` once with `request`.
    async fn invoke(&self, operation: &str, request: &Value) -> Result<Response, ErrorResponse>;
}

#[async_trait]
impl<T: Invoke + Send + Sync + ?Sized> Invoke for &T {
    async fn invoke(&self, operation: &str, request: &Value) -> Result<Response, ErrorResponse> {
        (**self).invoke(operation, request).await
    }
}

#[async_trait]
impl<T: Invoke + Send + Sync + ?Sized> Invoke for Box<T> {
    async fn invoke(&self, operation: &str, request: &Value) -> Result<Response, ErrorResponse> {
        (**self).invoke(operation, request).await
    }
}
