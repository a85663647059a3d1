//! Raw HTTP capability used by the API adapter.

use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::Value;
use std::sync::Arc;

/// A request relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl TransportRequest {
    /// New request carrying the JSON `Accept` and `Content-Type` headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method,
            path: path.into(),
            headers,
            body: None,
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: &str) -> TransportResult<Self> {
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn authorization(self, value: &str) -> TransportResult<Self> {
        self.header(AUTHORIZATION, value)
    }
}

/// Status and parsed body of an HTTP response.
///
/// An empty body parses as `null`; a body that is not JSON is kept as a JSON
/// string.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    /// Parse raw response text the way every transport should.
    pub fn from_text(status: StatusCode, text: &str) -> Self {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        };
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Server-provided error text from `message` (string or list of strings)
    /// or `error`.
    pub fn message(&self) -> Option<String> {
        let field = |name: &str| match self.body.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Value::Null => None,
            other => Some(other.to_string()),
        };
        field("message").or_else(|| field("error"))
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: TransportRequest) -> TransportResult<TransportResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, request: TransportRequest) -> TransportResult<TransportResponse> {
        (**self).request(request).await
    }
}
