//! HTTP transport for the to-do REST API.
//!
//! ```no_run
//! use todo_core::{HttpTodoApi, TaskListService};
//! use todo_rest_client::ReqwestTransportBuilder;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = ReqwestTransportBuilder::new("http://localhost:3000").build()?;
//! let mut service = TaskListService::new(HttpTodoApi::new(transport));
//! service.login("Test user").await?;
//! service.fetch_all().await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::time::Duration;
use todo_core::{Transport, TransportError, TransportRequest, TransportResponse, TransportResult};
use tracing::{debug, warn};
use url::Url;

/// Join a base URL and a path with exactly one slash between them.
fn join_url_segments(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, path)
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Request(error.to_string())
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

pub struct ReqwestTransportBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl ReqwestTransportBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
        }
    }

    /// Requests never time out unless this is set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// # Errors
    ///
    /// Returns an error if the base URL does not parse or the HTTP client
    /// fails to build.
    pub fn build(self) -> TransportResult<ReqwestTransport> {
        let parsed = Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(TransportError::InvalidUrl(self.base_url));
        }

        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build().map_err(map_reqwest_error)?;

        Ok(ReqwestTransport {
            client,
            base_url: self.base_url,
        })
    }
}

impl ReqwestTransport {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn request(&self, request: TransportRequest) -> TransportResult<TransportResponse> {
        let url = join_url_segments(&self.base_url, &request.path);
        debug!(method = %request.method, %url, "Sending request");

        let mut request_builder = self
            .client
            .request(request.method, &url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            request_builder = request_builder.json(body);
        }

        let response = request_builder.send().await.map_err(|e| {
            warn!(%url, error = %e, "HTTP request failed");
            map_reqwest_error(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        debug!(%url, %status, bytes = text.len(), "Received response");

        Ok(TransportResponse::from_text(status, &text))
    }
}
