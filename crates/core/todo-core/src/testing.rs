use crate::error::{TransportError, TransportResult};
use crate::transport::{Transport, TransportRequest, TransportResponse};
use async_trait::async_trait;
use http::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses and records every request it sees.
#[derive(Clone, Default)]
pub struct StubTransport {
    responses: Arc<Mutex<VecDeque<TransportResult<TransportResponse>>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, status: StatusCode, body: Value) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    pub fn push_ok(&self, body: Value) {
        self.push(StatusCode::OK, body);
    }

    pub fn push_err(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn request(&self, request: TransportRequest) -> TransportResult<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no stubbed response".to_string())))
    }
}
