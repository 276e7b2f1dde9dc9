//! Mock transport for unit testing.
//!
//! Replays scripted responses in order and records every attempt, so tests can
//! assert on attempt counts and request payloads without touching the network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde_json::Value;

use super::{ApiRequest, Connector, RawResponse, Sender};
use crate::error::FetchError;

/// Snapshot of one attempt seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: Method,
    /// Request URL.
    pub url: String,
    /// Query parameters.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    responses: VecDeque<RawResponse>,
    requests: Vec<RecordedRequest>,
    connections: usize,
}

/// Mock sender replaying scripted responses.
#[derive(Debug, Clone, Default)]
pub struct MockSender {
    state: Arc<Mutex<MockState>>,
}

impl MockSender {
    /// Create a mock with no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that replays the given responses in order.
    pub fn with_responses(responses: Vec<RawResponse>) -> Self {
        let sender = Self::new();
        for response in responses {
            sender.push_response(response);
        }
        sender
    }

    /// Queue another response.
    pub fn push_response(&self, response: RawResponse) {
        self.lock().responses.push_back(response);
    }

    /// Queue a 200 response with a JSON body.
    pub fn push_json(&self, body: &Value) {
        self.push_response(RawResponse::new(200, body.to_string()));
    }

    /// Number of attempts made so far.
    pub fn attempts(&self) -> usize {
        self.lock().requests.len()
    }

    /// All attempts made so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Number of sessions opened through a [`MockConnector`].
    pub fn connections(&self) -> usize {
        self.lock().connections
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sender for MockSender {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse, FetchError> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method: request.method.clone(),
            url: request.url.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
        });
        state.responses.pop_front().ok_or_else(|| {
            FetchError::UnexpectedPayload("mock sender has no scripted response".to_string())
        })
    }
}

/// Connector handing out clones of one shared [`MockSender`].
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    sender: MockSender,
}

impl MockConnector {
    /// Create a connector over the given sender.
    pub fn new(sender: MockSender) -> Self {
        Self { sender }
    }

    /// The shared sender, for scripting and inspection.
    pub fn sender(&self) -> &MockSender {
        &self.sender
    }
}

impl Connector for MockConnector {
    type Sender = MockSender;

    fn connect(&self) -> Result<MockSender, FetchError> {
        self.sender.lock().connections += 1;
        Ok(self.sender.clone())
    }
}
