//! Deterministic [`HttpClient`] double for unit tests

use crate::visitor::fetcher::{HttpClient, HttpResponse, VisitRequest};
use crate::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Canned response for one URL
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Completed exchange with the body split into chunks
    Ok { status: u16, chunks: Vec<Vec<u8>> },
    /// Exchange completes, then the body fails after a few bytes
    BodyError(u16),
    /// The request never completes
    TransportError,
}

impl StubResponse {
    /// Completed exchange with a body of `size` bytes
    pub fn sized(status: u16, size: usize) -> Self {
        Self::Ok {
            status,
            chunks: vec![vec![b'x'; size]],
        }
    }

    pub fn chunked(status: u16, chunks: Vec<Vec<u8>>) -> Self {
        Self::Ok { status, chunks }
    }
}

/// Records every request and answers from a per-URL table
pub struct StubClient {
    responses: HashMap<String, StubResponse>,
    default: StubResponse,
    delay: Option<Duration>,
    requests: Mutex<Vec<(String, String)>>,
}

impl StubClient {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            default: StubResponse::sized(200, 0),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, response: StubResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn with_default(mut self, response: StubResponse) -> Self {
        self.default = response;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in request order
    pub fn requested(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// `User-Agent` values sent so far, in request order
    pub fn user_agents(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, agent)| agent.clone())
            .collect()
    }
}

#[async_trait]
impl HttpClient for StubClient {
    async fn execute(&self, request: VisitRequest) -> Result<HttpResponse, FetchError> {
        let url = request.url.to_string();
        let agent = request.user_agent.to_str().unwrap_or_default().to_string();
        self.requests.lock().unwrap().push((url.clone(), agent));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .get(&url)
            .cloned()
            .unwrap_or_else(|| self.default.clone());

        match response {
            StubResponse::Ok { status, chunks } => {
                let body = stream::iter(chunks.into_iter().map(|c| Ok(Bytes::from(c)))).boxed();
                Ok(HttpResponse::new(status, body))
            }
            StubResponse::BodyError(status) => {
                let body = stream::iter(vec![
                    Ok(Bytes::from_static(b"partial")),
                    Err(FetchError::Body {
                        url,
                        message: "connection reset".to_string(),
                    }),
                ])
                .boxed();
                Ok(HttpResponse::new(status, body))
            }
            StubResponse::TransportError => Err(FetchError::Stub(format!("{} unreachable", url))),
        }
    }
}
