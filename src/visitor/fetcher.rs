//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the visitor, including:
//! - The [`HttpClient`] capability that workers execute requests through
//! - Building the default reqwest-backed client
//! - Preparing a GET request for a normalized URL
//! - Running one fetch attempt and turning it into a [`VisitOutcome`]

use crate::url::NormalizedUrl;
use crate::visitor::outcome::VisitOutcome;
use crate::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client, Method};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Streamed response body
pub type BodyStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// A request ready to be executed by an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct VisitRequest {
    pub method: Method,
    /// The URL as produced by validation, used to identify the visit
    pub url: NormalizedUrl,
    /// The parsed request target
    pub target: Url,
    pub user_agent: HeaderValue,
}

/// Status and body of a completed HTTP exchange
///
/// Headers are not exposed. The body is released as soon as the response is
/// dropped, whether or not it was read.
pub struct HttpResponse {
    pub status: u16,
    pub body: BodyStream,
}

impl HttpResponse {
    pub fn new(status: u16, body: BodyStream) -> Self {
        Self { status, body }
    }
}

/// Capability to execute an HTTP request
///
/// Workers only talk to the network through this trait, so a test double with
/// canned responses can stand in for the real client.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: VisitRequest) -> Result<HttpResponse, FetchError>;
}

/// Default [`HttpClient`] backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Builds a client that gives up on any single request after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(timeout)?,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn execute(&self, request: VisitRequest) -> Result<HttpResponse, FetchError> {
        let url = request.url.to_string();

        let response = self
            .client
            .request(request.method, request.target)
            .header(USER_AGENT, request.user_agent)
            .send()
            .await
            .map_err(|e| classify_error(&url, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes_stream()
            .map(move |chunk| {
                chunk.map_err(|e| FetchError::Body {
                    url: url.clone(),
                    message: e.to_string(),
                })
            })
            .boxed();

        Ok(HttpResponse::new(status, body))
    }
}

/// Builds an HTTP client with the per-request timeout applied
///
/// # Arguments
///
/// * `timeout` - Upper bound for a whole request, connect through body
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Maps a reqwest failure to the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_builder() {
        FetchError::Build {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

/// Prepares a GET request for `url` carrying the identifying header
pub fn prepare_request(
    url: &NormalizedUrl,
    user_agent: &HeaderValue,
) -> Result<VisitRequest, FetchError> {
    let target = Url::parse(url.as_str()).map_err(|e| FetchError::Build {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    Ok(VisitRequest {
        method: Method::GET,
        url: url.clone(),
        target,
        user_agent: user_agent.clone(),
    })
}

/// Performs one fetch attempt for `url`
///
/// # Request Flow
///
/// 1. Build a GET request; a build failure drops the attempt
/// 2. Execute it, racing the run's cancellation token; a transport error or
///    cancellation drops the attempt
/// 3. Status >= 300: record a body size of 0 without reading the body
/// 4. Otherwise stream the body and count its bytes; a body read error is
///    logged and recorded as a body size of 0
///
/// # Returns
///
/// * `Ok(VisitOutcome)` - The exchange completed and produced an outcome
/// * `Err(FetchError)` - The attempt was dropped
pub async fn visit_url(
    client: &dyn HttpClient,
    url: &NormalizedUrl,
    user_agent: &HeaderValue,
    cancel: &CancellationToken,
) -> Result<VisitOutcome, FetchError> {
    let request = prepare_request(url, user_agent)?;
    let method = request.method.to_string();

    tracing::debug!(url = %url, method = %method, "Sending request");

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return Err(FetchError::Cancelled { url: url.to_string() });
        }
        result = client.execute(request) => result?,
    };

    let status_code = response.status;
    let body_size = if status_code >= 300 {
        tracing::warn!(url = %url, status = status_code, "Received non-success status");
        0
    } else {
        match read_body_size(response.body, cancel, url).await {
            Ok(size) => size,
            Err(e) => {
                tracing::error!("{}", e);
                0
            }
        }
    };

    Ok(VisitOutcome {
        method,
        url: url.clone(),
        body_size,
        status_code,
    })
}

/// Drains `body`, returning the number of bytes received
async fn read_body_size(
    mut body: BodyStream,
    cancel: &CancellationToken,
    url: &NormalizedUrl,
) -> Result<u64, FetchError> {
    let mut total: u64 = 0;

    loop {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(FetchError::Body {
                    url: url.to_string(),
                    message: "run was cancelled while reading".to_string(),
                });
            }
            chunk = body.next() => chunk,
        };

        match chunk {
            Some(chunk) => total += chunk?.len() as u64,
            None => return Ok(total),
        }
    }
}
