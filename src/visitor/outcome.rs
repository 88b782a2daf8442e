use crate::url::NormalizedUrl;
use serde::Serialize;

/// Recorded result of one completed fetch attempt
///
/// Failed attempts (request build or transport errors) never produce an
/// outcome. A response with a status of 300 or more is recorded with a body
/// size of 0 because its body is never read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisitOutcome {
    /// HTTP method used for the request
    pub method: String,

    /// The URL that was visited
    pub url: NormalizedUrl,

    /// Number of body bytes received
    pub body_size: u64,

    /// HTTP status code of the response
    pub status_code: u16,
}

impl VisitOutcome {
    /// Returns true when the response status was below 300
    pub fn is_success(&self) -> bool {
        self.status_code < 300
    }
}
