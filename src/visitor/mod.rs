//! Visitor module - concurrent fetching and outcome collection
//!
//! # Components
//!
//! - `fetcher`: the [`HttpClient`] capability and a single fetch attempt
//! - `pool`: a fixed number of workers sharing one URL stream
//! - `aggregator`: the single consumer of the outcome stream
//! - `coordinator`: wires the above together and owns the run state

mod aggregator;
mod coordinator;
mod fetcher;
mod outcome;
mod pool;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::Aggregator;
pub use coordinator::Coordinator;
pub use fetcher::{
    build_http_client, prepare_request, visit_url, BodyStream, HttpClient, HttpResponse,
    ReqwestClient, VisitRequest,
};
pub use outcome::VisitOutcome;
pub use pool::{OutcomeSink, WorkerContext, WorkerPool};
