//! Fixed-size fetch worker pool
//!
//! Every worker pulls from one shared URL receiver, so each URL is visited by
//! exactly one worker. Workers only ever send on the outcome stream; closing
//! it is left to whoever created it.

use crate::output::VisitStats;
use crate::url::NormalizedUrl;
use crate::visitor::fetcher::{visit_url, HttpClient};
use crate::visitor::outcome::VisitOutcome;
use reqwest::header::HeaderValue;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// URL receiver shared by all workers of a pool
type SharedUrlReceiver = Arc<Mutex<mpsc::Receiver<NormalizedUrl>>>;

/// Send-only handle onto the outcome stream
///
/// Dropping a sink never closes the stream while the coordinator still holds
/// its own sender.
#[derive(Clone)]
pub struct OutcomeSink {
    tx: mpsc::Sender<VisitOutcome>,
}

impl OutcomeSink {
    pub(crate) fn new(tx: mpsc::Sender<VisitOutcome>) -> Self {
        Self { tx }
    }

    /// Pushes `outcome`, giving up if the run is cancelled while waiting for room
    ///
    /// Returns false when the outcome was not delivered.
    pub async fn push(&self, outcome: VisitOutcome, cancel: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            sent = self.tx.send(outcome) => sent.is_ok(),
            _ = cancel.cancelled() => false,
        }
    }
}

/// Everything a worker needs besides its input and output streams
#[derive(Clone)]
pub struct WorkerContext {
    pub client: Arc<dyn HttpClient>,
    pub user_agent: HeaderValue,
    pub cancel: CancellationToken,
    pub stats: Arc<VisitStats>,
}

/// Handles to the running workers of a pool
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns exactly `concurrency` workers reading from `urls`
    pub fn spawn(
        concurrency: usize,
        urls: mpsc::Receiver<NormalizedUrl>,
        sink: OutcomeSink,
        context: WorkerContext,
    ) -> Self {
        let urls: SharedUrlReceiver = Arc::new(Mutex::new(urls));

        let handles = (0..concurrency)
            .map(|id| {
                let urls = urls.clone();
                let sink = sink.clone();
                let context = context.clone();
                tokio::spawn(run_worker(id, urls, sink, context))
            })
            .collect();

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Waits until every worker has exited
    ///
    /// All workers are awaited even if one of them failed; the first failure
    /// is returned afterwards.
    pub async fn join(self) -> Result<(), JoinError> {
        let mut first_error = None;

        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker task failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Worker loop: take a URL, visit it, push the outcome, repeat
async fn run_worker(
    id: usize,
    urls: SharedUrlReceiver,
    sink: OutcomeSink,
    context: WorkerContext,
) {
    loop {
        let next = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => {
                tracing::warn!(worker = id, "Worker must stop: run was cancelled");
                break;
            }
            url = next_url(&urls) => url,
        };

        let Some(url) = next else {
            tracing::debug!(worker = id, "URL stream closed");
            break;
        };

        if context.cancel.is_cancelled() {
            tracing::warn!(worker = id, url = %url, "Worker must stop: run was cancelled");
            break;
        }

        context.stats.record_attempt();

        match visit_url(
            context.client.as_ref(),
            &url,
            &context.user_agent,
            &context.cancel,
        )
        .await
        {
            Ok(outcome) => {
                tracing::info!(
                    method = %outcome.method,
                    url = %outcome.url,
                    status = outcome.status_code,
                    body_size = outcome.body_size,
                    "Visited"
                );
                context.stats.record_completed();

                if !sink.push(outcome, &context.cancel).await {
                    tracing::warn!(url = %url, "Outcome dropped: run was cancelled before delivery");
                    context.stats.record_lost();
                }
            }
            Err(e) => {
                tracing::error!("Could not visit url [{}]: {}", url, e);
                context.stats.record_dropped();
            }
        }
    }
}

async fn next_url(urls: &SharedUrlReceiver) -> Option<NormalizedUrl> {
    urls.lock().await.recv().await
}
