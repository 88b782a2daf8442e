//! Visitor coordinator - run orchestration
//!
//! This module owns the lifecycle of one run:
//! - Spawning the aggregator and the worker pool
//! - Closing the outcome stream once every worker has exited
//! - Walking the run through its states until it is done
//! - Turning a cancelled run into [`VisitorError::Cancelled`]

use crate::config::Config;
use crate::output::{Report, VisitStats};
use crate::source::{spawn_url_stream, UrlSource};
use crate::state::RunState;
use crate::url::{NormalizedUrl, UrlValidator};
use crate::visitor::aggregator::Aggregator;
use crate::visitor::fetcher::HttpClient;
use crate::visitor::pool::{OutcomeSink, WorkerContext, WorkerPool};
use crate::{ConfigError, Result, VisitorError};
use reqwest::header::HeaderValue;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Main visitor coordinator structure
///
/// A coordinator drives exactly one run. Once it has reached
/// [`RunState::Done`] any further run is refused.
pub struct Coordinator {
    client: Arc<dyn HttpClient>,
    concurrency: usize,
    user_agent: HeaderValue,
    stats: Arc<VisitStats>,
    state: watch::Sender<RunState>,
}

impl Coordinator {
    /// Creates a new coordinator
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP capability shared by every worker
    /// * `config` - Validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(VisitorError)` - The configuration cannot drive a run
    pub fn new(client: Arc<dyn HttpClient>, config: &Config) -> Result<Self> {
        if config.visitor.concurrency == 0 {
            return Err(ConfigError::Validation(
                "concurrency must be at least 1".to_string(),
            )
            .into());
        }

        let user_agent = HeaderValue::from_str(&config.user_agent.header).map_err(|e| {
            ConfigError::Validation(format!("user-agent header is not a valid header value: {}", e))
        })?;

        let (state, _) = watch::channel(RunState::Starting);

        Ok(Self {
            client,
            concurrency: config.visitor.concurrency,
            user_agent,
            stats: Arc::new(VisitStats::new()),
            state,
        })
    }

    pub fn stats(&self) -> Arc<VisitStats> {
        self.stats.clone()
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Subscribes to run state changes
    pub fn watch_state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    fn transition(&self, to: RunState) -> Result<()> {
        let mut refused = None;

        self.state.send_if_modified(|current| {
            if current.can_transition_to(to) {
                *current = to;
                true
            } else {
                refused = Some(*current);
                false
            }
        });

        match refused {
            Some(from) => Err(VisitorError::InvalidTransition { from, to }),
            None => {
                tracing::debug!(state = %to, "Run state changed");
                Ok(())
            }
        }
    }

    /// Validates URLs from `source` and visits them
    ///
    /// The producer task is awaited before returning, so nothing of the run is
    /// left running afterwards.
    pub async fn visit(
        &self,
        source: UrlSource,
        validator: Arc<UrlValidator>,
        cancel: CancellationToken,
    ) -> Result<Report> {
        let current = self.state();
        if current.is_terminal() {
            tracing::warn!("Coordinator has already finished its run");
        }
        if current != RunState::Starting {
            return Err(VisitorError::InvalidTransition {
                from: current,
                to: RunState::FetchingAndAggregating,
            });
        }

        let (urls, producer) = spawn_url_stream(
            source,
            validator,
            self.stats.clone(),
            cancel.clone(),
            self.concurrency,
        );

        let result = self.run(urls, cancel).await;
        producer.await?;
        result
    }

    /// Runs the pool over an already validated URL stream
    ///
    /// # Run Flow
    ///
    /// 1. Create the outcome stream and spawn the aggregator on it
    /// 2. Spawn the pool and wait until every worker has exited
    /// 3. Close the outcome stream by dropping the last sender
    /// 4. Wait for the aggregator and report its result
    ///
    /// The run reaches [`RunState::Done`] on every path that got past step 1,
    /// including cancellation.
    ///
    /// # Returns
    ///
    /// * `Ok(Report)` - Every outcome was collected
    /// * `Err(VisitorError::Cancelled)` - The run was cancelled before collection finished
    /// * `Err(VisitorError)` - The run could not start or a task failed
    pub async fn run(
        &self,
        urls: mpsc::Receiver<NormalizedUrl>,
        cancel: CancellationToken,
    ) -> Result<Report> {
        self.transition(RunState::FetchingAndAggregating)?;

        tracing::info!(workers = self.concurrency, "Starting visit run");

        let (outcome_tx, outcome_rx) = mpsc::channel(self.concurrency);
        let aggregator = Aggregator::new(cancel.clone()).spawn(outcome_rx);

        let context = WorkerContext {
            client: self.client.clone(),
            user_agent: self.user_agent.clone(),
            cancel: cancel.clone(),
            stats: self.stats.clone(),
        };
        let pool = WorkerPool::spawn(
            self.concurrency,
            urls,
            OutcomeSink::new(outcome_tx.clone()),
            context,
        );

        let pool_result = pool.join().await;

        self.transition(RunState::Draining)?;
        drop(outcome_tx);

        let aggregated = aggregator.await;

        self.transition(RunState::Done)?;

        pool_result?;
        let report = aggregated??;

        tracing::info!(
            outcomes = report.len(),
            successful = report.outcomes().iter().filter(|o| o.is_success()).count(),
            "Visit run completed"
        );
        Ok(report)
    }
}
