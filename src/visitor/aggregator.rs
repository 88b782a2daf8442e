//! Outcome aggregation
//!
//! The aggregator is the only consumer of the outcome stream. It finishes
//! normally once the stream closes and every buffered outcome is read; if the
//! run is cancelled first it stops and no report is produced.

use crate::output::Report;
use crate::visitor::outcome::VisitOutcome;
use crate::{Result, VisitorError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Aggregator {
    cancel: CancellationToken,
    collected: Vec<VisitOutcome>,
}

impl Aggregator {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            collected: Vec::new(),
        }
    }

    /// Reads outcomes until the stream closes
    ///
    /// Cancellation is checked before every read, so a cancelled run stops even
    /// when outcomes are still waiting in the buffer.
    pub async fn collect(&mut self, rx: &mut mpsc::Receiver<VisitOutcome>) -> Result<()> {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!(
                        collected = self.collected.len(),
                        "Aggregation must stop: run was cancelled"
                    );
                    return Err(VisitorError::Cancelled);
                }
                next = rx.recv() => next,
            };

            match next {
                Some(outcome) => {
                    tracing::debug!(url = %outcome.url, "Collected outcome");
                    self.collected.push(outcome);
                }
                None => {
                    tracing::debug!(collected = self.collected.len(), "Outcome stream closed");
                    return Ok(());
                }
            }
        }
    }

    /// Consumes the aggregator, producing the ordered report
    pub fn into_report(self) -> Report {
        Report::from_outcomes(self.collected)
    }

    /// Collects the whole stream and builds the report
    pub async fn run(mut self, mut rx: mpsc::Receiver<VisitOutcome>) -> Result<Report> {
        self.collect(&mut rx).await?;
        Ok(self.into_report())
    }

    /// Runs the aggregator on its own task
    pub fn spawn(self, rx: mpsc::Receiver<VisitOutcome>) -> JoinHandle<Result<Report>> {
        tokio::spawn(self.run(rx))
    }
}
