//! URL input sources
//!
//! A [`UrlSource`] yields raw strings, either from a fixed list (command-line
//! arguments) or line by line from an async reader such as stdin.
//! [`spawn_url_stream`] validates them on a producer task and feeds the
//! accepted URLs into a bounded channel for the worker pool.

use crate::output::VisitStats;
use crate::url::{NormalizedUrl, UrlValidator};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where raw URLs come from
pub enum UrlSource {
    /// A fixed list, consumed in order
    Args(Vec<String>),
    /// One URL per line
    Lines(Box<dyn AsyncBufRead + Send + Unpin>),
}

impl UrlSource {
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Args(args.into_iter().map(Into::into).collect())
    }

    pub fn from_reader<R>(reader: R) -> Self
    where
        R: AsyncBufRead + Send + Unpin + 'static,
    {
        Self::Lines(Box::new(reader))
    }

    /// Reads URLs from the process's standard input
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Picks the source for a command-line invocation
    ///
    /// Arguments win when present. Otherwise stdin is read, unless it is an
    /// interactive terminal, in which case there is no input at all.
    pub fn from_cli(urls: Vec<String>, stdin_is_terminal: bool) -> Option<Self> {
        if !urls.is_empty() {
            Some(Self::Args(urls))
        } else if stdin_is_terminal {
            None
        } else {
            Some(Self::stdin())
        }
    }
}

impl std::fmt::Debug for UrlSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Args(args) => f.debug_tuple("Args").field(args).finish(),
            Self::Lines(_) => f.write_str("Lines(..)"),
        }
    }
}

/// Starts the producer task for `source`
///
/// Every raw string is trimmed; empty ones are skipped silently, invalid ones
/// are logged and skipped. Accepted URLs are sent in input order. The returned
/// receiver closes when the source is exhausted or the run is cancelled.
pub fn spawn_url_stream(
    source: UrlSource,
    validator: Arc<UrlValidator>,
    stats: Arc<VisitStats>,
    cancel: CancellationToken,
    capacity: usize,
) -> (mpsc::Receiver<NormalizedUrl>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let producer = Producer {
        validator,
        stats,
        cancel,
        tx,
    };

    let handle = tokio::spawn(async move {
        match source {
            UrlSource::Args(args) => producer.feed_args(args).await,
            UrlSource::Lines(reader) => producer.feed_lines(reader).await,
        }
    });

    (rx, handle)
}

struct Producer {
    validator: Arc<UrlValidator>,
    stats: Arc<VisitStats>,
    cancel: CancellationToken,
    tx: mpsc::Sender<NormalizedUrl>,
}

impl Producer {
    async fn feed_args(&self, args: Vec<String>) {
        for raw in args {
            if !self.offer(&raw).await {
                return;
            }
        }
        tracing::debug!("All URL arguments consumed");
    }

    async fn feed_lines(&self, reader: Box<dyn AsyncBufRead + Send + Unpin>) {
        let mut lines = reader.lines();

        loop {
            let line = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::warn!("URL input abandoned: run was cancelled");
                    return;
                }
                line = lines.next_line() => line,
            };

            match line {
                Ok(Some(raw)) => {
                    if !self.offer(&raw).await {
                        return;
                    }
                }
                Ok(None) => {
                    tracing::debug!("URL input exhausted");
                    return;
                }
                Err(e) => {
                    tracing::error!("Could not read URL input: {}", e);
                    return;
                }
            }
        }
    }

    /// Validates one raw string and sends it on
    ///
    /// Returns false once no further URLs should be produced.
    async fn offer(&self, raw: &str) -> bool {
        if self.cancel.is_cancelled() {
            tracing::warn!("URL input abandoned: run was cancelled");
            return false;
        }

        if raw.trim().is_empty() {
            return true;
        }

        let url = match self.validator.validate(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(input = raw.trim(), "Rejected URL: {}", e);
                self.stats.record_rejected();
                return true;
            }
        };

        tracing::info!(url = %url, "Accepted URL");
        let shown = url.to_string();

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::warn!(url = %shown, "URL not dispatched: run was cancelled");
                false
            }
            sent = self.tx.send(url) => {
                if sent.is_ok() {
                    self.stats.record_accepted();
                    true
                } else {
                    tracing::debug!("URL stream has no readers left");
                    false
                }
            }
        }
    }
}
