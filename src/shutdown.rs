//! Shutdown triggers for a run
//!
//! A single listener task waits for an interrupt (Ctrl-C), a terminate signal
//! (unix only) or the optional overall deadline, and cancels the run's token
//! when the first of them fires.

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What cancelled the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    Deadline,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate signal",
            Self::Deadline => "deadline",
        };
        f.write_str(s)
    }
}

/// Spawns the listener for `cancel`
///
/// The task resolves to the reason it cancelled the token, or `None` if the
/// token was cancelled by someone else first.
pub fn spawn_shutdown_listener(
    cancel: CancellationToken,
    deadline: Option<Duration>,
) -> JoinHandle<Option<ShutdownReason>> {
    tokio::spawn(listen(cancel, deadline, interrupt(), terminate()))
}

async fn listen<I, T>(
    cancel: CancellationToken,
    deadline: Option<Duration>,
    interrupt: I,
    terminate: T,
) -> Option<ShutdownReason>
where
    I: Future<Output = ()>,
    T: Future<Output = ()>,
{
    let reason = tokio::select! {
        biased;
        _ = cancel.cancelled() => return None,
        _ = interrupt => ShutdownReason::Interrupt,
        _ = terminate => ShutdownReason::Terminate,
        _ = expire(deadline) => ShutdownReason::Deadline,
    };

    tracing::warn!(reason = %reason, "Cancelling run");
    cancel.cancel();
    Some(reason)
}

async fn expire(deadline: Option<Duration>) {
    match deadline {
        Some(d) => tokio::time::sleep(d).await,
        None => std::future::pending().await,
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            tracing::error!("Could not listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
