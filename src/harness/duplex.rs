//! Bidirectional-streaming handler.
//!
//! The handler owns a task that alternates strictly between reading one
//! inbound request and writing its response. The caller keeps the inbound
//! side and the response stream as independent halves, so it can keep
//! sending while it reads without buffering the whole request sequence.
//!
//! ```text
//!   Open ──(inbound ends)──> Draining ──(last write done)──> Closed
//!     └──────────────(cancelled / consumer gone)───────────────┘
//! ```
//!
//! Every response is written before the next read, so when inbound ends
//! nothing is pending and Draining passes straight to Closed. A monitor
//! only observes Draining if it reads the state between the two updates.
//!
//! Cancellation also ends the response stream on the consumer side:
//! responses already queued in the channel are dropped, not delivered.

use std::time::Instant;

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::{
    ResponseStream, StreamOptions, StreamOutcome, pace, record_stream_end, response_stream,
};
use crate::Result;

const OPERATION: &str = "stream";

/// Lifecycle of a duplex call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplexState {
    /// Reading requests and writing responses.
    Open,
    /// Inbound has ended; no more reads, pending writes still go out.
    Draining,
    /// Terminal.
    Closed,
}

/// Observer for the state of a running duplex call.
#[derive(Debug, Clone)]
pub struct DuplexMonitor {
    state: watch::Receiver<DuplexState>,
}

impl DuplexMonitor {
    /// Current state.
    pub fn state(&self) -> DuplexState {
        *self.state.borrow()
    }

    /// Wait until the call reaches [`DuplexState::Closed`].
    pub async fn closed(&mut self) {
        // The sender only drops after publishing Closed, so an error here
        // still means the call is over.
        let _ = self.state.wait_for(|s| *s == DuplexState::Closed).await;
    }
}

/// Run `transform` over every item of `inbound`, one response per request.
///
/// An `Err` read from `inbound` is forwarded as the final item. An `Err`
/// returned by `transform` is written and ends the call. Cancellation ends
/// the call without an error item, abandoning unread requests and any
/// response not yet written.
pub fn duplex<Req, Resp, S, F>(
    inbound: S,
    transform: F,
    options: StreamOptions,
) -> (ResponseStream<Resp>, DuplexMonitor)
where
    Req: Send + 'static,
    Resp: Send + 'static,
    S: Stream<Item = Result<Req>> + Send + 'static,
    F: FnMut(Req) -> Result<Resp> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(options.channel_capacity());
    let (state_tx, state_rx) = watch::channel(DuplexState::Open);
    let responses = response_stream(rx, &options.cancel);
    tokio::spawn(run(inbound, transform, tx, state_tx, options));
    (responses, DuplexMonitor { state: state_rx })
}

async fn run<Req, Resp, S, F>(
    inbound: S,
    mut transform: F,
    tx: mpsc::Sender<Result<Resp>>,
    state: watch::Sender<DuplexState>,
    options: StreamOptions,
) -> StreamOutcome
where
    S: Stream<Item = Result<Req>>,
    F: FnMut(Req) -> Result<Resp>,
{
    let start = Instant::now();
    let mut inbound = std::pin::pin!(inbound);
    let cancel = &options.cancel;
    info!(label = options.label, "duplex stream started");

    let mut received = 0u64;
    let mut emitted = 0u64;

    let outcome = loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => break StreamOutcome::Cancelled,
            _ = tx.closed() => break StreamOutcome::Cancelled,
            next = inbound.next() => next,
        };

        let item = match next {
            None => {
                state.send_replace(DuplexState::Draining);
                break StreamOutcome::Completed;
            }
            Some(Err(e)) => {
                warn!(error = %e, "inbound stream failed");
                // Best effort: the consumer may already be gone.
                let _ = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break StreamOutcome::Cancelled,
                    sent = tx.send(Err(e)) => sent,
                };
                break StreamOutcome::Failed;
            }
            Some(Ok(request)) => {
                received += 1;
                transform(request)
            }
        };

        let failed = item.is_err();
        if let Err(ref e) = item {
            warn!(index = received, error = %e, "rejected stream item");
        }

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => false,
            sent = tx.send(item) => sent.is_ok(),
        };
        if !sent {
            break StreamOutcome::Cancelled;
        }
        if failed {
            break StreamOutcome::Failed;
        }
        emitted += 1;
        debug!(index = received, "duplex item written");

        if !pace(options.pacing, cancel, &tx).await {
            break StreamOutcome::Cancelled;
        }
    };

    drop(tx);
    state.send_replace(DuplexState::Closed);

    match outcome {
        StreamOutcome::Cancelled => info!(received, emitted, "duplex stream cancelled"),
        _ => info!(received, emitted, "duplex stream finished"),
    }
    record_stream_end(OPERATION, options.label, start, outcome, emitted);
    outcome
}
