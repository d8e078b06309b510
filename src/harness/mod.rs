//! Call-shape handlers.
//!
//! Each handler drives one call of a given shape:
//!
//! - [`unary`]: one request, one response, computed synchronously.
//! - [`series`]: one request, a bounded ordered run of responses.
//! - [`duplex`]: a stream of requests in, one response per request out.
//!
//! Streaming handlers run on their own tokio task and write into a bounded
//! `mpsc` channel; the caller receives the other end as a stream. Every
//! suspension point races against the call's [`CancellationToken`] and
//! against the consumer dropping the stream.

use std::pin::Pin;
use std::time::{Duration, Instant};

use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::telemetry;
use crate::{Converted, Result};

pub mod duplex;
pub mod series;
pub mod unary;

pub use duplex::{DuplexMonitor, DuplexState, duplex};
pub use series::series;
pub use unary::unary;

/// Default number of responses buffered between a handler and its consumer.
pub const DEFAULT_STREAM_BUFFER: usize = 16;

/// A boxed stream of handler responses.
pub type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// A boxed stream of conversion responses.
pub type ConvertedStream = ResponseStream<Converted>;

/// Per-call settings for a streaming handler.
#[derive(Debug, Clone)]
pub struct StreamOptions {
    /// Delay after each emitted response. Zero disables pacing.
    pub pacing: Duration,
    /// Capacity of the response channel (minimum 1).
    pub buffer: usize,
    /// Cooperative cancellation for this call.
    pub cancel: CancellationToken,
    /// Label attached to metrics, usually the conversion name.
    pub label: &'static str,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            pacing: Duration::ZERO,
            buffer: DEFAULT_STREAM_BUFFER,
            cancel: CancellationToken::new(),
            label: "custom",
        }
    }
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn buffer(mut self, buffer: usize) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub(crate) fn channel_capacity(&self) -> usize {
        self.buffer.max(1)
    }
}

/// How a streaming call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Every response was written.
    Completed,
    /// Cancelled by token or by the consumer going away.
    Cancelled,
    /// An error item was written and the stream stopped.
    Failed,
}

impl StreamOutcome {
    fn status(self) -> &'static str {
        match self {
            StreamOutcome::Failed => "error",
            StreamOutcome::Completed | StreamOutcome::Cancelled => "ok",
        }
    }
}

/// The consumer half of a handler's channel.
///
/// Ends as soon as `cancel` fires, dropping responses still queued in the
/// channel.
pub(crate) fn response_stream<T: Send + 'static>(
    rx: mpsc::Receiver<Result<T>>,
    cancel: &CancellationToken,
) -> ResponseStream<T> {
    Box::pin(ReceiverStream::new(rx).take_until(cancel.clone().cancelled_owned()))
}

/// Record request outcome metrics (counter + histogram).
pub(crate) fn record_request(
    operation: &'static str,
    label: &'static str,
    start: Instant,
    ok: bool,
) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(telemetry::REQUESTS_TOTAL,
        "operation" => operation,
        "conversion" => label,
        "status" => status,
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
        "operation" => operation,
        "conversion" => label,
    )
    .record(start.elapsed().as_secs_f64());
}

/// Record the end of a streaming call.
pub(crate) fn record_stream_end(
    operation: &'static str,
    label: &'static str,
    start: Instant,
    outcome: StreamOutcome,
    emitted: u64,
) {
    record_request(operation, label, start, outcome.status() == "ok");
    metrics::counter!(telemetry::STREAM_ITEMS_TOTAL,
        "operation" => operation,
        "conversion" => label,
    )
    .increment(emitted);
    if outcome == StreamOutcome::Cancelled {
        metrics::counter!(telemetry::STREAMS_CANCELLED_TOTAL, "operation" => operation)
            .increment(1);
    }
}

/// Sleep for `pacing`, returning `false` if the call was cancelled first.
pub(crate) async fn pace<T>(
    pacing: Duration,
    cancel: &CancellationToken,
    tx: &mpsc::Sender<T>,
) -> bool {
    if pacing.is_zero() {
        return !cancel.is_cancelled() && !tx.is_closed();
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tx.closed() => false,
        _ = tokio::time::sleep(pacing) => true,
    }
}
