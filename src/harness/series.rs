//! Server-streaming handler.

use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{
    ConvertedStream, StreamOptions, StreamOutcome, pace, record_stream_end, response_stream,
};
use crate::{Converted, Result, SeriesRequest};

const OPERATION: &str = "series";

/// Stream one response per input of `request`, in ascending order.
///
/// The request must already be validated; a non-finite input is still
/// written as an error item and ends the stream. Cancellation stops the
/// stream after a strict prefix of the full sequence, without an error.
pub fn series(request: SeriesRequest, options: StreamOptions) -> ConvertedStream {
    let (tx, rx) = mpsc::channel(options.channel_capacity());
    let responses = response_stream(rx, &options.cancel);
    tokio::spawn(run(request, tx, options));
    responses
}

async fn run(
    request: SeriesRequest,
    tx: mpsc::Sender<Result<Converted>>,
    options: StreamOptions,
) -> StreamOutcome {
    let start = Instant::now();
    let conversion = request.conversion;
    let total = request.count;
    info!(%conversion, count = total, start_value = request.start_value, "series started");

    let mut emitted = 0u64;
    let mut outcome = StreamOutcome::Completed;

    for (i, input) in request.inputs().enumerate() {
        if options.cancel.is_cancelled() {
            outcome = StreamOutcome::Cancelled;
            break;
        }

        let item = Converted::compute(conversion, input);
        let failed = item.is_err();
        if let Ok(ref converted) = item {
            debug!(index = i + 1, total, description = %converted.description, "series item");
        }

        let sent = tokio::select! {
            biased;
            _ = options.cancel.cancelled() => false,
            sent = tx.send(item) => sent.is_ok(),
        };
        if !sent {
            outcome = StreamOutcome::Cancelled;
            break;
        }
        if failed {
            outcome = StreamOutcome::Failed;
            break;
        }
        emitted += 1;

        let last = i + 1 == total as usize;
        if !last && !pace(options.pacing, &options.cancel, &tx).await {
            outcome = StreamOutcome::Cancelled;
            break;
        }
    }

    match outcome {
        StreamOutcome::Cancelled => info!(emitted, total, "series cancelled"),
        _ => info!(emitted, total, "series finished"),
    }
    record_stream_end(OPERATION, options.label, start, outcome, emitted);
    outcome
}
