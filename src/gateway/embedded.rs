//! EmbeddedConverter - runs the call-shape handlers in-process

use async_trait::async_trait;
use futures_util::Stream;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::harness::{self, ConvertedStream, DuplexMonitor, StreamOptions};
use crate::traits::ValueStream;
use crate::{Conversion, Converted, Result, SeriesRequest, UnitConverter};

/// Converter that drives the handlers directly, without a transport.
///
/// Every streaming call gets a child of the converter's shutdown token, so
/// [`shutdown`](Self::shutdown) cancels all calls in flight.
#[derive(Debug, Clone)]
pub struct EmbeddedConverter {
    series_pacing: Duration,
    stream_pacing: Duration,
    stream_buffer: usize,
    max_series_len: u32,
    shutdown: CancellationToken,
}

impl EmbeddedConverter {
    pub(crate) fn new(
        series_pacing: Duration,
        stream_pacing: Duration,
        stream_buffer: usize,
        max_series_len: u32,
    ) -> Self {
        Self {
            series_pacing,
            stream_pacing,
            stream_buffer,
            max_series_len,
            shutdown: CancellationToken::new(),
        }
    }

    /// Longest series a single call may request.
    pub fn max_series_len(&self) -> u32 {
        self.max_series_len
    }

    /// Cancel every streaming call started by this converter.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// A fresh per-call token, cancelled on [`shutdown`](Self::shutdown).
    pub fn call_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Start a series call with an explicit cancellation token.
    pub fn series_call(
        &self,
        request: SeriesRequest,
        cancel: CancellationToken,
    ) -> Result<ConvertedStream> {
        if let Err(e) = request.validate(self.max_series_len) {
            warn!(error = %e, "rejected series request");
            return Err(e);
        }
        let options = StreamOptions::new()
            .pacing(self.series_pacing)
            .buffer(self.stream_buffer)
            .cancel(cancel)
            .label(request.conversion.name());
        Ok(harness::series(request, options))
    }

    /// Start a duplex call over a fallible inbound stream.
    ///
    /// Inbound errors (e.g. a transport reset) are forwarded as the last
    /// response item.
    pub fn stream_call<S>(
        &self,
        conversion: Conversion,
        inbound: S,
        cancel: CancellationToken,
    ) -> (ConvertedStream, DuplexMonitor)
    where
        S: Stream<Item = Result<f64>> + Send + 'static,
    {
        let options = StreamOptions::new()
            .pacing(self.stream_pacing)
            .buffer(self.stream_buffer)
            .cancel(cancel)
            .label(conversion.name());
        harness::duplex(
            inbound,
            move |value| Converted::compute(conversion, value).map(Converted::streamed),
            options,
        )
    }
}

#[async_trait]
impl UnitConverter for EmbeddedConverter {
    async fn convert(&self, conversion: Conversion, value: f64) -> Result<Converted> {
        harness::unary(conversion, value)
    }

    async fn convert_series(&self, request: SeriesRequest) -> Result<ConvertedStream> {
        self.series_call(request, self.call_token())
    }

    async fn convert_stream(
        &self,
        conversion: Conversion,
        values: ValueStream,
    ) -> Result<ConvertedStream> {
        let (responses, _monitor) = self.stream_call(conversion, values, self.call_token());
        Ok(responses)
    }
}
