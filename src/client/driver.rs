//! Demonstration driver.
//!
//! Exercises every call shape against a [`UnitConverter`]: the six unary
//! conversions, one series call, and one bidirectional stream. Each call's
//! outcome is captured on its own; a failing call never stops the run.

use std::time::Duration;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{Conversion, ConverterError, Result, SeriesRequest, UnitConverter};

/// Unary calls made by the demo, in order.
pub const UNARY_CALLS: [(Conversion, f64); 6] = [
    (Conversion::EuroToDollar, 10.0),
    (Conversion::DollarToEuro, 10.80),
    (Conversion::KmToMiles, 100.0),
    (Conversion::MilesToKm, 62.14),
    (Conversion::CelsiusToFahrenheit, 20.0),
    (Conversion::FahrenheitToCelsius, 68.0),
];

/// Values sent over the bidirectional stream.
pub const STREAM_VALUES: [f64; 5] = [0.0, 10.0, 20.0, -5.0, 30.0];

/// Demo settings.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Series request sent by the demo.
    pub series: SeriesRequest,
    /// Values sent over the bidirectional stream.
    pub stream_values: Vec<f64>,
    /// Delay between values sent over the bidirectional stream.
    pub send_pacing: Duration,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            series: SeriesRequest::new(Conversion::CelsiusToFahrenheit, 0.0, 5),
            stream_values: STREAM_VALUES.to_vec(),
            send_pacing: Duration::ZERO,
        }
    }
}

/// Outcome of a single demo call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CallOutcome {
    /// A unary call returned.
    Reply { description: String },
    /// A streaming call ran; `error` is set if it ended early.
    Streamed {
        descriptions: Vec<String>,
        error: Option<String>,
    },
    /// The call failed before producing anything.
    Failed { error: String },
}

impl CallOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            CallOutcome::Reply { .. } => true,
            CallOutcome::Streamed { error, .. } => error.is_none(),
            CallOutcome::Failed { .. } => false,
        }
    }
}

/// One call and what came of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallReport {
    pub call: String,
    #[serde(flatten)]
    pub outcome: CallOutcome,
}

/// Everything the demo did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoReport {
    pub calls: Vec<CallReport>,
}

impl DemoReport {
    /// Whether every call succeeded.
    pub fn all_ok(&self) -> bool {
        self.calls.iter().all(|c| c.outcome.is_ok())
    }

    fn push(&mut self, call: impl Into<String>, outcome: CallOutcome) {
        self.calls.push(CallReport {
            call: call.into(),
            outcome,
        });
    }
}

/// Run the full demo, passing each progress line to `progress`.
pub async fn run_demo<C, P>(converter: &C, options: &DemoOptions, mut progress: P) -> DemoReport
where
    C: UnitConverter + ?Sized,
    P: FnMut(&str),
{
    let mut report = DemoReport::default();

    progress("Testing unary conversions...");
    for (conversion, value) in UNARY_CALLS {
        let call = rpc_name(conversion);
        let outcome = match converter.convert(conversion, value).await {
            Ok(reply) => {
                progress(&format!(" -> {call} Reply: {}", reply.description));
                CallOutcome::Reply {
                    description: reply.description,
                }
            }
            Err(e) => {
                progress(&format!(" !! RPC Error: {e}"));
                CallOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };
        report.push(call, outcome);
    }

    progress("Testing server streaming (GetMultipleTemperatureConversions)...");
    let outcome = run_series(converter, options.series, &mut progress).await;
    report.push("GetMultipleTemperatureConversions", outcome);

    progress("Testing bidirectional streaming (CelsiusToFahrenheitStream)...");
    let outcome = run_duplex(converter, options, &mut progress).await;
    report.push("CelsiusToFahrenheitStream", outcome);

    report
}

async fn run_series<C, P>(converter: &C, request: SeriesRequest, progress: &mut P) -> CallOutcome
where
    C: UnitConverter + ?Sized,
    P: FnMut(&str),
{
    progress(&format!(
        " -> Requesting {} conversions starting from {}...",
        request.count, request.start_value
    ));
    let stream = match converter.convert_series(request).await {
        Ok(stream) => stream,
        Err(e) => return failed(progress, "server stream", e),
    };

    let (descriptions, error) = drain(stream, progress, "    -> Server Stream Response").await;
    if error.is_none() {
        progress(" -> Server stream finished.");
    }
    CallOutcome::Streamed {
        descriptions,
        error,
    }
}

async fn run_duplex<C, P>(converter: &C, options: &DemoOptions, progress: &mut P) -> CallOutcome
where
    C: UnitConverter + ?Sized,
    P: FnMut(&str),
{
    progress(&format!(
        " -> Will send {} Celsius values via stream...",
        options.stream_values.len()
    ));

    // The writer runs on its own task so sending never waits on reading.
    let (tx, rx) = mpsc::channel::<Result<f64>>(1);
    let values = options.stream_values.clone();
    let pacing = options.send_pacing;
    let writer = tokio::spawn(async move {
        for value in values {
            debug!(value, "sending stream value");
            if tx.send(Ok(value)).await.is_err() {
                warn!("stream closed before all values were sent");
                return;
            }
            if !pacing.is_zero() {
                tokio::time::sleep(pacing).await;
            }
        }
        debug!("finished sending stream values");
    });

    let stream = match converter
        .convert_stream(
            Conversion::CelsiusToFahrenheit,
            Box::pin(ReceiverStream::new(rx)),
        )
        .await
    {
        Ok(stream) => stream,
        Err(e) => {
            writer.abort();
            return failed(progress, "bidirectional stream", e);
        }
    };

    let (descriptions, mut error) = drain(stream, progress, "    <- BiDi Stream Response").await;
    if let Err(e) = writer.await {
        error.get_or_insert_with(|| format!("writer task failed: {e}"));
    }
    if error.is_none() {
        progress(" -> Bidirectional stream interaction finished.");
    }
    CallOutcome::Streamed {
        descriptions,
        error,
    }
}

async fn drain<P>(
    mut stream: crate::ConvertedStream,
    progress: &mut P,
    prefix: &str,
) -> (Vec<String>, Option<String>)
where
    P: FnMut(&str),
{
    let mut descriptions = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(reply) => {
                progress(&format!("{prefix}: {}", reply.description));
                descriptions.push(reply.description);
            }
            Err(e) => {
                progress(&format!(" !! RPC Error during stream: {e}"));
                return (descriptions, Some(e.to_string()));
            }
        }
    }
    (descriptions, None)
}

fn failed<P: FnMut(&str)>(progress: &mut P, what: &str, e: ConverterError) -> CallOutcome {
    progress(&format!(" !! RPC Error during {what}: {e}"));
    CallOutcome::Failed {
        error: e.to_string(),
    }
}

/// RPC method name for a unary conversion.
pub fn rpc_name(conversion: Conversion) -> &'static str {
    match conversion {
        Conversion::EuroToDollar => "EuroToDollar",
        Conversion::DollarToEuro => "DollarToEuro",
        Conversion::KmToMiles => "KmToMiles",
        Conversion::MilesToKm => "MilesToKm",
        Conversion::CelsiusToFahrenheit => "CelsiusToFahrenheit",
        Conversion::FahrenheitToCelsius => "FahrenheitToCelsius",
    }
}
